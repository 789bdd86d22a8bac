//! 执行器与传感器抽象
//!
//! 真实的电机位置闭环与颜色采样由外部驱动实现，这里只定义最小的阻塞式接口：
//! 每个调用在电机到位（或采样完成）之后才返回。

use crate::DriverError;
use cubebot_protocol::{ChannelCount, ColorSample};

/// 绝对定位时的旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinDirection {
    /// 最短路径
    #[default]
    Shortest,
    Clockwise,
    CounterClockwise,
}

/// 单个位置控制电机
pub trait Motor {
    /// 运动到绝对角度（度），阻塞直到到位
    fn run_to_position(&mut self, degrees: i32, direction: SpinDirection) -> Result<(), DriverError>;

    /// 相对当前角度转动（度），阻塞直到到位
    fn run_for_degrees(&mut self, degrees: i32) -> Result<(), DriverError>;

    /// 停止后是否保持力矩
    fn set_hold(&mut self, _hold: bool) -> Result<(), DriverError> {
        Ok(())
    }
}

/// 颜色传感器
pub trait ColorSensor {
    /// 采样一次
    fn sample(&mut self) -> Result<ColorSample, DriverError>;

    /// 每次采样的通道数
    fn channels(&self) -> ChannelCount;
}

impl<M: Motor + ?Sized> Motor for Box<M> {
    fn run_to_position(&mut self, degrees: i32, direction: SpinDirection) -> Result<(), DriverError> {
        (**self).run_to_position(degrees, direction)
    }

    fn run_for_degrees(&mut self, degrees: i32) -> Result<(), DriverError> {
        (**self).run_for_degrees(degrees)
    }

    fn set_hold(&mut self, hold: bool) -> Result<(), DriverError> {
        (**self).set_hold(hold)
    }
}

impl<S: ColorSensor + ?Sized> ColorSensor for Box<S> {
    fn sample(&mut self) -> Result<ColorSample, DriverError> {
        (**self).sample()
    }

    fn channels(&self) -> ChannelCount {
        (**self).channels()
    }
}

/// 一台机器人的全部外设
pub struct RobotHardware {
    pub flipper: Box<dyn Motor + Send>,
    pub turntable: Box<dyn Motor + Send>,
    pub sensor: Box<dyn ColorSensor + Send>,
}

impl RobotHardware {
    pub fn new(
        flipper: impl Motor + Send + 'static,
        turntable: impl Motor + Send + 'static,
        sensor: impl ColorSensor + Send + 'static,
    ) -> Self {
        Self {
            flipper: Box::new(flipper),
            turntable: Box::new(turntable),
            sensor: Box::new(sensor),
        }
    }
}

impl std::fmt::Debug for RobotHardware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotHardware")
            .field("channels", &self.sensor.channels())
            .finish_non_exhaustive()
    }
}
