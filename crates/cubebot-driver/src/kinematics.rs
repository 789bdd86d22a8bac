//! 运动学核心
//!
//! [`RobotState`] 独占两台电机和颜色传感器，并跟踪当前执行器位姿。
//! 所有动作都是阻塞的：每条命令返回时电机已经到位。
//! 每条执行器命令之前检查取消标志。

use crate::cancel::CancelToken;
use crate::config::KinematicsConfig;
use crate::error::DriverError;
use crate::hardware::{RobotHardware, SpinDirection};
use crate::pose::{ActuatorPose, FlipperPreset, normalize_angle};
use crate::reorientation::{CubeOp, Reorientation};
use cubebot_protocol::{ColorSample, Direction};
use std::time::Duration;
use tracing::{debug, info};

/// 机器人运动学状态
pub struct RobotState {
    hardware: RobotHardware,
    config: KinematicsConfig,
    pose: ActuatorPose,
    cancel: CancelToken,
}

impl RobotState {
    /// 创建运动学状态
    ///
    /// 配置必须自洽，且传感器通道数与配置一致。
    pub fn new(hardware: RobotHardware, config: KinematicsConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let channels = hardware.sensor.channels();
        if channels != config.channels {
            return Err(DriverError::InvalidConfig(format!(
                "sensor reports {} channels, config expects {}",
                channels.len(),
                config.channels.len()
            )));
        }
        Ok(Self {
            hardware,
            config,
            pose: ActuatorPose::default(),
            cancel: CancelToken::new(),
        })
    }

    /// 使用外部共享的取消标志
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    pub fn pose(&self) -> ActuatorPose {
        self.pose
    }

    fn checkpoint(&self) -> Result<(), DriverError> {
        if self.cancel.is_cancelled() {
            return Err(DriverError::Cancelled);
        }
        Ok(())
    }

    /// 等待机构稳定
    pub fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            spin_sleep::sleep(delay);
        }
    }

    /// 上电初始化：两台电机保持力矩，翻转臂逆时针回到 Home，转盘回零
    ///
    /// 启动时位姿未知，这里不做 Hold 路由。
    pub fn initialize(&mut self) -> Result<(), DriverError> {
        self.checkpoint()?;
        self.hardware.flipper.set_hold(true)?;
        self.hardware.turntable.set_hold(true)?;

        let home = self.config.flipper.home;
        self.checkpoint()?;
        self.hardware
            .flipper
            .run_to_position(home, SpinDirection::CounterClockwise)?;
        self.pose.flipper = FlipperPreset::Home;

        self.checkpoint()?;
        self.hardware
            .turntable
            .run_to_position(self.config.turntable_home, SpinDirection::Shortest)?;
        self.pose.turntable = 0;

        info!("Robot initialized at {:?}", self.pose);
        Ok(())
    }

    /// 结束后收回翻转臂
    pub fn park(&mut self) -> Result<(), DriverError> {
        self.flipper_to(FlipperPreset::Home)?;
        info!("Robot parked");
        Ok(())
    }

    fn drive_flipper(&mut self, preset: FlipperPreset) -> Result<(), DriverError> {
        self.checkpoint()?;
        let angle = self.config.flipper.angle(preset);
        debug!("flipper {} -> {} ({}°)", self.pose.flipper, preset, angle);
        self.hardware
            .flipper
            .run_to_position(angle, preset.approach())?;
        self.pose.flipper = preset;
        Ok(())
    }

    /// 翻转臂移动到预设位，需要时自动经过 Hold
    pub fn flipper_to(&mut self, preset: FlipperPreset) -> Result<(), DriverError> {
        if self.pose.flipper == preset {
            return Ok(());
        }
        if self.pose.flipper.needs_hold(preset) {
            self.drive_flipper(FlipperPreset::Hold)?;
        }
        self.drive_flipper(preset)
    }

    /// 翻转 `count` 次，每次 Hold → Flip → Hold
    pub fn flip(&mut self, count: u8) -> Result<(), DriverError> {
        for _ in 0..count {
            self.flipper_to(FlipperPreset::Hold)?;
            self.settle(self.config.settle.hold());
            self.drive_flipper(FlipperPreset::Flip)?;
            self.settle(self.config.settle.flip());
            self.drive_flipper(FlipperPreset::Hold)?;
        }
        Ok(())
    }

    /// 转盘相对转动（魔方坐标系，俯视顺时针为正），位姿不回绕
    pub fn turntable_by(&mut self, degrees: i32) -> Result<(), DriverError> {
        self.checkpoint()?;
        debug!(
            "turntable {:+}° (flipper at {}, absolute {}°)",
            degrees, self.pose.flipper, self.pose.turntable
        );
        self.hardware
            .turntable
            .run_for_degrees(degrees * self.config.turntable_polarity)?;
        self.pose.turntable += degrees;
        Ok(())
    }

    /// 转盘转到绝对角度，目标先归一化到 [-180, 180)
    pub fn turntable_to(&mut self, degrees: i32) -> Result<(), DriverError> {
        let target = normalize_angle(degrees);
        self.checkpoint()?;
        debug!("turntable -> {}°", target);
        let motor = self.config.turntable_home + target * self.config.turntable_polarity;
        self.hardware
            .turntable
            .run_to_position(motor, SpinDirection::Shortest)?;
        self.pose.turntable = target;
        Ok(())
    }

    /// 整体绕竖直轴旋转 `quarters` 个 90°（俯视顺时针为正）
    pub fn rotate_y(&mut self, quarters: i32) -> Result<(), DriverError> {
        self.flipper_to(FlipperPreset::Spin)?;
        self.turntable_by(90 * quarters)
    }

    /// 转动底层
    ///
    /// 翻转臂压住上面两层；底层顺时针（从下往上看）对应转盘俯视逆时针。
    pub fn turn_bottom(&mut self, count: u8, direction: Direction) -> Result<(), DriverError> {
        self.flipper_to(FlipperPreset::Hold)?;
        self.turntable_by(-90 * count as i32 * direction.sign())
    }

    /// 执行一段整体重定向，非空时结束于 Hold
    pub fn reorient(&mut self, reorientation: &Reorientation) -> Result<(), DriverError> {
        if reorientation.is_empty() {
            return Ok(());
        }
        debug!("reorient: {}", reorientation);
        for op in reorientation.ops() {
            match *op {
                CubeOp::Flip => self.flip(1)?,
                CubeOp::Rotate(quarters) => self.rotate_y(quarters as i32)?,
            }
        }
        self.flipper_to(FlipperPreset::Hold)
    }

    /// 采样一次颜色
    pub fn sample(&mut self) -> Result<ColorSample, DriverError> {
        self.checkpoint()?;
        let sample = self.hardware.sensor.sample()?;
        if sample.channels() != self.config.channels {
            return Err(DriverError::SensorFault(format!(
                "expected {} channels, got {}",
                self.config.channels.len(),
                sample.channels().len()
            )));
        }
        Ok(sample)
    }

    /// 归还外设
    pub fn into_hardware(self) -> RobotHardware {
        self.hardware
    }
}

impl std::fmt::Debug for RobotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotState")
            .field("pose", &self.pose)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
