//! 运动学配置
//!
//! 两种硬件平台（Spike 主控直连 / Build HAT 上位机）只在预设角度、
//! 转盘方向、颜色通道数和等待时间上不同，统一用 [`KinematicsConfig`] 参数化。

use crate::DriverError;
use crate::pose::FlipperPreset;
use cubebot_protocol::{ChannelCount, DistanceMetric};
use std::time::Duration;

/// 翻转臂预设角度（电机度数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlipperAngles {
    pub home: i32,
    pub hold: i32,
    pub flip: i32,
    pub scan_edge: i32,
    pub scan_center: i32,
    pub scan_corner: i32,
    pub spin: i32,
}

impl FlipperAngles {
    /// 预设位对应的电机角度
    pub fn angle(&self, preset: FlipperPreset) -> i32 {
        match preset {
            FlipperPreset::Home => self.home,
            FlipperPreset::Hold => self.hold,
            FlipperPreset::Flip => self.flip,
            FlipperPreset::ScanEdge => self.scan_edge,
            FlipperPreset::ScanCenter => self.scan_center,
            FlipperPreset::ScanCorner => self.scan_corner,
            FlipperPreset::Spin => self.spin,
        }
    }

    /// 反查：哪个预设位使用该角度
    pub fn preset_at(&self, degrees: i32) -> Option<FlipperPreset> {
        FlipperPreset::ALL
            .into_iter()
            .find(|&p| self.angle(p) == degrees)
    }
}

/// 各动作之后的固定等待时间（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SettleDelays {
    /// 翻转前到达 Hold 之后
    pub hold_ms: u64,
    /// 到达 Flip 之后
    pub flip_ms: u64,
    /// 标定时到达 ScanCenter 之后、采样之前
    pub sample_ms: u64,
    /// 一个面的周边扫描完成之后
    pub face_ms: u64,
}

impl SettleDelays {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn flip(&self) -> Duration {
        Duration::from_millis(self.flip_ms)
    }

    pub fn sample(&self) -> Duration {
        Duration::from_millis(self.sample_ms)
    }

    pub fn face(&self) -> Duration {
        Duration::from_millis(self.face_ms)
    }
}

/// 运动学配置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KinematicsConfig {
    pub flipper: FlipperAngles,
    /// 转盘零位（电机度数）
    pub turntable_home: i32,
    /// 魔方坐标系 1° 对应的电机度数（+1 或 -1）
    pub turntable_polarity: i32,
    pub channels: ChannelCount,
    pub metric: DistanceMetric,
    #[cfg_attr(feature = "serde", serde(default))]
    pub settle: SettleDelays,
}

impl KinematicsConfig {
    /// Spike 主控直连：RGB 传感器，无等待
    pub fn spike_hub() -> Self {
        Self {
            flipper: FlipperAngles {
                home: 12,
                hold: 143,
                flip: 274,
                scan_edge: 198,
                scan_center: 243,
                scan_corner: 184,
                spin: 43,
            },
            turntable_home: 0,
            turntable_polarity: 1,
            channels: ChannelCount::Rgb,
            metric: DistanceMetric::Manhattan,
            settle: SettleDelays {
                hold_ms: 0,
                flip_ms: 0,
                sample_ms: 500,
                face_ms: 300,
            },
        }
    }

    /// Build HAT 上位机：RGBI 传感器，高位预设按 -360° 偏移
    pub fn build_hat() -> Self {
        Self {
            flipper: FlipperAngles {
                home: 12,
                hold: 143,
                flip: 274 - 360,
                scan_edge: 198 - 360,
                scan_center: 243 - 360,
                scan_corner: 184 - 360,
                spin: 43,
            },
            turntable_home: 0,
            turntable_polarity: 1,
            channels: ChannelCount::Rgbi,
            metric: DistanceMetric::Euclidean,
            settle: SettleDelays {
                hold_ms: 300,
                flip_ms: 500,
                sample_ms: 500,
                face_ms: 300,
            },
        }
    }

    /// 模拟机器人：Build HAT 参数去掉所有等待
    pub fn simulated() -> Self {
        Self {
            settle: SettleDelays::default(),
            ..Self::build_hat()
        }
    }

    /// 按名称查找内置预设
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "spike-hub" | "spike_hub" => Some(Self::spike_hub()),
            "build-hat" | "build_hat" => Some(Self::build_hat()),
            "simulated" => Some(Self::simulated()),
            _ => None,
        }
    }

    /// 检查配置是否自洽
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.turntable_polarity != 1 && self.turntable_polarity != -1 {
            return Err(DriverError::InvalidConfig(format!(
                "turntable_polarity must be 1 or -1, got {}",
                self.turntable_polarity
            )));
        }

        for (i, a) in FlipperPreset::ALL.iter().enumerate() {
            for b in &FlipperPreset::ALL[i + 1..] {
                if self.flipper.angle(*a) == self.flipper.angle(*b) {
                    return Err(DriverError::InvalidConfig(format!(
                        "flipper presets {} and {} share angle {}",
                        a,
                        b,
                        self.flipper.angle(*a)
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self::build_hat()
    }
}
