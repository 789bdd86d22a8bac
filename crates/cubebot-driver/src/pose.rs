//! 执行器位姿
//!
//! 翻转臂只停在有限的几个预设位上，转盘记录绝对角度（度）。
//! 预设位之间的过渡受机械约束：从低位（Home/Spin）到高位（扫描位或翻转位）
//! 必须经过 Hold，否则翻转臂会与魔方干涉。

use crate::hardware::SpinDirection;

/// 翻转臂预设位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlipperPreset {
    Home,
    Hold,
    Flip,
    ScanEdge,
    ScanCenter,
    ScanCorner,
    Spin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Low,
    Hold,
    High,
}

impl FlipperPreset {
    pub const ALL: [FlipperPreset; 7] = [
        FlipperPreset::Home,
        FlipperPreset::Hold,
        FlipperPreset::Flip,
        FlipperPreset::ScanEdge,
        FlipperPreset::ScanCenter,
        FlipperPreset::ScanCorner,
        FlipperPreset::Spin,
    ];

    fn zone(self) -> Zone {
        match self {
            FlipperPreset::Home | FlipperPreset::Spin => Zone::Low,
            FlipperPreset::Hold => Zone::Hold,
            FlipperPreset::Flip
            | FlipperPreset::ScanEdge
            | FlipperPreset::ScanCenter
            | FlipperPreset::ScanCorner => Zone::High,
        }
    }

    /// 从 `self` 到 `to` 是否必须先经过 Hold
    ///
    /// 跨区过渡都要经过 Hold；进入 Flip 也总是从 Hold 出发，
    /// 因为只有 Hold → Flip 这一段行程才会推动魔方翻转。
    pub fn needs_hold(self, to: FlipperPreset) -> bool {
        self != to
            && self != FlipperPreset::Hold
            && to != FlipperPreset::Hold
            && (to == FlipperPreset::Flip || self.zone() != to.zone())
    }

    /// 是否可以带着魔方旋转转盘（翻转臂离开魔方）
    pub fn clears_cube(self) -> bool {
        !matches!(self, FlipperPreset::Hold | FlipperPreset::Flip)
    }

    /// 驱动到该预设位时使用的旋转方向
    pub fn approach(self) -> SpinDirection {
        match self {
            FlipperPreset::Home | FlipperPreset::Spin => SpinDirection::CounterClockwise,
            _ => SpinDirection::Shortest,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlipperPreset::Home => "home",
            FlipperPreset::Hold => "hold",
            FlipperPreset::Flip => "flip",
            FlipperPreset::ScanEdge => "scan-edge",
            FlipperPreset::ScanCenter => "scan-center",
            FlipperPreset::ScanCorner => "scan-corner",
            FlipperPreset::Spin => "spin",
        }
    }
}

impl std::fmt::Display for FlipperPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 把角度归一化到 [-180, 180)
pub fn normalize_angle(degrees: i32) -> i32 {
    (degrees + 180).rem_euclid(360) - 180
}

/// 当前执行器位姿
///
/// `turntable` 是魔方坐标系下的绝对角度（俯视顺时针为正），
/// 解魔方时不回绕，扫描时按 [`normalize_angle`] 回绕。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorPose {
    pub flipper: FlipperPreset,
    pub turntable: i32,
}

impl Default for ActuatorPose {
    fn default() -> Self {
        Self {
            flipper: FlipperPreset::Home,
            turntable: 0,
        }
    }
}
