//! 驱动层模块
//!
//! 本模块把两轴机器人（翻转臂 + 转盘）抽象为一个运动学核心，包括：
//! - 执行器与传感器 trait（真实驱动由外部提供）
//! - 执行器位姿跟踪（翻转臂预设位 + 转盘绝对角度）
//! - 整体重定向表及其逆（只转底层的关键）
//! - 整数旋转模型（用于验证重定向与模拟）
//! - 软件模拟机器人（`mock` feature）
//!
//! # 使用场景
//!
//! 扫描与解魔方流程位于 `cubebot-client`，它们通过 [`RobotState`] 独占地驱动执行器。

mod cancel;
pub mod config;
mod error;
pub mod geometry;
pub mod hardware;
mod kinematics;
pub mod pose;
pub mod reorientation;
#[cfg(feature = "mock")]
pub mod sim;

pub use cancel::CancelToken;
pub use config::{FlipperAngles, KinematicsConfig, SettleDelays};
pub use error::DriverError;
pub use geometry::{Orientation, Vec3};
pub use hardware::{ColorSensor, Motor, RobotHardware, SpinDirection};
pub use kinematics::RobotState;
pub use pose::{ActuatorPose, FlipperPreset, normalize_angle};
pub use reorientation::{CubeOp, Reorientation};
