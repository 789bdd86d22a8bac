//! 客户端模块
//!
//! 本模块在运动学核心之上实现魔方机器人的业务流程：
//! - 颜色分类（最近参考色，平局取靠前的面）
//! - 扫描（54 个色块按固定顺序送到传感器下方）
//! - 走法执行（每一步都是"重定向 → 转底层 → 恢复"）
//! - 求解器接口与整机控制器
//!
//! # 使用场景
//!
//! 命令行程序通过 [`CubeRobot`] 完成标定、扫描和求解；
//! 测试可以开启 `mock` feature，在模拟机器人上运行完整流程。

pub mod classifier;
pub mod controller;
mod error;
pub mod interpreter;
pub mod scan;
pub mod solver;

pub use classifier::{Classification, ColorClassifier, classify};
pub use controller::{CubeRobot, SolveReport, load_classifier};
pub use error::ClientError;
pub use interpreter::MoveInterpreter;
pub use scan::{PERIMETER_ORDER, ScanReport, ScanSequencer, ScannedFacelet};
pub use solver::{CommandSolver, RelaySolver, Solver};
