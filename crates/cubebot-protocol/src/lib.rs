//! # Cube Bot Protocol
//!
//! 魔方机器人的纯数据层（无硬件依赖）
//!
//! ## 模块
//!
//! - `face`: 六个面符号及其固定顺序
//! - `moves`: 解算器记号（`R2`、`F'`、`U`）的解析
//! - `cube_state`: 54 色块的魔方状态字符串
//! - `color`: 颜色采样与参考色集合
//!
//! ## 面顺序
//!
//! 所有持久化格式与状态字符串都使用 `{U, R, F, D, L, B}` 顺序，
//! 扫描顺序 `{U, F, D, B, R, L}` 只存在于运动层。

pub mod color;
pub mod cube_state;
pub mod face;
pub mod moves;

// 重新导出常用类型
pub use color::{ChannelCount, ColorSample, DistanceMetric, ReferenceColorSet};
pub use cube_state::{CubeState, FACELET_COUNT, TILES_PER_FACE, facelet_index};
pub use face::Face;
pub use moves::{Direction, Move, MoveSequence};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 无法解析的走法记号
    #[error("Malformed move token {token:?}: {reason}")]
    MalformedMove { token: String, reason: &'static str },

    /// 非法的面符号
    #[error("Invalid face symbol: {0:?}")]
    InvalidFaceSymbol(char),

    /// 状态字符串长度或字符非法
    #[error("Invalid cube string: {0}")]
    InvalidCubeString(String),

    /// 同一色块被写入两次
    #[error("Facelet {face}{tile} written twice")]
    DuplicateFacelet { face: Face, tile: u8 },

    /// 色块编号越界
    #[error("Tile index out of range: {0} (expected 1..=9)")]
    InvalidTile(u8),

    /// 走法次数只能是 1 或 2
    #[error("Invalid quarter-turn count: {0} (expected 1 or 2)")]
    InvalidTurnCount(u8),

    /// 状态未填满 54 个色块
    #[error("Cube state incomplete: {written}/54 facelets written")]
    IncompleteCubeState { written: usize },

    /// 颜色通道数不一致
    #[error("Channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
}
