//! 魔方状态字符串
//!
//! 54 个色块按 `face_ordinal * 9 + (tile - 1)` 排列，面顺序 `{U, R, F, D, L, B}`。
//! 每个面的 9 个色块按展开图逐行编号：
//!
//! ```text
//!              |U1 U2 U3|
//!              |U4 U5 U6|
//!              |U7 U8 U9|
//!     |L1 L2 L3|F1 F2 F3|R1 R2 R3|B1 B2 B3|
//!     |L4 L5 L6|F4 F5 F6|R4 R5 R6|B4 B5 B6|
//!     |L7 L8 L9|F7 F8 F9|R7 R8 R9|B7 B8 B9|
//!              |D1 D2 D3|
//!              |D4 D5 D6|
//!              |D7 D8 D9|
//! ```

use crate::{Face, ProtocolError};
use std::fmt;

/// 每面色块数
pub const TILES_PER_FACE: usize = 9;

/// 色块总数
pub const FACELET_COUNT: usize = 6 * TILES_PER_FACE;

/// 色块在状态字符串中的下标
///
/// `tile` 取值 1..=9，越界返回 `None`。
pub fn facelet_index(face: Face, tile: u8) -> Option<usize> {
    if (1..=TILES_PER_FACE as u8).contains(&tile) {
        Some(face.ordinal() * TILES_PER_FACE + tile as usize - 1)
    } else {
        None
    }
}

/// 魔方状态累加器
///
/// 扫描过程中逐个写入，每个下标只能写一次；只有 54 个下标全部写入后
/// 才能导出状态字符串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeState {
    facelets: [Option<Face>; FACELET_COUNT],
    written: usize,
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeState {
    /// 创建空状态
    pub fn new() -> Self {
        Self {
            facelets: [None; FACELET_COUNT],
            written: 0,
        }
    }

    /// 复原态（每个色块等于所在面）
    pub fn solved() -> Self {
        let mut state = Self::new();
        for (i, slot) in state.facelets.iter_mut().enumerate() {
            *slot = Face::from_ordinal(i / TILES_PER_FACE);
        }
        state.written = FACELET_COUNT;
        state
    }

    /// 写入一个色块
    ///
    /// # 错误
    ///
    /// - `InvalidTile`: `tile` 不在 1..=9
    /// - `DuplicateFacelet`: 该色块已经写过
    pub fn set(&mut self, face: Face, tile: u8, value: Face) -> Result<(), ProtocolError> {
        let index = facelet_index(face, tile).ok_or(ProtocolError::InvalidTile(tile))?;
        let slot = &mut self.facelets[index];
        if slot.is_some() {
            return Err(ProtocolError::DuplicateFacelet { face, tile });
        }
        *slot = Some(value);
        self.written += 1;
        Ok(())
    }

    /// 读取一个色块
    pub fn get(&self, face: Face, tile: u8) -> Option<Face> {
        facelet_index(face, tile).and_then(|i| self.facelets[i])
    }

    /// 已写入数量
    pub fn written(&self) -> usize {
        self.written
    }

    /// 是否已全部写入
    pub fn is_complete(&self) -> bool {
        self.written == FACELET_COUNT
    }

    /// 某个面的 9 个色块（按编号顺序）
    pub fn face_tiles(&self, face: Face) -> &[Option<Face>] {
        let start = face.ordinal() * TILES_PER_FACE;
        &self.facelets[start..start + TILES_PER_FACE]
    }

    /// 导出 54 字符状态字符串
    ///
    /// 状态不完整时返回 `IncompleteCubeState`，绝不输出部分字符串。
    pub fn to_cube_string(&self) -> Result<String, ProtocolError> {
        if !self.is_complete() {
            return Err(ProtocolError::IncompleteCubeState {
                written: self.written,
            });
        }
        Ok(self
            .facelets
            .iter()
            .flatten()
            .map(|face| face.symbol())
            .collect())
    }

    /// 解析 54 字符状态字符串
    pub fn from_cube_string(text: &str) -> Result<Self, ProtocolError> {
        let count = text.chars().count();
        if count != FACELET_COUNT {
            return Err(ProtocolError::InvalidCubeString(format!(
                "expected {} characters, got {}",
                FACELET_COUNT, count
            )));
        }

        let mut state = Self::new();
        for (i, c) in text.chars().enumerate() {
            state.facelets[i] = Some(Face::try_from(c)?);
        }
        state.written = FACELET_COUNT;
        Ok(state)
    }

    /// 是否为复原态
    pub fn is_solved(&self) -> bool {
        *self == Self::solved()
    }
}

impl fmt::Display for CubeState {
    /// 每面一行，未写入的色块显示为 `.`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for face in Face::ALL {
            write!(f, "{} =", face)?;
            for tile in self.face_tiles(face) {
                match tile {
                    Some(t) => write!(f, " {}", t.color_name())?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
