//! 面符号定义

use crate::ProtocolError;
use std::fmt;

/// 魔方的六个面
///
/// 判别值即面序号（状态字符串与标定文件都按此顺序排列）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Face {
    U = 0,
    R = 1,
    F = 2,
    D = 3,
    L = 4,
    B = 5,
}

impl Face {
    /// 固定面顺序 `{U, R, F, D, L, B}`
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// 扫描与标定时的访问顺序
    pub const SCAN_ORDER: [Face; 6] = [Face::U, Face::F, Face::D, Face::B, Face::R, Face::L];

    /// 面序号（0..6）
    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// 由序号构造
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    /// 记号字符
    pub fn symbol(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    /// 标准配色下该面中心块的颜色名（用于诊断输出）
    pub fn color_name(self) -> &'static str {
        match self {
            Face::U => "white",
            Face::R => "red",
            Face::F => "green",
            Face::D => "yellow",
            Face::L => "orange",
            Face::B => "blue",
        }
    }
}

impl TryFrom<char> for Face {
    type Error = ProtocolError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'U' => Ok(Face::U),
            'R' => Ok(Face::R),
            'F' => Ok(Face::F),
            'D' => Ok(Face::D),
            'L' => Ok(Face::L),
            'B' => Ok(Face::B),
            other => Err(ProtocolError::InvalidFaceSymbol(other)),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
