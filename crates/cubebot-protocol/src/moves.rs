//! 解算器记号
//!
//! 语法：`token = face_letter [ "2" | "'" ]`，记号之间以空白分隔。
//!
//! | 记号 | 次数 | 方向 |
//! |------|------|------|
//! | `R`  | 1    | 顺时针 |
//! | `R2` | 2    | 顺时针 |
//! | `R'` | 1    | 逆时针 |
//!
//! 两种修饰符同时出现（`R2'`）、未知面字母、空记号都视为非法。

use crate::{Face, ProtocolError};
use std::fmt;
use std::str::FromStr;

/// 转动方向（从该面外侧看）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// 顺时针（无修饰符）
    #[default]
    Clockwise,
    /// 逆时针（`'`）
    CounterClockwise,
}

impl Direction {
    /// 反方向
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// 顺时针为 +1，逆时针为 -1
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// 单步走法
///
/// 字段私有：次数只能是 1 或 2，由构造函数保证。
/// 序列化形式就是记号本身（`"R2"`），反序列化同样经过记号解析。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Move {
    face: Face,
    count: u8,
    direction: Direction,
}

impl Move {
    /// 构造走法，`count` 必须是 1 或 2
    pub fn new(face: Face, count: u8, direction: Direction) -> Result<Self, ProtocolError> {
        match count {
            1 | 2 => Ok(Self {
                face,
                count,
                direction,
            }),
            _ => Err(ProtocolError::InvalidTurnCount(count)),
        }
    }

    pub fn face(self) -> Face {
        self.face
    }

    /// 四分之一圈数（1 或 2）
    pub fn count(self) -> u8 {
        self.count
    }

    pub fn direction(self) -> Direction {
        self.direction
    }

    /// 顺时针单步
    pub fn cw(face: Face) -> Self {
        Self {
            face,
            count: 1,
            direction: Direction::Clockwise,
        }
    }

    /// 逆时针单步
    pub fn ccw(face: Face) -> Self {
        Self {
            face,
            count: 1,
            direction: Direction::CounterClockwise,
        }
    }

    /// 半圈
    pub fn double(face: Face) -> Self {
        Self {
            face,
            count: 2,
            direction: Direction::Clockwise,
        }
    }

    /// 逆操作（半圈的逆就是自身）
    pub fn inverse(self) -> Self {
        if self.count == 2 {
            self
        } else {
            Self {
                direction: self.direction.reversed(),
                ..self
            }
        }
    }

    /// 带符号的四分之一圈数（顺时针为正）
    pub fn quarter_turns(self) -> i32 {
        self.count as i32 * self.direction.sign()
    }

    /// 解析单个记号
    pub fn parse_token(token: &str) -> Result<Self, ProtocolError> {
        let malformed = |reason: &'static str| ProtocolError::MalformedMove {
            token: token.to_string(),
            reason,
        };

        let mut chars = token.chars();
        let letter = chars.next().ok_or_else(|| malformed("empty token"))?;
        let face = Face::try_from(letter).map_err(|_| malformed("unknown face letter"))?;

        let rest: Vec<char> = chars.collect();
        match rest.as_slice() {
            [] => Ok(Move::cw(face)),
            ['2'] => Ok(Move::double(face)),
            ['\''] => Ok(Move::ccw(face)),
            ['2', '\''] | ['\'', '2'] => Err(malformed("double and inverse modifiers are exclusive")),
            [_] => Err(malformed("unknown modifier")),
            _ => Err(malformed("trailing characters")),
        }
    }
}

impl FromStr for Move {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::parse_token(s)
    }
}

impl TryFrom<String> for Move {
    type Error = ProtocolError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Move::parse_token(&token)
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> Self {
        mv.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.count, self.direction) {
            (2, _) => write!(f, "{}2", self.face),
            (_, Direction::Clockwise) => write!(f, "{}", self.face),
            (_, Direction::CounterClockwise) => write!(f, "{}'", self.face),
        }
    }
}

/// 走法序列（由外部解算器产生，严格从左到右执行）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveSequence {
    moves: Vec<Move>,
}

impl MoveSequence {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    /// 解析整条序列
    ///
    /// 任何一个记号非法都会使整条序列被拒绝，调用方不会拿到部分序列。
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        text.split_whitespace()
            .map(Move::parse_token)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// 逆序列：倒序且逐步取逆
    pub fn inverse(&self) -> Self {
        Self::new(self.moves.iter().rev().map(|m| m.inverse()).collect())
    }
}

impl FromStr for MoveSequence {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveSequence::parse(s)
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.moves.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl FromIterator<Move> for MoveSequence {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
