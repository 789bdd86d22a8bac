//! 整体重定向表
//!
//! 机器人只能转动最下面一层。要转其他面，先用翻转臂和转盘把该面换到底部，
//! 转完再用一段等效于逆变换的动作恢复原坐标系。翻转只能单向进行，
//! 所以恢复序列不是逐项取反，而是整体上与重定向互逆，且转盘净位移为零。
//!
//! 扫描时传感器在魔方正上方，各阶段把下一个待扫描面翻到顶部，
//! 并保证该面展开图的"上"方向朝向 `+y`。

use crate::geometry::Orientation;
use cubebot_protocol::Face;
use std::fmt;

use CubeOp::{Flip as F, Rotate as Y};

/// 整体动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeOp {
    /// 翻转一次（B 面转到底部）
    Flip,
    /// 转盘带动整体旋转若干个 90°，俯视顺时针为正
    Rotate(i8),
}

impl CubeOp {
    pub fn orientation(self) -> Orientation {
        match self {
            CubeOp::Flip => Orientation::flip(),
            CubeOp::Rotate(quarters) => Orientation::turntable(quarters as i32 * 90),
        }
    }

    /// 转盘位移（度）
    pub fn turntable_degrees(self) -> i32 {
        match self {
            CubeOp::Flip => 0,
            CubeOp::Rotate(quarters) => quarters as i32 * 90,
        }
    }
}

impl fmt::Display for CubeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeOp::Flip => f.write_str("flip"),
            CubeOp::Rotate(1) => f.write_str("y"),
            CubeOp::Rotate(-1) => f.write_str("y'"),
            CubeOp::Rotate(q) if *q > 0 => write!(f, "y{}", q),
            CubeOp::Rotate(q) => write!(f, "y{}'", -q),
        }
    }
}

/// 一段固定的整体动作序列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reorientation {
    ops: &'static [CubeOp],
}

impl Reorientation {
    pub const NONE: Reorientation = Reorientation::new(&[]);

    pub const fn new(ops: &'static [CubeOp]) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &'static [CubeOp] {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// 序列整体对应的姿态变换
    pub fn orientation(&self) -> Orientation {
        self.ops
            .iter()
            .fold(Orientation::IDENTITY, |acc, op| acc.then(op.orientation()))
    }

    /// 转盘净位移（度）
    pub fn turntable_displacement(&self) -> i32 {
        self.ops.iter().map(|op| op.turntable_degrees()).sum()
    }

    pub fn flip_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == CubeOp::Flip).count()
    }

    /// 把 `face` 换到底部的序列，以及对应的恢复序列
    pub fn for_face(face: Face) -> (Reorientation, Reorientation) {
        match face {
            Face::D => (Self::NONE, Self::NONE),
            Face::B => (Self::new(&[F]), Self::new(&[F, F, F])),
            Face::U => (Self::new(&[F, F]), Self::new(&[F, F])),
            Face::F => (Self::new(&[Y(2), F]), Self::new(&[Y(-2), F])),
            Face::R => (Self::new(&[Y(-1), F]), Self::new(&[Y(2), F, Y(-1)])),
            Face::L => (Self::new(&[Y(1), F]), Self::new(&[Y(-2), F, Y(1)])),
        }
    }
}

impl fmt::Display for Reorientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("-");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// 扫描阶段：每个面扫描之前执行的重定向（相对上一阶段）
pub const SCAN_STAGES: [(Face, Reorientation); 6] = [
    (Face::U, Reorientation::NONE),
    (Face::F, Reorientation::new(&[F])),
    (Face::D, Reorientation::new(&[F])),
    (Face::B, Reorientation::new(&[F, Y(2)])),
    (Face::R, Reorientation::new(&[Y(-1), F, Y(1)])),
    (Face::L, Reorientation::new(&[F, F, Y(-2)])),
];

/// 六面扫描完成后恢复初始坐标系
///
/// 七次翻转的奇偶性决定了转盘净位移只能是 90° 的奇数倍，无法为零；
/// 这里只保证魔方坐标系复原。
pub const SCAN_RESTORE: Reorientation = Reorientation::new(&[Y(2), F, Y(-1)]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Vec3, face_frame};

    #[test]
    fn test_present_brings_face_to_bottom() {
        for face in Face::ALL {
            let (present, _) = Reorientation::for_face(face);
            assert_eq!(present.orientation().face_at_bottom(), face, "{}", face);
        }
    }

    #[test]
    fn test_restore_inverts_present() {
        for face in Face::ALL {
            let (present, restore) = Reorientation::for_face(face);
            let round_trip = present.orientation().then(restore.orientation());
            assert!(round_trip.is_identity(), "{}: {} / {}", face, present, restore);
        }
    }

    #[test]
    fn test_face_turn_has_zero_turntable_displacement() {
        for face in Face::ALL {
            let (present, restore) = Reorientation::for_face(face);
            assert_eq!(
                present.turntable_displacement() + restore.turntable_displacement(),
                0,
                "{}",
                face
            );
        }
    }

    #[test]
    fn test_scan_stages_present_faces_upright() {
        let mut acc = Orientation::IDENTITY;
        for (face, stage) in SCAN_STAGES {
            acc = acc.then(stage.orientation());
            let (normal, right, up) = face_frame(face);
            assert_eq!(acc.apply(normal), Vec3::Z, "{} not on top", face);
            assert_eq!(acc.apply(right), Vec3::X, "{} rotated", face);
            assert_eq!(acc.apply(up), Vec3::Y, "{} rotated", face);
        }
        acc = acc.then(SCAN_RESTORE.orientation());
        assert!(acc.is_identity());
    }

    #[test]
    fn test_scan_order() {
        let order: Vec<Face> = SCAN_STAGES.iter().map(|(f, _)| *f).collect();
        assert_eq!(order, Face::SCAN_ORDER.to_vec());
    }

    #[test]
    fn test_scan_displacement_parity() {
        let flips: usize = SCAN_STAGES.iter().map(|(_, s)| s.flip_count()).sum::<usize>()
            + SCAN_RESTORE.flip_count();
        let turn: i32 = SCAN_STAGES
            .iter()
            .map(|(_, s)| s.turntable_displacement())
            .sum::<i32>()
            + SCAN_RESTORE.turntable_displacement();
        assert_eq!(flips, 7);
        assert_eq!(turn.rem_euclid(180), 90);
    }

    #[test]
    fn test_display() {
        let (present, restore) = Reorientation::for_face(Face::R);
        assert_eq!(present.to_string(), "y' flip");
        assert_eq!(restore.to_string(), "y2 flip y'");
        assert_eq!(Reorientation::NONE.to_string(), "-");
        assert_eq!(CubeOp::Rotate(-2).to_string(), "y2'");
    }
}
