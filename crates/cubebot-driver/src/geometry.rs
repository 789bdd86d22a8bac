//! 整数旋转模型
//!
//! 世界坐标系：`+x` 指向 R 面，`+y` 指向 B 面，`+z` 指向 U 面（向上）。
//! 魔方所有合法姿态都是符号置换矩阵，用 `i8` 精确表示，没有浮点误差。
//!
//! 两个执行器对应的基本旋转：
//!
//! - 翻转（flip）：绕 `+x` 转 -90°，`B → D → F → U → B`
//! - 转盘正向 90°：俯视顺时针，即绕 `+z` 转 -90°（标准记号 `y`）

use cubebot_protocol::Face;
use std::ops::{Add, Mul, Neg};

/// 整数三维向量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vec3 {
    pub x: i8,
    pub y: i8,
    pub z: i8,
}

impl Vec3 {
    pub const X: Vec3 = Vec3::new(1, 0, 0);
    pub const Y: Vec3 = Vec3::new(0, 1, 0);
    pub const Z: Vec3 = Vec3::new(0, 0, 1);

    pub const fn new(x: i8, y: i8, z: i8) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> i8 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// 绕单位轴 `axis` 旋转 `quarters` 个 90°（右手定则，正值为逆时针）
    pub fn rotate_about(self, axis: Vec3, quarters: i32) -> Vec3 {
        (0..quarters.rem_euclid(4)).fold(self, |v, _| axis.cross(v) + axis * axis.dot(v))
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<i8> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: i8) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 面的外法线与展开图上的行列方向
///
/// 返回 `(normal, right, up)`：`right` 为列号增大方向，`up` 为行号减小方向。
pub fn face_frame(face: Face) -> (Vec3, Vec3, Vec3) {
    match face {
        Face::U => (Vec3::Z, Vec3::X, Vec3::Y),
        Face::R => (Vec3::X, Vec3::Y, Vec3::Z),
        Face::F => (-Vec3::Y, Vec3::X, Vec3::Z),
        Face::D => (-Vec3::Z, Vec3::X, -Vec3::Y),
        Face::L => (-Vec3::X, -Vec3::Y, Vec3::Z),
        Face::B => (Vec3::Y, -Vec3::X, Vec3::Z),
    }
}

/// 色块 `(face, tile)` 在复原姿态下的位置
///
/// 返回 `(cubie, normal)`：所在小块的中心坐标（各分量 ∈ {-1, 0, 1}）与贴纸朝向。
/// `tile` 取值 1..=9。
pub fn facelet_position(face: Face, tile: u8) -> (Vec3, Vec3) {
    let (normal, right, up) = face_frame(face);
    let row = ((tile - 1) / 3) as i8;
    let col = ((tile - 1) % 3) as i8;
    (normal + right * (col - 1) + up * (1 - row), normal)
}

/// 魔方整体姿态（符号置换矩阵，按列存储 x̂、ŷ、ẑ 的像）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation {
    columns: [Vec3; 3],
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation {
        columns: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// 绕轴旋转若干个 90°
    pub fn about(axis: Vec3, quarters: i32) -> Self {
        Self {
            columns: [
                Vec3::X.rotate_about(axis, quarters),
                Vec3::Y.rotate_about(axis, quarters),
                Vec3::Z.rotate_about(axis, quarters),
            ],
        }
    }

    /// 翻转臂翻转一次
    pub fn flip() -> Self {
        Self::about(Vec3::X, -1)
    }

    /// 转盘带动整体转过 `degrees`（俯视顺时针为正，必须是 90 的倍数）
    pub fn turntable(degrees: i32) -> Self {
        Self::about(Vec3::Z, -degrees / 90)
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.columns[0] * v.x + self.columns[1] * v.y + self.columns[2] * v.z
    }

    /// 先做 `self` 再做 `next`
    pub fn then(self, next: Orientation) -> Orientation {
        Orientation {
            columns: self.columns.map(|c| next.apply(c)),
        }
    }

    /// 逆（正交矩阵的转置）
    pub fn inverse(self) -> Orientation {
        let [a, b, c] = self.columns;
        Orientation {
            columns: [
                Vec3::new(a.x, b.x, c.x),
                Vec3::new(a.y, b.y, c.y),
                Vec3::new(a.z, b.z, c.z),
            ],
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// 当前朝下（-z）的原始面
    pub fn face_at_bottom(&self) -> Face {
        self.face_at(-Vec3::Z)
    }

    /// 当前朝上（+z）的原始面
    pub fn face_on_top(&self) -> Face {
        self.face_at(Vec3::Z)
    }

    /// 当前位于世界方向 `world` 的原始面
    pub fn face_at(&self, world: Vec3) -> Face {
        let original = self.inverse().apply(world);
        Face::ALL
            .into_iter()
            .find(|&f| face_frame(f).0 == original)
            .unwrap_or(Face::U)
    }
}
