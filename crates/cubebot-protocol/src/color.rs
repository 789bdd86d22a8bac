//! 颜色采样与参考色
//!
//! 传感器返回 3 通道（RGB）或 4 通道（RGB + 强度）的无符号整数向量。
//! 采样固定使用栈上的 `SmallVec<[u32; 4]>`，不会发生堆分配。

use crate::{Face, ProtocolError};
use smallvec::SmallVec;
use std::fmt;

/// 颜色通道数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChannelCount {
    /// 红绿蓝
    Rgb = 3,
    /// 红绿蓝 + 强度
    #[default]
    Rgbi = 4,
}

impl ChannelCount {
    #[inline]
    pub fn len(self) -> usize {
        self as usize
    }

    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            3 => Some(ChannelCount::Rgb),
            4 => Some(ChannelCount::Rgbi),
            _ => None,
        }
    }
}

/// 颜色距离度量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceMetric {
    /// 欧氏距离：各通道差的平方和开方
    #[default]
    Euclidean,
    /// 曼哈顿距离：各通道差的绝对值之和
    Manhattan,
}

impl DistanceMetric {
    /// 计算两个采样之间的距离
    ///
    /// 只比较两者共有的通道（通道数不同时按较短者计算）。
    pub fn distance(self, a: &ColorSample, b: &ColorSample) -> f64 {
        let diffs = a
            .components()
            .iter()
            .zip(b.components())
            .map(|(&x, &y)| x as f64 - y as f64);
        match self {
            DistanceMetric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            DistanceMetric::Manhattan => diffs.map(f64::abs).sum(),
        }
    }
}

/// 单次颜色采样
///
/// 序列化为整数数组，反序列化经过 [`ColorSample::from_slice`] 检查通道数。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<u32>", into = "Vec<u32>")
)]
pub struct ColorSample {
    components: SmallVec<[u32; 4]>,
}

impl ColorSample {
    /// 3 通道采样
    pub fn rgb(r: u32, g: u32, b: u32) -> Self {
        Self {
            components: SmallVec::from_buf_and_len([r, g, b, 0], 3),
        }
    }

    /// 4 通道采样
    pub fn rgbi(r: u32, g: u32, b: u32, i: u32) -> Self {
        Self {
            components: SmallVec::from_buf([r, g, b, i]),
        }
    }

    /// 从切片构造，长度必须是 3 或 4
    pub fn from_slice(values: &[u32]) -> Result<Self, ProtocolError> {
        if ChannelCount::from_len(values.len()).is_none() {
            return Err(ProtocolError::ChannelMismatch {
                expected: ChannelCount::Rgbi.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            components: SmallVec::from_slice(values),
        })
    }

    /// 全零采样（传感器无读数）
    pub fn black(channels: ChannelCount) -> Self {
        match channels {
            ChannelCount::Rgb => Self::rgb(0, 0, 0),
            ChannelCount::Rgbi => Self::rgbi(0, 0, 0, 0),
        }
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    pub fn channels(&self) -> ChannelCount {
        // 构造函数保证长度为 3 或 4
        if self.components.len() == 3 {
            ChannelCount::Rgb
        } else {
            ChannelCount::Rgbi
        }
    }
}

impl TryFrom<Vec<u32>> for ColorSample {
    type Error = ProtocolError;

    fn try_from(values: Vec<u32>) -> Result<Self, Self::Error> {
        ColorSample::from_slice(&values)
    }
}

impl From<ColorSample> for Vec<u32> {
    fn from(sample: ColorSample) -> Self {
        sample.components.into_vec()
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = ["R", "G", "B", "I"];
        for (i, (v, label)) in self.components.iter().zip(labels).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", v, label)?;
        }
        Ok(())
    }
}

/// 六面参考色（按 `{U, R, F, D, L, B}` 排列）
///
/// 类型本身保证六项齐全且通道数一致，反序列化同样经过 [`ReferenceColorSet::new`]。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "[ColorSample; 6]", into = "[ColorSample; 6]")
)]
pub struct ReferenceColorSet {
    references: [ColorSample; 6],
}

impl ReferenceColorSet {
    /// 从六个采样构造（按面序号排列）
    pub fn new(references: [ColorSample; 6]) -> Result<Self, ProtocolError> {
        let expected = references[0].channels();
        if let Some(bad) = references.iter().find(|r| r.channels() != expected) {
            return Err(ProtocolError::ChannelMismatch {
                expected: expected.len(),
                actual: bad.channels().len(),
            });
        }
        Ok(Self { references })
    }

    /// 未标定时使用的全零参考色
    ///
    /// 分类仍然可以运行，但结果没有意义。
    pub fn uncalibrated(channels: ChannelCount) -> Self {
        Self {
            references: std::array::from_fn(|_| ColorSample::black(channels)),
        }
    }

    pub fn get(&self, face: Face) -> &ColorSample {
        &self.references[face.ordinal()]
    }

    pub fn channels(&self) -> ChannelCount {
        self.references[0].channels()
    }

    /// 按固定面顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = (Face, &ColorSample)> {
        Face::ALL.into_iter().zip(self.references.iter())
    }

    pub fn as_array(&self) -> &[ColorSample; 6] {
        &self.references
    }
}

impl TryFrom<[ColorSample; 6]> for ReferenceColorSet {
    type Error = ProtocolError;

    fn try_from(references: [ColorSample; 6]) -> Result<Self, Self::Error> {
        ReferenceColorSet::new(references)
    }
}

impl From<ReferenceColorSet> for [ColorSample; 6] {
    fn from(set: ReferenceColorSet) -> Self {
        set.references
    }
}
