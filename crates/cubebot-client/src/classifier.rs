//! 颜色分类
//!
//! 最近参考色：依次计算到六个参考色的距离，按 `{U, R, F, D, L, B}` 顺序遍历，
//! 只有严格更小的距离才替换当前结果，所以平局总是归到顺序靠前的面。
//!
//! 没有拒绝阈值：任何采样都会被归到最近的面。最小距离随结果一起返回，
//! 调用方可以据此标记低置信度结果，但分类本身不会失败。

use cubebot_protocol::{ChannelCount, ColorSample, DistanceMetric, Face, ReferenceColorSet};
use tracing::warn;

/// 一次分类结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub face: Face,
    /// 到该面参考色的距离
    pub distance: f64,
}

/// 在参考色集合中查找最近的面
pub fn classify(
    sample: &ColorSample,
    references: &ReferenceColorSet,
    metric: DistanceMetric,
) -> Classification {
    let mut best = Classification {
        face: Face::U,
        distance: f64::INFINITY,
    };
    for (face, reference) in references.iter() {
        let distance = metric.distance(sample, reference);
        if distance < best.distance {
            best = Classification { face, distance };
        }
    }
    best
}

/// 带参考色与度量的分类器
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    references: ReferenceColorSet,
    metric: DistanceMetric,
    calibrated: bool,
    warn_distance: Option<f64>,
}

impl ColorClassifier {
    pub fn new(references: ReferenceColorSet, metric: DistanceMetric) -> Self {
        Self {
            references,
            metric,
            calibrated: true,
            warn_distance: None,
        }
    }

    /// 未标定模式：参考色全为零，结果没有意义
    pub fn uncalibrated(channels: ChannelCount, metric: DistanceMetric) -> Self {
        warn!("No calibration data, colors will not be classified meaningfully. Please calibrate the cube.");
        Self {
            references: ReferenceColorSet::uncalibrated(channels),
            metric,
            calibrated: false,
            warn_distance: None,
        }
    }

    /// 距离超过 `distance` 时记录警告（不改变分类结果）
    pub fn with_warn_distance(mut self, distance: f64) -> Self {
        self.warn_distance = Some(distance);
        self
    }

    pub fn classify(&self, sample: &ColorSample) -> Classification {
        let result = classify(sample, &self.references, self.metric);
        if self.is_low_confidence(&result) {
            warn!(
                "Low-confidence classification: {} -> {} (distance {:.1})",
                sample, result.face, result.distance
            );
        }
        result
    }

    pub fn warn_distance(&self) -> Option<f64> {
        self.warn_distance
    }

    /// 结果是否超出警告距离
    pub fn is_low_confidence(&self, result: &Classification) -> bool {
        self.warn_distance.is_some_and(|limit| result.distance > limit)
    }

    pub fn references(&self) -> &ReferenceColorSet {
        &self.references
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}
