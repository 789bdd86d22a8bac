//! 扫描流程
//!
//! 按 `{U, F, D, B, R, L}` 顺序把每个面翻到传感器下方：
//! 先在 ScanCenter 读中心，再每转 45° 读一个周边色块，棱块用 ScanEdge，
//! 角块用 ScanCorner，周边访问顺序固定为 `8, 9, 6, 3, 2, 1, 4, 7`。
//! 六面结束后执行固定的恢复动作，魔方回到扫描前的坐标系。
//!
//! 标定与扫描走同样的路线，但只在每个面的中心采样。

use crate::classifier::{Classification, ColorClassifier};
use crate::error::ClientError;
use cubebot_driver::reorientation::{SCAN_RESTORE, SCAN_STAGES};
use cubebot_driver::{FlipperPreset, RobotState};
use cubebot_protocol::{ColorSample, CubeState, Face, ReferenceColorSet};
use tracing::{debug, info};

/// 中心色块编号
pub const CENTER_TILE: u8 = 5;

/// 周边色块访问顺序（转盘每步 +45°）
pub const PERIMETER_ORDER: [u8; 8] = [8, 9, 6, 3, 2, 1, 4, 7];

/// 单个色块的扫描记录
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedFacelet {
    pub face: Face,
    pub tile: u8,
    pub sample: ColorSample,
    pub classification: Classification,
}

/// 一次完整扫描的结果
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub state: CubeState,
    /// 按采样顺序排列
    pub facelets: Vec<ScannedFacelet>,
}

impl ScanReport {
    /// 54 字符状态串
    pub fn cube_string(&self) -> Result<String, ClientError> {
        self.state.to_cube_string().map_err(|e| ClientError::IncompleteScan {
            written: self.state.written(),
            reason: e.to_string(),
        })
    }

    /// 超出分类器警告距离的色块
    pub fn low_confidence<'a>(
        &'a self,
        classifier: &'a ColorClassifier,
    ) -> impl Iterator<Item = &'a ScannedFacelet> + 'a {
        self.facelets
            .iter()
            .filter(move |f| classifier.is_low_confidence(&f.classification))
    }
}

/// 扫描器：在一次扫描期间独占执行器
pub struct ScanSequencer<'a> {
    robot: &'a mut RobotState,
    classifier: &'a ColorClassifier,
    state: CubeState,
    facelets: Vec<ScannedFacelet>,
}

impl<'a> ScanSequencer<'a> {
    pub fn new(robot: &'a mut RobotState, classifier: &'a ColorClassifier) -> Self {
        Self {
            robot,
            classifier,
            state: CubeState::new(),
            facelets: Vec::with_capacity(54),
        }
    }

    /// 扫描整个魔方
    ///
    /// 任一色块缺失或重复都返回 `IncompleteScan`。
    pub fn scan(mut self) -> Result<ScanReport, ClientError> {
        for (face, stage) in SCAN_STAGES {
            self.robot.reorient(&stage)?;
            info!("Scanning face {}", face);
            self.scan_face(face)?;
        }
        self.robot.reorient(&SCAN_RESTORE)?;

        if !self.state.is_complete() {
            return Err(ClientError::IncompleteScan {
                written: self.state.written(),
                reason: "traversal left facelets unwritten".to_string(),
            });
        }
        info!("Scan complete:\n{}", self.state);
        Ok(ScanReport {
            state: self.state,
            facelets: self.facelets,
        })
    }

    fn scan_face(&mut self, face: Face) -> Result<(), ClientError> {
        self.robot.flipper_to(FlipperPreset::ScanCenter)?;
        self.scan_tile(face, CENTER_TILE)?;

        let start = self.robot.pose().turntable;
        self.robot.turntable_to(start)?;
        for (step, tile) in PERIMETER_ORDER.into_iter().enumerate() {
            let preset = if step % 2 == 1 {
                FlipperPreset::ScanCorner
            } else {
                FlipperPreset::ScanEdge
            };
            self.robot.flipper_to(preset)?;
            self.scan_tile(face, tile)?;
            self.robot.turntable_to(start + 45 * (step as i32 + 1))?;
        }
        self.robot.settle(self.robot.config().settle.face());
        Ok(())
    }

    fn scan_tile(&mut self, face: Face, tile: u8) -> Result<(), ClientError> {
        let sample = self.robot.sample()?;
        let classification = self.classifier.classify(&sample);
        debug!(
            "{}-{} color is {} ({}, distance {:.1})",
            face,
            tile,
            classification.face.color_name(),
            sample,
            classification.distance
        );
        self.state
            .set(face, tile, classification.face)
            .map_err(|e| ClientError::IncompleteScan {
                written: self.state.written(),
                reason: e.to_string(),
            })?;
        self.facelets.push(ScannedFacelet {
            face,
            tile,
            sample,
            classification,
        });
        Ok(())
    }
}

/// 标定：沿扫描路线只读取六个中心色
pub fn calibrate(robot: &mut RobotState) -> Result<ReferenceColorSet, ClientError> {
    let mut centers: [Option<ColorSample>; 6] = Default::default();
    for (face, stage) in SCAN_STAGES {
        robot.reorient(&stage)?;
        robot.flipper_to(FlipperPreset::ScanCenter)?;
        robot.settle(robot.config().settle.sample());
        let sample = robot.sample()?;
        info!("{} center {}", face, sample);
        centers[face.ordinal()] = Some(sample);
    }
    robot.reorient(&SCAN_RESTORE)?;

    let references: Vec<ColorSample> = centers.into_iter().flatten().collect();
    let written = references.len();
    let references: [ColorSample; 6] =
        references
            .try_into()
            .map_err(|_| ClientError::IncompleteScan {
                written,
                reason: "calibration missed a center".to_string(),
            })?;
    ReferenceColorSet::new(references).map_err(ClientError::Protocol)
}
