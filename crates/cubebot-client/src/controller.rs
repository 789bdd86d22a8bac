//! 整机控制器
//!
//! [`CubeRobot`] 持有唯一的 [`RobotState`]，扫描与走法执行轮流借用它，
//! 两者不会同时驱动执行器。

use crate::classifier::ColorClassifier;
use crate::error::ClientError;
use crate::interpreter::MoveInterpreter;
use crate::scan::{ScanReport, ScanSequencer, calibrate};
use crate::solver::Solver;
use cubebot_driver::{CancelToken, RobotState};
use cubebot_protocol::{DistanceMetric, MoveSequence, ReferenceColorSet};
use cubebot_tools::CalibrationStore;
use tracing::{info, warn};

/// 一次完整求解的结果
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub cube: String,
    pub solution: MoveSequence,
    pub scan: ScanReport,
}

/// 从标定文件构造分类器
///
/// 文件缺失或损坏时退化为未标定模式（仅警告，不中止）。
pub fn load_classifier(store: &CalibrationStore, metric: DistanceMetric) -> ColorClassifier {
    match store.load() {
        Ok(references) => ColorClassifier::new(references, metric),
        Err(e) => {
            warn!("{}", e);
            ColorClassifier::uncalibrated(store.channels(), metric)
        },
    }
}

/// 魔方机器人
pub struct CubeRobot {
    robot: RobotState,
    classifier: ColorClassifier,
}

impl CubeRobot {
    pub fn new(robot: RobotState, classifier: ColorClassifier) -> Self {
        Self { robot, classifier }
    }

    pub fn robot(&self) -> &RobotState {
        &self.robot
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.robot.cancel_token()
    }

    /// 上电初始化
    pub fn initialize(&mut self) -> Result<(), ClientError> {
        Ok(self.robot.initialize()?)
    }

    /// 收回翻转臂
    pub fn park(&mut self) -> Result<(), ClientError> {
        Ok(self.robot.park()?)
    }

    /// 标定六面参考色，保存后立即用于分类
    pub fn calibrate(&mut self, store: &CalibrationStore) -> Result<ReferenceColorSet, ClientError> {
        info!("Calibrating colors");
        let references = calibrate(&mut self.robot)?;
        store.save(&references)?;
        let mut classifier = ColorClassifier::new(references.clone(), self.classifier.metric());
        if let Some(distance) = self.classifier.warn_distance() {
            classifier = classifier.with_warn_distance(distance);
        }
        self.classifier = classifier;
        Ok(references)
    }

    /// 扫描整个魔方
    pub fn scan(&mut self) -> Result<ScanReport, ClientError> {
        if !self.classifier.is_calibrated() {
            warn!("Scanning without calibration data");
        }
        ScanSequencer::new(&mut self.robot, &self.classifier).scan()
    }

    /// 解析并执行走法串
    pub fn execute(&mut self, solution: &str) -> Result<usize, ClientError> {
        let mut interpreter = MoveInterpreter::new(&mut self.robot);
        interpreter.run(solution)?;
        Ok(interpreter.executed())
    }

    /// 扫描 → 求解 → 执行 → 收回
    pub fn solve(&mut self, solver: &mut dyn Solver) -> Result<SolveReport, ClientError> {
        let scan = self.scan()?;
        let cube = scan.cube_string()?;
        info!("cubestring = {}", cube);

        let text = solver.solve(&cube)?;
        let solution = MoveSequence::parse(&text).map_err(ClientError::MalformedMove)?;
        MoveInterpreter::new(&mut self.robot).execute_sequence(&solution)?;

        self.robot.park()?;
        info!("Cube solved in {} moves", solution.len());
        Ok(SolveReport {
            cube,
            solution,
            scan,
        })
    }

    pub fn into_robot(self) -> RobotState {
        self.robot
    }
}
