//! 整机流程集成测试（模拟机器人）
//!
//! 测试覆盖：
//! - 扫描打乱后的魔方，状态串与真实状态一致，魔方坐标系复原
//! - 走法执行与直接转动结果一致
//! - 扫描 → 求解 → 执行的完整闭环
//! - 非法记号、取消、执行器故障、未标定模式
//! - 标定并保存到文件

use cubebot_client::{ClientError, ColorClassifier, CubeRobot, MoveInterpreter, ScanSequencer};
use cubebot_driver::sim::{RigEvent, SimulatedRig};
use cubebot_driver::{KinematicsConfig, RobotState};
use cubebot_protocol::{ChannelCount, DistanceMetric, Face, MoveSequence};
use cubebot_tools::CalibrationStore;
use std::collections::HashSet;

const SCRAMBLE: &str = "R U2 F' L D' B2 R' U F2 L2 D B'";

fn setup(rig: &SimulatedRig) -> RobotState {
    let mut robot = RobotState::new(rig.hardware(), KinematicsConfig::simulated()).unwrap();
    robot.initialize().unwrap();
    robot
}

fn calibrated(rig: &SimulatedRig) -> ColorClassifier {
    ColorClassifier::new(rig.reference_colors(), DistanceMetric::Euclidean)
}

#[test]
fn test_scan_solved_cube() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    let classifier = calibrated(&rig);

    let report = ScanSequencer::new(&mut robot, &classifier).scan().unwrap();
    assert!(report.state.is_solved());
    assert_eq!(
        report.cube_string().unwrap(),
        "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB"
    );
}

#[test]
fn test_scan_scrambled_cube_matches_ground_truth() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    rig.scramble(&MoveSequence::parse(SCRAMBLE).unwrap());
    let mut robot = setup(&rig);
    let classifier = calibrated(&rig);

    let report = ScanSequencer::new(&mut robot, &classifier).scan().unwrap();
    assert_eq!(report.state, rig.cube_state());
    assert!(rig.orientation().is_identity());
    assert_eq!(rig.sweep_offset(), 0);
}

#[test]
fn test_scan_visits_every_facelet_once() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    let classifier = calibrated(&rig);
    rig.take_events();

    let report = ScanSequencer::new(&mut robot, &classifier).scan().unwrap();
    let visited: HashSet<(Face, u8)> = report.facelets.iter().map(|f| (f.face, f.tile)).collect();
    assert_eq!(report.facelets.len(), 54);
    assert_eq!(visited.len(), 54);

    let samples = rig
        .events()
        .iter()
        .filter(|e| matches!(e, RigEvent::Sample(_)))
        .count();
    assert_eq!(samples, 54);

    // 扫描顺序 U F D B R L，每面先读中心
    let faces: Vec<Face> = report.facelets.iter().step_by(9).map(|f| f.face).collect();
    assert_eq!(faces, Face::SCAN_ORDER.to_vec());
    assert!(report.facelets.iter().step_by(9).all(|f| f.tile == 5));
}

#[test]
fn test_scan_with_sensor_noise() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated()).with_noise(25, 42);
    rig.scramble(&MoveSequence::parse(SCRAMBLE).unwrap());
    let mut robot = setup(&rig);
    let classifier = calibrated(&rig).with_warn_distance(200.0);

    let report = ScanSequencer::new(&mut robot, &classifier).scan().unwrap();
    assert_eq!(report.state, rig.cube_state());
    assert_eq!(report.low_confidence(&classifier).count(), 0);
}

#[test]
fn test_uncalibrated_scan_reports_everything_as_first_face() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    let classifier = ColorClassifier::uncalibrated(ChannelCount::Rgbi, DistanceMetric::Euclidean);

    let report = ScanSequencer::new(&mut robot, &classifier).scan().unwrap();
    assert_eq!(report.cube_string().unwrap(), "U".repeat(54));
}

#[test]
fn test_interpreter_matches_direct_moves() {
    let moves = MoveSequence::parse(SCRAMBLE).unwrap();

    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    let mut interpreter = MoveInterpreter::new(&mut robot);
    interpreter.execute_sequence(&moves).unwrap();
    assert_eq!(interpreter.executed(), moves.len());

    let reference = SimulatedRig::new(KinematicsConfig::simulated());
    reference.scramble(&moves);

    assert_eq!(rig.cube_state(), reference.cube_state());
    assert!(rig.orientation().is_identity());
}

#[test]
fn test_scramble_then_inverse_is_solved() {
    let moves = MoveSequence::parse(SCRAMBLE).unwrap();
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    rig.scramble(&moves);
    let mut robot = setup(&rig);

    MoveInterpreter::new(&mut robot)
        .run(&moves.inverse().to_string())
        .unwrap();
    assert!(rig.cube_state().is_solved());
}

#[test]
fn test_malformed_token_issues_no_commands() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    let before = rig.command_count();

    for bad in ["R U X", "R2' U", "R U2 F''"] {
        let err = MoveInterpreter::new(&mut robot).run(bad).unwrap_err();
        assert!(matches!(err, ClientError::MalformedMove(_)), "{}", bad);
        assert!(!err.is_fatal());
    }
    assert_eq!(rig.command_count(), before);
}

#[test]
fn test_full_solve_cycle() {
    let scramble = MoveSequence::parse(SCRAMBLE).unwrap();
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    rig.scramble(&scramble);
    let expected_cube = rig.cube_state().to_cube_string().unwrap();

    let mut cube_robot = CubeRobot::new(setup(&rig), calibrated(&rig));
    let inverse = scramble.inverse().to_string();
    let mut solver = move |cube: &str| -> Result<String, String> {
        assert_eq!(cube.len(), 54);
        Ok(inverse.clone())
    };

    let report = cube_robot.solve(&mut solver).unwrap();
    assert_eq!(report.cube, expected_cube);
    assert_eq!(report.solution.len(), scramble.len());
    assert!(rig.cube_state().is_solved());
    assert_eq!(rig.flipper(), cubebot_driver::FlipperPreset::Home);
}

#[test]
fn test_solver_output_outside_grammar_aborts_before_motion() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut cube_robot = CubeRobot::new(setup(&rig), calibrated(&rig));
    let mut solver = |_: &str| -> Result<String, String> { Ok("R U Q".to_string()) };

    let err = cube_robot.solve(&mut solver).unwrap_err();
    assert!(matches!(err, ClientError::MalformedMove(_)));
    // 只发生了扫描，魔方未被转动
    assert!(rig.cube_state().is_solved());
    assert!(
        !rig.events()
            .iter()
            .any(|e| matches!(e, RigEvent::LayerTurn(_)))
    );
}

#[test]
fn test_cancel_mid_scan() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    let classifier = calibrated(&rig);
    rig.cancel_after(20, robot.cancel_token());

    let err = ScanSequencer::new(&mut robot, &classifier).scan().unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(!err.is_fatal());

    // 取消后重新从 Home 开始
    robot.cancel_token().reset();
    let rig2 = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot2 = setup(&rig2);
    let report = ScanSequencer::new(&mut robot2, &classifier).scan().unwrap();
    assert!(report.state.is_solved());
}

#[test]
fn test_actuator_fault_is_fatal() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = setup(&rig);
    rig.set_turntable_fault(Some("motor disconnected"));

    let err = MoveInterpreter::new(&mut robot).run("D R").unwrap_err();
    assert!(matches!(err, ClientError::ActuatorFault(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_calibration_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = CalibrationStore::new(dir.path().join("data").join("cubecolors"), ChannelCount::Rgbi);

    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    rig.scramble(&MoveSequence::parse(SCRAMBLE).unwrap());
    let mut cube_robot = CubeRobot::new(
        setup(&rig),
        ColorClassifier::uncalibrated(ChannelCount::Rgbi, DistanceMetric::Euclidean),
    );

    let references = cube_robot.calibrate(&store).unwrap();
    assert_eq!(references, rig.reference_colors());
    assert!(cube_robot.classifier().is_calibrated());
    assert!(rig.orientation().is_identity());

    let loaded = cubebot_client::load_classifier(&store, DistanceMetric::Euclidean);
    assert!(loaded.is_calibrated());
    assert_eq!(loaded.references(), &references);

    let report = cube_robot.scan().unwrap();
    assert_eq!(report.state, rig.cube_state());
}

#[test]
fn test_missing_calibration_degrades() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = CalibrationStore::new(dir.path().join("cubecolors"), ChannelCount::Rgbi);
    let classifier = cubebot_client::load_classifier(&store, DistanceMetric::Euclidean);
    assert!(!classifier.is_calibrated());
}

#[test]
fn test_spike_hub_preset_on_rgb_rig() {
    let config = KinematicsConfig {
        settle: Default::default(),
        ..KinematicsConfig::spike_hub()
    };
    let rig = SimulatedRig::new(config.clone());
    rig.scramble(&MoveSequence::parse("F R' D2").unwrap());
    let mut robot = RobotState::new(rig.hardware(), config).unwrap();
    robot.initialize().unwrap();
    let classifier = ColorClassifier::new(rig.reference_colors(), DistanceMetric::Manhattan);

    let report = ScanSequencer::new(&mut robot, &classifier).scan().unwrap();
    assert_eq!(report.state, rig.cube_state());
}
