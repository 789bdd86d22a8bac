//! 运动学核心 + 模拟机器人集成测试
//!
//! 验证：
//! - 每个面的"重定向 - 转底层 - 恢复"与直接转动该面结果一致
//! - 面转动前后魔方坐标系与执行器位姿不变
//! - 扫描阶段依次把各面正向翻到顶部，结束后复原坐标系
//! - 机械约束与取消

use cubebot_driver::reorientation::{SCAN_RESTORE, SCAN_STAGES};
use cubebot_driver::sim::{RigEvent, SimulatedRig};
use cubebot_driver::{
    DriverError, FlipperPreset, KinematicsConfig, Reorientation, RobotState,
};
use cubebot_protocol::{Direction, Face, Move, MoveSequence};

fn setup() -> (SimulatedRig, RobotState) {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut robot = RobotState::new(rig.hardware(), KinematicsConfig::simulated()).unwrap();
    robot.initialize().unwrap();
    (rig, robot)
}

fn face_turn(robot: &mut RobotState, mv: Move) -> Result<(), DriverError> {
    let (present, restore) = Reorientation::for_face(mv.face());
    robot.reorient(&present)?;
    robot.turn_bottom(mv.count(), mv.direction())?;
    robot.reorient(&restore)
}

#[test]
fn test_face_turns_match_direct_moves() {
    for face in Face::ALL {
        for mv in [Move::cw(face), Move::ccw(face), Move::double(face)] {
            let (rig, mut robot) = setup();
            face_turn(&mut robot, mv).unwrap();

            let reference = SimulatedRig::new(KinematicsConfig::simulated());
            reference.apply_move(mv);

            assert_eq!(rig.cube_state(), reference.cube_state(), "move {}", mv);
            assert!(rig.orientation().is_identity(), "move {} left cube rotated", mv);
        }
    }
}

#[test]
fn test_reorientation_round_trip_restores_pose() {
    let (rig, mut robot) = setup();
    robot.flipper_to(FlipperPreset::Hold).unwrap();
    for face in Face::ALL {
        let before = robot.pose();
        let (present, restore) = Reorientation::for_face(face);
        robot.reorient(&present).unwrap();
        robot.reorient(&restore).unwrap();
        assert_eq!(robot.pose(), before, "{}", face);
        assert!(rig.orientation().is_identity(), "{}", face);
        assert!(rig.cube_state().is_solved(), "{}", face);
    }
}

#[test]
fn test_face_turn_only_moves_turntable_by_layer_turn() {
    let (_rig, mut robot) = setup();
    robot.flipper_to(FlipperPreset::Hold).unwrap();
    for face in Face::ALL {
        for (count, direction) in [
            (1, Direction::Clockwise),
            (1, Direction::CounterClockwise),
            (2, Direction::Clockwise),
        ] {
            let mv = Move::new(face, count, direction).unwrap();
            let before = robot.pose();
            face_turn(&mut robot, mv).unwrap();
            let after = robot.pose();

            // 转底层的位移不回绕，其余重定向全部抵消
            assert_eq!(after.flipper, before.flipper, "{}", mv);
            assert_eq!(
                after.turntable - before.turntable,
                -90 * count as i32 * direction.sign(),
                "{}",
                mv
            );
        }
    }
}

#[test]
fn test_sequence_then_inverse_is_solved() {
    let (rig, mut robot) = setup();
    let moves = MoveSequence::parse("R U2 F' L D B2 U' R2").unwrap();
    for mv in &moves {
        face_turn(&mut robot, *mv).unwrap();
    }
    assert!(!rig.cube_state().is_solved());
    for mv in &moves.inverse() {
        face_turn(&mut robot, *mv).unwrap();
    }
    assert!(rig.cube_state().is_solved());
}

#[test]
fn test_scan_stages_bring_each_center_on_top() {
    let (rig, mut robot) = setup();
    for (face, stage) in SCAN_STAGES {
        robot.reorient(&stage).unwrap();
        robot.flipper_to(FlipperPreset::ScanCenter).unwrap();
        robot.sample().unwrap();
        assert_eq!(rig.events().last(), Some(&RigEvent::Sample(face)));
    }
    robot.reorient(&SCAN_RESTORE).unwrap();
    assert!(rig.orientation().is_identity());
    assert!(rig.cube_state().is_solved());
}

#[test]
fn test_scan_sweep_returns_to_grid() {
    let (rig, mut robot) = setup();
    robot.flipper_to(FlipperPreset::ScanCenter).unwrap();
    let start = robot.pose().turntable;
    for step in 1..=8 {
        let preset = if step % 2 == 1 {
            FlipperPreset::ScanEdge
        } else {
            FlipperPreset::ScanCorner
        };
        robot.flipper_to(preset).unwrap();
        robot.sample().unwrap();
        robot.turntable_to(start + 45 * step).unwrap();
        assert!((-180..180).contains(&robot.pose().turntable));
    }
    assert_eq!(rig.sweep_offset(), 0);
    assert!(rig.orientation().is_identity());
}

#[test]
fn test_unrouted_flip_is_rejected_by_rig() {
    let rig = SimulatedRig::new(KinematicsConfig::simulated());
    let mut hardware = rig.hardware();
    let flip = KinematicsConfig::simulated().flipper.flip;
    let err = hardware
        .flipper
        .run_to_position(flip, cubebot_driver::SpinDirection::Shortest)
        .unwrap_err();
    assert!(matches!(err, DriverError::MechanicalInterference(_)));
}

#[test]
fn test_cancel_mid_face_turn() {
    let (rig, mut robot) = setup();
    rig.cancel_after(3, robot.cancel_token());
    let before = rig.command_count();

    let err = face_turn(&mut robot, Move::cw(Face::R)).unwrap_err();
    assert_eq!(err, DriverError::Cancelled);
    assert_eq!(rig.command_count() - before, 3);
}

#[test]
fn test_turntable_fault_propagates() {
    let (rig, mut robot) = setup();
    rig.set_turntable_fault(Some("encoder lost"));
    let err = face_turn(&mut robot, Move::cw(Face::D)).unwrap_err();
    assert!(matches!(err, DriverError::ActuatorFault { actuator: "turntable", .. }));
    assert_eq!(robot.pose().flipper, FlipperPreset::Hold);
    assert_eq!(robot.pose().turntable, 0);
}
