//! 软件模拟机器人
//!
//! 用整数几何精确模拟 54 个贴纸、翻转臂与转盘，实现 [`Motor`] 与 [`ColorSensor`]。
//! 机械约束与真实机器人一致：
//!
//! - 翻转臂未经 Hold 跨区移动时报 `MechanicalInterference`
//! - 只有 Hold → Flip 这段行程会翻转魔方
//! - 翻转臂在 Hold 时转盘只转底层，在 Flip 时转盘被卡住，其余位置转动整体
//! - 传感器读取顶面：ScanCenter 读中心，ScanEdge / ScanCorner 读转盘偏移 0° / 45° 时
//!   位于传感器下方的棱块 / 角块
//!
//! 模拟器还记录事件日志，并可注入故障或在若干条命令后触发取消，供测试使用。

use crate::cancel::CancelToken;
use crate::config::KinematicsConfig;
use crate::error::DriverError;
use crate::geometry::{Orientation, Vec3, face_frame, facelet_position};
use crate::hardware::{ColorSensor, Motor, RobotHardware, SpinDirection};
use crate::pose::{FlipperPreset, normalize_angle};
use cubebot_protocol::{
    ChannelCount, ColorSample, CubeState, Face, Move, MoveSequence, ReferenceColorSet,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// 模拟器事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigEvent {
    /// 翻转臂到达预设位
    Flipper(FlipperPreset),
    /// 魔方被翻转一次
    Flipped,
    /// 整体旋转（魔方坐标系度数）
    Spin(i32),
    /// 底层转动（魔方坐标系度数）
    LayerTurn(i32),
    /// 采样，附带传感器下方贴纸的真实颜色
    Sample(Face),
}

impl RigEvent {
    /// 是否是执行器命令产生的事件
    pub fn is_motion(&self) -> bool {
        !matches!(self, RigEvent::Sample(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct Sticker {
    pos: Vec3,
    normal: Vec3,
    color: Face,
}

struct SimState {
    config: KinematicsConfig,
    /// 魔方坐标系下的贴纸
    stickers: Vec<Sticker>,
    /// 魔方坐标系到世界坐标系
    orientation: Orientation,
    /// 尚未累计进 `orientation` 的整体旋转（0 或 45）
    sweep: i32,
    flipper: FlipperPreset,
    flipper_angle: i32,
    turntable_angle: i32,
    palette: [ColorSample; 6],
    noise: u32,
    rng: StdRng,
    events: Vec<RigEvent>,
    commands: usize,
    turntable_fault: Option<String>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl SimState {
    fn command_done(&mut self) {
        self.commands += 1;
        if let Some((limit, token)) = &self.cancel_after
            && self.commands >= *limit
        {
            token.cancel();
        }
    }

    fn move_flipper(&mut self, degrees: i32) -> Result<(), DriverError> {
        let target = self.config.flipper.preset_at(degrees).ok_or_else(|| {
            DriverError::actuator("flipper", format!("no preset at {}°", degrees))
        })?;
        let from = self.flipper;
        if from.needs_hold(target) {
            return Err(DriverError::MechanicalInterference(format!(
                "flipper moved {} -> {} without passing hold",
                from, target
            )));
        }
        if from == FlipperPreset::Hold && target == FlipperPreset::Flip {
            if self.sweep != 0 {
                return Err(DriverError::MechanicalInterference(format!(
                    "flip with turntable {}° off axis",
                    self.sweep
                )));
            }
            self.orientation = self.orientation.then(Orientation::flip());
            self.events.push(RigEvent::Flipped);
        }
        self.flipper = target;
        self.flipper_angle = degrees;
        self.events.push(RigEvent::Flipper(target));
        Ok(())
    }

    fn turn_turntable(&mut self, motor_degrees: i32) -> Result<(), DriverError> {
        if let Some(reason) = &self.turntable_fault {
            return Err(DriverError::actuator("turntable", reason.clone()));
        }
        let degrees = motor_degrees * self.config.turntable_polarity;
        if degrees % 45 != 0 {
            return Err(DriverError::MechanicalInterference(format!(
                "turntable step {}° is not a multiple of 45°",
                degrees
            )));
        }

        match self.flipper {
            FlipperPreset::Flip => {
                return Err(DriverError::MechanicalInterference(
                    "turntable moved while flipper at flip".to_string(),
                ));
            },
            FlipperPreset::Hold => {
                if self.sweep != 0 || degrees % 90 != 0 {
                    return Err(DriverError::MechanicalInterference(format!(
                        "bottom layer turn of {}° with turntable {}° off axis",
                        degrees, self.sweep
                    )));
                }
                let inverse = self.orientation.inverse();
                let bottom = inverse.apply(-Vec3::Z);
                self.rotate_layer(bottom, -bottom, -degrees / 90);
                self.events.push(RigEvent::LayerTurn(degrees));
            },
            _ => {
                let total = self.sweep + degrees;
                let quarters = total.div_euclid(90);
                self.orientation = self.orientation.then(Orientation::turntable(quarters * 90));
                self.sweep = total.rem_euclid(90);
                self.events.push(RigEvent::Spin(degrees));
            },
        }
        self.turntable_angle += motor_degrees;
        Ok(())
    }

    /// 旋转魔方坐标系中外法线为 `layer` 的那一层
    fn rotate_layer(&mut self, layer: Vec3, axis: Vec3, quarters: i32) {
        for sticker in self.stickers.iter_mut().filter(|s| s.pos.dot(layer) == 1) {
            sticker.pos = sticker.pos.rotate_about(axis, quarters);
            sticker.normal = sticker.normal.rotate_about(axis, quarters);
        }
    }

    fn apply_move(&mut self, mv: Move) {
        let (normal, _, _) = face_frame(mv.face());
        // 从面外侧看顺时针 = 绕外法线负方向
        self.rotate_layer(normal, normal, -mv.quarter_turns());
    }

    fn sticker_at(&self, pos: Vec3, normal: Vec3) -> Option<Face> {
        self.stickers
            .iter()
            .find(|s| s.pos == pos && s.normal == normal)
            .map(|s| s.color)
    }

    fn read(&mut self) -> Result<ColorSample, DriverError> {
        let world = match (self.flipper, self.sweep) {
            (FlipperPreset::ScanCenter, _) => Vec3::new(0, 0, 1),
            (FlipperPreset::ScanEdge, 0) => Vec3::new(0, -1, 1),
            (FlipperPreset::ScanCorner, 45) => Vec3::new(1, -1, 1),
            (preset, sweep) => {
                return Err(DriverError::SensorFault(format!(
                    "no facelet under sensor (flipper at {}, turntable offset {}°)",
                    preset, sweep
                )));
            },
        };
        let inverse = self.orientation.inverse();
        let color = self
            .sticker_at(inverse.apply(world), inverse.apply(Vec3::Z))
            .ok_or_else(|| DriverError::SensorFault("sticker not found".to_string()))?;
        self.events.push(RigEvent::Sample(color));

        let base = &self.palette[color.ordinal()];
        let noise = self.noise as i64;
        let mut values = Vec::with_capacity(base.components().len());
        for &v in base.components() {
            let offset = if noise > 0 {
                self.rng.gen_range(-noise..=noise)
            } else {
                0
            };
            values.push((v as i64 + offset).max(0) as u32);
        }
        ColorSample::from_slice(&values).map_err(|e| DriverError::SensorFault(e.to_string()))
    }
}

/// 默认调色板（RGBI，接近真实传感器读数）
fn default_palette(channels: ChannelCount) -> [ColorSample; 6] {
    const RGBI: [[u32; 4]; 6] = [
        [900, 900, 880, 950], // 白
        [610, 90, 80, 260],   // 红
        [80, 500, 120, 230],  // 绿
        [820, 760, 120, 560], // 黄
        [760, 300, 90, 380],  // 橙
        [60, 120, 540, 240],  // 蓝
    ];
    RGBI.map(|[r, g, b, i]| match channels {
        ChannelCount::Rgb => ColorSample::rgb(r, g, b),
        ChannelCount::Rgbi => ColorSample::rgbi(r, g, b, i),
    })
}

/// 模拟机器人
///
/// 克隆得到的是同一台机器人的另一个句柄。
#[derive(Clone)]
pub struct SimulatedRig {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedRig {
    /// 复原态魔方，翻转臂位于 Home，转盘位于零位
    pub fn new(config: KinematicsConfig) -> Self {
        let mut stickers = Vec::with_capacity(54);
        for face in Face::ALL {
            for tile in 1..=9u8 {
                let (pos, normal) = facelet_position(face, tile);
                stickers.push(Sticker {
                    pos,
                    normal,
                    color: face,
                });
            }
        }
        let palette = default_palette(config.channels);
        let flipper_angle = config.flipper.home;
        let turntable_angle = config.turntable_home;
        Self {
            state: Arc::new(Mutex::new(SimState {
                config,
                stickers,
                orientation: Orientation::IDENTITY,
                sweep: 0,
                flipper: FlipperPreset::Home,
                flipper_angle,
                turntable_angle,
                palette,
                noise: 0,
                rng: StdRng::seed_from_u64(0),
                events: Vec::new(),
                commands: 0,
                turntable_fault: None,
                cancel_after: None,
            })),
        }
    }

    /// 给每个通道加上 `±amplitude` 的均匀噪声
    pub fn with_noise(self, amplitude: u32, seed: u64) -> Self {
        {
            let mut state = self.state.lock();
            state.noise = amplitude;
            state.rng = StdRng::seed_from_u64(seed);
        }
        self
    }

    /// 直接打乱魔方（不经过执行器）
    pub fn scramble(&self, moves: &MoveSequence) {
        let mut state = self.state.lock();
        for mv in moves {
            state.apply_move(*mv);
        }
    }

    /// 直接转动一个面（不经过执行器），用作对照
    pub fn apply_move(&self, mv: Move) {
        self.state.lock().apply_move(mv);
    }

    /// 魔方坐标系下的真实状态
    pub fn cube_state(&self) -> CubeState {
        let state = self.state.lock();
        let text: String = Face::ALL
            .into_iter()
            .flat_map(|face| (1..=9u8).map(move |tile| (face, tile)))
            .filter_map(|(face, tile)| {
                let (pos, normal) = facelet_position(face, tile);
                state.sticker_at(pos, normal)
            })
            .map(Face::symbol)
            .collect();
        CubeState::from_cube_string(&text).unwrap_or_default()
    }

    /// 魔方当前整体姿态
    pub fn orientation(&self) -> Orientation {
        self.state.lock().orientation
    }

    /// 转盘相对 90° 网格的偏移
    pub fn sweep_offset(&self) -> i32 {
        self.state.lock().sweep
    }

    pub fn flipper(&self) -> FlipperPreset {
        self.state.lock().flipper
    }

    /// 翻转臂电机角度
    pub fn flipper_angle(&self) -> i32 {
        self.state.lock().flipper_angle
    }

    /// 转盘电机角度（不回绕）
    pub fn turntable_angle(&self) -> i32 {
        self.state.lock().turntable_angle
    }

    pub fn events(&self) -> Vec<RigEvent> {
        self.state.lock().events.clone()
    }

    /// 取出并清空事件日志
    pub fn take_events(&self) -> Vec<RigEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    /// 已执行的执行器与传感器命令数
    pub fn command_count(&self) -> usize {
        self.state.lock().commands
    }

    /// 调色板对应的参考色（相当于一次完美标定）
    pub fn reference_colors(&self) -> ReferenceColorSet {
        let palette = self.state.lock().palette.clone();
        ReferenceColorSet::new(palette)
            .unwrap_or_else(|_| ReferenceColorSet::uncalibrated(ChannelCount::Rgbi))
    }

    /// 之后所有转盘命令都以执行器故障失败；`None` 清除故障
    pub fn set_turntable_fault(&self, reason: Option<&str>) {
        self.state.lock().turntable_fault = reason.map(str::to_string);
    }

    /// 执行 `commands` 条命令后触发取消
    pub fn cancel_after(&self, commands: usize, token: CancelToken) {
        let mut state = self.state.lock();
        let limit = state.commands + commands;
        state.cancel_after = Some((limit, token));
    }

    /// 生成一套外设句柄
    pub fn hardware(&self) -> RobotHardware {
        RobotHardware::new(
            SimFlipper {
                state: self.state.clone(),
            },
            SimTurntable {
                state: self.state.clone(),
            },
            SimSensor {
                state: self.state.clone(),
            },
        )
    }
}

impl std::fmt::Debug for SimulatedRig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SimulatedRig")
            .field("flipper", &state.flipper)
            .field("turntable_angle", &state.turntable_angle)
            .field("sweep", &state.sweep)
            .field("commands", &state.commands)
            .finish_non_exhaustive()
    }
}

struct SimFlipper {
    state: Arc<Mutex<SimState>>,
}

impl Motor for SimFlipper {
    fn run_to_position(&mut self, degrees: i32, _direction: SpinDirection) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let result = state.move_flipper(degrees);
        state.command_done();
        result
    }

    fn run_for_degrees(&mut self, degrees: i32) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let target = state.flipper_angle + degrees;
        let result = state.move_flipper(target);
        state.command_done();
        result
    }
}

struct SimTurntable {
    state: Arc<Mutex<SimState>>,
}

impl Motor for SimTurntable {
    fn run_to_position(&mut self, degrees: i32, direction: SpinDirection) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let diff = degrees - state.turntable_angle;
        let delta = match direction {
            SpinDirection::Shortest => normalize_angle(diff),
            SpinDirection::Clockwise => diff.rem_euclid(360),
            SpinDirection::CounterClockwise => -(-diff).rem_euclid(360),
        };
        let result = state.turn_turntable(delta);
        state.command_done();
        result
    }

    fn run_for_degrees(&mut self, degrees: i32) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let result = state.turn_turntable(degrees);
        state.command_done();
        result
    }
}

struct SimSensor {
    state: Arc<Mutex<SimState>>,
}

impl ColorSensor for SimSensor {
    fn sample(&mut self) -> Result<ColorSample, DriverError> {
        let mut state = self.state.lock();
        let result = state.read();
        state.command_done();
        result
    }

    fn channels(&self) -> ChannelCount {
        self.state.lock().config.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> SimulatedRig {
        SimulatedRig::new(KinematicsConfig::simulated())
    }

    #[test]
    fn test_starts_solved() {
        let rig = rig();
        assert!(rig.cube_state().is_solved());
        assert!(rig.orientation().is_identity());
        assert_eq!(rig.flipper(), FlipperPreset::Home);
    }

    #[test]
    fn test_move_and_inverse() {
        let rig = rig();
        let moves = MoveSequence::parse("R U R' U' F2 D L' B").unwrap();
        rig.scramble(&moves);
        assert!(!rig.cube_state().is_solved());
        rig.scramble(&moves.inverse());
        assert!(rig.cube_state().is_solved());
    }

    #[test]
    fn test_known_u_turn() {
        // U 顺时针后，F 面顶行变成原来 R 面的颜色
        let rig = rig();
        rig.apply_move(Move::cw(Face::U));
        let state = rig.cube_state();
        for tile in 1..=3 {
            assert_eq!(state.get(Face::F, tile), Some(Face::R));
            assert_eq!(state.get(Face::R, tile), Some(Face::B));
        }
        assert_eq!(state.get(Face::F, 4), Some(Face::F));
    }

    #[test]
    fn test_four_quarter_turns_identity() {
        for face in Face::ALL {
            let rig = rig();
            for _ in 0..4 {
                rig.apply_move(Move::cw(face));
            }
            assert!(rig.cube_state().is_solved(), "{}", face);
        }
    }

    #[test]
    fn test_flip_requires_hold() {
        let rig = rig();
        let mut hw = rig.hardware();
        let flip = KinematicsConfig::simulated().flipper.flip;
        let err = hw.flipper.run_to_position(flip, SpinDirection::Shortest).unwrap_err();
        assert!(matches!(err, DriverError::MechanicalInterference(_)));
        assert_eq!(rig.flipper(), FlipperPreset::Home);
    }

    #[test]
    fn test_hold_to_flip_flips_cube() {
        let rig = rig();
        let mut hw = rig.hardware();
        let angles = KinematicsConfig::simulated().flipper;
        hw.flipper.run_to_position(angles.hold, SpinDirection::Shortest).unwrap();
        hw.flipper.run_to_position(angles.flip, SpinDirection::Shortest).unwrap();
        assert_eq!(rig.orientation().face_at_bottom(), Face::B);
        assert_eq!(
            rig.take_events(),
            vec![
                RigEvent::Flipper(FlipperPreset::Hold),
                RigEvent::Flipped,
                RigEvent::Flipper(FlipperPreset::Flip),
            ]
        );
    }

    #[test]
    fn test_turntable_at_hold_turns_bottom_layer() {
        let rig = rig();
        let mut hw = rig.hardware();
        let angles = KinematicsConfig::simulated().flipper;
        hw.flipper.run_to_position(angles.hold, SpinDirection::Shortest).unwrap();
        // 俯视逆时针 90° = D 顺时针
        hw.turntable.run_for_degrees(-90).unwrap();

        let expected = {
            let reference = SimulatedRig::new(KinematicsConfig::simulated());
            reference.apply_move(Move::cw(Face::D));
            reference.cube_state()
        };
        assert_eq!(rig.cube_state(), expected);
        assert!(rig.orientation().is_identity());
    }

    #[test]
    fn test_sensor_needs_matching_offset() {
        let rig = rig();
        let mut hw = rig.hardware();
        let angles = KinematicsConfig::simulated().flipper;
        hw.flipper.run_to_position(angles.hold, SpinDirection::Shortest).unwrap();
        hw.flipper.run_to_position(angles.scan_corner, SpinDirection::Shortest).unwrap();
        assert!(matches!(hw.sensor.sample(), Err(DriverError::SensorFault(_))));

        hw.turntable.run_for_degrees(45).unwrap();
        assert_eq!(rig.sweep_offset(), 45);
        assert_eq!(hw.sensor.sample().unwrap(), rig.reference_colors().get(Face::U).clone());
    }

    #[test]
    fn test_turntable_blocked_at_flip() {
        let rig = rig();
        let mut hw = rig.hardware();
        let angles = KinematicsConfig::simulated().flipper;
        hw.flipper.run_to_position(angles.hold, SpinDirection::Shortest).unwrap();
        hw.flipper.run_to_position(angles.flip, SpinDirection::Shortest).unwrap();
        assert!(matches!(
            hw.turntable.run_for_degrees(90),
            Err(DriverError::MechanicalInterference(_))
        ));
    }

    #[test]
    fn test_noise_stays_near_palette() {
        let rig = rig().with_noise(10, 7);
        let mut hw = rig.hardware();
        let angles = KinematicsConfig::simulated().flipper;
        hw.flipper.run_to_position(angles.hold, SpinDirection::Shortest).unwrap();
        hw.flipper.run_to_position(angles.scan_center, SpinDirection::Shortest).unwrap();
        let reference = rig.reference_colors();
        for _ in 0..20 {
            let sample = hw.sensor.sample().unwrap();
            for (a, b) in sample.components().iter().zip(reference.get(Face::U).components()) {
                assert!(a.abs_diff(*b) <= 10);
            }
        }
    }

    #[test]
    fn test_cancel_after_commands() {
        let rig = rig();
        let token = CancelToken::new();
        rig.cancel_after(2, token.clone());
        let mut hw = rig.hardware();
        let angles = KinematicsConfig::simulated().flipper;
        hw.flipper.run_to_position(angles.hold, SpinDirection::Shortest).unwrap();
        assert!(!token.is_cancelled());
        hw.flipper.run_to_position(angles.spin, SpinDirection::Shortest).unwrap();
        assert!(token.is_cancelled());
    }
}
