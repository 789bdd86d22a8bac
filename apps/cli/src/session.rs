//! 机器人会话
//!
//! 每个命令独立执行：
//! 1. 解析运动学参数与标定文件
//! 2. 连接执行器（目前只有模拟机器人）
//! 3. 安装 Ctrl-C 处理并初始化位姿

use anyhow::{Context, Result, bail};
use clap::Args;
use cubebot_client::{ColorClassifier, CubeRobot, load_classifier};
use cubebot_driver::sim::SimulatedRig;
use cubebot_driver::{RobotState, SettleDelays};
use cubebot_protocol::MoveSequence;
use cubebot_tools::CalibrationStore;
use tracing::{info, warn};

use crate::config::CliConfig;

/// 执行器相关的全局参数
#[derive(Args, Debug, Clone, Default)]
pub struct RigArgs {
    /// 在软件模拟的机器人上运行
    #[arg(long, global = true)]
    pub simulate: bool,

    /// 覆盖配置文件中的硬件预设（spike-hub, build-hat, simulated）
    #[arg(long, global = true, value_name = "NAME")]
    pub preset: Option<String>,

    /// 模拟模式：开始前先打乱魔方
    #[arg(long, global = true, value_name = "MOVES")]
    pub scramble: Option<String>,

    /// 模拟模式：传感器噪声幅度
    #[arg(long, global = true, default_value_t = 0)]
    pub noise: u32,

    /// 模拟模式：噪声随机种子
    #[arg(long, global = true, default_value_t = 0)]
    pub seed: u64,
}

/// 已初始化的机器人
pub struct Session {
    pub robot: CubeRobot,
    pub store: CalibrationStore,
    /// 模拟模式下的机器人模型，用于核对结果
    pub rig: Option<SimulatedRig>,
}

impl Session {
    pub fn open(args: &RigArgs, config: &CliConfig) -> Result<Self> {
        let mut kinematics = config.kinematics(args.preset.as_deref())?;

        if !args.simulate {
            bail!(
                "没有可用的执行器后端：真实电机需要实现 cubebot_driver::Motor 与 ColorSensor。\n\
                 使用 --simulate 在模拟机器人上运行"
            );
        }

        // 模拟机器人即时到位，不需要等待
        kinematics.settle = SettleDelays::default();
        let rig = SimulatedRig::new(kinematics.clone()).with_noise(args.noise, args.seed);
        if let Some(text) = &args.scramble {
            let moves = MoveSequence::parse(text).context("--scramble 走法串非法")?;
            rig.scramble(&moves);
            info!("Simulated cube scrambled with {} moves", moves.len());
        }

        let store = CalibrationStore::new(config.calibration_path()?, kinematics.channels);
        let mut classifier = load_classifier(&store, kinematics.metric);
        if !classifier.is_calibrated() {
            info!("Using the simulated rig's palette as reference colors");
            classifier = ColorClassifier::new(rig.reference_colors(), kinematics.metric);
        }
        if let Some(distance) = config.warn_distance {
            classifier = classifier.with_warn_distance(distance);
        }

        let robot = RobotState::new(rig.hardware(), kinematics).context("创建机器人失败")?;
        install_interrupt_handler(&robot);

        let mut robot = CubeRobot::new(robot, classifier);
        robot.initialize().context("初始化执行器失败")?;

        Ok(Self {
            robot,
            store,
            rig: Some(rig),
        })
    }

    /// 模拟模式下打印真实魔方状态，便于核对
    pub fn report_ground_truth(&self) {
        let Some(rig) = &self.rig else {
            return;
        };
        let truth = rig.cube_state();
        match truth.to_cube_string() {
            Ok(cube) => info!("Simulated cube = {}", cube),
            Err(e) => warn!("Simulated cube state unavailable: {}", e),
        }
        if truth.is_solved() {
            info!("Simulated cube is solved");
        }
    }
}

/// Ctrl-C 只设置取消标志，运动学层在下一条命令前检查
fn install_interrupt_handler(robot: &RobotState) {
    let token = robot.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\n⚠️  收到中断信号，停止当前序列...");
        token.cancel();
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }
}
