//! # Cube Bot CLI
//!
//! 两轴魔方机器人的命令行工具。
//!
//! ## 使用
//!
//! ```bash
//! # 写入默认配置
//! cubebot config init
//!
//! # 标定六面参考色
//! cubebot --simulate calibrate
//!
//! # 扫描 → 外部求解器 → 执行
//! cubebot --simulate --scramble "R U2 F'" solve --solver kociemba
//!
//! # 直接执行走法串
//! cubebot --simulate run R U R\' U\'
//!
//! # 主机端转发求解请求（stdin/stdout 逐行 JSON）
//! cubebot relay --solver kociemba
//! ```

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod session;

use commands::{ConfigCommand, RelayCommand, RunCommand, SolveCommand};
use config::CliConfig;
use session::{RigArgs, Session};

/// Cube Bot - 魔方机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "cubebot")]
#[command(about = "Command-line interface for the two-actuator cube bot", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/cubebot/config.toml）
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 日志详细程度（-v debug，-vv trace）
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    rig: RigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 标定六面参考色
    Calibrate,

    /// 扫描魔方，输出 54 字符状态串
    Scan,

    /// 扫描、求解并执行
    Solve {
        #[command(flatten)]
        args: SolveCommand,
    },

    /// 执行走法串
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 转发机器人程序的求解请求
    Relay {
        #[command(flatten)]
        args: RelayCommand,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if verbose == 0 => filter,
        _ => EnvFilter::new(format!("cubebot={}", level)),
    };
    // stdout 留给状态串与转发消息
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_path()?,
    };

    let load = || CliConfig::load(&config_path);
    match cli.command {
        Commands::Config(cmd) => cmd.execute(&config_path),
        Commands::Calibrate => commands::robot::calibrate(Session::open(&cli.rig, &load()?)?),
        Commands::Scan => commands::robot::scan(Session::open(&cli.rig, &load()?)?),
        Commands::Solve { args } => {
            let config = load()?;
            args.execute(Session::open(&cli.rig, &config)?, &config)
        },
        Commands::Run { args } => args.execute(Session::open(&cli.rig, &load()?)?),
        Commands::Relay { args } => args.execute(&load()?),
    }
}
