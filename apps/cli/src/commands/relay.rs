//! relay 命令
//!
//! 主机端消息转发：从标准输入逐行读取机器人程序发来的 JSON 消息，
//! 收到 `cube_scanned` 时调用求解器并把走法串写回标准输出。

use anyhow::{Context, Result};
use clap::Args;
use cubebot_client::Solver;
use cubebot_tools::{StreamLink, relay};
use std::io;
use tracing::info;

use crate::commands::resolve_solver;
use crate::config::CliConfig;

/// 转发命令参数
#[derive(Args, Debug)]
pub struct RelayCommand {
    /// 外部求解器命令（覆盖配置）
    #[arg(short, long, value_name = "COMMAND")]
    pub solver: Option<String>,
}

impl RelayCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut solver = resolve_solver(self.solver.as_deref(), config)?;
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut link = StreamLink::new(stdin.lock(), stdout.lock());

        info!("Relaying solve requests on stdin/stdout");
        let solved = relay(&mut link, |cube: &str| {
            solver.solve(cube).map_err(|e| e.to_string())
        })
        .context("消息转发失败")?;
        info!("Relay finished after {} solve requests", solved);
        Ok(())
    }
}
