//! 命令定义和实现

pub mod config;
pub mod relay;
pub mod robot;

pub use config::ConfigCommand;
pub use relay::RelayCommand;
pub use robot::{RunCommand, SolveCommand};

use anyhow::{Result, bail};
use cubebot_client::CommandSolver;

use crate::config::CliConfig;

/// 命令行 `--solver` 优先，其次是配置文件中的 `solver_command`
pub(crate) fn resolve_solver(arg: Option<&str>, config: &CliConfig) -> Result<CommandSolver> {
    let line = arg.or(config.solver_command.as_deref()).unwrap_or_default();
    match CommandSolver::from_command_line(line) {
        Some(solver) => Ok(solver),
        None => bail!("未配置求解器：使用 --solver 或在配置文件中设置 solver_command"),
    }
}
