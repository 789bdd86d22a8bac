//! 求解器接口
//!
//! 求解算法本身在外部：输入 54 字符状态串，输出空格分隔的走法串。

use crate::error::ClientError;
use cubebot_tools::{MessageLink, request_solution};
use std::process::Command;
use tracing::debug;

/// 外部求解器
pub trait Solver {
    fn solve(&mut self, cube: &str) -> Result<String, ClientError>;
}

/// 闭包求解器（测试与嵌入使用）
impl<F> Solver for F
where
    F: FnMut(&str) -> Result<String, String>,
{
    fn solve(&mut self, cube: &str) -> Result<String, ClientError> {
        self(cube).map_err(ClientError::Solver)
    }
}

/// 调用外部程序：`program [args..] <cube>`，标准输出即走法串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSolver {
    program: String,
    args: Vec<String>,
}

impl CommandSolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 从一行命令文本构造（按空白切分，不支持引号）
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl Solver for CommandSolver {
    fn solve(&mut self, cube: &str) -> Result<String, ClientError> {
        debug!("Running solver {} {:?} {}", self.program, self.args, cube);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(cube)
            .output()
            .map_err(|e| ClientError::Solver(format!("failed to run {}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(ClientError::Solver(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// 经消息链路由另一进程求解
pub struct RelaySolver<L> {
    link: L,
}

impl<L: MessageLink> RelaySolver<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn into_inner(self) -> L {
        self.link
    }
}

impl<L: MessageLink> Solver for RelaySolver<L> {
    fn solve(&mut self, cube: &str) -> Result<String, ClientError> {
        Ok(request_solution(&mut self.link, cube)?)
    }
}
