//! 需要执行器的命令：calibrate / scan / solve / run

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use crate::commands::resolve_solver;
use crate::config::CliConfig;
use crate::session::Session;

/// 标定六面参考色并写入标定文件
pub fn calibrate(mut session: Session) -> Result<()> {
    let references = session
        .robot
        .calibrate(&session.store)
        .context("标定失败")?;
    session.robot.park()?;

    println!("✅ 标定完成: {}", session.store.path().display());
    for (face, color) in references.iter() {
        println!("  {} ({:<6}) {}", face, face.color_name(), color);
    }
    Ok(())
}

/// 扫描魔方并打印状态串
pub fn scan(mut session: Session) -> Result<()> {
    let report = session.robot.scan().context("扫描失败")?;
    session.robot.park()?;

    for facelet in report.low_confidence(session.robot.classifier()) {
        warn!(
            "Low-confidence facelet {}{}: {} -> {} (distance {:.1})",
            facelet.face,
            facelet.tile,
            facelet.sample,
            facelet.classification.face,
            facelet.classification.distance
        );
    }

    eprint!("{}", report.state);
    println!("{}", report.cube_string()?);
    session.report_ground_truth();
    Ok(())
}

/// 求解命令参数
#[derive(Args, Debug)]
pub struct SolveCommand {
    /// 外部求解器命令（覆盖配置），魔方状态串作为最后一个参数
    #[arg(short, long, value_name = "COMMAND")]
    pub solver: Option<String>,
}

impl SolveCommand {
    pub fn execute(&self, mut session: Session, config: &CliConfig) -> Result<()> {
        let mut solver = resolve_solver(self.solver.as_deref(), config)?;
        let report = session.robot.solve(&mut solver).context("求解失败")?;

        println!("{}", report.cube);
        println!("{}", report.solution);
        eprintln!("✅ 已执行 {} 步", report.solution.len());
        session.report_ground_truth();
        Ok(())
    }
}

/// 执行走法串命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 走法记号，如 `R U2 F'`
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub moves: Vec<String>,
}

impl RunCommand {
    pub fn execute(&self, mut session: Session) -> Result<()> {
        let text = self.moves.join(" ");
        let executed = session.robot.execute(&text).context("执行走法失败")?;
        session.robot.park()?;

        eprintln!("✅ 已执行 {} 步", executed);
        session.report_ground_truth();
        Ok(())
    }
}
