//! 走法执行
//!
//! 每个面的走法都是"重定向 → 转底层 → 恢复"。D 面不需要重定向；
//! 其余五个面的重定向与恢复序列见 [`Reorientation::for_face`]，
//! 该表对六个面做穷尽匹配。
//!
//! 整段走法串先完整解析，再逐步执行：只要有一个记号非法，
//! 整段作废，执行器不会收到任何命令。

use crate::error::ClientError;
use cubebot_driver::{Reorientation, RobotState};
use cubebot_protocol::{Move, MoveSequence};
use tracing::{debug, info};

/// 走法执行器：在执行期间独占执行器
pub struct MoveInterpreter<'a> {
    robot: &'a mut RobotState,
    executed: usize,
}

impl<'a> MoveInterpreter<'a> {
    pub fn new(robot: &'a mut RobotState) -> Self {
        Self { robot, executed: 0 }
    }

    /// 已完整执行的走法数
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// 解析并执行一段走法串
    pub fn run(&mut self, solution: &str) -> Result<(), ClientError> {
        let moves = MoveSequence::parse(solution).map_err(ClientError::MalformedMove)?;
        self.execute_sequence(&moves)
    }

    /// 严格按顺序执行，前一步到位后才开始下一步
    pub fn execute_sequence(&mut self, moves: &MoveSequence) -> Result<(), ClientError> {
        info!("Solving cube with {} moves: {}", moves.len(), moves);
        for mv in moves {
            self.execute(*mv)?;
        }
        Ok(())
    }

    /// 执行单步走法
    pub fn execute(&mut self, mv: Move) -> Result<(), ClientError> {
        debug!("Executing move {}", mv);
        let (present, restore) = Reorientation::for_face(mv.face());
        self.robot.reorient(&present)?;
        self.robot.turn_bottom(mv.count(), mv.direction())?;
        self.robot.reorient(&restore)?;
        self.executed += 1;
        Ok(())
    }
}
