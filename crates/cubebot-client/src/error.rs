//! 客户端错误类型

use cubebot_driver::DriverError;
use cubebot_protocol::ProtocolError;
use cubebot_tools::{CalibrationError, LinkError};
use thiserror::Error;

/// 客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 求解器输出了语法之外的记号；整段序列作废，不执行任何动作
    #[error("Malformed move sequence: {0}")]
    MalformedMove(#[source] ProtocolError),

    /// 扫描未能写满 54 个色块，绝不把部分状态交给求解器
    #[error("Incomplete scan ({written}/54 facelets): {reason}")]
    IncompleteScan { written: usize, reason: String },

    /// 执行器或传感器故障，当前序列在最近一个完整动作后中止
    #[error("Actuator fault: {0}")]
    ActuatorFault(#[source] DriverError),

    /// 外部中断；需要从 Home 重新开始
    #[error("Sequence cancelled")]
    Cancelled,

    /// 求解器失败
    #[error("Solver failed: {0}")]
    Solver(String),

    #[error("Solver link error: {0}")]
    Link(#[from] LinkError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// 颜色通道等数据不一致
    #[error("Invalid data: {0}")]
    Protocol(#[source] ProtocolError),
}

impl From<DriverError> for ClientError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Cancelled => ClientError::Cancelled,
            other => ClientError::ActuatorFault(other),
        }
    }
}

impl ClientError {
    /// 是否必须中止整个运行（而不仅是放弃当前序列）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::IncompleteScan { .. } | ClientError::ActuatorFault(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_conversion() {
        assert!(matches!(ClientError::from(DriverError::Cancelled), ClientError::Cancelled));

        let err = ClientError::from(DriverError::actuator("flipper", "stalled"));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Actuator fault: Actuator fault on flipper: stalled");
    }

    #[test]
    fn test_fatality() {
        let malformed = ClientError::MalformedMove(ProtocolError::InvalidFaceSymbol('X'));
        assert!(!malformed.is_fatal());
        assert!(!ClientError::Cancelled.is_fatal());
        assert!(
            ClientError::IncompleteScan {
                written: 53,
                reason: "sensor".into()
            }
            .is_fatal()
        );
    }
}
