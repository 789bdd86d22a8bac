//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// 执行器故障（电机未响应、堵转等）
    #[error("Actuator fault on {actuator}: {reason}")]
    ActuatorFault {
        actuator: &'static str,
        reason: String,
    },

    /// 颜色传感器故障
    #[error("Sensor fault: {0}")]
    SensorFault(String),

    /// 机械干涉（例如未经 Hold 直接翻转）
    #[error("Mechanical interference: {0}")]
    MechanicalInterference(String),

    /// 序列被外部中断
    #[error("Motion sequence cancelled")]
    Cancelled,

    /// 运动学配置非法
    #[error("Invalid kinematics config: {0}")]
    InvalidConfig(String),
}

impl DriverError {
    /// 构造执行器故障
    pub fn actuator(actuator: &'static str, reason: impl Into<String>) -> Self {
        DriverError::ActuatorFault {
            actuator,
            reason: reason.into(),
        }
    }

    /// 是否由外部中断引起
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DriverError::Cancelled)
    }
}
