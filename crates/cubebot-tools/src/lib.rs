//! # Cube Bot Tools - 标定文件与消息中继
//!
//! **依赖原则**: 只依赖 `cubebot-protocol`，不引入执行器
//!
//! ## 包含模块
//!
//! - `calibration` - 六面参考色的二进制文件存取
//! - `messaging` - 扫描端与求解端之间的逐行 JSON 消息

pub mod calibration;
pub mod messaging;

pub use calibration::{CalibrationError, CalibrationStore};
pub use messaging::{ChannelLink, LinkError, Message, MessageLink, StreamLink, relay, request_solution};
