//! # 进程间消息
//!
//! 扫描与求解分布在两个进程时（例如主控上跑扫描，上位机跑求解器），
//! 双方交换逐行 JSON 对象 `{"m": <name or code>, "p": <payload>}`：
//!
//! | 方向 | 消息 | 负载 |
//! |------|------|------|
//! | 扫描端 → 求解端 | `cube_scanned` | 54 字符状态串 |
//! | 求解端 → 扫描端 | `solve_cube` | 空格分隔的走法串 |
//! | 任一方 | `runtime_error` | 错误文本 |
//! | 主控 → 上位机 | `runtime_error` / `user_program_error` | 数组，下标 3 为 base64 编码的错误文本 |
//! | 主控 → 上位机 | `12` | `[slot, running]` 程序启停 |
//!
//! 扫描端发出 `cube_scanned` 后阻塞，直到收到 `solve_cube`。

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use crossbeam_channel::{Receiver, Sender};
use serde_json::{Value, json};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 程序启停控制消息的编号
pub const PROGRAM_STATUS: u64 = 12;

/// 消息链路错误
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Link I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed message {line:?}: {reason}")]
    Decode { line: String, reason: String },

    /// 对端关闭或程序已结束
    #[error("Link closed")]
    Closed,

    /// 对端报告的错误
    #[error("Remote error: {0}")]
    Remote(String),
}

/// 一条消息
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    CubeScanned(String),
    SolveCube(String),
    RuntimeError(String),
    ProgramStatus { slot: u64, running: bool },
    /// 无法识别的消息，原样保留
    Other(Value),
}

impl Message {
    pub fn to_json(&self) -> Value {
        match self {
            Message::CubeScanned(cube) => json!({ "m": "cube_scanned", "p": cube }),
            Message::SolveCube(solution) => json!({ "m": "solve_cube", "p": solution }),
            Message::RuntimeError(text) => json!({ "m": "runtime_error", "p": text }),
            Message::ProgramStatus { slot, running } => {
                json!({ "m": PROGRAM_STATUS, "p": [slot, running] })
            },
            Message::Other(value) => value.clone(),
        }
    }

    pub fn from_json(value: Value) -> Message {
        let text = |v: &Value| v.as_str().map(str::to_string);
        let m = value.get("m");
        let p = value.get("p");

        let parsed = match (m, p) {
            (Some(Value::String(name)), Some(p)) => match name.as_str() {
                "cube_scanned" => text(p).map(Message::CubeScanned),
                "solve_cube" => text(p).map(Message::SolveCube),
                "runtime_error" | "user_program_error" => Some(Message::RuntimeError(error_text(p))),
                _ => None,
            },
            (Some(Value::Number(code)), Some(Value::Array(p)))
                if code.as_u64() == Some(PROGRAM_STATUS) =>
            {
                match (p.first().and_then(Value::as_u64), p.get(1).and_then(Value::as_bool)) {
                    (Some(slot), Some(running)) => Some(Message::ProgramStatus { slot, running }),
                    _ => None,
                }
            },
            _ => None,
        };
        parsed.unwrap_or(Message::Other(value))
    }

    /// 编码为一行文本（不含换行符）
    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }

    pub fn decode(line: &str) -> Result<Message, LinkError> {
        let value: Value = serde_json::from_str(line.trim()).map_err(|e| LinkError::Decode {
            line: line.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Message::from_json(value))
    }
}

/// 错误负载：字符串原样使用；主控上报的数组取下标 3 并做 base64 解码
fn error_text(payload: &Value) -> String {
    if let Some(text) = payload.as_str() {
        return text.to_string();
    }
    payload
        .get(3)
        .and_then(Value::as_str)
        .and_then(|encoded| BASE64.decode(encoded).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_else(|| payload.to_string())
}

/// 双向消息链路
pub trait MessageLink {
    fn send(&mut self, message: &Message) -> Result<(), LinkError>;

    /// 阻塞接收下一条消息
    fn recv(&mut self) -> Result<Message, LinkError>;
}

/// 进程内链路（crossbeam 通道）
#[derive(Debug, Clone)]
pub struct ChannelLink {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl ChannelLink {
    /// 创建一对互相连接的端点
    pub fn pair() -> (ChannelLink, ChannelLink) {
        let (a_tx, b_rx) = crossbeam_channel::unbounded();
        let (b_tx, a_rx) = crossbeam_channel::unbounded();
        (
            ChannelLink { tx: a_tx, rx: a_rx },
            ChannelLink { tx: b_tx, rx: b_rx },
        )
    }
}

impl MessageLink for ChannelLink {
    fn send(&mut self, message: &Message) -> Result<(), LinkError> {
        self.tx.send(message.clone()).map_err(|_| LinkError::Closed)
    }

    fn recv(&mut self) -> Result<Message, LinkError> {
        self.rx.recv().map_err(|_| LinkError::Closed)
    }
}

/// 基于字节流的链路（串口、管道、标准输入输出）
///
/// 非 JSON 行（对端的 `print` 输出）记录日志后跳过。
pub struct StreamLink<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> StreamLink<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> MessageLink for StreamLink<R, W> {
    fn send(&mut self, message: &Message) -> Result<(), LinkError> {
        let line = message.encode();
        debug!("-> {}", line);
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Message, LinkError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(LinkError::Closed);
            }
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('{') {
                info!("remote: {}", line);
                continue;
            }
            debug!("<- {}", line);
            return Message::decode(line);
        }
    }
}

/// 扫描端：发送状态串并阻塞等待走法串
pub fn request_solution<L: MessageLink + ?Sized>(link: &mut L, cube: &str) -> Result<String, LinkError> {
    link.send(&Message::CubeScanned(cube.to_string()))?;
    loop {
        match link.recv()? {
            Message::SolveCube(solution) => return Ok(solution),
            Message::RuntimeError(text) => return Err(LinkError::Remote(text)),
            Message::ProgramStatus { running: false, .. } => return Err(LinkError::Closed),
            other => debug!("ignoring message while waiting for solution: {:?}", other),
        }
    }
}

/// 求解端：应答 `cube_scanned`，直到对端程序结束
///
/// 求解失败时回复 `runtime_error`，无法解析的行记录后跳过，都不中断中继。
/// 返回处理过的请求数。
pub fn relay<L, F>(link: &mut L, mut solve: F) -> Result<usize, LinkError>
where
    L: MessageLink + ?Sized,
    F: FnMut(&str) -> Result<String, String>,
{
    let mut handled = 0;
    loop {
        let message = match link.recv() {
            Ok(message) => message,
            Err(LinkError::Closed) => return Ok(handled),
            Err(e @ LinkError::Decode { .. }) => {
                warn!("Skipping message: {}", e);
                continue;
            },
            Err(e) => return Err(e),
        };
        match message {
            Message::CubeScanned(cube) => {
                info!("Received scanned cube {}", cube);
                let reply = match solve(&cube) {
                    Ok(solution) => {
                        info!("Sending cube solution {}", solution);
                        Message::SolveCube(solution)
                    },
                    Err(reason) => {
                        warn!("Solver failed for {}: {}", cube, reason);
                        Message::RuntimeError(reason)
                    },
                };
                link.send(&reply)?;
                handled += 1;
            },
            Message::RuntimeError(text) => warn!("Remote error: {}", text),
            Message::ProgramStatus { slot, running: true } => info!("Program started (slot {})", slot),
            Message::ProgramStatus { slot, running: false } => {
                info!("Program ended (slot {})", slot);
                return Ok(handled);
            },
            other => debug!("Unhandled message: {:?}", other),
        }
    }
}
