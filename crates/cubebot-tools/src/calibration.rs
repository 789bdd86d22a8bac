//! # 标定文件
//!
//! 格式（无文件头、无版本号，按位置解析）：
//!
//! ```text
//! [U: N x u32 LE][R: N x u32 LE][F: N x u32 LE][D: N x u32 LE][L: N x u32 LE][B: N x u32 LE]
//! ```
//!
//! N 为颜色通道数（RGB 传感器为 3，带强度通道为 4）。

use cubebot_protocol::{ChannelCount, ColorSample, Face, ProtocolError, ReferenceColorSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 标定文件错误
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// 文件不存在或长度不足，调用方应按"未标定"处理
    #[error("No calibration data at {path}: {reason}")]
    Missing { path: PathBuf, reason: String },

    #[error("Calibration file I/O error: {0}")]
    Io(#[from] io::Error),

    /// 参考色通道数与存储不一致
    #[error("Channel mismatch: store holds {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
}

impl CalibrationError {
    pub fn is_missing(&self) -> bool {
        matches!(self, CalibrationError::Missing { .. })
    }
}

/// 标定文件存取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationStore {
    path: PathBuf,
    channels: ChannelCount,
}

impl CalibrationStore {
    pub fn new(path: impl Into<PathBuf>, channels: ChannelCount) -> Self {
        Self {
            path: path.into(),
            channels,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn channels(&self) -> ChannelCount {
        self.channels
    }

    /// 文件应有的字节数
    pub fn record_len(&self) -> usize {
        Face::ALL.len() * self.channels.len() * 4
    }

    /// 读取参考色
    ///
    /// 只读取前 `6 * N` 个整数，多余的字节忽略。
    pub fn load(&self) -> Result<ReferenceColorSet, CalibrationError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CalibrationError::Missing {
                    path: self.path.clone(),
                    reason: "file not found".to_string(),
                });
            },
            Err(e) => return Err(e.into()),
        };

        let expected = self.record_len();
        if bytes.len() < expected {
            return Err(CalibrationError::Missing {
                path: self.path.clone(),
                reason: format!("expected {} bytes, found {}", expected, bytes.len()),
            });
        }

        let values: Vec<u32> = bytes[..expected]
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        let n = self.channels.len();
        let mut samples = Vec::with_capacity(Face::ALL.len());
        for record in values.chunks_exact(n) {
            samples.push(ColorSample::from_slice(record).map_err(|_| {
                CalibrationError::ChannelMismatch {
                    expected: n,
                    actual: record.len(),
                }
            })?);
        }
        let references: [ColorSample; 6] =
            samples
                .try_into()
                .map_err(|v: Vec<ColorSample>| CalibrationError::Missing {
                    path: self.path.clone(),
                    reason: format!("expected 6 records, found {}", v.len()),
                })?;
        let set = ReferenceColorSet::new(references).map_err(|e| match e {
            ProtocolError::ChannelMismatch { expected, actual } => {
                CalibrationError::ChannelMismatch { expected, actual }
            },
            other => CalibrationError::Missing {
                path: self.path.clone(),
                reason: other.to_string(),
            },
        })?;

        info!("Read calibration data from {}", self.path.display());
        for (face, sample) in set.iter() {
            debug!("{} center {}", face, sample);
        }
        Ok(set)
    }

    /// 保存参考色
    ///
    /// 需要时创建所在目录（目录已存在不算错误）；先写临时文件再改名。
    pub fn save(&self, references: &ReferenceColorSet) -> Result<(), CalibrationError> {
        if references.channels() != self.channels {
            return Err(CalibrationError::ChannelMismatch {
                expected: self.channels.len(),
                actual: references.channels().len(),
            });
        }

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let mut bytes = Vec::with_capacity(self.record_len());
        for (_, sample) in references.iter() {
            for value in sample.components() {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }

        let tmp = self.path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            // 失败时不留下半成品
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Saved calibration data to {}", self.path.display());
        Ok(())
    }
}
