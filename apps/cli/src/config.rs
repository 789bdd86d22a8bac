//! CLI 配置文件
//!
//! TOML 格式，默认位于 `<config_dir>/cubebot/config.toml`：
//!
//! ```toml
//! preset = "build-hat"
//! calibration_file = "~/cubecolors"
//! solver_command = "kociemba"
//! warn_distance = 150.0   # 可选，超出时扫描结果标记为低置信度
//!
//! [kinematics]   # 可选，整体覆盖预设
//! ```

use anyhow::{Context, Result, anyhow, bail};
use cubebot_driver::KinematicsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow!("无法确定配置目录"))?;
    path.push("cubebot");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 硬件预设名（spike-hub / build-hat / simulated）
    pub preset: String,

    /// 标定文件路径，支持 `~/` 前缀
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_file: Option<String>,

    /// 外部求解器命令，魔方状态串作为最后一个参数传入
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_command: Option<String>,

    /// 颜色分类的警告距离，最近参考色距离超过该值时记录警告
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_distance: Option<f64>,

    /// 完整的运动学参数，存在时忽略 `preset`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kinematics: Option<KinematicsConfig>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            preset: "build-hat".to_string(),
            calibration_file: None,
            solver_command: None,
            warn_distance: None,
            kinematics: None,
        }
    }
}

impl CliConfig {
    /// 加载配置，文件不存在时返回默认值
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置（自动创建目录）
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).with_context(|| format!("写入配置文件失败: {}", path.display()))
    }

    /// 解析出运动学参数
    ///
    /// 优先级：`[kinematics]` 表 > 命令行 `--preset` > 文件中的 `preset`。
    pub fn kinematics(&self, preset_override: Option<&str>) -> Result<KinematicsConfig> {
        let config = match (&self.kinematics, preset_override) {
            (Some(k), None) => k.clone(),
            (_, Some(name)) => lookup_preset(name)?,
            (None, None) => lookup_preset(&self.preset)?,
        };
        config.validate().context("运动学参数无效")?;
        Ok(config)
    }

    /// 标定文件路径
    ///
    /// 未配置时使用 `<data_dir>/cubebot/cubecolors`。
    pub fn calibration_path(&self) -> Result<PathBuf> {
        match &self.calibration_file {
            Some(path) => expand_home(path),
            None => {
                let mut path = dirs::data_dir().ok_or_else(|| anyhow!("无法确定数据目录"))?;
                path.push("cubebot");
                path.push("cubecolors");
                Ok(path)
            },
        }
    }
}

fn lookup_preset(name: &str) -> Result<KinematicsConfig> {
    match KinematicsConfig::preset(name) {
        Some(config) => Ok(config),
        None => bail!("未知的硬件预设: {} (可选 spike-hub, build-hat, simulated)", name),
    }
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("无法确定用户主目录"))?;
            Ok(home.join(rest))
        },
        None => Ok(PathBuf::from(path)),
    }
}
