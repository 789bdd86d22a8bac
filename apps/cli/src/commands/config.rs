//! 配置管理命令

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use std::path::Path;

use crate::config::CliConfig;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印当前生效的配置
    Show,

    /// 写入默认配置文件
    Init {
        /// 覆盖已有文件
        #[arg(short, long)]
        force: bool,
    },

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = CliConfig::load(path)?;
                let kinematics = config.kinematics(None)?;
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&config).context("序列化配置失败")?);
                println!("# 标定文件: {}", config.calibration_path()?.display());
                println!(
                    "# 传感器通道: {}, 距离度量: {:?}",
                    kinematics.channels.len(),
                    kinematics.metric
                );
                Ok(())
            },

            ConfigCommand::Init { force } => {
                if path.exists() && !force {
                    bail!("配置文件已存在: {} (使用 --force 覆盖)", path.display());
                }
                CliConfig::default().save(path)?;
                println!("✅ 已写入默认配置: {}", path.display());
                Ok(())
            },

            ConfigCommand::Path => {
                println!("{}", path.display());
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        ConfigCommand::Init { force: false }.execute(&path).unwrap();
        assert!(path.exists());
        assert!(ConfigCommand::Init { force: false }.execute(&path).is_err());
        ConfigCommand::Init { force: true }.execute(&path).unwrap();
        ConfigCommand::Show.execute(&path).unwrap();
    }
}
