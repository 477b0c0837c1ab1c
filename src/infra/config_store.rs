use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::config::AppConfig;
use crate::domain::ports::{ConfigRepository, LoadOutcome};

pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    /// 默认位置
    /// Windows: %APPDATA%/cccam2oscam/settings.toml
    /// Linux: ~/.config/cccam2oscam/settings.toml
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法获取系统配置目录"))?;
        path.push("cccam2oscam");
        path.push("settings.toml");
        Ok(path)
    }
}

impl ConfigRepository for TomlConfigStore {
    fn load(&self) -> LoadOutcome {
        if !self.path.exists() {
            return LoadOutcome::NotFound;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                return LoadOutcome::ParseError(format!(
                    "无法读取配置文件 {:?}: {}",
                    self.path, e
                ))
            }
        };

        match toml::from_str::<AppConfig>(&content) {
            Ok(config) => LoadOutcome::Loaded(config),
            Err(e) => LoadOutcome::ParseError(format!(
                "配置文件格式错误，请检查 {:?}: {}",
                self.path, e
            )),
        }
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(config)
            .with_context(|| "序列化配置失败")?;

        fs::write(&self.path, content)
            .with_context(|| format!("无法写入配置文件: {:?}", self.path))?;

        log::debug!("配置已保存到 {:?}", self.path);
        Ok(())
    }
}
