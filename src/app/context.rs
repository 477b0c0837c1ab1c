use std::path::PathBuf;

use anyhow::Result;

use crate::domain::config::AppConfig;
use crate::domain::ports::{ConfigRepository, LoadOutcome};
use crate::domain::transfer::Console;
use crate::infra::config_store::TomlConfigStore;

pub struct AppContext {
    pub config: AppConfig,
    pub config_repo: Box<dyn ConfigRepository>,
}

impl AppContext {
    pub fn bootstrap(config_path: Option<PathBuf>, console: &mut Console) -> Result<Self> {
        let repo: Box<dyn ConfigRepository> = match config_path {
            Some(path) => Box::new(TomlConfigStore::at(path)),
            None => Box::new(TomlConfigStore::new()?),
        };
        Ok(Self::with_repo(repo, console))
    }

    /// 配置不存在时使用默认值；格式错误时提示并使用默认值
    pub fn with_repo(repo: Box<dyn ConfigRepository>, console: &mut Console) -> Self {
        let config = match repo.load() {
            LoadOutcome::Loaded(config) => config,
            LoadOutcome::NotFound => {
                log::debug!("未找到配置文件，使用默认配置");
                AppConfig::default()
            }
            LoadOutcome::ParseError(msg) => {
                console.error(format!("{}，使用默认配置", msg));
                AppConfig::default()
            }
        };
        Self {
            config,
            config_repo: repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_config_falls_back_silently() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::new();
        let ctx = AppContext::bootstrap(Some(dir.path().join("settings.toml")), &mut console).unwrap();
        assert_eq!(ctx.config, AppConfig::default());
        assert!(console.lines().is_empty());
    }

    #[test]
    fn test_broken_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "ftp = 3").unwrap();
        let mut console = Console::new();
        let ctx = AppContext::bootstrap(Some(path), &mut console).unwrap();
        assert_eq!(ctx.config, AppConfig::default());
        assert!(console.has_errors());
    }
}
