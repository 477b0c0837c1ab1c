use anyhow::Result;

use crate::app::context::AppContext;
use crate::domain::config::FtpConfig;

/// 命令行上临时指定的连接参数，覆盖已保存的配置
#[derive(Debug, Default, Clone)]
pub struct FtpOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub directory: Option<String>,
}

impl FtpOverrides {
    pub fn apply(&self, base: &FtpConfig) -> FtpConfig {
        FtpConfig {
            host: self.host.clone().unwrap_or_else(|| base.host.clone()),
            port: self.port.unwrap_or(base.port),
            username: self.username.clone().unwrap_or_else(|| base.username.clone()),
            password: self.password.clone().unwrap_or_else(|| base.password.clone()),
            directory: self
                .directory
                .clone()
                .unwrap_or_else(|| base.directory.clone()),
        }
    }
}

/// 合并覆盖值后写回配置文件
pub fn save_ftp(ctx: &mut AppContext, overrides: &FtpOverrides) -> Result<FtpConfig> {
    let merged = overrides.apply(&ctx.config.ftp);
    let mut next = ctx.config.clone();
    next.ftp = merged.clone();
    ctx.config_repo.save(&next)?;
    ctx.config = next;
    Ok(merged)
}

/// 用于显示的配置摘要，密码只显示是否已设置
pub fn describe(ftp: &FtpConfig) -> Vec<String> {
    vec![
        format!("host      = {}", ftp.host),
        format!("port      = {}", ftp.port),
        format!("username  = {}", ftp.username),
        format!(
            "password  = {}",
            if ftp.password.is_empty() { "(未设置)" } else { "********" }
        ),
        format!("directory = {}", ftp.directory),
    ]
}
