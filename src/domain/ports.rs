use std::io::Read;

use anyhow::Result;
use thiserror::Error;

use super::config::{AppConfig, FtpConfig};
use super::file_entry::RemoteEntry;

/// 读取本地配置的结果，由调用方决定如何回退
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(AppConfig),
    NotFound,
    ParseError(String),
}

pub trait ConfigRepository {
    fn load(&self) -> LoadOutcome;
    fn save(&self, config: &AppConfig) -> Result<()>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// 服务器返回了非预期的应答码
    #[error("服务器拒绝 ({code}): {message}")]
    Rejected { code: u32, message: String },
    #[error("连接错误: {0}")]
    Transport(String),
}

impl RemoteError {
    /// 5xx 永久性错误 (权限不足、文件不存在等)
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if (500..600).contains(code))
    }
}

/// 已登录的远程会话，所有路径相对于当前目录
pub trait RemoteSession {
    fn welcome(&self) -> Option<String>;
    fn change_dir(&mut self, dir: &str) -> Result<(), RemoteError>;
    fn rename(&mut self, from: &str, to: &str) -> Result<(), RemoteError>;
    fn put(&mut self, name: &str, reader: &mut dyn Read) -> Result<u64, RemoteError>;
    fn get(&mut self, name: &str) -> Result<Vec<u8>, RemoteError>;
    fn list(&mut self) -> Result<Vec<RemoteEntry>, RemoteError>;
    fn quit(&mut self) -> Result<(), RemoteError>;
}

/// 建立连接并完成登录
pub trait Connector {
    type Session: RemoteSession;

    fn connect(&self, config: &FtpConfig) -> Result<Self::Session, RemoteError>;
}

/// OSCam WebIf，返回 HTTP 状态码
pub trait WebInterface {
    fn restart(&self, host: &str, port: u16) -> Result<u16>;
}
