use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Enigma2 镜像上常见的 OSCam 配置目录
pub const KNOWN_DIRECTORIES: &[&str] = &[
    "/etc/tuxbox/config/",
    "/etc/tuxbox/config/oscam/",
    "/etc/tuxbox/config/oscam-emu/",
    "/hdd/oscam/",
    "/home/oscam/",
    "/usr/local/etc/",
    "/usr/local/oscam/config/",
    "/usr/share/oscam/config/",
    "/var/tuxbox/config/",
    "/var/etc/",
    "/var/oscam/config/",
];

pub const DEFAULT_USERNAME: &str = "root";
pub const DEFAULT_DIRECTORY: &str = "/etc/tuxbox/config/";
pub const DEFAULT_FTP_PORT: u16 = 21;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("FTP 配置不完整，请填写所有连接信息 (缺少: {})", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("分组必须在 1 到 64 之间: {0}")]
    GroupOutOfRange(i64),
    #[error("超时必须在 -1 到 9999 之间: {0}")]
    TimeoutOutOfRange(i64),
    #[error("无效的数字: {0:?}")]
    NotANumber(String),
}

/// FTP 连接配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FtpConfig {
    /// 主机地址 (IP 或域名)
    pub host: String,
    /// FTP 端口 (默认 21)
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    /// 明文保存，没有默认值
    #[serde(default)]
    pub password: String,
    /// 远程 OSCam 配置目录
    pub directory: String,
}

fn default_port() -> u16 {
    DEFAULT_FTP_PORT
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_FTP_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            directory: DEFAULT_DIRECTORY.to_string(),
        }
    }
}

impl FtpConfig {
    /// 任何网络操作之前都要求主机、用户名、密码非空
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }
}

/// 应用全局配置
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub ftp: FtpConfig,
}

/// reader 分组 (1-64)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group(u8);

impl Group {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 64;

    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::GroupOutOfRange(value))
        }
    }

    #[allow(dead_code)]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Group {
    fn default() -> Self {
        Self(1)
    }
}

impl FromStr for Group {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 空闲超时秒数 (-1 表示不超时)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityTimeout(i16);

impl InactivityTimeout {
    pub const MIN: i64 = -1;
    pub const MAX: i64 = 9999;

    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as i16))
        } else {
            Err(ConfigError::TimeoutOutOfRange(value))
        }
    }

    #[allow(dead_code)]
    pub fn get(self) -> i16 {
        self.0
    }
}

impl FromStr for InactivityTimeout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for InactivityTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 转换参数，C 行与 N 行各自一套
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub c_timeout: InactivityTimeout,
    pub n_timeout: InactivityTimeout,
    pub c_group: Group,
    pub n_group: Group,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            c_timeout: InactivityTimeout(600),
            n_timeout: InactivityTimeout(-1),
            c_group: Group::default(),
            n_group: Group::default(),
        }
    }
}
