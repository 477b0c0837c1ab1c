use std::time::Duration;

use anyhow::{Context, Result};

use crate::domain::ports::WebInterface;

const RESTART_TIMEOUT: Duration = Duration::from_secs(5);

pub fn restart_url(host: &str, port: u16) -> String {
    format!("http://{}:{}/shutdown.html?action=Restart", host.trim(), port)
}

/// 无认证的 OSCam WebIf 重启请求
pub struct HttpWebInterface {
    timeout: Duration,
}

impl HttpWebInterface {
    pub fn new() -> Self {
        Self {
            timeout: RESTART_TIMEOUT,
        }
    }
}

impl Default for HttpWebInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl WebInterface for HttpWebInterface {
    fn restart(&self, host: &str, port: u16) -> Result<u16> {
        let url = restart_url(host, port);
        log::debug!("GET {}", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .with_context(|| "无法创建 HTTP 客户端")?;
        let response = client
            .get(&url)
            .send()
            .with_context(|| format!("请求失败: {}", url))?;

        Ok(response.status().as_u16())
    }
}
