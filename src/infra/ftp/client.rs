use std::io::Read;

use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};

use crate::domain::config::FtpConfig;
use crate::domain::file_entry::RemoteEntry;
use crate::domain::ports::{Connector, RemoteError, RemoteSession};

use super::listing;

impl From<FtpError> for RemoteError {
    fn from(e: FtpError) -> Self {
        match e {
            FtpError::UnexpectedResponse(resp) => RemoteError::Rejected {
                code: resp.status.code(),
                message: String::from_utf8_lossy(&resp.body).trim().to_string(),
            },
            other => RemoteError::Transport(other.to_string()),
        }
    }
}

/// 明文 FTP 连接器，每次操作新建一个会话
#[derive(Debug, Default, Clone, Copy)]
pub struct FtpConnector;

impl Connector for FtpConnector {
    type Session = FtpSession;

    fn connect(&self, config: &FtpConfig) -> Result<FtpSession, RemoteError> {
        log::debug!("连接 FTP {} (User: {})", config.address(), config.username);
        let mut stream = FtpStream::connect(config.address())?;
        stream.login(config.username.as_str(), config.password.as_str())?;
        stream.transfer_type(FileType::Binary)?;
        Ok(FtpSession { stream })
    }
}

pub struct FtpSession {
    stream: FtpStream,
}

impl RemoteSession for FtpSession {
    fn welcome(&self) -> Option<String> {
        self.stream.get_welcome_msg().map(|m| m.trim().to_string())
    }

    fn change_dir(&mut self, dir: &str) -> Result<(), RemoteError> {
        self.stream.cwd(dir)?;
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), RemoteError> {
        self.stream.rename(from, to)?;
        Ok(())
    }

    fn put(&mut self, name: &str, mut reader: &mut dyn Read) -> Result<u64, RemoteError> {
        Ok(self.stream.put_file(name, &mut reader)?)
    }

    fn get(&mut self, name: &str) -> Result<Vec<u8>, RemoteError> {
        Ok(self.stream.retr_as_buffer(name)?.into_inner())
    }

    fn list(&mut self) -> Result<Vec<RemoteEntry>, RemoteError> {
        let lines = self.stream.list(None)?;
        Ok(listing::parse_entries(&lines))
    }

    fn quit(&mut self) -> Result<(), RemoteError> {
        self.stream.quit()?;
        Ok(())
    }
}
