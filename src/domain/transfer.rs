use std::fmt;

/// 远程操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TestConnection,
    Upload,
    Download,
    ViewRemote,
    BackupDirectory,
    Restart,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TestConnection => "测试连接",
            Self::Upload => "上传",
            Self::Download => "下载",
            Self::ViewRemote => "查看远程文件",
            Self::BackupDirectory => "备份目录",
            Self::Restart => "重启 OSCam",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// 单条操作日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub level: Level,
    pub message: String,
}

/// 操作日志，每一步写入一行，同时转发到 `log`
#[derive(Debug, Default)]
pub struct Console {
    lines: Vec<ConsoleLine>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.lines.push(ConsoleLine {
            level: Level::Info,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.lines.push(ConsoleLine {
            level: Level::Error,
            message,
        });
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    /// 取出并清空已有日志
    pub fn drain(&mut self) -> Vec<ConsoleLine> {
        std::mem::take(&mut self.lines)
    }

    #[allow(dead_code)]
    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(|l| l.level == Level::Error)
    }

    #[allow(dead_code)]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.message.contains(needle))
    }
}

/// 目录备份结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupSummary {
    pub saved: usize,
    pub failed: Vec<String>,
    pub skipped_dirs: usize,
}
