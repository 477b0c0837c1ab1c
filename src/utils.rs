use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// 标准化路径 (用于显示)
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    if let Ok(p) = std::fs::canonicalize(path) {
        return Ok(p);
    }

    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .with_context(|| "无法获取当前工作目录")
    }
}

/// 检查文件是否存在且是文件
pub fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("文件不存在: {:?}", path);
    }
    if !path.is_file() {
        anyhow::bail!("路径不是一个文件: {:?}", path);
    }
    Ok(())
}

pub fn timestamp(now: &NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `oscam.server` -> `oscam.server.20240102-030405.bak`
pub fn backup_name(file_name: &str, now: &NaiveDateTime) -> String {
    format!("{}.{}.bak", file_name, timestamp(now))
}
