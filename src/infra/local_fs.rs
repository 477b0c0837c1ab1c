use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::utils;

/// 本地已有同名文件时改名为带时间戳的备份，返回备份路径
pub fn backup_existing(path: &Path, now: &NaiveDateTime) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("无效的文件名: {:?}", path))?
        .to_string_lossy();
    let backup = path.with_file_name(utils::backup_name(&file_name, now));

    fs::rename(path, &backup)
        .with_context(|| format!("无法备份本地文件 {:?} -> {:?}", path, backup))?;
    Ok(Some(backup))
}

/// 在 base 下创建新的 `backup_<时间戳>` 目录
pub fn create_backup_dir(base: &Path, now: &NaiveDateTime) -> Result<PathBuf> {
    let dir = base.join(format!("backup_{}", utils::timestamp(now)));
    fs::create_dir_all(&dir)
        .with_context(|| format!("无法创建备份目录: {:?}", dir))?;
    Ok(dir)
}

/// 备份目录中的目标路径；远程文件名只取最后一段，避免写出备份目录
pub fn entry_path(dir: &Path, remote_name: &str) -> Option<PathBuf> {
    let name = Path::new(remote_name).file_name()?;
    Some(dir.join(name))
}
