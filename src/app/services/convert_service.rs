use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::domain::cccam;
use crate::domain::config::ConvertOptions;
use crate::domain::oscam::{self, Conversion};

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("无法读取文件: {:?}", path))
}

/// 只显示 C 行和 N 行
pub fn filter_file(input: &Path) -> Result<String> {
    Ok(cccam::filter_lines(&read_source(input)?))
}

/// 转换并写入 output；格式错误时不写任何内容
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<Conversion> {
    let text = read_source(input)?;
    let conversion = oscam::convert(&text, options, &Local::now().naive_local())?;

    fs::write(output, &conversion.content)
        .with_context(|| format!("无法写入文件: {:?}", output))?;
    log::info!("写入 {} 个 reader 到 {:?}", conversion.readers, output);
    Ok(conversion)
}

/// 读取本地 oscam.server；不存在时返回 `None`
pub fn view_local(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    read_source(path).map(Some)
}
