use std::str::FromStr;

use suppaftp::list::File;

use crate::domain::file_entry::RemoteEntry;

/// 解析 LIST 输出，忽略 `.`、`..` 和无法识别的行
pub fn parse_entries(lines: &[String]) -> Vec<RemoteEntry> {
    lines
        .iter()
        .filter_map(|line| parse_entry(line))
        .filter(|e| e.name != "." && e.name != "..")
        .collect()
}

pub fn parse_entry(line: &str) -> Option<RemoteEntry> {
    match File::from_str(line) {
        Ok(file) => Some(RemoteEntry {
            name: file.name().to_string(),
            is_dir: file.is_directory(),
        }),
        Err(_) => parse_unix_fallback(line),
    }
}

/// busybox ftpd 的个别输出格式 suppaftp 不认，按 `ls -l` 的列退回解析
fn parse_unix_fallback(line: &str) -> Option<RemoteEntry> {
    let mut rest = line.trim_start();
    let perms = rest.split_whitespace().next()?;
    if perms.len() < 10 || !matches!(perms.as_bytes()[0], b'-' | b'd' | b'l') {
        log::debug!("无法解析 LIST 行: {}", line);
        return None;
    }

    // 跳过 权限 链接数 属主 属组 大小 月 日 时间
    for _ in 0..8 {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        rest = &rest[end..];
    }

    let name = rest.trim();
    if name.is_empty() {
        return None;
    }
    let name = name.split(" -> ").next().unwrap_or(name);

    Some(RemoteEntry {
        name: name.to_string(),
        is_dir: perms.starts_with('d'),
    })
}
