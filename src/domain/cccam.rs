//! CCcam.cfg 中 C 行 / N 行的解析

use thiserror::Error;

/// 每条记录至少需要: 标签 主机 端口 用户名 密码
const MIN_FIELDS: usize = 5;
/// N 行密钥所在的字段区间 [5, 20)
const KEY_START: usize = 5;
const KEY_END: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("第 {line} 行格式错误: 至少需要 5 个字段，实际只有 {found} 个: {text}")]
pub struct FormatError {
    /// 记录起始行号 (从 1 开始)
    pub line: usize,
    pub found: usize,
    pub text: String,
}

/// 记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `C:` CCcam 客户端行
    Client,
    /// `N:` newcamd 行
    Newcamd,
}

impl RecordKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "C:" => Some(Self::Client),
            "N:" => Some(Self::Newcamd),
            _ => None,
        }
    }
}

/// 一条解析后的源记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub kind: RecordKind,
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    /// N 行 DES 密钥 (已去掉空白和 `#`)，C 行为空
    pub key: String,
    /// N 行 `#` 之后的 caid:ident，没有时为空
    pub ident: String,
    /// ident 中第一个 `:` 之前的部分
    pub caid: String,
}

/// 解析状态: 空闲，或正在累积一条 (可能跨行的) 记录
#[derive(Debug)]
enum ParserState {
    Idle,
    Accumulating { line: usize, text: String },
}

/// 只保留以 `C:` 或 `N:` 开头的行，保持原有顺序
pub fn filter_lines(text: &str) -> String {
    text.lines()
        .filter(|line| line.starts_with("C:") || line.starts_with("N:"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `X: ` 形式的行首标签
fn is_tagged(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && bytes[2].is_ascii_whitespace()
}

/// 逐行解析，返回所有 C/N 记录
///
/// 注释行结束当前记录；非标签行直接拼接到当前记录末尾 (不插入分隔符)；
/// 空闲状态下的非标签行被忽略。其他标签 (F:、L: 等) 的记录被静默跳过。
pub fn parse_records(text: &str) -> Result<Vec<SourceRecord>, FormatError> {
    let mut records = Vec::new();
    let mut state = ParserState::Idle;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('#') {
            let closed = std::mem::replace(&mut state, ParserState::Idle);
            close_record(closed, &mut records)?;
        } else if is_tagged(line) {
            let opened = ParserState::Accumulating {
                line: idx + 1,
                text: line.to_string(),
            };
            let closed = std::mem::replace(&mut state, opened);
            close_record(closed, &mut records)?;
        } else if let ParserState::Accumulating { text, .. } = &mut state {
            text.push_str(line);
        } else {
            log::debug!("跳过第 {} 行: 不属于任何记录", idx + 1);
        }
    }

    close_record(state, &mut records)?;
    Ok(records)
}

fn close_record(
    state: ParserState,
    records: &mut Vec<SourceRecord>,
) -> Result<(), FormatError> {
    if let ParserState::Accumulating { line, text } = state {
        if let Some(record) = parse_record(line, &text)? {
            records.push(record);
        }
    }
    Ok(())
}

/// 解析一条完整记录；非 C/N 标签返回 `None`
pub fn parse_record(line: usize, text: &str) -> Result<Option<SourceRecord>, FormatError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let kind = match parts.first().and_then(|tag| RecordKind::from_tag(tag)) {
        Some(kind) => kind,
        None => {
            log::debug!("跳过第 {} 行: 不支持的记录类型", line);
            return Ok(None);
        }
    };

    if parts.len() < MIN_FIELDS {
        return Err(FormatError {
            line,
            found: parts.len(),
            text: text.trim().to_string(),
        });
    }

    let (key, ident) = match kind {
        RecordKind::Newcamd => split_key(&parts[KEY_START..]),
        RecordKind::Client => (String::new(), String::new()),
    };
    let caid = ident.split(':').next().unwrap_or_default().to_string();

    Ok(Some(SourceRecord {
        kind,
        host: parts[1].to_string(),
        port: parts[2].to_string(),
        user: parts[3].to_string(),
        password: parts[4].to_string(),
        key,
        ident,
        caid,
    }))
}

/// 从 N 行第 5 个字段开始拆出 (密钥, ident)
///
/// 密钥取字段 5..20，遇到 `#` 截止；ident 是同一字段中 `#` 之后的部分，
/// 为空时取下一个字段 (标准 14 字节密钥时即第 20 个字段)。
fn split_key(fields: &[&str]) -> (String, String) {
    let window = &fields[..fields.len().min(KEY_END - KEY_START)];
    let mut key = String::new();

    for (i, field) in window.iter().enumerate() {
        if let Some(pos) = field.find('#') {
            key.push_str(&field[..pos]);
            let tail = field[pos..].trim_start_matches('#');
            let ident = if tail.is_empty() {
                fields.get(i + 1).copied().unwrap_or_default()
            } else {
                tail
            };
            return (key, ident.replace('#', ""));
        }
        key.push_str(field);
    }

    (key, String::new())
}
