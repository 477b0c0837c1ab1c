//! oscam.server reader 块的生成与校验，以及 oscam.conf 的少量读取

use chrono::NaiveDateTime;

use super::cccam::{self, FormatError, RecordKind, SourceRecord};
use super::config::ConvertOptions;

pub const HEADER: &str = "# Created with CCcam2OsCam Converter";
/// 生成文件中第一个占位 reader，导入 OSCam 后手动删除
pub const PLACEHOLDER_LABEL: &str = "DELETE";

const DESCRIPTION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CCC_VERSION: &str = "2.3.2";
const HTTP_PORT_KEY: &str = "httpport";

/// 一个 `[reader]` 段，按顺序保存键值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderBlock {
    entries: Vec<(&'static str, String)>,
}

impl ReaderBlock {
    fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.entries.push((key, value.to_string()));
        self
    }

    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// `[reader]` 加每行 `key<TAB>= value`
    pub fn render(&self) -> String {
        let mut out = String::from("[reader]\n");
        for (key, value) in &self.entries {
            out.push_str(&format_entry(key, value));
            out.push('\n');
        }
        out
    }
}

/// 长键名后一个制表符，短键名后两个
fn format_entry(key: &str, value: &str) -> String {
    let pad = if key.len() >= 10 { "\t" } else { "\t\t" };
    format!("{key}{pad}= {value}")
}

pub fn placeholder_block() -> ReaderBlock {
    ReaderBlock::default()
        .with("label", PLACEHOLDER_LABEL)
        .with("protocol", "cccam")
        .with("device", "dummy.com")
}

pub fn reader_block(
    record: &SourceRecord,
    options: &ConvertOptions,
    now: &NaiveDateTime,
) -> ReaderBlock {
    let description = now.format(DESCRIPTION_FORMAT);
    let device = format!("{},{}", record.host, record.port);
    let label = format!("{}@{}:{}", record.user, record.host, record.port);

    match record.kind {
        RecordKind::Newcamd => ReaderBlock::default()
            .with("label", format!("{} {}", label, record.ident))
            .with("description", description)
            .with("protocol", "newcamd")
            .with("device", device)
            .with("key", &record.key)
            .with("user", &record.user)
            .with("password", &record.password)
            .with("inactivitytimeout", options.n_timeout)
            .with("disableserverfilter", 1)
            .with("connectoninit", 1)
            .with("caid", &record.caid)
            .with("ident", &record.ident)
            .with("group", options.n_group)
            .with("audisabled", 1),
        RecordKind::Client => ReaderBlock::default()
            .with("label", label)
            .with("description", description)
            .with("protocol", "cccam")
            .with("device", device)
            .with("user", &record.user)
            .with("password", &record.password)
            .with("inactivitytimeout", options.c_timeout)
            .with("group", options.c_group)
            .with("cccversion", CCC_VERSION)
            .with("audisabled", 1),
    }
}

/// 头部注释 + 占位 reader + 按输入顺序的所有 reader
pub fn assemble(records: &[SourceRecord], options: &ConvertOptions, now: &NaiveDateTime) -> String {
    let mut output = format!("{HEADER}\n\n\n");
    output.push_str(&placeholder_block().render());
    for record in records {
        output.push('\n');
        output.push_str(&reader_block(record, options, now).render());
    }
    output
}

/// 去掉每行首尾空白，丢弃以 `=` 结尾的行 (值为空的键)
pub fn validate(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.ends_with('='))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 完整转换流程；出错时不产生任何输出
pub fn convert(
    text: &str,
    options: &ConvertOptions,
    now: &NaiveDateTime,
) -> Result<Conversion, FormatError> {
    let records = cccam::parse_records(text)?;
    let content = validate(&assemble(&records, options, now));
    Ok(Conversion {
        content,
        readers: records.len(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub content: String,
    /// 不含占位 reader
    pub readers: usize,
}

/// 从 oscam.conf 中找出 WebIf 端口
///
/// 取第一个包含 `httpport` 的行，值在 `=` 之后 (没有 `=` 时取下一个字段)；
/// SSL 端口前的 `+` 被忽略。
pub fn find_http_port(conf: &str) -> Option<u16> {
    let line = conf
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find(|line| line.contains(HTTP_PORT_KEY))?;

    let value = match line.split_once('=') {
        Some((_, rest)) => rest.split_whitespace().next(),
        None => {
            let mut fields = line.split_whitespace();
            fields.find(|f| f.contains(HTTP_PORT_KEY))?;
            fields.next()
        }
    }?;

    value.trim_start_matches('+').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::config::{Group, InactivityTimeout};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(21, 5, 7)
            .unwrap()
    }

    fn block_lines(content: &str, label_prefix: &str) -> Vec<String> {
        content
            .split("[reader]")
            .find(|b| b.contains(&format!("label\t\t= {label_prefix}")))
            .unwrap_or_else(|| panic!("no block with label {label_prefix}"))
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_c_line_block_contents() {
        let out = convert("C: 1.2.3.4 12000 user1 pass1", &ConvertOptions::default(), &now()).unwrap();
        assert_eq!(out.readers, 1);
        let lines = block_lines(&out.content, "user1@");
        assert_eq!(
            lines,
            vec![
                "label\t\t= user1@1.2.3.4:12000",
                "description\t= 2024-03-09 21:05:07",
                "protocol\t\t= cccam",
                "device\t\t= 1.2.3.4,12000",
                "user\t\t= user1",
                "password\t\t= pass1",
                "inactivitytimeout\t= 600",
                "group\t\t= 1",
                "cccversion\t= 2.3.2",
                "audisabled\t= 1",
            ]
        );
    }

    #[test]
    fn test_n_line_block_with_ident() {
        let out = convert(
            "N: 1.2.3.4 15000 user2 pass2 0011223344 # 0100:000000",
            &ConvertOptions::default(),
            &now(),
        )
        .unwrap();
        let lines = block_lines(&out.content, "user2@");
        assert!(lines.contains(&"label\t\t= user2@1.2.3.4:15000 0100:000000".to_string()));
        assert!(lines.contains(&"protocol\t\t= newcamd".to_string()));
        assert!(lines.contains(&"key\t\t= 0011223344".to_string()));
        assert!(lines.contains(&"caid\t\t= 0100".to_string()));
        assert!(lines.contains(&"ident\t\t= 0100:000000".to_string()));
        assert!(lines.contains(&"inactivitytimeout\t= -1".to_string()));
        assert!(lines.contains(&"disableserverfilter\t= 1".to_string()));
        assert!(lines.contains(&"connectoninit\t= 1".to_string()));
    }

    #[test]
    fn test_n_line_without_ident_drops_empty_fields() {
        let out = convert(
            "N: host 15000 u p 01 02 03 04 05 06 07 08 09 10 11 12 13 14",
            &ConvertOptions::default(),
            &now(),
        )
        .unwrap();
        let lines = block_lines(&out.content, "u@");
        assert!(lines.contains(&"label\t\t= u@host:15000".to_string()));
        assert!(lines.iter().all(|l| !l.starts_with("caid")));
        assert!(lines.iter().all(|l| !l.starts_with("ident")));
    }

    #[test]
    fn test_output_starts_with_header_and_placeholder() {
        let out = convert("", &ConvertOptions::default(), &now()).unwrap();
        assert_eq!(out.readers, 0);
        assert_eq!(
            out.content,
            "# Created with CCcam2OsCam Converter\n\n\n[reader]\nlabel\t\t= DELETE\nprotocol\t\t= cccam\ndevice\t\t= dummy.com"
        );
    }

    #[test]
    fn test_blocks_follow_input_order() {
        let out = convert("C: a 1 ua p\nN: b 2 ub p 01\nC: c 3 uc p", &ConvertOptions::default(), &now()).unwrap();
        assert_eq!(out.readers, 3);
        let a = out.content.find("ua@a:1").unwrap();
        let b = out.content.find("ub@b:2").unwrap();
        let c = out.content.find("uc@c:3").unwrap();
        let placeholder = out.content.find("= DELETE").unwrap();
        assert!(placeholder < a && a < b && b < c);
        assert_eq!(out.content.matches("[reader]").count(), 4);
    }

    #[test]
    fn test_options_are_applied_per_kind() {
        let options = ConvertOptions {
            c_timeout: InactivityTimeout::new(30).unwrap(),
            n_timeout: InactivityTimeout::new(90).unwrap(),
            c_group: Group::new(2).unwrap(),
            n_group: Group::new(64).unwrap(),
        };
        let out = convert("C: a 1 uc p\nN: b 2 un p 01", &options, &now()).unwrap();
        let c = block_lines(&out.content, "uc@");
        let n = block_lines(&out.content, "un@");
        assert!(c.contains(&"inactivitytimeout\t= 30".to_string()));
        assert!(c.contains(&"group\t\t= 2".to_string()));
        assert!(n.contains(&"inactivitytimeout\t= 90".to_string()));
        assert!(n.contains(&"group\t\t= 64".to_string()));
    }

    #[test]
    fn test_format_error_produces_no_output() {
        let err = convert("C: a 1 u p\nC: short 1 u", &ConvertOptions::default(), &now()).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_validate_drops_empty_values_and_keeps_order() {
        let input = "  a\t= 1\nb\t=\n c =  \n\td\t= 4\ne=\n";
        assert_eq!(validate(input), "a\t= 1\nd\t= 4");
    }

    #[test]
    fn test_validate_output_has_no_trailing_equals() {
        let out = convert(
            "N: h 1 u p 01 #\nC: h 2 u p\nN: h 3 u p 01 # 0100:0",
            &ConvertOptions::default(),
            &now(),
        )
        .unwrap();
        assert!(out.content.lines().all(|l| !l.trim().ends_with('=')));
        assert_eq!(validate(&out.content), out.content);
    }

    #[test]
    fn test_block_key_order() {
        let record = cccam::parse_records("C: h 1 u p").unwrap().remove(0);
        let block = reader_block(&record, &ConvertOptions::default(), &now());
        let keys: Vec<_> = block.keys().collect();
        assert_eq!(keys[..4], ["label", "description", "protocol", "device"]);
        assert_eq!(block.get("cccversion"), Some("2.3.2"));
        assert_eq!(block.get("key"), None);
    }

    #[test]
    fn test_find_http_port() {
        let conf = "[global]\nlogfile = /tmp/oscam.log\n\n[webif]\nhttpport                      = 8888\nhttpuser = admin\n";
        assert_eq!(find_http_port(conf), Some(8888));
    }

    #[test]
    fn test_find_http_port_ssl_and_spacing() {
        assert_eq!(find_http_port("httpport=+8443"), Some(8443));
        assert_eq!(find_http_port("httpport 8081"), Some(8081));
        assert_eq!(find_http_port("# httpport = 1\nhttpport = 83"), Some(83));
    }

    #[test]
    fn test_find_http_port_missing_or_invalid() {
        assert_eq!(find_http_port("[webif]\nhttpuser = admin"), None);
        assert_eq!(find_http_port("httpport ="), None);
        assert_eq!(find_http_port("httpport = abc"), None);
    }
}
