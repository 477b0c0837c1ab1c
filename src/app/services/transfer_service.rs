use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};

use crate::domain::config::FtpConfig;
use crate::domain::oscam;
use crate::domain::ports::{Connector, RemoteSession, WebInterface};
use crate::domain::transfer::{BackupSummary, Console, Operation};
use crate::infra::local_fs;
use crate::utils;

pub const OSCAM_SERVER: &str = "oscam.server";
pub const OSCAM_CONF: &str = "oscam.conf";

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// 把操作结果写入日志，失败不向上传播
pub fn report<T>(operation: Operation, result: Result<T>, console: &mut Console) -> Option<T> {
    match result {
        Ok(value) => {
            console.info(format!("{}完成", operation));
            Some(value)
        }
        Err(e) => {
            console.error(format!("{}失败: {:#}", operation, e));
            None
        }
    }
}

/// 连接 → 登录 → (切换目录) → action → 断开
///
/// 无论 action 是否成功都会尝试 QUIT。
fn with_session<C, T>(
    connector: &C,
    config: &FtpConfig,
    enter_directory: bool,
    console: &mut Console,
    action: impl FnOnce(&mut C::Session, &mut Console) -> Result<T>,
) -> Result<T>
where
    C: Connector,
{
    console.info(format!(
        "正在连接到 {} (User: {})...",
        config.address(),
        config.username
    ));
    let mut session = connector
        .connect(config)
        .with_context(|| format!("无法连接或登录 {}", config.address()))?;
    console.info("登录成功");

    let result = enter(&mut session, config, enter_directory, console, action);

    match session.quit() {
        Ok(()) => console.info("已断开连接"),
        Err(e) => console.error(format!("断开连接时出错: {}", e)),
    }
    result
}

fn enter<S, T>(
    session: &mut S,
    config: &FtpConfig,
    enter_directory: bool,
    console: &mut Console,
    action: impl FnOnce(&mut S, &mut Console) -> Result<T>,
) -> Result<T>
where
    S: RemoteSession,
{
    if enter_directory {
        session
            .change_dir(&config.directory)
            .with_context(|| format!("无法进入远程目录 {}", config.directory))?;
        console.info(format!("当前目录: {}", config.directory));
    }
    action(session, console)
}

/// 连接并登录，返回服务器欢迎信息
pub fn test_connection<C: Connector>(
    connector: &C,
    config: &FtpConfig,
    console: &mut Console,
) -> Result<String> {
    config.validate()?;
    with_session(connector, config, false, console, |session, console| {
        let welcome = session.welcome().unwrap_or_default();
        console.info(welcome.clone());
        Ok(welcome)
    })
}

/// 上传本地 oscam.server；远程已有同名文件时先改名备份
pub fn upload<C: Connector>(
    connector: &C,
    config: &FtpConfig,
    local_path: &Path,
    console: &mut Console,
) -> Result<u64> {
    config.validate()?;
    utils::ensure_file_exists(local_path)?;

    with_session(connector, config, true, console, |session, console| {
        let backup = utils::backup_name(OSCAM_SERVER, &now());
        match session.rename(OSCAM_SERVER, &backup) {
            Ok(()) => console.info(format!("远程已有 {}，已备份为 {}", OSCAM_SERVER, backup)),
            Err(e) if e.is_permanent() => {
                console.info(format!("远程没有可备份的 {} ({})", OSCAM_SERVER, e))
            }
            Err(e) => return Err(e).context("备份远程文件失败"),
        }

        let mut file = File::open(local_path)
            .with_context(|| format!("无法打开本地文件: {:?}", local_path))?;
        let bytes = session
            .put(OSCAM_SERVER, &mut file)
            .with_context(|| format!("上传 {} 失败", OSCAM_SERVER))?;
        console.info(format!(
            "已上传 {:?} ({} 字节) 到 {}{}",
            local_path, bytes, config.directory, OSCAM_SERVER
        ));
        Ok(bytes)
    })
}

/// 下载远程 oscam.server；本地已有同名文件时先改名备份
pub fn download<C: Connector>(
    connector: &C,
    config: &FtpConfig,
    local_path: &Path,
    console: &mut Console,
) -> Result<PathBuf> {
    config.validate()?;

    with_session(connector, config, true, console, |session, console| {
        let data = session
            .get(OSCAM_SERVER)
            .with_context(|| format!("下载 {} 失败", OSCAM_SERVER))?;

        if let Some(backup) = local_fs::backup_existing(local_path, &now())? {
            console.info(format!("本地已有 {:?}，已备份为 {:?}", local_path, backup));
        }

        fs::write(local_path, &data)
            .with_context(|| format!("无法写入本地文件: {:?}", local_path))?;
        console.info(format!("已下载 {} 字节到 {:?}", data.len(), local_path));
        Ok(local_path.to_path_buf())
    })
}

/// 读取远程 oscam.server 内容用于显示，不落盘
pub fn view_remote<C: Connector>(
    connector: &C,
    config: &FtpConfig,
    console: &mut Console,
) -> Result<Vec<String>> {
    config.validate()?;

    with_session(connector, config, true, console, |session, console| {
        let data = session
            .get(OSCAM_SERVER)
            .with_context(|| format!("读取远程 {} 失败", OSCAM_SERVER))?;
        let lines: Vec<String> = String::from_utf8_lossy(&data)
            .lines()
            .map(str::to_string)
            .collect();
        console.info(format!("已读取 {} ({} 行)", OSCAM_SERVER, lines.len()));
        Ok(lines)
    })
}

/// 把远程目录中的所有文件 (不含子目录) 复制到新的本地备份目录
///
/// 单个文件失败只记录，不中断其余文件。
pub fn backup_directory<C: Connector>(
    connector: &C,
    config: &FtpConfig,
    base_dir: &Path,
    console: &mut Console,
) -> Result<(PathBuf, BackupSummary)> {
    config.validate()?;

    with_session(connector, config, true, console, |session, console| {
        let entries = session.list().context("无法列出远程目录")?;
        let target = local_fs::create_backup_dir(base_dir, &now())?;
        console.info(format!("备份到 {:?}", target));

        let mut summary = BackupSummary::default();
        for entry in entries {
            if entry.is_dir {
                summary.skipped_dirs += 1;
                continue;
            }

            let saved = session
                .get(&entry.name)
                .map_err(anyhow::Error::from)
                .and_then(|data| {
                    let path = local_fs::entry_path(&target, &entry.name)
                        .ok_or_else(|| anyhow!("无效的文件名"))?;
                    fs::write(&path, data)
                        .with_context(|| format!("无法写入 {:?}", path))
                });

            match saved {
                Ok(()) => {
                    summary.saved += 1;
                    console.info(format!("已备份 {}", entry.name));
                }
                Err(e) => {
                    console.error(format!("备份 {} 失败: {:#}", entry.name, e));
                    summary.failed.push(entry.name);
                }
            }
        }

        console.info(format!(
            "共备份 {} 个文件，失败 {} 个，跳过 {} 个子目录",
            summary.saved,
            summary.failed.len(),
            summary.skipped_dirs
        ));
        Ok((target, summary))
    })
}

/// 从远程 oscam.conf 读取 WebIf 端口，然后请求重启
pub fn restart_remote<C: Connector, W: WebInterface>(
    connector: &C,
    web: &W,
    config: &FtpConfig,
    console: &mut Console,
) -> Result<()> {
    config.validate()?;

    let port = with_session(connector, config, true, console, |session, console| {
        let data = session
            .get(OSCAM_CONF)
            .with_context(|| format!("读取远程 {} 失败", OSCAM_CONF))?;
        let port = oscam::find_http_port(&String::from_utf8_lossy(&data))
            .ok_or_else(|| anyhow!("{} 中找不到有效的 httpport", OSCAM_CONF))?;
        console.info(format!("WebIf 端口: {}", port));
        Ok(port)
    })?;

    let status = web.restart(&config.host, port)?;
    if status == 200 {
        console.info("已发送重启请求");
        Ok(())
    } else {
        Err(anyhow!("WebIf 返回状态码 {}", status))
    }
}
