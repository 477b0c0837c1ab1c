mod app;
mod domain;
mod infra;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use app::context::AppContext;
use app::services::settings_service::{self, FtpOverrides};
use app::services::transfer_service::{self, report};
use app::services::convert_service;
use domain::config::{ConvertOptions, Group, InactivityTimeout, KNOWN_DIRECTORIES};
use domain::oscam::PLACEHOLDER_LABEL;
use domain::transfer::{Console, Level, Operation};
use infra::ftp::FtpConnector;
use infra::webif::HttpWebInterface;

#[derive(Parser, Debug)]
#[command(author, version, about = "CCcam.cfg -> oscam.server 转换，并通过 FTP 同步到 Enigma2", long_about = None)]
struct Cli {
    /// 配置文件路径 (默认在系统配置目录下)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 只显示 C 行和 N 行
    Filter {
        #[arg(value_name = "CCCAM_CFG")]
        input: PathBuf,
    },
    /// 转换为 oscam.server
    Convert {
        #[arg(value_name = "CCCAM_CFG")]
        input: PathBuf,
        #[arg(short, long, default_value = "oscam.server")]
        output: PathBuf,
        /// C 行空闲超时 (秒, -1 到 9999)
        #[arg(long, default_value = "600", allow_negative_numbers = true)]
        c_timeout: InactivityTimeout,
        /// N 行空闲超时 (秒, -1 到 9999)
        #[arg(long, default_value = "-1", allow_negative_numbers = true)]
        n_timeout: InactivityTimeout,
        /// C 行分组 (1-64)
        #[arg(long, default_value = "1")]
        c_group: Group,
        /// N 行分组 (1-64)
        #[arg(long, default_value = "1")]
        n_group: Group,
    },
    /// 查看本地 oscam.server
    View {
        #[arg(default_value = "oscam.server")]
        path: PathBuf,
    },
    /// 与 Enigma2 接收机之间的 FTP 操作
    Ftp {
        #[command(flatten)]
        conn: ConnectionArgs,
        #[command(subcommand)]
        action: FtpAction,
    },
    /// 管理保存的连接配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
struct ConnectionArgs {
    /// IP 地址或主机名
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// 远程 OSCam 配置目录
    #[arg(long)]
    dir: Option<String>,
}

impl From<ConnectionArgs> for FtpOverrides {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            username: args.user,
            password: args.password,
            directory: args.dir,
        }
    }
}

#[derive(Subcommand, Debug)]
enum FtpAction {
    /// 测试连接
    Test,
    /// 上传本地 oscam.server
    Upload {
        #[arg(long, default_value = "oscam.server")]
        file: PathBuf,
    },
    /// 下载远程 oscam.server
    Download {
        #[arg(long, default_value = "oscam.server")]
        file: PathBuf,
    },
    /// 查看远程 oscam.server
    View,
    /// 备份整个远程目录
    Backup {
        #[arg(long, default_value = ".")]
        dest: PathBuf,
    },
    /// 通过 WebIf 重启 OSCam
    Restart,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 显示当前配置
    Show,
    /// 保存连接配置
    Save {
        #[command(flatten)]
        conn: ConnectionArgs,
    },
    /// 列出常见的 OSCam 配置目录
    Dirs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut console = Console::new();

    let result = run(cli, &mut console);
    flush(&mut console);

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn flush(console: &mut Console) {
    for line in console.drain() {
        match line.level {
            Level::Info => println!("{}", line.message),
            Level::Error => eprintln!("{}", line.message),
        }
    }
}

fn run(cli: Cli, console: &mut Console) -> anyhow::Result<bool> {
    match cli.command {
        Command::Filter { input } => {
            println!("{}", convert_service::filter_file(&input)?);
            Ok(true)
        }
        Command::Convert {
            input,
            output,
            c_timeout,
            n_timeout,
            c_group,
            n_group,
        } => {
            let options = ConvertOptions {
                c_timeout,
                n_timeout,
                c_group,
                n_group,
            };
            let conversion = convert_service::convert_file(&input, &output, &options)?;
            let shown = utils::normalize_path(&output).unwrap_or(output);
            console.info(format!(
                "已转换 {} 个 reader，写入 {}",
                conversion.readers,
                shown.display()
            ));
            console.info(format!(
                "上传到 OSCam 后请删除名为 {} 的占位 reader",
                PLACEHOLDER_LABEL
            ));
            Ok(true)
        }
        Command::View { path } => {
            match convert_service::view_local(&path)? {
                Some(content) => println!("{}", content),
                None => console.info(format!("{} 不存在", path.display())),
            }
            Ok(true)
        }
        Command::Ftp { conn, action } => {
            let ctx = AppContext::bootstrap(cli.config, console)?;
            let config = FtpOverrides::from(conn).apply(&ctx.config.ftp);
            Ok(run_ftp(&config, action, console))
        }
        Command::Config { action } => {
            let mut ctx = AppContext::bootstrap(cli.config, console)?;
            match action {
                ConfigAction::Show => {
                    for line in settings_service::describe(&ctx.config.ftp) {
                        println!("{}", line);
                    }
                }
                ConfigAction::Save { conn } => {
                    settings_service::save_ftp(&mut ctx, &FtpOverrides::from(conn))?;
                    console.info("配置已保存");
                }
                ConfigAction::Dirs => {
                    for dir in KNOWN_DIRECTORIES {
                        println!("{}", dir);
                    }
                }
            }
            Ok(true)
        }
    }
}

/// 每个 FTP 操作独立建立会话；失败只写入日志
fn run_ftp(config: &domain::config::FtpConfig, action: FtpAction, console: &mut Console) -> bool {
    let connector = FtpConnector;

    match action {
        FtpAction::Test => {
            let result = transfer_service::test_connection(&connector, config, console);
            report(Operation::TestConnection, result, console).is_some()
        }
        FtpAction::Upload { file } => {
            let result = transfer_service::upload(&connector, config, &file, console);
            report(Operation::Upload, result, console).is_some()
        }
        FtpAction::Download { file } => {
            let result = transfer_service::download(&connector, config, &file, console);
            report(Operation::Download, result, console).is_some()
        }
        FtpAction::View => {
            let result = transfer_service::view_remote(&connector, config, console);
            match report(Operation::ViewRemote, result, console) {
                Some(lines) => {
                    flush(console);
                    for line in lines {
                        println!("{}", line);
                    }
                    true
                }
                None => false,
            }
        }
        FtpAction::Backup { dest } => {
            let result = transfer_service::backup_directory(&connector, config, &dest, console);
            match report(Operation::BackupDirectory, result, console) {
                Some((_, summary)) => summary.failed.is_empty(),
                None => false,
            }
        }
        FtpAction::Restart => {
            let web = HttpWebInterface::new();
            let result = transfer_service::restart_remote(&connector, &web, config, console);
            report(Operation::Restart, result, console).is_some()
        }
    }
}
