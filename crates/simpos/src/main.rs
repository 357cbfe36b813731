//! SimpOs 入口。
//!
//! 职责：
//! - 解析命令行参数（配置文件、应用目录、升级仓库目录、快速模式）
//! - 初始化日志（输出到 stderr，默认只显示 warn 及以上）
//! - 装配真实终端与宿主并运行内核状态机
//!
//! 退出码：
//! - 0：正常关机或输入结束
//! - 130：用户中断
//! - 1：启动失败
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use simpos_core::config::ConfigStore;
use simpos_core::paths;
use simpos_core::{Exit, Kernel, KernelOptions};
use simpos_host::{interrupt, SystemHost, TerminalConsole};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 命令行参数。
///
/// 说明：
/// - `repo_dir` 指向 SimpOs 自身的 Git 克隆，供 settings 中的升级功能使用
/// - `fast` 关闭打字动画与自检延时（脚本化/测试场景）
#[derive(Debug, Parser)]
#[command(name = "simpos", version, about = "A tiny menu-driven fake operating system console")]
struct Cli {
    #[arg(long, default_value = paths::CONFIG_FILE)]
    config: PathBuf,

    #[arg(long, default_value = paths::APPS_DIR)]
    apps_dir: PathBuf,

    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    fast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging() {
        eprintln!("simpos: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Exit::Shutdown => ExitCode::SUCCESS,
        Exit::Interrupted => ExitCode::from(interrupt::EXIT_INTERRUPTED as u8),
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

fn run(cli: Cli) -> Exit {
    if let Err(e) = interrupt::spawn_watcher() {
        warn!("中断监听不可用: {e:#}");
    }

    info!(
        config = %cli.config.display(),
        apps_dir = %cli.apps_dir.display(),
        repo_dir = %cli.repo_dir.display(),
        fast = cli.fast,
        "SimpOs 启动"
    );
    let options = KernelOptions {
        apps_dir: cli.apps_dir,
        repo_dir: cli.repo_dir,
    };
    let mut kernel = Kernel::new(
        Box::new(TerminalConsole::new(!cli.fast)),
        Box::new(SystemHost),
        ConfigStore::new(cli.config),
        options,
    );
    kernel.run()
}
