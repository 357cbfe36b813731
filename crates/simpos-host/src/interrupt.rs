//! Ctrl+C 监听。
//!
//! 说明：
//! - 会话循环是同步阻塞的，阻塞在读行时无法把中断逐层返回；因此在独立线程上
//!   用单线程 Tokio runtime 等待信号，收到后恢复终端、输出关机提示并以 130 退出
//! - 方向键菜单处于 raw 模式时不会产生信号，由菜单自身报告中断
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use anyhow::{Context, Result};
use simpos_core::kernel::{FAREWELL_MESSAGE, INTERRUPT_MESSAGE};
use tracing::{info, warn};

/// 因中断退出时的进程退出码。
pub const EXIT_INTERRUPTED: i32 = 130;

/// 启动后台监听线程。
///
/// 异常处理：
/// - runtime 创建失败或线程无法启动时返回错误；调用方可选择在无监听的情况下继续运行
pub fn spawn_watcher() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("simpos-interrupt".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("无法监听 Ctrl+C: {e}");
                    return;
                }
                let _ = crossterm::terminal::disable_raw_mode();
                println!();
                println!("{INTERRUPT_MESSAGE}");
                println!("{FAREWELL_MESSAGE}");
                info!("收到中断信号，退出");
                std::process::exit(EXIT_INTERRUPTED);
            });
        })
        .context("failed to spawn interrupt watcher")?;
    Ok(())
}
