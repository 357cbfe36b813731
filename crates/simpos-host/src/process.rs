//! 外部进程执行（升级用 git、应用启动、安装命令）。
//!
//! 说明：
//! - `run` 继承当前终端的标准输入输出，便于交互式应用直接使用终端
//! - `capture` 只在需要读取输出时使用（例如读取修订号）
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::process::Command;

use anyhow::{anyhow, Context, Result};
use simpos_core::host::ExternalCommand;
use tracing::info;

fn build(command: &ExternalCommand) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args).current_dir(&command.cwd);
    cmd
}

/// 执行外部命令并等待结束。
///
/// 返回值：
/// - `Ok(true)`：退出码为 0
/// - `Ok(false)`：退出码非 0（或被信号终止）
///
/// 异常处理：
/// - 进程无法启动时返回错误
pub fn run(command: &ExternalCommand) -> Result<bool> {
    let status = build(command)
        .status()
        .with_context(|| format!("failed to start `{command}` in {}", command.cwd.display()))?;
    let code = status.code().unwrap_or(-1);
    info!(%command, code, "外部命令结束");
    Ok(status.success())
}

/// 执行外部命令并返回去除首尾空白的标准输出。
pub fn capture(command: &ExternalCommand) -> Result<String> {
    let out = build(command)
        .output()
        .with_context(|| format!("failed to start `{command}` in {}", command.cwd.display()))?;
    if !out.status.success() {
        let code = out.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(anyhow!("`{command}` exited with {code}: {}", stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}
