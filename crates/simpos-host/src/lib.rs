//! SimpOs 宿主层：终端、系统信息、外部进程与中断监听的真实实现。
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

pub mod interrupt;
pub mod process;
pub mod system;
pub mod terminal;

use anyhow::Result;
use simpos_core::host::{ExternalCommand, Host, InfoField};

pub use terminal::TerminalConsole;

/// 当前机器上的宿主实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn system_info(&mut self) -> Vec<InfoField> {
        system::collect()
    }

    fn run(&mut self, command: &ExternalCommand) -> Result<bool> {
        process::run(command)
    }

    fn capture(&mut self, command: &ExternalCommand) -> Result<String> {
        process::capture(command)
    }
}
