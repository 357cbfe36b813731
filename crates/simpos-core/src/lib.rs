//! SimpOs 核心：会话状态机、命令分发与各业务模块。
//!
//! 本 crate 与平台无关；真实终端与宿主能力由 `simpos-host` 提供，
//! 测试替身位于 `testing` 模块（需启用 `testing` feature）。
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

pub mod ai;
pub mod apps;
pub mod auth;
pub mod builtins;
pub mod command;
pub mod config;
pub mod console;
pub mod host;
pub mod kernel;
pub mod paths;
pub mod security;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use kernel::{Exit, Kernel, KernelOptions};
