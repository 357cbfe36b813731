//! 命令注册表与分发器。
//!
//! 解析规则：
//! - 去除首尾空白；空行不做任何事
//! - 按空白切分，首个词转小写作为命令名，其余原样作为参数
//! - 不支持引号/转义，含空格的参数无法传递
//! - `shutdown` 不调用处理函数，直接返回 [`Flow::Shutdown`]
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{debug, warn};

use crate::builtins;
use crate::kernel::Kernel;
use crate::state::Flow;

/// 命令处理函数。
///
/// 参数：
/// - 内核（配置、鉴权、终端等全部上下文）
/// - 注册表本身（`help` 需要列出全部命令）
/// - 位置参数
pub type Handler = fn(&mut Kernel, &CommandRegistry, &[String]) -> Result<Flow>;

/// 已注册的命令。
#[derive(Clone, Copy)]
pub struct Command {
    pub description: &'static str,
    pub handler: Handler,
}

/// 命令名 → 处理函数的映射（按名称有序）。
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    /// 空注册表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部内置命令。
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// 注册命令；同名命令以最后一次注册为准。
    pub fn register(&mut self, name: &str, description: &'static str, handler: Handler) {
        self.commands.insert(
            name.to_lowercase(),
            Command {
                description,
                handler,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// 全部命令（按名称字母序）。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.commands.iter().map(|(name, cmd)| (name.as_str(), cmd))
    }

    /// 解析一行输入并分发。
    ///
    /// 返回值：
    /// - [`Flow::Continue`]：空行、未知命令、普通命令执行完毕（含执行失败）
    /// - [`Flow::Shutdown`]：`shutdown`
    /// - 其他：处理函数返回的信号（例如 `reboot` 返回 [`Flow::Reboot`]）
    pub fn dispatch_line(&self, kernel: &mut Kernel, line: &str) -> Flow {
        let mut parts = line.split_whitespace();
        let Some(first) = parts.next() else {
            return Flow::Continue;
        };
        let name = first.to_lowercase();
        let args: Vec<String> = parts.map(str::to_string).collect();

        if self.get(&name).is_none() {
            kernel.console.error(&format!("Unknown command: {name}"));
            return Flow::Continue;
        }
        if name == "shutdown" {
            return Flow::Shutdown;
        }
        self.invoke(kernel, &name, &args)
    }

    /// 直接调用指定命令（主菜单快捷入口使用）。
    ///
    /// 异常处理：
    /// - 处理函数返回错误时输出 `Command failed: ...` 并返回 [`Flow::Continue`]
    pub fn invoke(&self, kernel: &mut Kernel, name: &str, args: &[String]) -> Flow {
        let Some(command) = self.get(name) else {
            kernel.console.error(&format!("Unknown command: {name}"));
            return Flow::Continue;
        };
        debug!(command = name, argc = args.len(), "执行命令");
        match (command.handler)(kernel, self, args) {
            Ok(flow) => flow,
            Err(e) => {
                warn!(command = name, "命令执行失败: {e:#}");
                kernel.console.error(&format!("Command failed: {e:#}"));
                Flow::Continue
            }
        }
    }
}
