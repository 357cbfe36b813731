//! 内核：持有会话全部上下文，并驱动 [`crate::state`] 中定义的状态机。
//!
//! 职责：
//! - 单一所有者：配置记录、安全日志、鉴权状态、AI 助手、终端与宿主能力
//! - 启动流程：Logo → 首次设置（按需）→ 自检脚本 → 登录 → 主菜单/命令行
//! - 重启：丢弃登录状态与命令表，从配置文件重新加载后重新启动（进程不退出）
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::ai::Assistant;
use crate::auth::{Auth, User};
use crate::command::CommandRegistry;
use crate::config::{Config, ConfigStore, StoreError};
use crate::console::{prompt, Console, Input, MenuChoice, Tone};
use crate::host::Host;
use crate::paths;
use crate::security::SecurityLog;
use crate::state::{transition, Flow, HomeItem, State, Step};

/// 版本标识（Logo 下方显示）。
pub const VERSION: &str = "v0.1 Alpha";

/// 命令行提示符中的主机名部分：`<user>@system:~$ `。
pub const PROMPT_HOST: &str = "system";

/// 中断时的提示。
pub const INTERRUPT_MESSAGE: &str = "[!] SimpOs interrupted, shutting down...";

/// 关机提示。
pub const FAREWELL_MESSAGE: &str = "SimpOs is now shutting down...";

const LOGO: [&str; 6] = [
    r"  ____  _                  ___       ",
    r" / ___|(_)_ __ ___  _ __  / _ \ ___  ",
    r" \___ \| | '_ ` _ \| '_ \| | | / __| ",
    r"  ___) | | | | | | | |_) | |_| \__ \ ",
    r" |____/|_|_| |_| |_| .__/ \___/|___/ ",
    r"                   |_|               ",
];

/// 启动自检脚本（固定顺序，全部返回成功）。
const DIAGNOSTICS: [&str; 5] = [
    "Loading kernel modules",
    "Initializing memory manager",
    "Mounting virtual file systems",
    "Checking AI module",
    "Checking network interfaces",
];

/// 运行参数。
///
/// 说明：
/// - `apps_dir`：`apps` 命令使用的应用目录
/// - `repo_dir`：升级功能使用的 Git 克隆目录
#[derive(Debug, Clone)]
pub struct KernelOptions {
    pub apps_dir: PathBuf,
    pub repo_dir: PathBuf,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            apps_dir: PathBuf::from(paths::APPS_DIR),
            repo_dir: PathBuf::from("."),
        }
    }
}

/// 状态机结束原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// 正常关机或输入结束。
    Shutdown,
    /// 用户中断。
    Interrupted,
}

pub struct Kernel {
    pub console: Box<dyn Console>,
    pub host: Box<dyn Host>,
    pub store: ConfigStore,
    pub config: Config,
    pub security: SecurityLog,
    pub auth: Auth,
    pub ai: Assistant,
    pub options: KernelOptions,
    started_at: Instant,
    boot_cycles: u32,
}

impl Kernel {
    /// 创建内核并加载配置（配置缺失或损坏时回退到默认值）。
    pub fn new(
        console: Box<dyn Console>,
        host: Box<dyn Host>,
        store: ConfigStore,
        options: KernelOptions,
    ) -> Self {
        let config = store.load_or_default();
        let ai = Assistant::new(&config);
        Self {
            console,
            host,
            store,
            config,
            security: SecurityLog::new(),
            auth: Auth::new(),
            ai,
            options,
            started_at: Instant::now(),
            boot_cycles: 0,
        }
    }

    /// 已执行的启动周期数（首次启动为 1，每次重启加 1）。
    pub fn boot_cycles(&self) -> u32 {
        self.boot_cycles
    }

    /// 自进程启动以来的运行时间，`HH:MM:SS`。
    pub fn uptime(&self) -> String {
        format_uptime(self.started_at.elapsed())
    }

    /// 将当前配置写回文件。
    pub fn save_config(&self) -> Result<(), StoreError> {
        self.store.save(&self.config)
    }

    /// 运行状态机直至关机。
    pub fn run(&mut self) -> Exit {
        let mut state = State::Booting;
        let mut commands: Option<CommandRegistry> = None;
        let mut interrupted = false;

        while state != State::Halted {
            let step = self.step(state, &mut commands);
            interrupted |= state == State::Interrupted;
            let next = transition(state, step).unwrap_or_else(|| {
                warn!(?state, ?step, "未定义的状态迁移，强制关机");
                State::ShuttingDown
            });
            if next != state {
                debug!(from = ?state, to = ?next, "状态迁移");
            }
            state = next;
        }

        if interrupted {
            Exit::Interrupted
        } else {
            Exit::Shutdown
        }
    }

    /// 执行一次登录尝试（使用内核自身的终端、配置与安全日志）。
    pub fn login(&mut self) -> Result<Option<User>, Flow> {
        self.auth
            .login(self.console.as_mut(), &self.config, &mut self.security)
    }

    fn step(&mut self, state: State, commands: &mut Option<CommandRegistry>) -> Step {
        match state {
            State::Booting => self.boot(),
            State::FirstRunSetup => into_step(self.first_run_setup()),
            State::Diagnostics => into_step(self.run_diagnostics()),
            State::LoggingIn => match self.login() {
                Ok(Some(_)) => {
                    *commands = Some(CommandRegistry::with_builtins());
                    Step::Done
                }
                Ok(None) => Step::Retry,
                Err(flow) => Step::Flow(flow),
            },
            State::HomeMenu => self.home_menu(),
            State::CommandLoop => {
                let registry = commands.get_or_insert_with(CommandRegistry::with_builtins);
                Step::Flow(self.command_line(registry))
            }
            State::AppsMenu => Step::Flow(self.shortcut(commands, "apps")),
            State::SettingsMenu => Step::Flow(self.shortcut(commands, "settings")),
            State::AdminMenu => Step::Flow(self.shortcut(commands, "admin")),
            State::AiConsole => Step::Flow(self.shortcut(commands, "ai")),
            State::Rebooting => {
                *commands = None;
                self.reboot();
                Step::Done
            }
            State::Interrupted => {
                self.console.blank();
                self.console.print(Tone::System, INTERRUPT_MESSAGE);
                Step::Done
            }
            State::ShuttingDown => {
                self.console.print(Tone::System, FAREWELL_MESSAGE);
                info!("关机");
                Step::Done
            }
            State::Halted => Step::Done,
        }
    }

    fn boot(&mut self) -> Step {
        self.boot_cycles += 1;
        info!(cycle = self.boot_cycles, "开始启动");
        self.console.clear();
        self.show_logo();
        if self.config.first_run_completed {
            Step::Done
        } else {
            Step::SetupRequired
        }
    }

    fn show_logo(&mut self) {
        for line in LOGO {
            self.console.print(Tone::Primary, line);
        }
        self.console.print(Tone::Primary, &format!("--- {VERSION} ---"));
        self.console.blank();
    }

    /// 首次设置：机主名称 + 管理员口令（需二次确认，直到一致为止）。
    fn first_run_setup(&mut self) -> Result<(), Flow> {
        self.console.print(Tone::System, "=== First time setup ===");
        let mut owner = prompt(self.console.as_mut(), "Your name (owner of this system): ")?;
        if owner.is_empty() {
            owner = "owner".to_string();
        }

        loop {
            let mut code = prompt(
                self.console.as_mut(),
                "Choose admin code (leave empty to keep default): ",
            )?;
            if code.is_empty() {
                code = self.config.admin_code.clone();
            }
            let confirm = prompt(self.console.as_mut(), "Confirm admin code: ")?;
            if code != confirm {
                self.console.print(Tone::System, "Codes do not match, try again.");
                continue;
            }
            self.config.admin_code = code;
            break;
        }

        self.config.owner_name = Some(owner);
        self.config.first_run_completed = true;
        if let Err(e) = self.save_config() {
            warn!("首次设置落盘失败: {e}");
            self.console
                .error(&format!("Could not save configuration: {e}"));
        }
        info!("首次设置完成");

        self.console.print(
            Tone::System,
            "Setup complete. You can change settings later via 'admin' and 'settings'.",
        );
        prompt(self.console.as_mut(), "Press ENTER to continue booting...")?;
        Ok(())
    }

    fn run_diagnostics(&mut self) -> Result<(), Flow> {
        for label in DIAGNOSTICS {
            self.console.type_out(Tone::Primary, &format!("{label}..."));
            self.console.pause(Duration::from_millis(200));
            self.console.print(Tone::System, " [OK]");
            self.console.pause(Duration::from_millis(100));
        }
        self.console.blank();
        self.console
            .print(Tone::System, "System ready. Press ENTER to continue to login.");
        prompt(self.console.as_mut(), "")?;
        Ok(())
    }

    fn home_menu(&mut self) -> Step {
        self.console.clear();
        self.show_logo();
        let owner = self.config.owner_name.as_deref().unwrap_or("User");
        let greeting = format!("Welcome, {owner}. Use the arrow keys and ENTER.");
        self.console.print(Tone::System, &greeting);

        let labels: Vec<&str> = HomeItem::ALL.iter().map(|item| item.label()).collect();
        match self.console.select("--- Home ---", &labels) {
            MenuChoice::Selected(i) => HomeItem::ALL
                .get(i)
                .map_or(Step::Cancelled, |item| Step::Picked(*item)),
            MenuChoice::Cancelled => Step::Cancelled,
            MenuChoice::Interrupted => Step::Flow(Flow::Interrupted),
        }
    }

    /// 命令行的一次迭代：读取一行并处理。
    fn command_line(&mut self, registry: &CommandRegistry) -> Flow {
        let user = self
            .auth
            .current_user()
            .map(|u| u.username.clone())
            .unwrap_or_else(|| "?".to_string());
        let line = match self.console.read_line(&format!("{user}@{PROMPT_HOST}:~$ ")) {
            Input::Line(line) => line,
            Input::Eof => return Flow::Shutdown,
            Input::Interrupted => return Flow::Interrupted,
        };

        let line = line.trim();
        if line.eq_ignore_ascii_case("home") {
            return Flow::GoHome;
        }
        if line.eq_ignore_ascii_case("shutdown") {
            return Flow::Shutdown;
        }
        registry.dispatch_line(self, line)
    }

    fn shortcut(&mut self, commands: &mut Option<CommandRegistry>, name: &str) -> Flow {
        let registry = commands.get_or_insert_with(CommandRegistry::with_builtins);
        registry.invoke(self, name, &[])
    }

    fn reboot(&mut self) {
        self.console.print(Tone::System, "Rebooting SimpOs...");
        self.auth.logout();
        self.config = self.store.load_or_default();
        self.ai = Assistant::new(&self.config);
        info!("重启：会话已丢弃，配置已重新加载");
    }
}

fn into_step(result: Result<(), Flow>) -> Step {
    match result {
        Ok(()) => Step::Done,
        Err(flow) => Step::Flow(flow),
    }
}

/// 将时长格式化为 `HH:MM:SS`（小时不封顶）。
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
