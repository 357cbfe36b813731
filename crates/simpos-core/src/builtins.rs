//! 内置命令处理函数。
//!
//! 约定：
//! - 需要管理员权限的操作先调用 [`crate::auth::Auth::require_admin`]，失败立即返回，不做任何修改
//! - 配置修改后立即落盘（写穿），落盘失败以错误返回，由分发器统一报告
//! - 外部进程失败只输出提示，已保存的配置字段不回滚
//! - 输入结束/中断以对应 [`Flow`] 返回，不视为错误
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ai::Assistant;
use crate::apps;
use crate::command::CommandRegistry;
use crate::config::Config;
use crate::console::{prompt, MenuChoice, Tone};
use crate::host::ExternalCommand;
use crate::kernel::Kernel;
use crate::paths;
use crate::state::Flow;

/// 升级仓库的默认地址（配置中未设置时使用）。
pub const DEFAULT_UPDATE_URL: &str = "https://github.com/freezingjoeri/SimpOs.git";

/// 恢复出厂设置时需要输入的确认口令。
pub const RESET_TOKEN: &str = "RESET";

const FUTURE_NOTICE: &str = "[FUTURE] This command is reserved for the simulated file system.";

/// 读取一行；输入结束或中断时直接从处理函数返回对应信号。
macro_rules! read_or_return {
    ($kernel:expr, $text:expr) => {
        match prompt($kernel.console.as_mut(), $text) {
            Ok(line) => line,
            Err(flow) => return Ok(flow),
        }
    };
}

/// 显示菜单；取消时返回 [`Flow::Continue`]，中断时返回 [`Flow::Interrupted`]。
macro_rules! select_or_return {
    ($kernel:expr, $title:expr, $options:expr) => {
        match $kernel.console.select($title, $options) {
            MenuChoice::Selected(i) => i,
            MenuChoice::Cancelled => return Ok(Flow::Continue),
            MenuChoice::Interrupted => return Ok(Flow::Interrupted),
        }
    };
}

/// 注册全部内置命令。
pub fn register_all(registry: &mut CommandRegistry) {
    registry.register("help", "Show this help message.", help);
    registry.register("clear", "Clear the screen.", clear);
    registry.register("status", "Show system status.", status);
    registry.register("ai", "Interact with SimpAI (ai local|online|status).", ai);
    registry.register("netstat", "Show simulated network status.", netstat);
    registry.register("whoami", "Show current user.", whoami);
    registry.register("shutdown", "Power off SimpOs.", shutdown);
    registry.register("reboot", "Reboot SimpOs.", reboot);
    registry.register("admin", "Admin tools (requires admin).", admin);
    registry.register("settings", "System info, updates and factory reset.", settings);
    registry.register("apps", "Launch or install apps.", apps_menu);
    registry.register("reset", "Factory reset (requires admin).", reset);
    registry.register("mkdir", "[FUTURE] create directory.", future);
    registry.register("touch", "[FUTURE] create file.", future);
    registry.register("ls", "[FUTURE] list files.", future);
}

fn help(kernel: &mut Kernel, registry: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    kernel.console.print(Tone::Primary, "Available commands:");
    for (name, command) in registry.iter() {
        kernel
            .console
            .print(Tone::Primary, &format!("  {name:<10} {}", command.description));
    }
    Ok(Flow::Continue)
}

fn clear(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    kernel.console.clear();
    Ok(Flow::Continue)
}

fn status(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    let lines = [
        "--- System status ---".to_string(),
        format!("User   : {}", kernel.auth.principal()),
        format!(
            "Priv   : {}",
            kernel.auth.current_user().map_or("user", |u| u.role())
        ),
        format!("Uptime : {}", kernel.uptime()),
        "Network: ONLINE (simulated)".to_string(),
        format!("AI mode: {}", kernel.config.ai_mode),
    ];
    for line in &lines {
        kernel.console.print(Tone::System, line);
    }
    Ok(Flow::Continue)
}

/// `ai`：无参数时提问；`local`/`online` 切换模式；`status` 显示状态。
fn ai(kernel: &mut Kernel, _: &CommandRegistry, args: &[String]) -> Result<Flow> {
    let Some(sub) = args.first() else {
        let question = read_or_return!(kernel, "SimpAI> ");
        kernel
            .ai
            .ask(kernel.console.as_mut(), &kernel.config, &question);
        return Ok(Flow::Continue);
    };

    match sub.to_lowercase().as_str() {
        mode @ ("local" | "online") => kernel.ai.set_mode(
            kernel.console.as_mut(),
            &mut kernel.config,
            &kernel.store,
            mode,
        )?,
        "status" => kernel.ai.show_status(kernel.console.as_mut(), &kernel.config),
        _ => kernel
            .console
            .error("Usage: ai [local|online|status] or just 'ai' to ask a question."),
    }
    Ok(Flow::Continue)
}

fn netstat(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    const TABLE: [&str; 7] = [
        "--- Netstat (simulated) ---",
        "Interface   Status   IP",
        "lo          UP       127.0.0.1",
        "eth0        UP       10.0.2.15",
        "",
        "Active connections:",
        "tcp  0  0  10.0.2.15:1337  10.0.2.2:22  ESTABLISHED",
    ];
    for line in TABLE {
        kernel.console.print(Tone::System, line);
    }
    Ok(Flow::Continue)
}

fn whoami(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    match kernel.auth.current_user() {
        Some(user) => {
            let line = format!("{} ({})", user.username, user.role());
            kernel.console.print(Tone::Primary, &line);
        }
        None => kernel.console.error("Not logged in."),
    }
    Ok(Flow::Continue)
}

// 由分发器直接处理，这里只占位以便出现在 help 中。
fn shutdown(_: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    Ok(Flow::Continue)
}

fn reboot(_: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    Ok(Flow::Reboot)
}

fn future(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    kernel.console.print(Tone::System, FUTURE_NOTICE);
    Ok(Flow::Continue)
}

/// 管理员菜单：安全日志、API Key、在线 AI 开关、配置查看。
fn admin(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    if !kernel
        .auth
        .require_admin(kernel.console.as_mut(), &mut kernel.security)
    {
        return Ok(Flow::Continue);
    }

    let choice = select_or_return!(
        kernel,
        "--- Admin menu ---",
        &[
            "Show security logs",
            "Set API key",
            "Toggle online AI allowed",
            "Show current config",
        ]
    );
    match choice {
        0 => kernel.security.show(kernel.console.as_mut()),
        1 => {
            let key = read_or_return!(kernel, "New API key (empty to clear): ");
            kernel.config.api_key = Some(key).filter(|k| !k.is_empty());
            kernel.save_config().context("failed to save API key")?;
            kernel.security.log(kernel.auth.principal(), "api_key_changed");
            kernel.console.print(Tone::System, "API key updated.");
        }
        2 => {
            kernel.config.allow_online_ai = !kernel.config.allow_online_ai;
            kernel
                .save_config()
                .context("failed to save online AI flag")?;
            info!(allowed = kernel.config.allow_online_ai, "在线 AI 开关已切换");
            let line = format!("Online AI allowed: {}", kernel.config.allow_online_ai);
            kernel.console.print(Tone::System, &line);
        }
        3 => show_config(kernel),
        _ => {}
    }
    Ok(Flow::Continue)
}

/// 输出非敏感配置字段（管理员口令始终隐藏）。
fn show_config(kernel: &mut Kernel) {
    let cfg = &kernel.config;
    let lines = [
        "admin_code       : (hidden)".to_string(),
        format!("ai_mode          : {}", cfg.ai_mode),
        format!(
            "api_key          : {}",
            if cfg.api_key.is_some() { "set" } else { "not set" }
        ),
        format!("allow_online_ai  : {}", cfg.allow_online_ai),
        format!("owner_name       : {}", cfg.owner_name.as_deref().unwrap_or("-")),
        format!(
            "update_repo_url  : {}",
            cfg.update_repo_url.as_deref().unwrap_or("-")
        ),
    ];
    for line in &lines {
        kernel.console.print(Tone::System, line);
    }
}

/// 设置菜单。主机信息无需权限；升级与恢复出厂设置在各自入口处校验管理员。
fn settings(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    let choice = select_or_return!(
        kernel,
        "--- Settings ---",
        &[
            "Server / OS info",
            "Check for updates",
            "Update from GitHub",
            "Factory reset",
        ]
    );
    match choice {
        0 => {
            show_system_info(kernel);
            Ok(Flow::Continue)
        }
        1 => check_updates(kernel),
        2 => update_from_remote(kernel),
        3 => factory_reset(kernel),
        _ => Ok(Flow::Continue),
    }
}

fn show_system_info(kernel: &mut Kernel) {
    let fields = kernel.host.system_info();
    kernel.console.print(Tone::System, "--- Server / OS info ---");
    for field in fields {
        let line = format!("{:<14}: {}", field.label, field.value);
        kernel.console.print(Tone::System, &line);
    }
}

/// 只读检查：`git fetch origin` 后比较本地与上游修订号。
fn check_updates(kernel: &mut Kernel) -> Result<Flow> {
    if !kernel
        .auth
        .require_admin(kernel.console.as_mut(), &mut kernel.security)
    {
        return Ok(Flow::Continue);
    }
    let repo_dir = kernel.options.repo_dir.clone();
    if !paths::git_dir(&repo_dir).exists() {
        kernel.console.error(
            "This installation is not a Git clone. Checking for updates is not possible here.",
        );
        return Ok(Flow::Continue);
    }

    kernel.console.print(Tone::System, "Checking for updates...");
    if !run_reported(kernel, &ExternalCommand::git(&repo_dir, &["fetch", "origin"])) {
        kernel
            .console
            .error("Update check failed. Check the network connection.");
        return Ok(Flow::Continue);
    }

    let local = kernel
        .host
        .capture(&ExternalCommand::git(&repo_dir, &["rev-parse", "HEAD"]));
    let remote = kernel
        .host
        .capture(&ExternalCommand::git(&repo_dir, &["rev-parse", "@{u}"]));
    match (local, remote) {
        (Ok(local), Ok(remote)) if local == remote => {
            kernel.console.print(Tone::System, "SimpOs is up to date.");
        }
        (Ok(local), Ok(remote)) => {
            let line = format!(
                "Update available: {} -> {}. Use 'Update from GitHub' to install it.",
                short_rev(&local),
                short_rev(&remote)
            );
            kernel.console.print(Tone::System, &line);
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("读取修订号失败: {e:#}");
            kernel
                .console
                .error("Update check failed. No upstream branch is configured.");
        }
    }
    Ok(Flow::Continue)
}

/// 从远程仓库拉取更新：先保存地址，再 `remote set-url` + `pull --ff-only`。
fn update_from_remote(kernel: &mut Kernel) -> Result<Flow> {
    if !kernel
        .auth
        .require_admin(kernel.console.as_mut(), &mut kernel.security)
    {
        return Ok(Flow::Continue);
    }

    let current = kernel
        .config
        .update_repo_url
        .clone()
        .unwrap_or_else(|| DEFAULT_UPDATE_URL.to_string());
    kernel
        .console
        .print(Tone::System, &format!("Current GitHub URL: {current}"));
    let mut url = read_or_return!(kernel, "GitHub repo URL (ENTER to keep current): ");
    if url.is_empty() {
        url = current;
    }
    kernel.config.update_repo_url = Some(url.clone());
    kernel.save_config().context("failed to save update URL")?;

    let repo_dir = kernel.options.repo_dir.clone();
    if !paths::git_dir(&repo_dir).exists() {
        kernel.console.error(
            "This installation is not a Git clone. Update via GitHub is not possible here.",
        );
        return Ok(Flow::Continue);
    }

    kernel
        .console
        .print(Tone::System, &format!("Updating from {url} ..."));
    let steps = [
        ExternalCommand::git(&repo_dir, &["remote", "set-url", "origin", url.as_str()]),
        ExternalCommand::git(&repo_dir, &["pull", "--ff-only"]),
    ];
    for step in &steps {
        if !run_reported(kernel, step) {
            kernel
                .console
                .error("Update failed. Check the GitHub URL and network connection.");
            return Ok(Flow::Continue);
        }
    }

    kernel.security.log(kernel.auth.principal(), "update_pulled");
    kernel.console.print(
        Tone::System,
        "Update complete. Restart SimpOs (reboot/shutdown) to use the new version.",
    );
    Ok(Flow::Continue)
}

fn reset(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    factory_reset(kernel)
}

/// 恢复出厂设置：管理员 + 重新输入口令 + 确认口令，三者都通过才删除配置文件。
///
/// 异常处理：
/// - 删除失败时输出提示并中止，内存与磁盘上的旧配置均保持不变
fn factory_reset(kernel: &mut Kernel) -> Result<Flow> {
    if !kernel
        .auth
        .require_admin(kernel.console.as_mut(), &mut kernel.security)
    {
        return Ok(Flow::Continue);
    }

    let code = read_or_return!(kernel, "Re-enter admin code: ");
    if code != kernel.config.admin_code {
        kernel.security.log(kernel.auth.principal(), "reset_denied");
        kernel
            .console
            .error("Admin code mismatch. Factory reset aborted.");
        return Ok(Flow::Continue);
    }
    let token = read_or_return!(kernel, "Type RESET to confirm factory reset: ");
    if token != RESET_TOKEN {
        kernel.console.print(Tone::System, "Factory reset cancelled.");
        return Ok(Flow::Continue);
    }

    if let Err(e) = kernel.store.delete() {
        warn!("恢复出厂设置失败: {e}");
        kernel
            .console
            .error(&format!("Factory reset failed: {e}. Configuration left unchanged."));
        return Ok(Flow::Continue);
    }

    // 内存中换成默认值但不落盘，下次启动重新进入首次设置。
    kernel.config = Config::default();
    kernel.ai = Assistant::new(&kernel.config);
    kernel.security.log(kernel.auth.principal(), "factory_reset");
    info!("配置文件已删除");
    kernel.console.print(
        Tone::System,
        "Configuration deleted. Reboot SimpOs to run the first time setup again.",
    );
    Ok(Flow::Continue)
}

/// 应用菜单：列出应用目录中的文件并启动，或执行一条安装命令。
fn apps_menu(kernel: &mut Kernel, _: &CommandRegistry, _args: &[String]) -> Result<Flow> {
    let dir = kernel.options.apps_dir.clone();
    let names = apps::list_apps(&dir)?;

    let mut options: Vec<&str> = names.iter().map(String::as_str).collect();
    options.push("Install app (shell command)");
    let title = format!("--- Apps ({}) ---", dir.display());
    let choice = select_or_return!(kernel, &title, &options);

    if let Some(name) = names.get(choice) {
        let command = apps::launch_command(&dir, name)?;
        kernel
            .console
            .print(Tone::System, &format!("Launching {name} ..."));
        if run_reported(kernel, &command) {
            kernel.console.print(Tone::System, "App finished.");
        } else {
            kernel.console.error(&format!("App {name} failed."));
        }
        return Ok(Flow::Continue);
    }

    let line = read_or_return!(kernel, "Install command (ENTER to cancel): ");
    if line.is_empty() {
        kernel.console.print(Tone::System, "Install cancelled.");
        return Ok(Flow::Continue);
    }
    if run_reported(kernel, &apps::install_command(&dir, &line)) {
        kernel.console.print(Tone::System, "Install finished.");
    } else {
        kernel.console.error("Install failed.");
    }
    Ok(Flow::Continue)
}

/// 执行外部命令，只关心成功与否；无法启动的进程同样视为失败。
fn run_reported(kernel: &mut Kernel, command: &ExternalCommand) -> bool {
    match kernel.host.run(command) {
        Ok(true) => true,
        Ok(false) => {
            warn!(%command, "外部命令退出码非 0");
            false
        }
        Err(e) => {
            warn!(%command, "外部命令无法启动: {e:#}");
            false
        }
    }
}

fn short_rev(rev: &str) -> &str {
    rev.get(..7).unwrap_or(rev)
}
