use std::path::{Path, PathBuf};

use simpos_core::config::{Config, ConfigStore};
use simpos_core::kernel::{FAREWELL_MESSAGE, INTERRUPT_MESSAGE};
use simpos_core::testing::{FakeHost, ScriptedConsole, Transcript};
use simpos_core::{Exit, Kernel, KernelOptions};
use uuid::Uuid;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

struct CleanupDir(PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn store_in(dir: &Path) -> ConfigStore {
    ConfigStore::new(dir.join("simp_config.json"))
}

fn completed_store(dir: &Path) -> ConfigStore {
    let store = store_in(dir);
    let cfg = Config {
        admin_code: "pw".to_string(),
        owner_name: Some("Tester".to_string()),
        first_run_completed: true,
        ..Config::default()
    };
    store.save(&cfg).expect("save config");
    store
}

fn boot(dir: &Path, store: ConfigStore, console: ScriptedConsole) -> (Kernel, Transcript) {
    let transcript = console.transcript();
    let options = KernelOptions {
        apps_dir: dir.join("apps"),
        repo_dir: dir.to_path_buf(),
    };
    let kernel = Kernel::new(Box::new(console), Box::new(FakeHost::new()), store, options);
    (kernel, transcript)
}

#[test]
fn first_boot_loops_until_codes_match_and_persists() {
    let dir = unique_temp_dir("simpos-core-first-boot");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new()
        .lines(&["Ada", "x1", "x2", "x1", "x1", "", "", "ada"])
        .choose(0)
        .lines(&["whoami", "shutdown"]);
    let (mut kernel, transcript) = boot(&dir, store_in(&dir), console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert_eq!(transcript.count("Codes do not match, try again."), 1);
    assert!(transcript.contains("Setup complete."));
    assert!(transcript.contains("System ready. Press ENTER to continue to login."));
    assert!(transcript.contains("Welcome, Ada."));
    assert!(transcript.contains("ada (user)"));
    assert!(transcript.contains(FAREWELL_MESSAGE));

    let saved = store_in(&dir).read().unwrap().expect("config saved");
    assert_eq!(saved.owner_name.as_deref(), Some("Ada"));
    assert_eq!(saved.admin_code, "x1");
    assert!(saved.first_run_completed);
}

#[test]
fn blank_setup_answers_keep_defaults() {
    let dir = unique_temp_dir("simpos-core-setup-defaults");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new().lines(&["", "", "changeme-admin", ""]);
    let (mut kernel, _transcript) = boot(&dir, store_in(&dir), console);

    // 自检阶段读到 EOF 即关机。
    assert_eq!(kernel.run(), Exit::Shutdown);
    let saved = store_in(&dir).read().unwrap().expect("config saved");
    assert_eq!(saved.owner_name.as_deref(), Some("owner"));
    assert_eq!(saved.admin_code, "changeme-admin");
}

#[test]
fn diagnostics_run_in_fixed_order() {
    let dir = unique_temp_dir("simpos-core-diagnostics");
    let _cleanup = CleanupDir(dir.clone());

    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), ScriptedConsole::new());
    assert_eq!(kernel.run(), Exit::Shutdown);

    let labels = [
        "Loading kernel modules...",
        "Initializing memory manager...",
        "Mounting virtual file systems...",
        "Checking AI module...",
        "Checking network interfaces...",
    ];
    let lines = transcript.lines();
    let positions: Vec<usize> = labels
        .iter()
        .map(|l| lines.iter().position(|x| x == l).expect(l))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert_eq!(transcript.count("[OK]"), 5);
    assert!(!transcript.contains("=== First time setup ==="));
}

#[test]
fn wrong_admin_code_retries_login() {
    let dir = unique_temp_dir("simpos-core-login-retry");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new()
        .lines(&["", "ADMIN", "bad", "admin", "pw"])
        .cancel()
        .line("whoami")
        .eof();
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert_eq!(kernel.security.failed_logins(), 1);
    assert_eq!(transcript.count("Login to SimpOs"), 2);
    assert!(transcript.contains("[SECURITY] Failed login attempts: 1"));
    assert!(transcript.contains("admin (admin)"));
    assert!(kernel.auth.is_admin());

    let events: Vec<&str> = kernel
        .security
        .entries()
        .iter()
        .map(|e| e.event.as_str())
        .collect();
    assert_eq!(events, ["failed_login", "admin_login"]);
}

#[test]
fn reboot_command_reruns_boot_and_drops_login() {
    let dir = unique_temp_dir("simpos-core-reboot");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new()
        .lines(&["", "bob"])
        .cancel()
        .line("reboot")
        .lines(&["", "carol"])
        .cancel()
        .lines(&["whoami", "shutdown"]);
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert_eq!(kernel.boot_cycles(), 2);
    assert_eq!(transcript.count("Loading kernel modules"), 2);
    assert!(transcript.contains("Rebooting SimpOs..."));
    assert!(transcript.contains("carol (user)"));
    assert!(!transcript.contains("bob (user)"));
    // 安全日志跨重启保留。
    assert_eq!(kernel.security.entries().len(), 2);
}

#[test]
fn home_menu_reboot_keeps_config_untouched() {
    let dir = unique_temp_dir("simpos-core-home-reboot");
    let _cleanup = CleanupDir(dir.clone());
    let store = completed_store(&dir);
    let before_bytes = std::fs::read(store.path()).unwrap();
    let before = store.read().unwrap().expect("config saved");

    let console = ScriptedConsole::new()
        .lines(&["", "bob"])
        .choose(6)
        .lines(&["", "carol"])
        .choose(5);
    let (mut kernel, transcript) = boot(&dir, store, console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert_eq!(kernel.boot_cycles(), 2);
    assert!(transcript.contains("Rebooting SimpOs..."));
    assert!(!transcript.contains("=== First time setup ==="));
    assert_eq!(std::fs::read(dir.join("simp_config.json")).unwrap(), before_bytes);
    assert_eq!(kernel.config, before);
}

#[test]
fn factory_reset_then_reboot_reenters_setup() {
    let dir = unique_temp_dir("simpos-core-reset-reboot");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new()
        .lines(&["", "admin", "pw"])
        .cancel()
        .lines(&["reset", "pw", "RESET", "reboot"])
        .lines(&["Neo", "", "changeme-admin", "", "", "neo"])
        .cancel()
        .line("shutdown");
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert_eq!(transcript.count("=== First time setup ==="), 1);
    let saved = store_in(&dir).read().unwrap().expect("config recreated");
    assert_eq!(saved.owner_name.as_deref(), Some("Neo"));
    assert_eq!(saved.admin_code, "changeme-admin");
}

#[test]
fn home_menu_shortcuts_return_home() {
    let dir = unique_temp_dir("simpos-core-home");
    let _cleanup = CleanupDir(dir.clone());

    // Apps → 取消 → 回到主菜单 → Shutdown。
    let console = ScriptedConsole::new()
        .lines(&["", "bob"])
        .choose(1)
        .cancel()
        .choose(5);
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert_eq!(transcript.count("--- Home ---"), 2);
    assert!(transcript.contains("Install app (shell command)"));
    assert!(dir.join("apps").is_dir());
}

#[test]
fn admin_tools_from_home_are_gated() {
    let dir = unique_temp_dir("simpos-core-home-admin");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new()
        .lines(&["", "bob"])
        .choose(3)
        .choose(5);
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert!(transcript.contains("ACCESS DENIED - ADMIN CODE REQUIRED"));
    assert!(!transcript.contains("--- Admin menu ---"));
}

#[test]
fn interrupt_in_menu_shuts_down_with_message() {
    let dir = unique_temp_dir("simpos-core-interrupt");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new().lines(&["", "bob"]).interrupt();
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Interrupted);
    let lines = transcript.lines();
    let interrupt = lines.iter().position(|l| l == INTERRUPT_MESSAGE).expect("interrupt");
    let farewell = lines.iter().position(|l| l == FAREWELL_MESSAGE).expect("farewell");
    assert!(interrupt < farewell);
}

#[test]
fn interrupt_while_reading_a_prompt_shuts_down() {
    let dir = unique_temp_dir("simpos-core-interrupt-prompt");
    let _cleanup = CleanupDir(dir.clone());

    let console = ScriptedConsole::new().line("").interrupt();
    let (mut kernel, transcript) = boot(&dir, completed_store(&dir), console);

    assert_eq!(kernel.run(), Exit::Interrupted);
    assert!(transcript.contains(INTERRUPT_MESSAGE));
}

#[test]
fn corrupt_config_boots_into_setup() {
    let dir = unique_temp_dir("simpos-core-corrupt");
    let _cleanup = CleanupDir(dir.clone());
    std::fs::write(dir.join("simp_config.json"), "{ not json").unwrap();

    let (mut kernel, transcript) = boot(&dir, store_in(&dir), ScriptedConsole::new());

    assert_eq!(kernel.run(), Exit::Shutdown);
    assert!(transcript.contains("=== First time setup ==="));
    // 损坏的文件已被默认配置覆盖。
    let saved = store_in(&dir).read().unwrap().expect("defaults saved");
    assert!(!saved.first_run_completed);
}
