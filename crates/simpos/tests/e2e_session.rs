use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use uuid::Uuid;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content)
        .unwrap_or_else(|e| panic!("write {} failed: {e}", path.display()));
}

fn write_completed_config(dir: &Path, admin_code: &str) {
    let cfg = serde_json::json!({
        "admin_code": admin_code,
        "owner_name": "Tester",
        "first_run_completed": true
    });
    write_file(&dir.join("simp_config.json"), &cfg.to_string());
}

fn run_simpos(dir: &Path, stdin: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_simpos");
    let mut child = Command::new(exe)
        .arg("--config")
        .arg(dir.join("simp_config.json"))
        .arg("--apps-dir")
        .arg(dir.join("apps"))
        .arg("--repo-dir")
        .arg(dir)
        .arg("--fast")
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn simpos");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait simpos")
}

fn assert_success(out: &Output) -> String {
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    assert!(
        out.status.success(),
        "simpos failed: status={:?}, stdout={}, stderr={}",
        out.status.code(),
        stdout,
        String::from_utf8_lossy(&out.stderr)
    );
    stdout
}

#[test]
fn e2e_first_boot_runs_setup_and_persists_owner() {
    let dir = unique_temp_dir("simpos-first-boot");
    let _cleanup = CleanupDir(dir.clone());

    let out = run_simpos(
        &dir,
        "Alice\nsecret\nsecret\n\n\nalice\n1\nwhoami\nstatus\nshutdown\n",
    );
    let stdout = assert_success(&out);

    assert!(stdout.contains("=== First time setup ==="), "stdout: {stdout}");
    assert!(stdout.contains("Loading kernel modules..."), "stdout: {stdout}");
    assert!(stdout.contains("Welcome, Alice."), "stdout: {stdout}");
    assert!(stdout.contains("alice (user)"), "stdout: {stdout}");
    assert!(stdout.contains("Network: ONLINE (simulated)"), "stdout: {stdout}");
    assert!(stdout.contains("SimpOs is now shutting down..."), "stdout: {stdout}");

    let raw = std::fs::read_to_string(dir.join("simp_config.json")).expect("config written");
    let cfg: serde_json::Value = serde_json::from_str(&raw).expect("config is JSON");
    assert_eq!(cfg["owner_name"], "Alice");
    assert_eq!(cfg["admin_code"], "secret");
    assert_eq!(cfg["first_run_completed"], true);
}

#[test]
fn e2e_admin_login_retries_after_wrong_code() {
    let dir = unique_temp_dir("simpos-admin-login");
    let _cleanup = CleanupDir(dir.clone());
    write_completed_config(&dir, "pw");

    let out = run_simpos(&dir, "\nadmin\nwrong\nadmin\npw\n1\nwhoami\nadmin\n1\nshutdown\n");
    let stdout = assert_success(&out);

    assert!(stdout.contains("Invalid admin code."), "stdout: {stdout}");
    assert!(stdout.contains("[SECURITY] Failed login attempts: 1"), "stdout: {stdout}");
    assert!(stdout.contains("admin (admin)"), "stdout: {stdout}");
    assert!(stdout.contains("user=admin | failed_login"), "stdout: {stdout}");
    assert!(stdout.contains("user=admin | admin_login"), "stdout: {stdout}");
}

#[test]
fn e2e_reboot_from_home_menu_reruns_boot() {
    let dir = unique_temp_dir("simpos-reboot");
    let _cleanup = CleanupDir(dir.clone());
    write_completed_config(&dir, "pw");

    // 7 = Reboot；第二轮主菜单读到 EOF 后进入命令行，再次 EOF 即关机。
    let out = run_simpos(&dir, "\nbob\n7\n\nbob\n");
    let stdout = assert_success(&out);

    assert_eq!(stdout.matches("Loading kernel modules").count(), 2, "stdout: {stdout}");
    assert!(stdout.contains("Rebooting SimpOs..."), "stdout: {stdout}");
    assert!(!stdout.contains("=== First time setup ==="), "stdout: {stdout}");
}

#[test]
fn e2e_non_admin_reset_is_denied_and_config_survives() {
    let dir = unique_temp_dir("simpos-reset-denied");
    let _cleanup = CleanupDir(dir.clone());
    write_completed_config(&dir, "pw");

    let out = run_simpos(&dir, "\n\n1\nreset\nmkdir docs\nshutdown\n");
    let stdout = assert_success(&out);

    assert!(stdout.contains("ACCESS DENIED - ADMIN CODE REQUIRED"), "stdout: {stdout}");
    assert!(stdout.contains("[FUTURE]"), "stdout: {stdout}");
    assert!(dir.join("simp_config.json").is_file());
}

#[test]
fn e2e_end_of_input_shuts_down_cleanly() {
    let dir = unique_temp_dir("simpos-eof");
    let _cleanup = CleanupDir(dir.clone());

    let out = run_simpos(&dir, "");
    let stdout = assert_success(&out);
    assert!(stdout.contains("SimpOs is now shutting down..."), "stdout: {stdout}");
}

struct CleanupDir(PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
