//! 安全审计日志（仅驻留内存，进程生命周期内有效）。
//!
//! 说明：
//! - 条目按写入顺序追加，不可修改/删除
//! - 重启（reboot）不会清空日志；只有进程退出才会丢失
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

use crate::console::{Console, Tone};

/// 单条安全事件。
///
/// 字段说明：
/// - `timestamp`：UTC 时间，秒级精度，形如 `2026-10-14T08:30:00Z`
/// - `user`：事件主体用户名
/// - `event`：事件名（`admin_login` / `user_login` / `failed_login` / `access_denied` 等）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityLogEntry {
    pub timestamp: String,
    pub user: String,
    pub event: String,
}

/// 安全事件日志与失败登录计数。
#[derive(Debug, Default)]
pub struct SecurityLog {
    failed_logins: u32,
    entries: Vec<SecurityLogEntry>,
}

impl SecurityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条事件。
    pub fn log(&mut self, user: &str, event: &str) {
        self.entries.push(SecurityLogEntry {
            timestamp: utc_timestamp(),
            user: user.to_string(),
            event: event.to_string(),
        });
    }

    /// 记录一次失败登录：计数加一、写入 `failed_login` 事件并提示当前累计次数。
    pub fn record_failed_login(&mut self, console: &mut dyn Console, username: &str) {
        self.failed_logins += 1;
        self.log(username, "failed_login");
        warn!(failed_logins = self.failed_logins, "登录失败");
        console.error(&format!(
            "[SECURITY] Failed login attempts: {}",
            self.failed_logins
        ));
    }

    pub fn failed_logins(&self) -> u32 {
        self.failed_logins
    }

    pub fn entries(&self) -> &[SecurityLogEntry] {
        &self.entries
    }

    /// 按时间顺序输出全部事件。
    pub fn show(&self, console: &mut dyn Console) {
        if self.entries.is_empty() {
            console.print(Tone::System, "[SECURITY] No logs yet.");
            return;
        }
        console.print(Tone::System, "--- Security logs ---");
        for entry in &self.entries {
            console.print(
                Tone::System,
                &format!("{} | user={} | {}", entry.timestamp, entry.user, entry.event),
            );
        }
    }
}

/// 当前 UTC 时间（秒级，`Z` 结尾）。
pub fn utc_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
