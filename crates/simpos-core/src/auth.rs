//! 登录鉴权与管理员权限校验。
//!
//! 规则：
//! - 用户名 `admin`（大小写不敏感）需要输入配置中的管理员口令
//! - 其他用户名无需密码，直接以普通用户身份登录；空用户名视为 `guest`
//! - 只有 admin 登录可能失败，失败时记录 `failed_login` 并累加计数
//! - 权限校验失败记录 `access_denied`
//!
//! 安全注意：
//! - 口令为明文比较，仅适用于演示环境；口令与 API Key 不写日志
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use tracing::info;

use crate::config::Config;
use crate::console::{prompt, Console, Tone};
use crate::security::SecurityLog;
use crate::state::Flow;

/// 管理员用户名。
pub const ADMIN_USERNAME: &str = "admin";

/// 空用户名时使用的默认用户名。
pub const GUEST_USERNAME: &str = "guest";

/// 已登录用户（仅在一个启动周期内有效，不落盘）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub is_admin: bool,
}

impl User {
    pub fn role(&self) -> &'static str {
        if self.is_admin {
            "admin"
        } else {
            "user"
        }
    }
}

/// 当前会话的鉴权状态。
#[derive(Debug, Default)]
pub struct Auth {
    current: Option<User>,
}

impl Auth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.current.as_ref().is_some_and(|u| u.is_admin)
    }

    /// 当前用户名；未登录时为 `none`（用于审计日志）。
    pub fn principal(&self) -> &str {
        self.current
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("none")
    }

    /// 丢弃当前登录状态（重启时调用）。
    pub fn logout(&mut self) {
        self.current = None;
    }

    /// 执行一次登录尝试。
    ///
    /// 返回值：
    /// - `Ok(Some(user))`：登录成功，同时设为当前用户
    /// - `Ok(None)`：admin 口令错误（调用方应重试）
    /// - `Err(flow)`：输入结束或被中断
    pub fn login(
        &mut self,
        console: &mut dyn Console,
        config: &Config,
        security: &mut SecurityLog,
    ) -> Result<Option<User>, Flow> {
        console.print(Tone::Primary, "Login to SimpOs");
        let mut username = prompt(console, "Username: ")?;
        if username.is_empty() {
            username = GUEST_USERNAME.to_string();
        }

        let user = if username.eq_ignore_ascii_case(ADMIN_USERNAME) {
            let code = prompt(console, "Admin code: ")?;
            if code != config.admin_code {
                console.error("Invalid admin code.");
                security.record_failed_login(console, &username);
                return Ok(None);
            }
            security.log(ADMIN_USERNAME, "admin_login");
            User {
                username: ADMIN_USERNAME.to_string(),
                is_admin: true,
            }
        } else {
            security.log(&username, "user_login");
            User {
                username,
                is_admin: false,
            }
        };

        info!(user = %user.username, admin = user.is_admin, "登录成功");
        self.current = Some(user.clone());
        Ok(Some(user))
    }

    /// 校验当前用户是否为管理员。
    ///
    /// 返回值：
    /// - `true`：已登录且为管理员
    /// - `false`：已输出拒绝提示并记录 `access_denied`；调用方必须立即返回，不做任何修改
    pub fn require_admin(&self, console: &mut dyn Console, security: &mut SecurityLog) -> bool {
        if self.is_admin() {
            return true;
        }
        security.log(self.principal(), "access_denied");
        console.error("ACCESS DENIED - ADMIN CODE REQUIRED");
        false
    }
}
