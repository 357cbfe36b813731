//! 内置 AI 助手（SimpAI）。
//!
//! 模式：
//! - `local`：极小的关键词应答表，完全离线
//! - `online`：预留接入点；需管理员允许在线 AI 且配置 API Key，否则明确拒绝
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use anyhow::Result;
use tracing::info;

use crate::config::{AiMode, Config, ConfigStore};
use crate::console::{Console, Tone};

/// 助手运行状态（仅用于展示）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiStatus {
    pub mode: AiMode,
    pub last_action: Option<String>,
    pub online_available: bool,
}

/// AI 助手。配置由调用方传入，助手本身不持有。
#[derive(Debug)]
pub struct Assistant {
    status: AiStatus,
}

impl Assistant {
    pub fn new(config: &Config) -> Self {
        Self {
            status: AiStatus {
                mode: config.ai_mode,
                last_action: None,
                online_available: config.online_ai_ready(),
            },
        }
    }

    pub fn status(&self) -> &AiStatus {
        &self.status
    }

    /// 输出助手状态；在线可用性按当前配置重新计算。
    pub fn show_status(&mut self, console: &mut dyn Console, config: &Config) {
        self.status.online_available = config.online_ai_ready();
        console.print(Tone::System, "--- SimpAI status ---");
        console.print(Tone::System, &format!("Mode          : {}", self.status.mode));
        console.print(
            Tone::System,
            &format!(
                "Online allowed: {} (api_key={})",
                config.allow_online_ai,
                if config.api_key.is_some() { "set" } else { "missing" }
            ),
        );
        console.print(
            Tone::System,
            &format!(
                "Online ready  : {}",
                if self.status.online_available { "yes" } else { "no" }
            ),
        );
        console.print(
            Tone::System,
            &format!(
                "Last action   : {}",
                self.status.last_action.as_deref().unwrap_or("-")
            ),
        );
    }

    /// 切换模式并立即落盘。
    ///
    /// 参数：
    /// - `raw_mode`：用户输入的模式名（`local` / `online`）
    ///
    /// 异常处理：
    /// - 模式名非法或在线前提不满足时只输出提示，不修改配置
    /// - 落盘失败返回错误（内存中的模式已切换）
    pub fn set_mode(
        &mut self,
        console: &mut dyn Console,
        config: &mut Config,
        store: &ConfigStore,
        raw_mode: &str,
    ) -> Result<()> {
        let Some(mode) = AiMode::parse(raw_mode) else {
            console.error("Unknown AI mode. Use 'local' or 'online'.");
            return Ok(());
        };
        if mode == AiMode::Online && !config.online_ai_ready() {
            console.error("Online mode not available. Admin must enable it and set API key.");
            return Ok(());
        }

        config.ai_mode = mode;
        self.status.mode = mode;
        self.status.online_available = config.online_ai_ready();
        self.status.last_action = Some(format!("Switched mode to {mode}"));
        info!(%mode, "AI 模式已切换");
        store.save(config)?;
        console.print(Tone::Ai, &format!("SimpAI mode set to {mode}."));
        Ok(())
    }

    /// 按当前配置模式回答问题。
    pub fn ask(&mut self, console: &mut dyn Console, config: &Config, question: &str) {
        match config.ai_mode {
            AiMode::Online => self.answer_online(console, config),
            AiMode::Local => {
                self.status.last_action = Some("local_answer".to_string());
                console.print(Tone::Ai, local_answer(question));
            }
        }
    }

    fn answer_online(&mut self, console: &mut dyn Console, config: &Config) {
        if !config.online_ai_ready() {
            console.error("ACCESS DENIED - ADMIN CODE REQUIRED or API key missing.");
            return;
        }
        // 在线接入点：当前只输出占位文本。
        console.print(
            Tone::Ai,
            "[ONLINE AI] This is a placeholder. Plug your own API call into the online handler.",
        );
        self.status.last_action = Some("online_placeholder".to_string());
    }
}

/// 本地关键词应答。
fn local_answer(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("help") && q.contains("command") {
        "In SimpOs you can type 'help' to list commands. Use 'status' for system info and 'ai status' for AI info."
    } else if q.contains("simpai") {
        "SimpAI is the integrated assistant. It can run fully offline or, if enabled by an admin, connect to an online API."
    } else {
        "Offline mode: I only know a few things.\nConfigure an online API and switch to 'ai online' for more powerful answers."
    }
}
