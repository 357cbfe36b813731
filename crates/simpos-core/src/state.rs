//! 会话状态机：状态、控制流信号与迁移表。
//!
//! 一个启动周期：
//! `Booting → [FirstRunSetup] → Diagnostics → LoggingIn → HomeMenu ↔ CommandLoop / 子菜单`
//! 最终到达 `ShuttingDown → Halted`，或经 `Rebooting` 回到 `Booting`（进程不退出）。
//!
//! 约定：
//! - 每个状态执行一步后产生一个 [`Step`]，由 [`transition`] 决定下一个状态
//! - 重启、关机、中断都是普通的 [`Flow`] 值，逐层返回，不使用 panic/错误表达
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

/// 会话状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Booting,
    FirstRunSetup,
    Diagnostics,
    LoggingIn,
    HomeMenu,
    CommandLoop,
    AppsMenu,
    SettingsMenu,
    AdminMenu,
    AiConsole,
    /// 丢弃会话并从配置文件重建，随后回到 `Booting`。
    Rebooting,
    /// 输出中断提示，随后进入 `ShuttingDown`。
    Interrupted,
    ShuttingDown,
    /// 终态。
    Halted,
}

/// 命令/菜单返回给外层循环的控制流信号。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// 继续当前循环。
    Continue,
    /// 回到主菜单。
    GoHome,
    /// 重新执行整个启动流程。
    Reboot,
    /// 结束会话。
    Shutdown,
    /// 用户中断（Ctrl+C）。
    Interrupted,
}

impl Flow {
    /// 对应分发器契约中的 “continueSession” 布尔值。
    pub fn continues(self) -> bool {
        !matches!(self, Flow::Shutdown | Flow::Interrupted)
    }
}

/// 主菜单选项（顺序即显示顺序）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeItem {
    OpenCommandLine,
    Apps,
    Settings,
    AdminTools,
    AiConsole,
    Shutdown,
    Reboot,
}

impl HomeItem {
    pub const ALL: [HomeItem; 7] = [
        HomeItem::OpenCommandLine,
        HomeItem::Apps,
        HomeItem::Settings,
        HomeItem::AdminTools,
        HomeItem::AiConsole,
        HomeItem::Shutdown,
        HomeItem::Reboot,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HomeItem::OpenCommandLine => "Open command line",
            HomeItem::Apps => "Apps",
            HomeItem::Settings => "Settings",
            HomeItem::AdminTools => "Admin tools",
            HomeItem::AiConsole => "AI console",
            HomeItem::Shutdown => "Shutdown",
            HomeItem::Reboot => "Reboot",
        }
    }
}

/// 单个状态执行一步后的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 本状态正常完成。
    Done,
    /// 启动时发现首次设置尚未完成。
    SetupRequired,
    /// 本状态需要再执行一次（例如登录失败）。
    Retry,
    /// 主菜单选中某项。
    Picked(HomeItem),
    /// 主菜单被取消。
    Cancelled,
    /// 命令/子菜单返回的控制流信号。
    Flow(Flow),
}

/// 迁移表。
///
/// 返回值：
/// - `Some(next)`：下一个状态
/// - `None`：该组合不存在（调用方应记录日志并关机）
pub fn transition(from: State, step: Step) -> Option<State> {
    use State::*;

    let next = match (from, step) {
        (Halted, _) => return None,
        (_, Step::Flow(Flow::Interrupted)) => Interrupted,
        (_, Step::Flow(Flow::Reboot)) => Rebooting,
        (_, Step::Flow(Flow::Shutdown)) => ShuttingDown,

        (Booting, Step::SetupRequired) => FirstRunSetup,
        (Booting, Step::Done) => Diagnostics,
        (FirstRunSetup, Step::Done) => Diagnostics,
        (Diagnostics, Step::Done) => LoggingIn,
        (LoggingIn, Step::Retry) => LoggingIn,
        (LoggingIn, Step::Done) => HomeMenu,

        (HomeMenu, Step::Cancelled) => CommandLoop,
        (HomeMenu, Step::Picked(item)) => match item {
            HomeItem::OpenCommandLine => CommandLoop,
            HomeItem::Apps => AppsMenu,
            HomeItem::Settings => SettingsMenu,
            HomeItem::AdminTools => AdminMenu,
            HomeItem::AiConsole => AiConsole,
            HomeItem::Shutdown => ShuttingDown,
            HomeItem::Reboot => Rebooting,
        },

        (CommandLoop, Step::Flow(Flow::Continue)) => CommandLoop,
        (CommandLoop, Step::Flow(Flow::GoHome)) => HomeMenu,

        (AppsMenu | SettingsMenu | AdminMenu | AiConsole, Step::Flow(_)) => HomeMenu,

        (Rebooting, Step::Done) => Booting,
        (Interrupted, Step::Done) => ShuttingDown,
        (ShuttingDown, Step::Done) => Halted,

        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_sequence_runs_setup_only_when_required() {
        assert_eq!(transition(State::Booting, Step::SetupRequired), Some(State::FirstRunSetup));
        assert_eq!(transition(State::Booting, Step::Done), Some(State::Diagnostics));
        assert_eq!(transition(State::FirstRunSetup, Step::Done), Some(State::Diagnostics));
        assert_eq!(transition(State::Diagnostics, Step::Done), Some(State::LoggingIn));
    }

    #[test]
    fn failed_login_retries() {
        assert_eq!(transition(State::LoggingIn, Step::Retry), Some(State::LoggingIn));
        assert_eq!(transition(State::LoggingIn, Step::Done), Some(State::HomeMenu));
    }

    #[test]
    fn home_menu_routes_every_item() {
        assert_eq!(transition(State::HomeMenu, Step::Cancelled), Some(State::CommandLoop));
        let expected = [
            State::CommandLoop,
            State::AppsMenu,
            State::SettingsMenu,
            State::AdminMenu,
            State::AiConsole,
            State::ShuttingDown,
            State::Rebooting,
        ];
        for (item, want) in HomeItem::ALL.into_iter().zip(expected) {
            assert_eq!(transition(State::HomeMenu, Step::Picked(item)), Some(want), "{item:?}");
        }
    }

    #[test]
    fn submenus_return_home_unless_signalled() {
        for s in [State::AppsMenu, State::SettingsMenu, State::AdminMenu, State::AiConsole] {
            assert_eq!(transition(s, Step::Flow(Flow::Continue)), Some(State::HomeMenu));
            assert_eq!(transition(s, Step::Flow(Flow::Reboot)), Some(State::Rebooting));
        }
    }

    #[test]
    fn command_loop_signals() {
        let cases = [
            (Flow::Continue, State::CommandLoop),
            (Flow::GoHome, State::HomeMenu),
            (Flow::Shutdown, State::ShuttingDown),
            (Flow::Reboot, State::Rebooting),
        ];
        for (flow, next) in cases {
            assert_eq!(
                transition(State::CommandLoop, Step::Flow(flow)),
                Some(next),
                "{flow:?}"
            );
        }
    }

    #[test]
    fn interrupt_from_anywhere_leads_to_halt() {
        for s in [State::Diagnostics, State::LoggingIn, State::HomeMenu, State::CommandLoop] {
            assert_eq!(transition(s, Step::Flow(Flow::Interrupted)), Some(State::Interrupted));
        }
        assert_eq!(transition(State::Interrupted, Step::Done), Some(State::ShuttingDown));
        assert_eq!(transition(State::ShuttingDown, Step::Done), Some(State::Halted));
        assert_eq!(transition(State::Rebooting, Step::Done), Some(State::Booting));
    }

    #[test]
    fn undefined_pairs_are_rejected() {
        assert_eq!(transition(State::Halted, Step::Done), None);
        assert_eq!(transition(State::Diagnostics, Step::Cancelled), None);
        assert_eq!(transition(State::CommandLoop, Step::Done), None);
    }
}
