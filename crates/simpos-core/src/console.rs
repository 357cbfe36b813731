//! 终端交互抽象（输出着色文本、读取一行输入、方向键菜单）。
//!
//! 说明：
//! - 核心逻辑只依赖 [`Console`] trait；真实终端实现位于 `simpos-host`
//! - 测试使用 [`crate::testing::ScriptedConsole`] 回放预置输入
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::time::Duration;

use crate::state::Flow;

/// 输出语义色调（由具体终端实现映射为颜色）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// 主色（标题、提示），绿色。
    Primary,
    /// 系统信息，青色。
    System,
    /// 错误/拒绝，红色。
    Error,
    /// AI 助手回答，品红。
    Ai,
}

/// 读取一行输入的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// 一行文本（不含换行符）。
    Line(String),
    /// 输入流结束。
    Eof,
    /// 用户中断（Ctrl+C）。
    Interrupted,
}

/// 菜单选择结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 选中项下标（从 0 开始）。
    Selected(usize),
    /// 取消（q / ESC / 空输入）。
    Cancelled,
    /// 用户中断（Ctrl+C）。
    Interrupted,
}

/// 终端交互能力。
pub trait Console {
    /// 输出一整行。
    fn print(&mut self, tone: Tone, text: &str);

    /// 逐字输出（打字动画），不换行。
    fn type_out(&mut self, tone: Tone, text: &str);

    /// 显示提示并读取一行。
    fn read_line(&mut self, prompt: &str) -> Input;

    /// 显示标题与选项列表，返回选择结果。
    fn select(&mut self, title: &str, options: &[&str]) -> MenuChoice;

    /// 清屏。
    fn clear(&mut self);

    /// 人为延时（启动自检动画用）；快速模式下实现可直接忽略。
    fn pause(&mut self, duration: Duration);

    fn error(&mut self, text: &str) {
        self.print(Tone::Error, text);
    }

    fn blank(&mut self) {
        self.print(Tone::System, "");
    }
}

/// 读取一行并去除首尾空白。
///
/// 返回值：
/// - `Ok(text)`：读到一行
/// - `Err(Flow::Shutdown)`：输入流结束
/// - `Err(Flow::Interrupted)`：用户中断
pub fn prompt(console: &mut dyn Console, text: &str) -> Result<String, Flow> {
    match console.read_line(text) {
        Input::Line(line) => Ok(line.trim().to_string()),
        Input::Eof => Err(Flow::Shutdown),
        Input::Interrupted => Err(Flow::Interrupted),
    }
}
