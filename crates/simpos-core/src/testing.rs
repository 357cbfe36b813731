//! 测试替身：回放预置输入的终端与记录调用的宿主。
//!
//! 说明：
//! - 二者均可 `clone`，克隆体共享同一份内部状态；测试在把替身交给
//!   [`crate::kernel::Kernel`] 之后仍可通过手里的克隆体检查输出与调用记录
//! - 输入队列耗尽时：读行返回 [`Input::Eof`]，菜单返回 [`MenuChoice::Cancelled`]
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::console::{Console, Input, MenuChoice, Tone};
use crate::host::{ExternalCommand, Host, InfoField};

#[derive(Debug, Clone)]
enum Scripted {
    Line(String),
    Choose(usize),
    Cancel,
    Interrupt,
    Eof,
}

/// 终端输出记录（每次 print/type_out/提示各占一条）。
#[derive(Debug, Clone, Default)]
pub struct Transcript(Rc<RefCell<Vec<String>>>);

impl Transcript {
    fn push(&self, text: &str) {
        self.0.borrow_mut().push(text.to_string());
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// 全部输出以换行拼接。
    pub fn text(&self) -> String {
        self.0.borrow().join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.borrow().iter().any(|l| l.contains(needle))
    }

    /// 包含 `needle` 的记录条数。
    pub fn count(&self, needle: &str) -> usize {
        self.0.borrow().iter().filter(|l| l.contains(needle)).count()
    }
}

/// 按顺序回放输入的终端。
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    inputs: Rc<RefCell<VecDeque<Scripted>>>,
    transcript: Transcript,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, item: Scripted) -> Self {
        self.inputs.borrow_mut().push_back(item);
        self
    }

    /// 下一次读行返回 `text`。
    pub fn line(self, text: &str) -> Self {
        self.push(Scripted::Line(text.to_string()))
    }

    pub fn lines(self, texts: &[&str]) -> Self {
        texts.iter().fold(self, |console, t| console.line(t))
    }

    /// 下一次菜单选中第 `index` 项（从 0 开始）。
    pub fn choose(self, index: usize) -> Self {
        self.push(Scripted::Choose(index))
    }

    pub fn cancel(self) -> Self {
        self.push(Scripted::Cancel)
    }

    /// 下一次读行或菜单报告用户中断。
    pub fn interrupt(self) -> Self {
        self.push(Scripted::Interrupt)
    }

    pub fn eof(self) -> Self {
        self.push(Scripted::Eof)
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    /// 尚未消费的输入条数。
    pub fn remaining(&self) -> usize {
        self.inputs.borrow().len()
    }

    fn next(&self) -> Option<Scripted> {
        self.inputs.borrow_mut().pop_front()
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, _tone: Tone, text: &str) {
        self.transcript.push(text);
    }

    fn type_out(&mut self, _tone: Tone, text: &str) {
        self.transcript.push(text);
    }

    fn read_line(&mut self, prompt: &str) -> Input {
        self.transcript.push(prompt);
        match self.next() {
            Some(Scripted::Line(line)) => Input::Line(line),
            Some(Scripted::Interrupt) => Input::Interrupted,
            Some(Scripted::Eof) | None => Input::Eof,
            Some(other) => panic!("prompt {prompt:?} got scripted menu input {other:?}"),
        }
    }

    fn select(&mut self, title: &str, options: &[&str]) -> MenuChoice {
        self.transcript.push(title);
        for option in options {
            self.transcript.push(option);
        }
        match self.next() {
            Some(Scripted::Choose(i)) => MenuChoice::Selected(i),
            Some(Scripted::Interrupt) => MenuChoice::Interrupted,
            Some(Scripted::Cancel) | None => MenuChoice::Cancelled,
            Some(other) => panic!("menu {title:?} got scripted line input {other:?}"),
        }
    }

    fn clear(&mut self) {}

    fn pause(&mut self, _duration: Duration) {}
}

#[derive(Debug, Default)]
struct FakeHostState {
    commands: Vec<ExternalCommand>,
    run_results: VecDeque<bool>,
    captures: HashMap<String, String>,
}

/// 记录全部外部命令的宿主，不启动任何真实进程。
///
/// 说明：
/// - `run` 依次返回 [`FakeHost::push_run_result`] 预置的结果，用尽后返回成功
/// - `capture` 按命令的显示文本（如 `git rev-parse HEAD`）查找预置输出，找不到时返回错误
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    state: Rc<RefCell<FakeHostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_run_result(&self, success: bool) -> &Self {
        self.state.borrow_mut().run_results.push_back(success);
        self
    }

    pub fn set_capture(&self, command_line: &str, output: &str) -> &Self {
        self.state
            .borrow_mut()
            .captures
            .insert(command_line.to_string(), output.to_string());
        self
    }

    /// 已执行的命令（run 与 capture 均记录）。
    pub fn commands(&self) -> Vec<ExternalCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.state
            .borrow()
            .commands
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl Host for FakeHost {
    fn system_info(&mut self) -> Vec<InfoField> {
        vec![
            InfoField {
                label: "Hostname",
                value: "fake-host".to_string(),
            },
            InfoField {
                label: "Platform",
                value: "TestOS 1.0".to_string(),
            },
        ]
    }

    fn run(&mut self, command: &ExternalCommand) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        state.commands.push(command.clone());
        Ok(state.run_results.pop_front().unwrap_or(true))
    }

    fn capture(&mut self, command: &ExternalCommand) -> Result<String> {
        let mut state = self.state.borrow_mut();
        state.commands.push(command.clone());
        let key = command.to_string();
        state
            .captures
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("no scripted output for `{key}`"))
    }
}
