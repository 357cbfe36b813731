//! 真实终端：着色输出、打字动画、方向键菜单。
//!
//! 行为：
//! - 标准输入输出均为 TTY 时启用颜色、清屏与方向键菜单（↑/↓ 或 w/s 移动，ENTER 确认，q/ESC 取消）
//! - 否则（管道、重定向）退化为编号菜单：输入序号选择，空行取消
//! - 方向键菜单处于 raw 模式时 Ctrl+C 不产生信号，由菜单自身报告中断
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use simpos_core::console::{Console, Input, MenuChoice, Tone};
use tracing::warn;

const TYPE_DELAY: Duration = Duration::from_millis(20);

fn color_of(tone: Tone) -> Color {
    match tone {
        Tone::Primary => Color::Green,
        Tone::System => Color::Cyan,
        Tone::Error => Color::Red,
        Tone::Ai => Color::Magenta,
    }
}

/// raw 模式守卫：离开作用域时恢复终端。
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// 基于 stdin/stdout 的终端实现。
pub struct TerminalConsole {
    animate: bool,
    interactive: bool,
}

impl TerminalConsole {
    /// 参数：
    /// - `animate`：是否启用打字动画与人为延时（`--fast` 时为 false）
    pub fn new(animate: bool) -> Self {
        Self {
            animate,
            interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
        }
    }

    fn write_line(&self, tone: Tone, text: &str, newline: bool) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.interactive {
            queue!(out, SetForegroundColor(color_of(tone)), Print(text), ResetColor)?;
        } else {
            out.write_all(text.as_bytes())?;
        }
        if newline {
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    fn arrow_menu(&mut self, title: &str, options: &[&str]) -> io::Result<MenuChoice> {
        let _raw = RawMode::enable()?;
        let mut index = 0usize;
        loop {
            draw_menu(title, options, index)?;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(MenuChoice::Interrupted)
                }
                KeyCode::Up | KeyCode::Char('w') => {
                    index = (index + options.len() - 1) % options.len();
                }
                KeyCode::Down | KeyCode::Char('s') => index = (index + 1) % options.len(),
                KeyCode::Enter => return Ok(MenuChoice::Selected(index)),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(MenuChoice::Cancelled),
                _ => {}
            }
        }
    }

    /// 编号菜单；非法输入提示后重新选择。
    fn numbered_menu(&mut self, title: &str, options: &[&str]) -> MenuChoice {
        self.print(Tone::Primary, title);
        for (i, option) in options.iter().enumerate() {
            self.print(Tone::System, &format!("  {}) {option}", i + 1));
        }
        let hint = format!("Select [1-{}], ENTER to cancel: ", options.len());
        loop {
            let line = match self.read_line(&hint) {
                Input::Line(line) => line,
                Input::Eof => return MenuChoice::Cancelled,
                Input::Interrupted => return MenuChoice::Interrupted,
            };
            let line = line.trim();
            if line.is_empty() {
                return MenuChoice::Cancelled;
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return MenuChoice::Selected(n - 1),
                _ => self.error("Invalid choice."),
            }
        }
    }
}

fn draw_menu(title: &str, options: &[&str], index: usize) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    queue!(
        out,
        SetForegroundColor(Color::Green),
        Print(title),
        ResetColor,
        Print("\r\n\r\n")
    )?;
    for (i, option) in options.iter().enumerate() {
        let (marker, color) = if i == index {
            ("> ", Color::Green)
        } else {
            ("  ", Color::Cyan)
        };
        queue!(
            out,
            SetForegroundColor(color),
            Print(marker),
            Print(option),
            ResetColor,
            Print("\r\n")
        )?;
    }
    queue!(
        out,
        Print("\r\n"),
        SetForegroundColor(Color::Cyan),
        Print("Use UP/DOWN and ENTER. Press q to cancel."),
        ResetColor,
        Print("\r\n")
    )?;
    out.flush()
}

impl Console for TerminalConsole {
    fn print(&mut self, tone: Tone, text: &str) {
        if let Err(e) = self.write_line(tone, text, true) {
            warn!("终端输出失败: {e}");
        }
    }

    fn type_out(&mut self, tone: Tone, text: &str) {
        if !self.animate {
            let _ = self.write_line(tone, text, false);
            return;
        }
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let _ = self.write_line(tone, ch.encode_utf8(&mut buf), false);
            std::thread::sleep(TYPE_DELAY);
        }
    }

    fn read_line(&mut self, prompt: &str) -> Input {
        let _ = self.write_line(Tone::Primary, prompt, false);
        let mut buf = String::new();
        match io::stdin().lock().read_line(&mut buf) {
            Ok(0) => Input::Eof,
            Ok(_) => Input::Line(buf.trim_end_matches(&['\r', '\n'][..]).to_string()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Input::Interrupted,
            Err(e) => {
                warn!("读取输入失败: {e}");
                Input::Eof
            }
        }
    }

    fn select(&mut self, title: &str, options: &[&str]) -> MenuChoice {
        if options.is_empty() {
            return MenuChoice::Cancelled;
        }
        if self.interactive {
            match self.arrow_menu(title, options) {
                Ok(choice) => return choice,
                Err(e) => warn!("方向键菜单不可用，改用编号菜单: {e}"),
            }
        }
        self.numbered_menu(title, options)
    }

    fn clear(&mut self) {
        if !self.interactive {
            return;
        }
        let mut out = io::stdout();
        if let Err(e) = execute!(out, Clear(ClearType::All), MoveTo(0, 0)) {
            warn!("清屏失败: {e}");
        }
    }

    fn pause(&mut self, duration: Duration) {
        if self.animate {
            std::thread::sleep(duration);
        }
    }
}
