//! 宿主能力抽象：主机信息查询与外部进程执行。
//!
//! 约定：
//! - 外部进程均同步执行，阻塞至结束
//! - 成功与否只看退出码（0 为成功），不解析输出；
//!   唯一例外是升级检查需要 [`Host::capture`] 读取修订号
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// 一条待执行的外部命令（程序、参数、工作目录）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 通过系统 shell 执行一整行命令（Unix: `sh -c`，Windows: `cmd /C`）。
    pub fn shell(line: &str, cwd: &Path) -> Self {
        if cfg!(windows) {
            Self::new("cmd", cwd).arg("/C").arg(line)
        } else {
            Self::new("sh", cwd).arg("-c").arg(line)
        }
    }

    /// 以 `repo_dir` 为工作目录执行 `git <args>`。
    pub fn git(repo_dir: &Path, args: &[&str]) -> Self {
        args.iter().fold(Self::new("git", repo_dir), |cmd, a| cmd.arg(*a))
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// 主机信息中的一项（标签 + 值）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoField {
    pub label: &'static str,
    pub value: String,
}

/// 宿主能力。
pub trait Host {
    /// 主机/系统信息（主机名、平台、内核、架构、运行时、负载、UTC 时间）。
    ///
    /// 异常处理：
    /// - 任一字段获取失败时直接省略该字段，不返回错误
    fn system_info(&mut self) -> Vec<InfoField>;

    /// 执行外部命令并等待结束。
    ///
    /// 返回值：
    /// - `Ok(true)`：退出码为 0
    /// - `Ok(false)`：进程已运行但退出码非 0
    ///
    /// 异常处理：
    /// - 进程无法启动（程序不存在、工作目录无效等）返回错误
    fn run(&mut self, command: &ExternalCommand) -> Result<bool>;

    /// 执行外部命令并返回去除首尾空白的标准输出。
    ///
    /// 异常处理：
    /// - 进程无法启动或退出码非 0 时返回错误
    fn capture(&mut self, command: &ExternalCommand) -> Result<String>;
}
