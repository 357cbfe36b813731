//! 应用目录：列出、按扩展名构造启动命令、构造安装命令。
//!
//! 启动规则（按扩展名，大小写不敏感）：
//! - `.py`：`python3`（Windows 下为 `python`）
//! - `.sh`：`sh`
//! - `.js`：`node`
//! - 其他：直接执行该文件
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::host::ExternalCommand;
use crate::paths;

/// 列出应用目录中的普通文件名（按名称排序）；目录不存在时先创建。
pub fn list_apps(dir: &Path) -> Result<Vec<String>> {
    paths::ensure_dir(dir)?;
    let mut names = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

/// 为应用目录中的 `name` 构造启动命令（工作目录为应用目录）。
///
/// 相对的 `dir` 先按当前工作目录转为绝对路径，子进程切换到应用目录后目标路径仍然有效。
///
/// 异常处理：
/// - 无法获取当前工作目录时返回错误
/// - 文件不存在时返回错误
pub fn launch_command(dir: &Path, name: &str) -> Result<ExternalCommand> {
    let dir = absolute_dir(dir)?;
    let path = paths::resolve_path(&dir, name)?;
    if !path.is_file() {
        return Err(anyhow!("app not found: {}", path.display()));
    }
    let target = path.to_string_lossy().to_string();
    Ok(match interpreter_for(&path) {
        Some(interpreter) => ExternalCommand::new(interpreter, &dir).arg(target),
        None => ExternalCommand::new(target, &dir),
    })
}

/// 在应用目录中通过 shell 执行一行安装命令。
pub fn install_command(dir: &Path, line: &str) -> ExternalCommand {
    ExternalCommand::shell(line, dir)
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(dir))
}

fn interpreter_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "py" if cfg!(windows) => Some("python"),
        "py" => Some("python3"),
        "sh" => Some("sh"),
        "js" => Some("node"),
        _ => None,
    }
}
