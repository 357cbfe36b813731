//! 统一路径与目录约定。
//!
//! 目标：
//! - 将落盘路径集中管理，避免散落在各模块中
//! - 配置文件、应用目录、升级用 Git 仓库路径均以“相对当前工作目录”为默认约定
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// 默认配置文件路径（相对当前工作目录）。
pub const CONFIG_FILE: &str = "simp_config.json";

/// 默认应用目录（`apps` 命令从这里列出/启动/安装应用）。
pub const APPS_DIR: &str = "apps";

/// 确保目录存在（不存在则递归创建）。
///
/// 参数：
/// - `path`：目标目录路径
///
/// 异常处理：
/// - 目录创建失败（权限、路径非法等）会返回错误。
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory {}", path.display()))?;
    Ok(())
}

/// 将用户输入的路径解析为实际路径。
///
/// 参数：
/// - `base`：相对路径的基准目录（通常是应用目录）
/// - `raw`：原始路径字符串
///
/// 返回值：
/// - `raw` 为绝对路径：直接返回
/// - `raw` 为相对路径：返回 `base.join(raw)`
///
/// 异常处理：
/// - `raw` 为空字符串时返回错误，避免误用导致操作基准目录本身。
pub fn resolve_path(base: &Path, raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        return Err(anyhow!("empty path"));
    }
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        Ok(p)
    } else {
        Ok(base.join(p))
    }
}

/// 仓库目录下的 `.git` 路径（存在即视为 Git 克隆安装）。
pub fn git_dir(repo_dir: &Path) -> PathBuf {
    repo_dir.join(".git")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_joins_relative_and_keeps_absolute() {
        let base = Path::new("apps");
        assert_eq!(resolve_path(base, "hello.sh").unwrap(), base.join("hello.sh"));

        let abs = std::env::temp_dir().join("tool");
        assert_eq!(resolve_path(base, &abs.to_string_lossy()).unwrap(), abs);

        assert!(resolve_path(base, "").is_err());
    }
}
