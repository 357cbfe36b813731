//! 配置记录落盘模型（simp_config.json）。
//!
//! 目的：
//! - 保存管理员口令、AI 模式、API Key、升级仓库地址、机主名称与首次设置标志
//! - 每次修改后立即写回（write-through），不做批量缓存
//!
//! 容错约定：
//! - 文件不存在：使用默认值并立即写出一份默认配置
//! - 文件损坏/不可读：回退到默认值并覆盖写出，不向调用方抛错
//! - 单个字段缺失：仅该字段取默认值（`#[serde(default)]`）
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 出厂默认管理员口令。
pub const DEFAULT_ADMIN_CODE: &str = "changeme-admin";

/// AI 助手工作模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiMode {
    #[default]
    /// 本地关键词应答。
    Local,
    /// 在线模式（需管理员开启并配置 API Key）。
    Online,
}

impl AiMode {
    /// 解析命令行中的模式名（大小写不敏感）。
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "online" => Some(Self::Online),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for AiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 系统配置（进程内单份，由 [`crate::kernel::Kernel`] 持有）。
///
/// 字段说明：
/// - `admin_code`：管理员口令（登录 admin、恢复出厂设置时校验）
/// - `ai_mode`：AI 助手当前模式
/// - `api_key`：在线 AI 的凭据（为空表示未配置）
/// - `allow_online_ai`：管理员是否允许在线 AI
/// - `update_repo_url`：升级用 Git 远端地址
/// - `owner_name`：机主名称（主菜单问候语使用）
/// - `first_run_completed`：首次设置是否已完成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub admin_code: String,
    pub ai_mode: AiMode,
    pub api_key: Option<String>,
    pub allow_online_ai: bool,
    pub update_repo_url: Option<String>,
    pub owner_name: Option<String>,
    pub first_run_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
            ai_mode: AiMode::Local,
            api_key: None,
            allow_online_ai: false,
            update_repo_url: None,
            owner_name: None,
            first_run_completed: false,
        }
    }
}

impl Config {
    /// 在线 AI 是否满足使用前提（已允许且 API Key 非空）。
    pub fn online_ai_ready(&self) -> bool {
        self.allow_online_ai && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// 配置持久化错误。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read configuration {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration {} is not valid JSON", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write configuration {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete configuration {}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize configuration")]
    Serialize(#[from] serde_json::Error),
}

/// 配置文件存取（固定路径的单个 JSON 文件）。
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// 读取配置；失败时回退到默认值。
    ///
    /// 返回值：
    /// - 总是返回一份可用的 [`Config`]
    ///
    /// 异常处理：
    /// - 文件不存在或解析失败时写出默认配置；写出失败仅记录日志
    pub fn load_or_default(&self) -> Config {
        match self.read() {
            Ok(Some(cfg)) => return cfg,
            Ok(None) => info!("配置文件不存在，创建默认配置: {}", self.path.display()),
            Err(e) => warn!("配置文件不可用，回退到默认配置: {e}"),
        }
        let cfg = Config::default();
        if let Err(e) = self.save(&cfg) {
            warn!("写入默认配置失败: {e}");
        }
        cfg
    }

    /// 读取并解析配置文件。
    ///
    /// 返回值：
    /// - `Ok(None)`：文件不存在
    /// - `Ok(Some(cfg))`：解析成功
    pub fn read(&self) -> Result<Option<Config>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let cfg = serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(cfg))
    }

    /// 将配置序列化为格式化 JSON 并写入文件（父目录不存在时自动创建）。
    pub fn save(&self, cfg: &Config) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(cfg)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// 删除配置文件（恢复出厂设置）。
    ///
    /// 异常处理：
    /// - 删除失败（含文件不存在）返回错误，调用方应中止重置流程
    pub fn delete(&self) -> Result<(), StoreError> {
        std::fs::remove_file(&self.path).map_err(|source| StoreError::Delete {
            path: self.path.clone(),
            source,
        })
    }
}
