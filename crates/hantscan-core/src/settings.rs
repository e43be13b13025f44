//! 设置文件加载（TOML）
//!
//! 示例：
//! ```toml
//! [oracle]
//! bin = "opencc"
//! config = "t2s.json"
//! # dict = "dicts/TSCharacters.txt"  # 使用进程内词典代替外部进程
//!
//! [scan]
//! threads = 4
//! one_based = true
//! include_hidden = false
//! ```
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::SettingsError;

/// 未显式指定时自动读取的设置文件
pub const DEFAULT_SETTINGS_FILE: &str = "hantscan.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub bin: Option<String>,
    pub config: Option<String>,
    pub dict: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub threads: Option<usize>,
    pub one_based: Option<bool>,
    pub include_hidden: Option<bool>,
}

/// 顶层设置结构；所有字段可省略，命令行参数优先
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub oracle: OracleSettings,
    pub scan: ScanSettings,
}

pub fn parse_settings(text: &str, path: &Path) -> Result<Settings, SettingsError> {
    toml::from_str(text).map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })
}

/// 从 TOML 文件加载设置
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let txt = std::fs::read_to_string(path)
        .map_err(|source| SettingsError::Read { path: path.to_path_buf(), source })?;
    parse_settings(&txt, path)
}

/// 显式路径必须可读；否则仅在默认文件存在时加载
pub fn load_settings_or_default(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    if let Some(path) = explicit {
        return load_settings(path);
    }
    let default_path = Path::new(DEFAULT_SETTINGS_FILE);
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading default settings file");
        return load_settings(default_path);
    }
    Ok(Settings::default())
}
