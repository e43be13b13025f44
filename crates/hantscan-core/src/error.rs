//! 错误类型
use std::path::PathBuf;
use thiserror::Error;

/// 转换能力（oracle）失败：必须与“转换结果无变化”区分开
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("conversion tool not found: {0}")]
    NotFound(String),
    #[error("conversion failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
    #[error("conversion produced invalid UTF-8")]
    InvalidUtf8,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 设置文件 / 词典文件加载失败
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("failed to build dictionary: {0}")]
    Dictionary(#[from] aho_corasick::BuildError),
}
