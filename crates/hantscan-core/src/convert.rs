//! 安全转换：同目录临时文件 → CRLF 不变量校验 → 原子替换
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::OracleError;
use crate::oracle::Converter;

/// 单个文件的转换结果（每个文件每次运行恰好一个）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Ok,
    Updated,
    WouldUpdate,
    Skip(String),
    Error(String),
}

impl ConversionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ConversionOutcome::Ok => "OK",
            ConversionOutcome::Updated => "UPDATED",
            ConversionOutcome::WouldUpdate => "WOULD-UPDATE",
            ConversionOutcome::Skip(_) => "SKIP",
            ConversionOutcome::Error(_) => "ERROR",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ConversionOutcome::Skip(r) | ConversionOutcome::Error(r) => Some(r.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 转换统计（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ConvertStats {
    pub ok: usize,
    pub updated: usize,
    pub would_update: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ConvertStats {
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        match outcome {
            ConversionOutcome::Ok => self.ok += 1,
            ConversionOutcome::Updated => self.updated += 1,
            ConversionOutcome::WouldUpdate => self.would_update += 1,
            ConversionOutcome::Skip(_) => self.skipped += 1,
            ConversionOutcome::Error(_) => self.errors += 1,
        }
    }
}

pub const CRLF_CHANGED: &str = "CRLF changed";

pub fn count_crlf(data: &[u8]) -> usize {
    data.windows(2).filter(|w| *w == b"\r\n").count()
}

/// 转换单个文件；任何失败都折叠为 `Error`，不会中断后续文件
pub fn safe_convert(path: &Path, oracle: &dyn Converter, dry_run: bool) -> ConversionOutcome {
    match try_convert(path, oracle, dry_run) {
        Ok(outcome) => {
            debug!(?path, status = outcome.label(), "converted");
            outcome
        }
        Err(e) => {
            warn!(?path, error = %e, "conversion failed");
            ConversionOutcome::Error(e.to_string())
        }
    }
}

fn try_convert(path: &Path, oracle: &dyn Converter, dry_run: bool) -> Result<ConversionOutcome, OracleError> {
    // 临时文件必须与目标同目录，rename 才是原子的
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    // NamedTempFile 在 drop 时删除自身，覆盖所有提前返回的路径
    let tmp = tempfile::Builder::new().prefix(".hantscan-").suffix(".tmp").tempfile_in(dir)?;

    oracle.convert_file(path, tmp.path())?;
    let original = std::fs::read(path)?;
    let converted = std::fs::read(tmp.path())?;

    if count_crlf(&original) != count_crlf(&converted) {
        return Ok(ConversionOutcome::Skip(CRLF_CHANGED.to_string()));
    }
    if original == converted {
        return Ok(ConversionOutcome::Ok);
    }
    if dry_run {
        return Ok(ConversionOutcome::WouldUpdate);
    }

    // 临时文件默认 0600，替换前沿用原文件权限
    let perms = std::fs::metadata(path)?.permissions();
    std::fs::set_permissions(tmp.path(), perms)?;
    tmp.persist(path).map_err(|e| OracleError::Io(e.error))?;
    Ok(ConversionOutcome::Updated)
}
