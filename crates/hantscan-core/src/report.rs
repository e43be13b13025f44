//! 文件级检测与报告格式化
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use crate::collect::extract_json_strings;
use crate::decode::read_text;
use crate::detector::{IndexBase, TraditionalDetector};
use crate::findings::StringFinding;

/// 预览文本的最大字符数
pub const PREVIEW_LIMIT: usize = 160;

/// 文件中是否存在繁体字；读取失败视为未命中
pub fn file_has_traditional(path: &Path, detector: &TraditionalDetector<'_>) -> bool {
    let text = match read_text(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(?path, error = %e, "unreadable file treated as no match");
            return false;
        }
    };
    let hit = extract_json_strings(&text).iter().any(|e| detector.has_traditional(&e.value));
    debug!(?path, hit, "checked");
    hit
}

/// 文件中每个含繁体字的字符串及其字符位置（按文档顺序）
pub fn file_traditional_details(path: &Path, detector: &TraditionalDetector<'_>, base: IndexBase) -> Vec<StringFinding> {
    let text = match read_text(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(?path, error = %e, "unreadable file treated as no match");
            return Vec::new();
        }
    };
    extract_json_strings(&text)
        .into_iter()
        .filter_map(|entry| {
            let positions = detector.traditional_char_positions(&entry.value, base);
            if positions.is_empty() {
                return None;
            }
            Some(StringFinding { pointer: entry.pointer.to_string(), value: entry.value, positions })
        })
        .collect()
}

/// 预览：转义 \r \n \t，超长时截断并以 `...` 结尾（总长不超过 limit）
pub fn preview_text(text: &str, limit: usize) -> String {
    let cleaned = text.replace('\r', "\\r").replace('\n', "\\n").replace('\t', "\\t");
    if cleaned.chars().count() <= limit {
        return cleaned;
    }
    let kept: String = cleaned.chars().take(limit.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// 以文本形式输出单个文件的详情
pub fn write_details_text(out: &mut dyn Write, rel: &str, findings: &[StringFinding]) -> Result<()> {
    writeln!(out, "{rel}")?;
    for f in findings {
        writeln!(out, "  {} {}", f.pointer, preview_text(&f.value, PREVIEW_LIMIT))?;
        for (ch, list) in f.positions.iter() {
            let pos = list.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",");
            writeln!(out, "    {ch} x{} @{pos}", list.len())?;
        }
    }
    Ok(())
}
