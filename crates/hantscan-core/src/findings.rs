//! 命中项：单个 JSON 字符串中的繁体字位置
use crate::detector::PositionIndex;

/// 单个命中字符串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringFinding {
    /// 已渲染的 JSON Pointer（根为 `/`）
    pub pointer: String,
    pub value: String,
    pub positions: PositionIndex,
}
