//! 公共输出类型（JSON 详情报告的单个元素）
use serde::Serialize;

use crate::findings::StringFinding;

/// 单个字符的命中情况
#[derive(Debug, Clone, Serialize)]
pub struct CharHits {
    pub ch: String,
    pub count: usize,
    pub positions: Vec<usize>,
}

/// 详情记录：一个文件中的一个命中字符串
#[derive(Debug, Clone, Serialize)]
pub struct DetailRecord<'a> {
    pub file: &'a str,
    pub pointer: &'a str,
    pub value: &'a str,
    pub chars: Vec<CharHits>,
}

impl<'a> DetailRecord<'a> {
    pub fn new(file: &'a str, finding: &'a StringFinding) -> Self {
        let chars = finding
            .positions
            .iter()
            .map(|(ch, list)| CharHits { ch: ch.to_string(), count: list.len(), positions: list.to_vec() })
            .collect();
        Self { file, pointer: &finding.pointer, value: &finding.value, chars }
    }
}
