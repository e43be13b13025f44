//! CJK 表意文字判定（固定码位区间）

/// CJK 表意文字码位区间（闭区间，互不重叠）
pub const CJK_RANGES: [(u32, u32); 7] = [
    (0x4E00, 0x9FFF),   // 基本区
    (0x3400, 0x4DBF),   // 扩展 A
    (0xF900, 0xFAFF),   // 兼容表意文字
    (0x20000, 0x2A6DF), // 扩展 B
    (0x2A700, 0x2B73F), // 扩展 C
    (0x2B740, 0x2B81F), // 扩展 D
    (0x2B820, 0x2CEAF), // 扩展 E
];

/// 字符是否落在 CJK 表意文字区间内
pub fn is_cjk(ch: char) -> bool {
    let code = ch as u32;
    CJK_RANGES.iter().any(|&(lo, hi)| lo <= code && code <= hi)
}

/// 文本中是否含有任一 CJK 字符
pub fn has_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}
