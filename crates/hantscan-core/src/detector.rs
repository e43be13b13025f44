//! 繁体字检测：整串快速路径 + 逐字探测兜底（带缓存）
//!
//! 判定顺序（不可调换）：
//! 1. 不含 CJK 字符：直接返回空，不调用 oracle；
//! 2. 整串转换失败或结果不变：返回空；
//! 3. 转换前后字符数相同：逐位置比对，命中即返回；
//! 4. 其余情况（长度变化，或逐位置比对无命中）：逐字探测，结果写入缓存。
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::cjk::{has_cjk, is_cjk};
use crate::oracle::Converter;

/// 单字判定缓存；生命周期为一次运行，写入后不再修改
#[derive(Debug, Default)]
pub struct CharCache {
    inner: Mutex<HashMap<char, bool>>,
}

impl CharCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ch: char) -> Option<bool> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).get(&ch).copied()
    }

    /// 已存在的判定保持不变，返回最终生效的值
    fn insert(&self, ch: char, verdict: bool) -> bool {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner).entry(ch).or_insert(verdict)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 位置索引的起点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    #[default]
    Zero,
    One,
}

impl IndexBase {
    fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// 字符 → 出现位置列表；按字符首次出现顺序分组
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    entries: Vec<(char, Vec<usize>)>,
}

impl PositionIndex {
    fn push(&mut self, ch: char, pos: usize) {
        match self.entries.iter_mut().find(|(c, _)| *c == ch) {
            Some((_, list)) => list.push(pos),
            None => self.entries.push((ch, vec![pos])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, ch: char) -> Option<&[usize]> {
        self.entries.iter().find(|(c, _)| *c == ch).map(|(_, l)| l.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &[usize])> {
        self.entries.iter().map(|(c, l)| (*c, l.as_slice()))
    }
}

/// 繁体字检测器：组合 CJK 判定与 oracle，持有本次运行的单字缓存
pub struct TraditionalDetector<'a> {
    oracle: &'a dyn Converter,
    cache: CharCache,
}

impl<'a> TraditionalDetector<'a> {
    pub fn new(oracle: &'a dyn Converter) -> Self {
        Self { oracle, cache: CharCache::new() }
    }

    pub fn with_cache(oracle: &'a dyn Converter, cache: CharCache) -> Self {
        Self { oracle, cache }
    }

    pub fn cache(&self) -> &CharCache {
        &self.cache
    }

    /// 单字判定：先查缓存；oracle 失败视为非繁体
    pub fn is_traditional_char(&self, ch: char) -> bool {
        if let Some(v) = self.cache.get(ch) {
            return v;
        }
        let mut buf = [0u8; 4];
        let s: &str = ch.encode_utf8(&mut buf);
        let verdict = match self.oracle.convert(s) {
            Ok(mapped) => mapped != s,
            Err(e) => {
                warn!(%ch, error = %e, "single character probe failed");
                false
            }
        };
        self.cache.insert(ch, verdict)
    }

    /// 找出文本中的繁体字（去重，按码位升序）
    pub fn find_traditional_chars(&self, text: &str) -> Vec<char> {
        if !has_cjk(text) {
            return Vec::new();
        }
        let converted = match self.oracle.convert(text) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "bulk conversion failed, treating as no finding");
                return Vec::new();
            }
        };
        if converted == text {
            return Vec::new();
        }

        let mut chars: BTreeSet<char> = BTreeSet::new();
        if converted.chars().count() == text.chars().count() {
            // 快速路径：一对一转换时按位置比对
            for (original, simplified) in text.chars().zip(converted.chars()) {
                if is_cjk(original) && original != simplified {
                    chars.insert(original);
                }
            }
            if !chars.is_empty() {
                return chars.into_iter().collect();
            }
        }

        // 兜底路径：逐字探测
        debug!(len = text.len(), "falling back to per-character probing");
        for ch in text.chars() {
            if is_cjk(ch) && self.is_traditional_char(ch) {
                chars.insert(ch);
            }
        }
        chars.into_iter().collect()
    }

    pub fn has_traditional(&self, text: &str) -> bool {
        !self.find_traditional_chars(text).is_empty()
    }

    /// 逐字记录繁体字出现位置（仅用逐字探测，保证位置精确）
    pub fn traditional_char_positions(&self, text: &str, base: IndexBase) -> PositionIndex {
        let mut index = PositionIndex::default();
        for (i, ch) in text.chars().enumerate() {
            if !is_cjk(ch) || !self.is_traditional_char(ch) {
                continue;
            }
            index.push(ch, i + base.offset());
        }
        index
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::oracle::TableConverter;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 计数桩：记录 oracle 调用次数
    pub(crate) struct CountingOracle {
        pub(crate) inner: TableConverter,
        pub(crate) calls: AtomicUsize,
    }

    impl CountingOracle {
        pub(crate) fn new(pairs: &[(&str, &str)]) -> Self {
            let inner = TableConverter::from_pairs(pairs.iter().copied()).expect("build table");
            Self { inner, calls: AtomicUsize::new(0) }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Converter for CountingOracle {
        fn convert(&self, text: &str) -> Result<String, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.convert(text)
        }

        fn convert_file(&self, src: &Path, dst: &Path) -> Result<(), OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.convert_file(src, dst)
        }
    }

    /// 永远失败的 oracle
    pub(crate) struct BrokenOracle;

    impl Converter for BrokenOracle {
        fn convert(&self, _text: &str) -> Result<String, OracleError> {
            Err(OracleError::Failed { status: "exit status: 1".into(), stderr: "broken".into() })
        }

        fn convert_file(&self, _src: &Path, _dst: &Path) -> Result<(), OracleError> {
            Err(OracleError::Failed { status: "exit status: 1".into(), stderr: "broken".into() })
        }
    }

    const PAIRS: &[(&str, &str)] = &[("繁", "繁"), ("體", "体"), ("測", "测"), ("試", "试"), ("後", "后")];

    #[test]
    fn non_cjk_text_never_reaches_oracle() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::new(&oracle);
        assert!(det.find_traditional_chars("plain ascii, ひらがな, 한국어").is_empty());
        assert!(det.find_traditional_chars("").is_empty());
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn fast_path_uses_single_bulk_call() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::new(&oracle);
        assert_eq!(det.find_traditional_chars("繁體"), vec!['體']);
        assert_eq!(oracle.calls(), 1);
        assert!(det.cache().is_empty());
    }

    #[test]
    fn phrase_conversion_reports_only_changed_characters() {
        // 繁 在简体中不变，只有 體 被判定为繁体
        let oracle = CountingOracle::new(&[("繁體", "繁体")]);
        let det = TraditionalDetector::new(&oracle);
        assert_eq!(det.find_traditional_chars(r#"{"a":"繁體"}"#), vec!['體']);
        assert_eq!(oracle.calls(), 1);
    }

    #[test]
    fn simplified_text_has_no_finding() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::new(&oracle);
        assert!(!det.has_traditional("简体字"));
        assert_eq!(oracle.calls(), 1);
    }

    #[test]
    fn result_is_sorted_and_distinct() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::new(&oracle);
        let found = det.find_traditional_chars("試測試後測");
        let mut expected = vec!['試', '測', '後'];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn fast_path_agrees_with_exhaustive_probing() {
        let oracle = CountingOracle::new(PAIRS);
        let samples = ["繁體字測試", "abc 後來 xyz", "體體體", "没有繁体"];
        for text in samples {
            let det = TraditionalDetector::new(&oracle);
            let fast = det.find_traditional_chars(text);
            let probe = TraditionalDetector::new(&oracle);
            let mut exhaustive: Vec<char> =
                text.chars().filter(|c| is_cjk(*c) && probe.is_traditional_char(*c)).collect();
            exhaustive.sort();
            exhaustive.dedup();
            assert_eq!(fast, exhaustive, "mismatch for {text}");
        }
    }

    #[test]
    fn length_change_triggers_cached_fallback() {
        let oracle = CountingOracle::new(&[("陛下", "陛"), ("體", "体")]);
        let det = TraditionalDetector::new(&oracle);
        assert_eq!(det.find_traditional_chars("陛下體"), vec!['體']);
        // 1 次整串 + 3 个不同字符
        assert_eq!(oracle.calls(), 4);
        assert_eq!(det.cache().len(), 3);

        // 第二次只剩整串调用，逐字结果来自缓存
        assert_eq!(det.find_traditional_chars("陛下體體"), vec!['體']);
        assert_eq!(oracle.calls(), 5);
    }

    #[test]
    fn equal_length_without_cjk_difference_still_probes() {
        let oracle = CountingOracle::new(&[("‧", "·")]);
        let det = TraditionalDetector::new(&oracle);
        assert!(det.find_traditional_chars("繁‧").is_empty());
        assert_eq!(oracle.calls(), 2);
        assert_eq!(det.cache().get('繁'), Some(false));
    }

    #[test]
    fn injected_cache_is_owned_by_detector() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::with_cache(&oracle, CharCache::new());
        assert!(det.is_traditional_char('體'));
        assert!(!det.is_traditional_char('繁'));
        assert_eq!(det.cache().get('體'), Some(true));
        assert_eq!(oracle.calls(), 2);
    }

    #[test]
    fn oracle_failure_means_no_finding() {
        let det = TraditionalDetector::new(&BrokenOracle);
        assert!(det.find_traditional_chars("繁體").is_empty());
        assert!(!det.is_traditional_char('體'));
        assert_eq!(det.cache().get('體'), Some(false));
    }

    #[test]
    fn positions_group_by_first_occurrence() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::new(&oracle);
        let text = "a試體試b後";

        let zero = det.traditional_char_positions(text, IndexBase::Zero);
        let got: Vec<(char, Vec<usize>)> = zero.iter().map(|(c, l)| (c, l.to_vec())).collect();
        assert_eq!(got, vec![('試', vec![1, 3]), ('體', vec![2]), ('後', vec![5])]);

        let one = det.traditional_char_positions(text, IndexBase::One);
        assert_eq!(one.get('試'), Some(&[2, 4][..]));
        assert_eq!(one.get('a'), None);
    }

    #[test]
    fn positions_skip_simplified_and_cache_verdicts() {
        let oracle = CountingOracle::new(PAIRS);
        let det = TraditionalDetector::new(&oracle);
        assert!(det.traditional_char_positions("简体", IndexBase::Zero).is_empty());
        let calls = oracle.calls();
        let _ = det.traditional_char_positions("简体简体", IndexBase::Zero);
        assert_eq!(oracle.calls(), calls);
    }
}
