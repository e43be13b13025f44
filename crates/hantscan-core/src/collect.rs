//! JSON 字符串收集：按文档顺序输出 (JSON Pointer, 字符串值)
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// JSON Pointer（RFC 6901 风格），空指针渲染为 `/`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn child(&self, token: String) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token);
        Self { tokens }
    }

    /// 解析已渲染的指针，恢复原始 token（`~1`→`/`，再 `~0`→`~`）
    pub fn parse(rendered: &str) -> Self {
        if rendered.is_empty() || rendered == "/" {
            return Self::root();
        }
        let body = rendered.strip_prefix('/').unwrap_or(rendered);
        let tokens = body.split('/').map(unescape_token).collect();
        Self { tokens }
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return f.write_str("/");
        }
        for t in &self.tokens {
            write!(f, "/{}", escape_token(t))?;
        }
        Ok(())
    }
}

/// 按 JSON Pointer 规则转义 token：先 `~`→`~0`，再 `/`→`~1`
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// 单个字符串条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStringEntry {
    pub pointer: JsonPointer,
    pub value: String,
}

/// 提取文本中的所有 JSON 字符串
/// - 可解析：按遍历顺序收集（对象保持插入顺序，数组保持下标顺序）；
/// - 不可解析：整段文本作为根路径 `/` 的单个条目，保证非 JSON 文件仍被扫描。
pub fn extract_json_strings(text: &str) -> Vec<JsonStringEntry> {
    match parse_json(text) {
        Ok(value) => {
            let mut out = Vec::new();
            collect_json_strings(&value, &JsonPointer::root(), &mut out);
            out
        }
        Err(_) => vec![JsonStringEntry { pointer: JsonPointer::root(), value: text.to_string() }],
    }
}

/// 解析 JSON，不设嵌套深度上限；深层嵌套时由 serde_stacker 按需扩栈
fn parse_json(text: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// 递归访问 JSON 值；数字、布尔、null 不携带文本，直接忽略
pub fn collect_json_strings(value: &Value, path: &JsonPointer, out: &mut Vec<JsonStringEntry>) {
    match value {
        Value::String(s) => out.push(JsonStringEntry { pointer: path.clone(), value: s.clone() }),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                collect_json_strings(item, &path.child(idx.to_string()), out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                collect_json_strings(item, &path.child(key.clone()), out);
            }
        }
        _ => {}
    }
}
