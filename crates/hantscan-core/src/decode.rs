//! 文本解码：固定的 BOM 启发式（UTF-16 LE/BE → UTF-8 BOM → UTF-8）
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 将原始字节解码为字符串，永不失败
/// - 先判定 UTF-16 BOM（任一字节序），避免被误当作 UTF-8；
/// - 再去除 UTF-8 BOM；
/// - 非法序列以 U+FFFD 替换（尽力而为）。
pub fn decode_bytes(data: &[u8]) -> String {
    if data.starts_with(b"\xFF\xFE") {
        let (text, _) = encoding_rs::UTF_16LE.decode_with_bom_removal(data);
        return text.into_owned();
    }
    if data.starts_with(b"\xFE\xFF") {
        let (text, _) = encoding_rs::UTF_16BE.decode_with_bom_removal(data);
        return text.into_owned();
    }
    let body = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    String::from_utf8_lossy(body).into_owned()
}

/// 读取文件并解码；仅读取本身可能失败
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(decode_bytes(&data))
}
