//! 繁体中文检测与安全转换核心库
//!
//! 设计要点：
//! - 检测：BOM 解码 → JSON 字符串收集（带 JSON Pointer）→ 繁体字判定；
//! - 判定优先走“整串转换 + 逐位置比对”的快速路径，长度变化时退回逐字探测并缓存；
//! - 转换：外部 oracle 整文件转换到同目录临时文件，CRLF 数量不变才原子替换；
//! - oracle 抽象为 `Converter`，外部 opencc 进程与进程内词典可互换。

mod cjk;
mod collect;
mod convert;
mod decode;
mod detector;
mod error;
mod findings;
mod options;
mod oracle;
mod report;
mod scan;
mod settings;
mod types;
mod walk;

pub use cjk::{has_cjk, is_cjk, CJK_RANGES};
pub use collect::{collect_json_strings, escape_token, extract_json_strings, JsonPointer, JsonStringEntry};
pub use convert::{count_crlf, safe_convert, ConversionOutcome, ConvertStats, CRLF_CHANGED};
pub use decode::{decode_bytes, read_text};
pub use detector::{CharCache, IndexBase, PositionIndex, TraditionalDetector};
pub use error::{OracleError, SettingsError};
pub use findings::StringFinding;
pub use options::{CheckOptions, ConvertOptions, OutputFormat, ReportMode, ScanStats};
pub use oracle::{Converter, OpenccCommand, TableConverter, DEFAULT_OPENCC_BIN, DEFAULT_OPENCC_CONFIG};
pub use report::{file_has_traditional, file_traditional_details, preview_text, write_details_text, PREVIEW_LIMIT};
pub use scan::{check_and_write, convert_and_write, NO_FOLDERS, NO_JSON_FILES, NO_MATCHES};
pub use settings::{
    load_settings, load_settings_or_default, parse_settings, OracleSettings, ScanSettings, Settings, DEFAULT_SETTINGS_FILE,
};
pub use types::{CharHits, DetailRecord};
pub use walk::{collect_json_files, is_json_file, json_files_under, relative_display, top_dirs};
