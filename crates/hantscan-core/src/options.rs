//! 检测 / 转换选项与统计信息（模块）
use crate::detector::IndexBase;

/// 检测报告模式
/// - List：列出命中文件的相对路径；
/// - Summary：按顶层文件夹输出 YES/NO；
/// - Details：输出每个命中字符串的 JSON 路径、预览与字符位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    List,
    Summary,
    Details,
}

/// 详情输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 检测选项
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub mode: ReportMode,
    /// Summary 模式下列出命中文件（同时关闭“首个命中即停止”）
    pub list_files: bool,
    /// 位置索引起点（仅 Details 生效）
    pub index_base: IndexBase,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    pub format: OutputFormat,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            mode: ReportMode::List,
            list_files: false,
            index_base: IndexBase::Zero,
            threads: Some(1),
            format: OutputFormat::Text,
        }
    }
}

/// 转换选项
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub dry_run: bool,
    /// 是否包含隐藏文件 / 目录（以及 __pycache__）
    pub include_hidden: bool,
}

/// 检测统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub folders_scanned: usize,
    pub files_scanned: usize,
    pub files_matched: usize,
}
