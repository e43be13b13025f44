//! 文件枚举：顶层文件夹、JSON 文件、隐藏项过滤
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// 扩展名为 `.json`（不区分大小写）
pub fn is_json_file(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".json")
}

fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// base 下的直接子目录，按名称排序
pub fn top_dirs(base: &Path, include_hidden: bool) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(base)? {
        let entry = match entry { Ok(e) => e, Err(_) => continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        if !include_hidden && is_hidden_name(&name) {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            dirs.push((name, path));
        }
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// 递归收集目录中的 JSON 文件（检测用，不过滤隐藏项），按遍历顺序
pub fn json_files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry { Ok(e) => e, Err(_) => continue };
        // 跟随符号链接判断：指向文件的链接同样收录
        if entry.path().is_file() && is_json_file(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    files
}

fn keep_entry(entry: &DirEntry, include_hidden: bool) -> bool {
    // 显式给出的根目录总是保留
    if include_hidden || entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if is_hidden_name(&name) {
        return false;
    }
    !(entry.file_type().is_dir() && name == "__pycache__")
}

/// 收集转换目标：显式文件（.json 即收录）与目录下的 JSON 文件；去重后按路径字符串排序
pub fn collect_json_files(targets: &[PathBuf], include_hidden: bool) -> Vec<PathBuf> {
    let mut files: HashSet<PathBuf> = HashSet::new();
    for target in targets {
        if target.is_file() {
            if target.file_name().is_some_and(|n| is_json_file(&n.to_string_lossy())) {
                files.insert(target.clone());
            }
            continue;
        }
        if !target.is_dir() {
            continue;
        }
        let walker = WalkDir::new(target).into_iter().filter_entry(|e| keep_entry(e, include_hidden));
        for entry in walker {
            let entry = match entry { Ok(e) => e, Err(_) => continue };
            if entry.path().is_file() && is_json_file(&entry.file_name().to_string_lossy()) {
                files.insert(entry.into_path());
            }
        }
    }
    // 按完整路径字符串排序（而非按路径分量），`a-b/x.json` 排在 `a/x.json` 之前
    let mut files: Vec<PathBuf> = files.into_iter().collect();
    files.sort_by_cached_key(|p| p.to_string_lossy().into_owned());
    files
}

/// 相对 base 的显示路径；去掉 `./` 前缀
pub fn relative_display(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    let cleaned: PathBuf = rel.components().filter(|c| !matches!(c, Component::CurDir)).collect();
    cleaned.display().to_string()
}
