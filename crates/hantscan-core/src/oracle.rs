//! 繁→简转换能力（oracle）适配层
//!
//! - `Converter` 抽象一次转换：短字符串（逐字探测）或整文件（安全转换）；
//! - `OpenccCommand` 调用外部 `opencc` 进程；
//! - `TableConverter` 为进程内词典表（最长匹配），便于离线运行与测试。
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use aho_corasick::{AhoCorasick, MatchKind};
use tracing::debug;

use crate::error::{OracleError, SettingsError};

pub const DEFAULT_OPENCC_BIN: &str = "opencc";
pub const DEFAULT_OPENCC_CONFIG: &str = "t2s.json";

/// 转换能力接口；失败必须返回 `Err`，不可伪装成“无变化”
pub trait Converter: Send + Sync {
    /// 转换一段文本
    fn convert(&self, text: &str) -> Result<String, OracleError>;
    /// 将 `src` 整文件转换后写入 `dst`
    fn convert_file(&self, src: &Path, dst: &Path) -> Result<(), OracleError>;
}

/// 外部 opencc 进程
#[derive(Debug, Clone)]
pub struct OpenccCommand {
    pub bin: String,
    pub config: String,
}

impl Default for OpenccCommand {
    fn default() -> Self {
        Self { bin: DEFAULT_OPENCC_BIN.to_string(), config: DEFAULT_OPENCC_CONFIG.to_string() }
    }
}

impl OpenccCommand {
    pub fn new(bin: impl Into<String>, config: impl Into<String>) -> Self {
        Self { bin: bin.into(), config: config.into() }
    }

    /// 启动期可用性检查：显式路径直接判断，否则在 PATH 中查找
    pub fn locate(&self) -> Result<PathBuf, OracleError> {
        let candidate = Path::new(&self.bin);
        if candidate.components().count() > 1 {
            return if candidate.is_file() {
                Ok(candidate.to_path_buf())
            } else {
                Err(OracleError::NotFound(self.bin.clone()))
            };
        }
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        for dir in std::env::split_paths(&path_var) {
            let full = dir.join(&self.bin);
            if full.is_file() {
                return Ok(full);
            }
            if cfg!(windows) {
                let exe = full.with_extension("exe");
                if exe.is_file() {
                    return Ok(exe);
                }
            }
        }
        Err(OracleError::NotFound(self.bin.clone()))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("-c").arg(&self.config);
        cmd
    }
}

fn spawn_error(bin: &str, e: std::io::Error) -> OracleError {
    if e.kind() == std::io::ErrorKind::NotFound {
        OracleError::NotFound(bin.to_string())
    } else {
        OracleError::Io(e)
    }
}

fn failure(status: std::process::ExitStatus, stderr: &[u8]) -> OracleError {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    OracleError::Failed {
        status: status.to_string(),
        stderr: if stderr.is_empty() { "opencc failed".to_string() } else { stderr },
    }
}

/// 写 stdin 的结果：子进程提前关闭管道（BrokenPipe）以退出码为准，其余失败视为输入不完整
fn check_stdin_write(written: std::thread::Result<std::io::Result<()>>) -> Result<(), OracleError> {
    match written {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Ok(Err(e)) => Err(OracleError::Io(e)),
        Err(_) => Err(OracleError::Io(std::io::Error::new(std::io::ErrorKind::Other, "stdin writer panicked"))),
    }
}

impl Converter for OpenccCommand {
    fn convert(&self, text: &str) -> Result<String, OracleError> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&self.bin, e))?;

        // 写 stdin 放到独立线程，避免大文本时管道互相阻塞
        let mut stdin = child.stdin.take().ok_or_else(|| {
            OracleError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin unavailable"))
        })?;
        let input = text.as_bytes().to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;
        let written = writer.join();

        if !output.status.success() {
            return Err(failure(output.status, &output.stderr));
        }
        check_stdin_write(written)?;
        String::from_utf8(output.stdout).map_err(|_| OracleError::InvalidUtf8)
    }

    fn convert_file(&self, src: &Path, dst: &Path) -> Result<(), OracleError> {
        debug!(?src, ?dst, config = %self.config, "opencc file conversion");
        let output = self
            .command()
            .arg("-i")
            .arg(src)
            .arg("-o")
            .arg(dst)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&self.bin, e))?;
        if !output.status.success() {
            return Err(failure(output.status, &output.stderr));
        }
        Ok(())
    }
}

/// 进程内词典转换（最长匹配），词典格式与 OpenCC 文本词典一致：
/// `键<TAB>候选1 候选2 ...`，取第一个候选；`#` 开头与空行忽略。
pub struct TableConverter {
    ac: Option<AhoCorasick>,
    replacements: Vec<String>,
}

impl TableConverter {
    /// 构建失败（自动机超出规模限制等）返回错误，不会退化为恒等转换
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut keys: Vec<String> = Vec::new();
        let mut replacements: Vec<String> = Vec::new();
        for (k, v) in pairs {
            let k = k.into();
            if k.is_empty() {
                continue;
            }
            // 重复键以首次出现为准
            if !seen.insert(k.clone()) {
                continue;
            }
            keys.push(k);
            replacements.push(v.into());
        }
        let ac = if keys.is_empty() {
            None
        } else {
            Some(AhoCorasick::builder().match_kind(MatchKind::LeftmostLongest).build(&keys)?)
        };
        Ok(Self { ac, replacements })
    }

    /// 解析 OpenCC 风格的文本词典
    pub fn from_dict_text(text: &str) -> Result<Self, SettingsError> {
        let pairs = text.lines().filter_map(|line| {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, rest) = line.split_once('\t')?;
            let first = rest.split_whitespace().next()?;
            Some((key.to_string(), first.to_string()))
        });
        Self::from_pairs(pairs)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read { path: path.to_path_buf(), source })?;
        Self::from_dict_text(&text)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    fn apply(&self, text: &str) -> String {
        match &self.ac {
            Some(ac) => ac.replace_all(text, &self.replacements),
            None => text.to_string(),
        }
    }
}

impl Converter for TableConverter {
    fn convert(&self, text: &str) -> Result<String, OracleError> {
        Ok(self.apply(text))
    }

    fn convert_file(&self, src: &Path, dst: &Path) -> Result<(), OracleError> {
        let data = std::fs::read(src)?;
        let text = String::from_utf8(data).map_err(|_| OracleError::InvalidUtf8)?;
        std::fs::write(dst, self.apply(&text))?;
        Ok(())
    }
}
