use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hantscan_core::{
    check_and_write, convert_and_write, load_settings_or_default, top_dirs, CheckOptions, ConvertOptions, Converter,
    IndexBase, OpenccCommand, OutputFormat, ReportMode, Settings, TableConverter, TraditionalDetector,
    DEFAULT_OPENCC_BIN, DEFAULT_OPENCC_CONFIG,
};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// oracle 不可用时的退出码
const EXIT_ORACLE_MISSING: u8 = 2;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "hantscan", version, about = "Find and convert Traditional Chinese text in JSON files")]
struct Cli {
    #[command(flatten)]
    oracle: OracleArgs,

    #[command(subcommand)]
    command: Commands,
}

/// oracle 相关的全局参数（优先级：命令行 > 设置文件 > 默认值）
#[derive(Args, Debug)]
struct OracleArgs {
    /// opencc 可执行文件（名称或路径）
    #[arg(long, global = true)]
    opencc_bin: Option<String>,

    /// opencc 转换配置（默认 t2s.json）
    #[arg(long, global = true)]
    opencc_config: Option<String>,

    /// 使用进程内词典（OpenCC 文本词典格式）代替外部 opencc
    #[arg(long, global = true)]
    dict: Option<PathBuf>,

    /// 设置文件（TOML）；未指定时读取 ./hantscan.toml（若存在）
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 查找含繁体字的 JSON 文件
    Check {
        /// 扫描根目录（检测其下的每个顶层文件夹）
        #[arg(long, default_value = ".")]
        base: PathBuf,

        /// 按文件夹输出 YES/NO 汇总
        #[arg(long, conflicts_with = "details")]
        summary: bool,

        /// 输出每个 JSON 路径的命中字符串与字符位置
        #[arg(long)]
        details: bool,

        /// 位置索引用 1 基（仅 --details 生效）
        #[arg(long)]
        one_based: bool,

        /// 在 --summary 下列出命中文件
        #[arg(long)]
        files: bool,

        /// 线程数（"auto"=CPU 核心数；默认 1，串行）
        #[arg(long)]
        threads: Option<String>,

        /// 详情输出格式
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// 安全地将 JSON 文件转换为简体
    Convert {
        /// 文件或目录；默认当前目录下的顶层文件夹
        paths: Vec<PathBuf>,

        /// 只报告，不写文件
        #[arg(long)]
        dry_run: bool,

        /// 包含隐藏文件 / 目录
        #[arg(long)]
        include_hidden: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "run failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = load_settings_or_default(cli.oracle.settings.as_deref()).context("load settings")?;
    let oracle = match build_oracle(&cli.oracle, &settings)? {
        Some(o) => o,
        None => return Ok(ExitCode::from(EXIT_ORACLE_MISSING)),
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Commands::Check { base, summary, details, one_based, files, threads, format } => {
            let mode = if details {
                ReportMode::Details
            } else if summary {
                ReportMode::Summary
            } else {
                ReportMode::List
            };
            let threads = match threads {
                Some(t) => parse_threads(&t),
                None => Some(settings.scan.threads.unwrap_or(1).max(1)),
            };
            let one_based = one_based || settings.scan.one_based.unwrap_or(false);
            let opts = CheckOptions {
                mode,
                list_files: files,
                index_base: if one_based { IndexBase::One } else { IndexBase::Zero },
                threads,
                format: match format {
                    Format::Text => OutputFormat::Text,
                    Format::Json => OutputFormat::Json,
                },
            };
            info!(?base, ?mode, "check requested");

            let detector = TraditionalDetector::new(oracle.as_ref());
            let stats = check_and_write(&base, &mut out, &detector, &opts).context("check failed")?;
            out.flush().context("flush output")?;
            info!(files_scanned = stats.files_scanned, files_matched = stats.files_matched, "check done");
        }
        Commands::Convert { paths, dry_run, include_hidden } => {
            let include_hidden = include_hidden || settings.scan.include_hidden.unwrap_or(false);
            let base = std::env::current_dir().context("resolve current directory")?;
            let targets: Vec<PathBuf> = if paths.is_empty() {
                top_dirs(&base, include_hidden)
                    .context("list top-level folders")?
                    .into_iter()
                    .map(|(_, p)| p)
                    .collect()
            } else {
                paths
            };

            let opts = ConvertOptions { dry_run, include_hidden };
            let stats = convert_and_write(&targets, &base, oracle.as_ref(), &opts, &mut out).context("convert failed")?;
            out.flush().context("flush output")?;
            info!(updated = stats.updated, errors = stats.errors, "convert done");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// 组装 oracle：指定词典时使用进程内词典，否则检查 opencc 是否可用
/// 返回 None 表示 opencc 不可用（已报告）
fn build_oracle(args: &OracleArgs, settings: &Settings) -> Result<Option<Box<dyn Converter>>> {
    if let Some(dict) = args.dict.as_ref().or(settings.oracle.dict.as_ref()) {
        let table = TableConverter::from_file(dict).context("load dictionary")?;
        info!(?dict, entries = table.len(), "using in-process dictionary");
        return Ok(Some(Box::new(table)));
    }

    let bin = args
        .opencc_bin
        .clone()
        .or_else(|| settings.oracle.bin.clone())
        .unwrap_or_else(|| DEFAULT_OPENCC_BIN.to_string());
    let config = args
        .opencc_config
        .clone()
        .or_else(|| settings.oracle.config.clone())
        .unwrap_or_else(|| DEFAULT_OPENCC_CONFIG.to_string());
    let cmd = OpenccCommand::new(bin, config);
    match cmd.locate() {
        Ok(path) => {
            info!(?path, config = %cmd.config, "using opencc");
            Ok(Some(Box::new(cmd)))
        }
        Err(e) => {
            error!(error = %e, "conversion tool unavailable");
            eprintln!("{} not found. Please install it or adjust --opencc-bin.", cmd.bin);
            Ok(None)
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级；日志写 stderr，stdout 只留报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数："auto" 表示自动（等于 CPU 核数）；非法值退回自动
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
