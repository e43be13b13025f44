//! 检测 / 转换主流程与并行调度
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::convert::{safe_convert, ConvertStats};
use crate::detector::TraditionalDetector;
use crate::options::{CheckOptions, ConvertOptions, OutputFormat, ReportMode, ScanStats};
use crate::oracle::Converter;
use crate::report::{file_has_traditional, file_traditional_details, write_details_text};
use crate::types::DetailRecord;
use crate::walk::{collect_json_files, json_files_under, relative_display, top_dirs};

pub const NO_FOLDERS: &str = "No folders found in the current directory.";
pub const NO_MATCHES: &str = "No JSON files with Traditional Chinese found.";
pub const NO_JSON_FILES: &str = "No JSON files found.";

/// 检测 base 下每个顶层文件夹中的 JSON 文件，并将报告写入 `out`
/// 稳定性保证：文件夹按名称排序，文件夹内按文件名遍历；并行时按索引重排输出。
pub fn check_and_write(
    base: &Path,
    out: &mut dyn Write,
    detector: &TraditionalDetector<'_>,
    opts: &CheckOptions,
) -> Result<ScanStats> {
    let mut stats = ScanStats::default();
    let json = opts.mode == ReportMode::Details && opts.format == OutputFormat::Json;
    let dirs = top_dirs(base, true).with_context(|| format!("list folders in {}", base.display()))?;
    if dirs.is_empty() {
        if json {
            writeln!(out, "[]")?;
        } else {
            writeln!(out, "{NO_FOLDERS}")?;
        }
        return Ok(stats);
    }

    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    info!(base = %base.display(), folders = dirs.len(), threads, "starting check");

    let mut any_match = false;
    let mut first = true;
    if json {
        write!(out, "[")?;
    }

    for (name, dir) in dirs {
        stats.folders_scanned += 1;
        let files = json_files_under(&dir);

        if opts.mode == ReportMode::Details {
            for_each_ordered(
                &files,
                threads,
                |path| file_traditional_details(path, detector, opts.index_base),
                |path, findings| {
                    stats.files_scanned += 1;
                    if findings.is_empty() {
                        return Ok(true);
                    }
                    stats.files_matched += 1;
                    any_match = true;
                    let rel = relative_display(path, base);
                    if json {
                        for f in &findings {
                            if !first { write!(out, ",")?; } else { first = false; }
                            serde_json::to_writer(&mut *out, &DetailRecord::new(&rel, f))?;
                        }
                    } else {
                        write_details_text(out, &rel, &findings)?;
                    }
                    Ok(true)
                },
            )?;
            continue;
        }

        // Summary 且不列文件时，首个命中即可判定 YES
        let stop_at_first = opts.mode == ReportMode::Summary && !opts.list_files;
        let mut matched: Vec<String> = Vec::new();
        for_each_ordered(
            &files,
            threads,
            |path| file_has_traditional(path, detector),
            |path, hit| {
                stats.files_scanned += 1;
                if !hit {
                    return Ok(true);
                }
                stats.files_matched += 1;
                matched.push(relative_display(path, base));
                Ok(!stop_at_first)
            },
        )?;

        if opts.mode == ReportMode::Summary {
            writeln!(out, "{}\t{}", name, if matched.is_empty() { "NO" } else { "YES" })?;
            if opts.list_files {
                for rel in &matched {
                    writeln!(out, "  {rel}")?;
                }
            }
        } else {
            for rel in &matched {
                any_match = true;
                writeln!(out, "{rel}")?;
            }
        }
    }

    if json {
        writeln!(out, "]")?;
    } else if opts.mode != ReportMode::Summary && !any_match {
        writeln!(out, "{NO_MATCHES}")?;
    }

    info!(
        files_scanned = stats.files_scanned,
        files_matched = stats.files_matched,
        cached_chars = detector.cache().len(),
        "check finished"
    );
    Ok(stats)
}

/// 按顺序转换目标中的 JSON 文件，每个文件输出一行状态
pub fn convert_and_write(
    targets: &[PathBuf],
    base: &Path,
    oracle: &dyn Converter,
    opts: &ConvertOptions,
    out: &mut dyn Write,
) -> Result<ConvertStats> {
    let mut stats = ConvertStats::default();
    let files = collect_json_files(targets, opts.include_hidden);
    if files.is_empty() {
        writeln!(out, "{NO_JSON_FILES}")?;
        return Ok(stats);
    }
    info!(files = files.len(), dry_run = opts.dry_run, "starting conversion");

    for path in files {
        let outcome = safe_convert(&path, oracle, opts.dry_run);
        stats.record(&outcome);
        let rel = relative_display(&path, base);
        match outcome.reason() {
            Some(reason) => writeln!(out, "{outcome} {rel} ({reason})")?,
            None => writeln!(out, "{outcome} {rel}")?,
        }
    }

    info!(
        ok = stats.ok,
        updated = stats.updated,
        would_update = stats.would_update,
        skipped = stats.skipped,
        errors = stats.errors,
        "conversion finished"
    );
    Ok(stats)
}

/// 逐文件执行 `work`，并按文件顺序把结果交给 `sink`
/// - threads <= 1：串行；
/// - 否则在 Rayon 线程池中并行执行，当前线程按 idx 重排后调用 sink；
/// - sink 返回 false 表示停止，后续文件不再执行 work。
fn for_each_ordered<T, W, S>(files: &[PathBuf], threads: usize, work: W, mut sink: S) -> Result<()>
where
    T: Send,
    W: Fn(&Path) -> T + Sync,
    S: FnMut(&Path, T) -> Result<bool>,
{
    if threads <= 1 || files.len() <= 1 {
        for path in files {
            if !sink(path.as_path(), work(path.as_path()))? {
                break;
            }
        }
        return Ok(());
    }

    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().context("build rayon pool")?;
    let stop = AtomicBool::new(false);
    // 通道用于 worker → writer 传递结果；None 表示已停止、未执行
    let (tx, rx) = channel::bounded::<(usize, Option<T>)>(256);

    std::thread::scope(|scope| {
        let stop = &stop;
        let work = &work;
        scope.spawn(move || {
            pool.install(|| {
                files.par_iter().enumerate().for_each(|(idx, path)| {
                    let item = if stop.load(Ordering::Relaxed) { None } else { Some(work(path.as_path())) };
                    let _ = tx.send((idx, item));
                });
            });
            // tx 在此处被丢弃，Receiver 将收到关闭信号
        });
        drain_ordered(rx, files, stop, &mut sink)
    })
}

/// Writer：维护 next_idx 与缓存，按序交付；rx 随返回被丢弃，出错时 worker 不会阻塞
fn drain_ordered<T, S>(
    rx: crossbeam_channel::Receiver<(usize, Option<T>)>,
    files: &[PathBuf],
    stop: &AtomicBool,
    sink: &mut S,
) -> Result<()>
where
    S: FnMut(&Path, T) -> Result<bool>,
{
    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, Option<T>> = BTreeMap::new();

    while let Ok((idx, item)) = rx.recv() {
        buffer.insert(idx, item);
        while let Some(item) = buffer.remove(&next_idx) {
            let path = files[next_idx].as_path();
            next_idx += 1;
            if stop.load(Ordering::Relaxed) {
                continue;
            }
            if let Some(value) = item {
                match sink(path, value) {
                    Ok(true) => {}
                    Ok(false) => stop.store(true, Ordering::Relaxed),
                    Err(e) => {
                        stop.store(true, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }
        }
    }
    Ok(())
}
