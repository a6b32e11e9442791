use std::fs::ReadDir;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use klinex_common::KlinexError;
use klinex_domain::{FileEntry, ScanResult};
use rayon::prelude::*;

use crate::filters::ScanFilters;

/// 进度回调：(已遍历文件数, 当前目录)
pub type ProgressCb = Box<dyn Fn(u64, &str) + Send + Sync>;

/// 子树的扫描结果，合并时周期性截断到 top-N 以限制内存
#[derive(Default)]
struct Partial {
    files: Vec<FileEntry>,
    matched: u64,
    skipped: Vec<String>,
}

impl Partial {
    fn merge(&mut self, other: Partial, top_n: usize) {
        self.files.extend(other.files);
        self.matched += other.matched;
        self.skipped.extend(other.skipped);
        if self.files.len() > top_n.saturating_mul(2) {
            keep_largest(&mut self.files, top_n);
        }
    }
}

/// 按大小降序（同大小按路径升序）排序并保留前 n 个
fn keep_largest(files: &mut Vec<FileEntry>, n: usize) {
    files.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    files.truncate(n);
}

struct Walker<'a> {
    min_size_bytes: u64,
    top_n: usize,
    excludes: Vec<&'a Path>,
    counter: AtomicU64,
    progress: Option<&'a ProgressCb>,
}

impl Walker<'_> {
    fn is_excluded(&self, dir: &Path) -> bool {
        self.excludes.iter().any(|prefix| dir.starts_with(prefix))
    }

    fn consider(&self, partial: &mut Partial, path: &Path, size: u64) {
        if size > self.min_size_bytes {
            partial.matched += 1;
            partial.files.push(FileEntry::new(path.display().to_string(), size));
        }
    }

    fn skip(&self, partial: &mut Partial, path: &Path, err: &std::io::Error) {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            log::warn!("permission denied, skipping {}", path.display());
        } else {
            log::warn!("cannot read {}, skipping: {}", path.display(), err);
        }
        partial.skipped.push(path.display().to_string());
    }

    fn walk_dir(&self, dir: &Path) -> Partial {
        match std::fs::read_dir(dir) {
            Ok(entries) => self.walk_entries(dir, entries),
            Err(e) => {
                let mut partial = Partial::default();
                self.skip(&mut partial, dir, &e);
                partial
            }
        }
    }

    fn walk_entries(&self, dir: &Path, entries: ReadDir) -> Partial {
        let mut partial = Partial::default();
        let mut subdirs: Vec<PathBuf> = Vec::new();
        let mut visited = 0u64;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    self.skip(&mut partial, dir, &e);
                    continue;
                }
            };
            let path = entry.path();
            // DirEntry::file_type 不跟随符号链接
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    self.skip(&mut partial, &path, &e);
                    continue;
                }
            };

            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                if self.is_excluded(&path) {
                    log::debug!("excluded directory: {}", path.display());
                } else {
                    subdirs.push(path);
                }
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(meta) => {
                        visited += 1;
                        self.consider(&mut partial, &path, meta.len());
                    }
                    Err(e) => self.skip(&mut partial, &path, &e),
                }
            }
        }

        self.counter.fetch_add(visited, Ordering::Relaxed);

        // 并行处理子目录
        let children: Vec<Partial> = subdirs.par_iter().map(|sub| self.walk_dir(sub)).collect();
        for child in children {
            partial.merge(child, self.top_n);
        }

        // 整个子树完成后再报告
        if let Some(cb) = self.progress {
            cb(self.counter.load(Ordering::Relaxed), dir.display().to_string().as_str());
        }
        partial
    }
}

/// 规范化路径（支持正斜杠、去除首尾空白）
fn normalize_path(path: &str) -> PathBuf {
    let s = path.trim();
    #[cfg(windows)]
    let s = s.replace('/', "\\");
    PathBuf::from(s)
}

/// 扫描大文件（支持进度回调）。
/// 结果按大小降序排列，最多 `filters.top_n` 个，且全部严格大于 `filters.min_size_bytes`。
pub fn scan_large_files_with_progress(
    path: &str,
    filters: &ScanFilters,
    progress: Option<ProgressCb>,
) -> Result<ScanResult, KlinexError> {
    let start = Instant::now();
    if path.trim().is_empty() {
        return Err(KlinexError::InvalidPath("no directory given".to_string()));
    }
    let path_buf = normalize_path(path);

    if !path_buf.exists() {
        return Err(KlinexError::InvalidPath(format!("path does not exist: {}", path)));
    }

    let root = std::fs::canonicalize(&path_buf)
        .map_err(|e| KlinexError::InvalidPath(format!("cannot resolve path: {}", e)))?;
    let metadata = std::fs::metadata(&root).map_err(|e| KlinexError::from_io(&root, e))?;

    log::info!(
        "scan start: {} (min size {} bytes, top {})",
        root.display(),
        filters.min_size_bytes,
        filters.top_n
    );

    let walker = Walker {
        min_size_bytes: filters.min_size_bytes,
        top_n: filters.top_n,
        excludes: filters.active_excludes(&root),
        counter: AtomicU64::new(0),
        progress: progress.as_ref(),
    };

    let mut partial = if metadata.is_dir() {
        let entries = std::fs::read_dir(&root).map_err(|e| KlinexError::from_io(&root, e))?;
        walker.walk_entries(&root, entries)
    } else {
        walker.counter.fetch_add(1, Ordering::Relaxed);
        let mut p = Partial::default();
        walker.consider(&mut p, &root, metadata.len());
        p
    };
    keep_largest(&mut partial.files, filters.top_n);

    let result = ScanResult {
        files: partial.files,
        file_count: walker.counter.load(Ordering::Relaxed),
        matched_count: partial.matched,
        scan_time_ms: start.elapsed().as_millis() as u64,
        skipped: partial.skipped,
    };
    log::info!(
        "scan done: {} files visited, {} large, {} kept, {} skipped, {} ms",
        result.file_count,
        result.matched_count,
        result.files.len(),
        result.skipped.len(),
        result.scan_time_ms
    );
    Ok(result)
}

/// 扫描大文件（无进度）
pub fn scan_large_files(path: &str, filters: &ScanFilters) -> Result<ScanResult, KlinexError> {
    scan_large_files_with_progress(path, filters, None)
}
