//! 扫描 → AI 分析的线性流程。

use std::sync::atomic::{AtomicU64, Ordering};

use klinex_ai::{analyze_files, AnalysisReport, TextModel};
use klinex_common::KlinexError;
use klinex_domain::ScanResult;
use klinex_scanner::{scan_large_files_with_progress, ProgressCb, ScanFilters};
use tokio::runtime::Runtime;

use crate::form::ScanForm;

/// 每遍历这么多文件打印一次进度
const PROGRESS_LOG_EVERY: u64 = 1000;

pub struct PipelineOutput {
    pub scan: ScanResult,
    pub analysis: AnalysisReport,
}

fn progress_logger() -> ProgressCb {
    let next_mark = AtomicU64::new(PROGRESS_LOG_EVERY);
    Box::new(move |count: u64, dir: &str| {
        let mark = next_mark.load(Ordering::Relaxed);
        if count >= mark
            && next_mark
                .compare_exchange(
                    mark,
                    count + PROGRESS_LOG_EVERY,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                )
                .is_ok()
        {
            log::info!("scanned {} files... ({})", count, dir);
        }
    })
}

/// 扫描 `form.path`，再对保留下来的文件并发请求建议。
/// 扫描本身的错误（路径无效等）直接返回；单个文件的分析错误体现在建议里。
pub fn scan_and_analyze(
    runtime: &Runtime,
    model: &dyn TextModel,
    form: &ScanForm,
    filters: ScanFilters,
    workers: usize,
) -> Result<PipelineOutput, KlinexError> {
    let mut scan = scan_large_files_with_progress(&form.path, &filters, Some(progress_logger()))?;

    if scan.files.is_empty() {
        return Ok(PipelineOutput {
            scan,
            analysis: AnalysisReport::default(),
        });
    }

    log::info!(
        "analyzing {} files with {} ({} workers)",
        scan.files.len(),
        form.model,
        workers
    );
    let files = std::mem::take(&mut scan.files);
    let analysis = runtime.block_on(analyze_files(model, files, workers));
    Ok(PipelineOutput { scan, analysis })
}
