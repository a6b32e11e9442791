use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use klinex_domain::{AnalyzedFile, FileEntry, Suggestion};

use crate::llm::TextModel;
use crate::prompt::build_prompt;
use crate::validator::parse_suggestion;

/// 默认并发请求数
pub const MAX_WORKERS: usize = 5;

/// 一批文件的分析结果
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// 与输入顺序一致（即按大小降序）
    pub files: Vec<AnalyzedFile>,
    /// 扫描之后、分析之前已被删除的文件
    pub vanished: Vec<FileEntry>,
}

/// 为单个文件获取建议。请求失败时返回 `Failed` 建议而不是错误。
pub async fn suggest_for(model: &dyn TextModel, path: &str) -> Suggestion {
    let prompt = build_prompt(path);
    match model.generate(&prompt).await {
        Ok(text) => parse_suggestion(&text),
        Err(e) => {
            log::warn!("AI analysis failed for {}: {}", path, e);
            Suggestion::failed(format!("Gemini API error: {}. Defaulting to uncertain.", e))
        }
    }
}

/// 以 `workers` 为宽度并发请求，每个文件一个请求。
/// 完成顺序不确定，结果按输入下标对齐；单个文件失败不影响其它文件。
pub async fn analyze_files(
    model: &dyn TextModel,
    files: Vec<FileEntry>,
    workers: usize,
) -> AnalysisReport {
    let mut vanished = Vec::new();
    let mut pending = Vec::with_capacity(files.len());
    for (idx, entry) in files.into_iter().enumerate() {
        if Path::new(&entry.path).exists() {
            pending.push((idx, entry));
        } else {
            log::warn!("{} no longer exists, skipping AI analysis", entry.path);
            vanished.push(entry);
        }
    }

    let total = pending.len();
    let done = AtomicUsize::new(0);
    let done = &done;

    let mut results: Vec<(usize, AnalyzedFile)> = stream::iter(pending)
        .map(|(idx, entry)| async move {
            let suggestion = suggest_for(model, &entry.path).await;
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("analyzed {}/{}: {}", finished, total, entry.path);
            (idx, AnalyzedFile { entry, suggestion })
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);
    let files: Vec<AnalyzedFile> = results.into_iter().map(|(_, f)| f).collect();
    log::info!(
        "AI analysis complete: {} analyzed, {} failed, {} vanished",
        files.len(),
        files.iter().filter(|f| !f.suggestion.is_classified()).count(),
        vanished.len()
    );

    AnalysisReport { files, vanished }
}
