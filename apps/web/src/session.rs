//! 单个界面会话的状态：当前结果列表、已释放空间、提示消息。
//! 不做跨进程持久化，进程退出即丢弃。

use std::collections::HashSet;
use std::path::Path;

use klinex_ai::AnalysisReport;
use klinex_common::AppConfig;
use klinex_domain::{human_size, AnalyzedFile, ScanResult, TrashOutcome, TrashStatus};
use klinex_executor::{move_all_to_trash, move_to_trash, Trasher};
use serde::Serialize;

use crate::form::ScanForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// 上一次扫描的统计
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub path: String,
    pub model: String,
    pub file_count: u64,
    pub matched_count: u64,
    pub scan_time_ms: u64,
    pub skipped: usize,
}

pub struct Session {
    files: Vec<AnalyzedFile>,
    analysis_completed: bool,
    liberated_bytes: u64,
    api_key: Option<String>,
    form: ScanForm,
    summary: Option<ScanSummary>,
    notices: Vec<Notice>,
}

#[derive(Serialize)]
pub struct SessionSnapshot<'a> {
    pub analysis_completed: bool,
    pub liberated_bytes: u64,
    pub liberated_human: String,
    pub api_key_set: bool,
    pub summary: Option<&'a ScanSummary>,
    pub files: &'a [AnalyzedFile],
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            files: Vec::new(),
            analysis_completed: false,
            liberated_bytes: 0,
            api_key: config.api_key.clone(),
            form: ScanForm::from_config(config),
            summary: None,
            notices: Vec::new(),
        }
    }

    pub fn files(&self) -> &[AnalyzedFile] {
        &self.files
    }

    pub fn analysis_completed(&self) -> bool {
        self.analysis_completed
    }

    pub fn liberated_bytes(&self) -> u64 {
        self.liberated_bytes
    }

    pub fn form(&self) -> &ScanForm {
        &self.form
    }

    pub fn summary(&self) -> Option<&ScanSummary> {
        self.summary.as_ref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// 表单提交了非空 key 时记住它，供之后的扫描复用
    pub fn remember_api_key(&mut self, key: Option<&str>) {
        if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
            self.api_key = Some(key.to_string());
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// 取出并清空提示（每条只显示一次）
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// 开始新的扫描：清空结果与已释放空间
    pub fn begin_scan(&mut self, form: ScanForm) {
        self.files.clear();
        self.analysis_completed = false;
        self.liberated_bytes = 0;
        self.summary = None;
        self.form = form;
    }

    /// 写入扫描与分析结果
    pub fn finish_scan(&mut self, scan: &ScanResult, report: AnalysisReport) {
        self.summary = Some(ScanSummary {
            path: self.form.path.clone(),
            model: self.form.model.clone(),
            file_count: scan.file_count,
            matched_count: scan.matched_count,
            scan_time_ms: scan.scan_time_ms,
            skipped: scan.skipped.len(),
        });

        if !scan.skipped.is_empty() {
            self.notify(
                NoticeLevel::Warning,
                format!("{} path(s) could not be read and were skipped.", scan.skipped.len()),
            );
        }
        for gone in &report.vanished {
            self.notify(
                NoticeLevel::Warning,
                format!(
                    "File '{}' no longer exists, skipping AI analysis.",
                    gone.file_name()
                ),
            );
        }

        self.files = report.files;
        self.analysis_completed = true;

        if self.files.is_empty() {
            self.notify(
                NoticeLevel::Warning,
                "No large files found matching your criteria in the specified directory.",
            );
        } else {
            let failed = self
                .files
                .iter()
                .filter(|f| !f.suggestion.is_classified())
                .count();
            if failed > 0 {
                self.notify(
                    NoticeLevel::Warning,
                    format!("{} file(s) could not be classified by the AI.", failed),
                );
            }
            self.notify(
                NoticeLevel::Success,
                "AI analysis complete! Review the suggestions below.",
            );
        }
    }

    /// 扫描失败时保持「未完成」状态
    pub fn fail_scan(&mut self, message: impl Into<String>) {
        self.analysis_completed = false;
        self.notify(NoticeLevel::Error, message);
    }

    fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.entry.path == path)
    }

    /// 移除磁盘上已不存在的条目
    pub fn prune_vanished(&mut self) {
        let (kept, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| Path::new(&f.entry.path).exists());
        self.files = kept;
        for f in gone {
            self.notify(
                NoticeLevel::Info,
                format!(
                    "File {} (originally {}) no longer exists on disk.",
                    f.entry.file_name(),
                    f.entry.size_human
                ),
            );
        }
    }

    /// 移动单个文件
    pub fn trash_one(&mut self, trasher: &dyn Trasher, path: &str) -> Option<TrashOutcome> {
        if !self.contains(path) {
            self.notify(
                NoticeLevel::Warning,
                format!("'{}' is not in the current result list.", path),
            );
            return None;
        }
        let outcome = move_to_trash(trasher, path);
        match &outcome.status {
            TrashStatus::Moved { freed } => self.notify(
                NoticeLevel::Success,
                format!(
                    "{}Moved to Trash: {} ({})",
                    dry_prefix(trasher),
                    file_name(path),
                    human_size(*freed)
                ),
            ),
            TrashStatus::Missing => self.notify(
                NoticeLevel::Warning,
                format!("File '{}' no longer exists.", file_name(path)),
            ),
            TrashStatus::Failed { reason } => self.notify(
                NoticeLevel::Error,
                format!("Error moving '{}' to Trash: {}", file_name(path), reason),
            ),
        }
        self.apply(std::slice::from_ref(&outcome));
        Some(outcome)
    }

    /// 批量移动选中的文件，逐个报告结果，不回滚
    pub fn trash_selected(&mut self, trasher: &dyn Trasher, selected: &[String]) -> Vec<TrashOutcome> {
        let mut seen = HashSet::new();
        let targets: Vec<&str> = selected
            .iter()
            .map(String::as_str)
            .filter(|p| seen.insert(*p))
            .filter(|p| self.contains(p))
            .collect();

        if targets.is_empty() {
            self.notify(NoticeLevel::Warning, "No files selected for deletion.");
            return Vec::new();
        }

        let outcomes = move_all_to_trash(trasher, &targets);
        let prefix = dry_prefix(trasher);
        for outcome in &outcomes {
            let (level, message) = match &outcome.status {
                TrashStatus::Moved { .. } => (
                    NoticeLevel::Info,
                    format!("✅ {}Moved to Trash: {}", prefix, file_name(&outcome.path)),
                ),
                TrashStatus::Missing => (
                    NoticeLevel::Info,
                    format!("⚠️ File '{}' no longer exists.", file_name(&outcome.path)),
                ),
                TrashStatus::Failed { reason } => (
                    NoticeLevel::Error,
                    format!("❌ Error moving '{}' to Trash: {}", file_name(&outcome.path), reason),
                ),
            };
            self.notify(level, message);
        }

        let moved = outcomes.iter().filter(|o| o.is_moved()).count();
        let freed: u64 = outcomes.iter().map(TrashOutcome::freed).sum();
        if moved > 0 {
            self.notify(
                NoticeLevel::Success,
                format!(
                    "{}Successfully moved {} file(s) to Trash. Liberated {}.",
                    prefix,
                    moved,
                    human_size(freed)
                ),
            );
        } else {
            self.notify(NoticeLevel::Info, "No files were deleted.");
        }

        self.apply(&outcomes);
        outcomes
    }

    /// 已移走或已不存在的文件从列表移除，移走的大小计入已释放空间
    fn apply(&mut self, outcomes: &[TrashOutcome]) {
        let gone: HashSet<&str> = outcomes
            .iter()
            .filter(|o| o.is_gone())
            .map(|o| o.path.as_str())
            .collect();
        self.files.retain(|f| !gone.contains(f.entry.path.as_str()));
        self.liberated_bytes += outcomes.iter().map(TrashOutcome::freed).sum::<u64>();
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            analysis_completed: self.analysis_completed,
            liberated_bytes: self.liberated_bytes,
            liberated_human: human_size(self.liberated_bytes),
            api_key_set: self.api_key.is_some(),
            summary: self.summary.as_ref(),
            files: &self.files,
        }
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

fn dry_prefix(trasher: &dyn Trasher) -> &'static str {
    if trasher.is_live() {
        ""
    } else {
        "[dry run] "
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klinex_common::KlinexError;
    use klinex_domain::{FileEntry, RiskLevel, Suggestion};
    use std::fs::{self, File};

    /// 删除文件模拟废纸篓；名称含 "locked" 的文件拒绝移动
    struct FakeTrash;

    impl Trasher for FakeTrash {
        fn trash(&self, path: &Path) -> Result<(), KlinexError> {
            if path.to_string_lossy().contains("locked") {
                return Err(KlinexError::Trash("operation not permitted".to_string()));
            }
            fs::remove_file(path)?;
            Ok(())
        }
    }

    fn analyzed(dir: &Path, name: &str, size: u64) -> AnalyzedFile {
        let path = dir.join(name);
        File::create(&path).unwrap().set_len(size).unwrap();
        AnalyzedFile {
            entry: FileEntry::new(path.to_string_lossy().to_string(), size),
            suggestion: Suggestion::classified(RiskLevel::Green, "test"),
        }
    }

    fn session_with(files: Vec<AnalyzedFile>) -> Session {
        let mut session = Session::new(&AppConfig::default());
        let scan = ScanResult {
            file_count: files.len() as u64,
            matched_count: files.len() as u64,
            ..ScanResult::default()
        };
        session.finish_scan(&scan, AnalysisReport { files, vanished: vec![] });
        session.take_notices();
        session
    }

    #[test]
    fn test_trash_one_removes_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let a = analyzed(dir.path(), "a.bin", 3_000);
        let b = analyzed(dir.path(), "b.bin", 2_000);
        let a_path = a.entry.path.clone();
        let mut session = session_with(vec![a, b]);

        let outcome = session.trash_one(&FakeTrash, &a_path).unwrap();
        assert!(outcome.is_moved());
        assert_eq!(session.files().len(), 1);
        assert!(session.files().iter().all(|f| f.entry.path != a_path));
        assert_eq!(session.liberated_bytes(), 3_000);
        let notices = session.take_notices();
        assert_eq!(notices[0].level, NoticeLevel::Success);
    }

    #[test]
    fn test_failed_trash_keeps_file_listed() {
        let dir = tempfile::tempdir().unwrap();
        let locked = analyzed(dir.path(), "locked.bin", 3_000);
        let path = locked.entry.path.clone();
        let mut session = session_with(vec![locked]);

        let outcome = session.trash_one(&FakeTrash, &path).unwrap();
        assert!(!outcome.is_moved());
        assert_eq!(session.files().len(), 1);
        assert_eq!(session.liberated_bytes(), 0);
        assert_eq!(session.take_notices()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_unknown_path_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let a = analyzed(dir.path(), "a.bin", 100);
        let outsider = dir.path().join("other.bin");
        File::create(&outsider).unwrap();
        let mut session = session_with(vec![a]);

        assert!(session.trash_one(&FakeTrash, &outsider.to_string_lossy()).is_none());
        assert!(outsider.exists());
        assert_eq!(session.files().len(), 1);
    }

    #[test]
    fn test_trash_selected_partial_failure() {
        let dir = tempfile::tempdir().unwrap();
        let a = analyzed(dir.path(), "a.bin", 1_000);
        let locked = analyzed(dir.path(), "locked.bin", 2_000);
        let c = analyzed(dir.path(), "c.bin", 4_000);
        let selected = vec![
            a.entry.path.clone(),
            locked.entry.path.clone(),
            c.entry.path.clone(),
            a.entry.path.clone(),
        ];
        let locked_path = locked.entry.path.clone();
        let mut session = session_with(vec![a, locked, c]);

        let outcomes = session.trash_selected(&FakeTrash, &selected);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(session.liberated_bytes(), 5_000);
        assert_eq!(session.files().len(), 1);
        assert_eq!(session.files()[0].entry.path, locked_path);
    }

    #[test]
    fn test_trash_selected_empty_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_with(vec![analyzed(dir.path(), "a.bin", 10)]);
        assert!(session.trash_selected(&FakeTrash, &[]).is_empty());
        let notices = session.take_notices();
        assert_eq!(notices[0].message, "No files selected for deletion.");
    }

    #[test]
    fn test_missing_file_leaves_list_without_counting() {
        let dir = tempfile::tempdir().unwrap();
        let a = analyzed(dir.path(), "a.bin", 1_000);
        let path = a.entry.path.clone();
        fs::remove_file(&path).unwrap();
        let mut session = session_with(vec![a]);

        let outcome = session.trash_one(&FakeTrash, &path).unwrap();
        assert_eq!(outcome.status, TrashStatus::Missing);
        assert!(session.files().is_empty());
        assert_eq!(session.liberated_bytes(), 0);
    }

    #[test]
    fn test_new_scan_resets_liberated_total() {
        let dir = tempfile::tempdir().unwrap();
        let a = analyzed(dir.path(), "a.bin", 1_000);
        let path = a.entry.path.clone();
        let mut session = session_with(vec![a]);
        session.trash_one(&FakeTrash, &path);
        assert_eq!(session.liberated_bytes(), 1_000);

        let form = session.form().clone();
        session.begin_scan(form);
        assert_eq!(session.liberated_bytes(), 0);
        assert!(session.files().is_empty());
        assert!(!session.analysis_completed());
    }

    #[test]
    fn test_prune_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let a = analyzed(dir.path(), "a.bin", 1_000);
        let b = analyzed(dir.path(), "b.bin", 1_000);
        fs::remove_file(&b.entry.path).unwrap();
        let mut session = session_with(vec![a, b]);

        session.prune_vanished();
        assert_eq!(session.files().len(), 1);
        assert_eq!(session.take_notices().len(), 1);
    }

    #[test]
    fn test_remember_api_key() {
        let mut session = Session::new(&AppConfig::default());
        session.remember_api_key(Some("  "));
        assert!(session.api_key().is_none());
        session.remember_api_key(Some(" key-1 "));
        assert_eq!(session.api_key(), Some("key-1"));
        session.remember_api_key(None);
        assert_eq!(session.api_key(), Some("key-1"));
    }
}
