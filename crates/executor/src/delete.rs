use std::path::Path;

use klinex_common::KlinexError;
use klinex_domain::{TrashOutcome, TrashStatus};

/// 将文件移入可恢复的回收站/废纸篓
pub trait Trasher: Send + Sync {
    fn trash(&self, path: &Path) -> Result<(), KlinexError>;

    /// 是否真正移动文件（dry run 为 false）
    fn is_live(&self) -> bool {
        true
    }
}

/// 使用操作系统的废纸篓（macOS Finder / Windows 回收站 / freedesktop Trash）
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl Trasher for SystemTrash {
    fn trash(&self, path: &Path) -> Result<(), KlinexError> {
        trash::delete(path).map_err(|e| KlinexError::Trash(e.to_string()))
    }
}

/// 移动单个文件：先读取大小，再交给 trasher。失败不回滚。
pub fn move_to_trash(trasher: &dyn Trasher, path: &str) -> TrashOutcome {
    let p = Path::new(path);
    let status = match std::fs::symlink_metadata(p) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} no longer exists", path);
            TrashStatus::Missing
        }
        Err(e) => TrashStatus::Failed {
            reason: KlinexError::from_io(p, e).to_string(),
        },
        Ok(meta) => match trasher.trash(p) {
            Ok(()) => {
                log::info!("moved to trash: {} ({} bytes)", path, meta.len());
                TrashStatus::Moved { freed: meta.len() }
            }
            Err(e) => {
                log::error!("cannot move {} to trash: {}", path, e);
                TrashStatus::Failed {
                    reason: e.to_string(),
                }
            }
        },
    };
    TrashOutcome {
        path: path.to_string(),
        status,
    }
}

/// 逐个移动，每个文件独立返回结果
pub fn move_all_to_trash<S: AsRef<str>>(trasher: &dyn Trasher, paths: &[S]) -> Vec<TrashOutcome> {
    paths
        .iter()
        .map(|p| move_to_trash(trasher, p.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::sync::Mutex;

    /// 直接删除文件来模拟废纸篓；名称含 "stuck" 的文件拒绝移动
    #[derive(Default)]
    struct RecordingTrash {
        moved: Mutex<Vec<String>>,
    }

    impl Trasher for RecordingTrash {
        fn trash(&self, path: &Path) -> Result<(), KlinexError> {
            if path.to_string_lossy().contains("stuck") {
                return Err(KlinexError::Trash("operation not permitted".to_string()));
            }
            fs::remove_file(path)?;
            self.moved.lock().unwrap().push(path.display().to_string());
            Ok(())
        }
    }

    fn make_file(dir: &Path, name: &str, size: u64) -> String {
        let path = dir.join(name);
        File::create(&path).unwrap().set_len(size).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_moved_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_file(dir.path(), "a.bin", 4_096);
        let trasher = RecordingTrash::default();

        let outcome = move_to_trash(&trasher, &path);
        assert_eq!(outcome.status, TrashStatus::Moved { freed: 4_096 });
        assert_eq!(outcome.freed(), 4_096);
        assert!(!Path::new(&path).exists());
        assert_eq!(trasher.moved.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.bin").to_string_lossy().to_string();
        let outcome = move_to_trash(&RecordingTrash::default(), &path);
        assert_eq!(outcome.status, TrashStatus::Missing);
        assert!(outcome.is_gone());
        assert_eq!(outcome.freed(), 0);
    }

    #[test]
    fn test_failure_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_file(dir.path(), "stuck.bin", 10);
        let outcome = move_to_trash(&RecordingTrash::default(), &path);
        assert!(matches!(outcome.status, TrashStatus::Failed { .. }));
        assert!(!outcome.is_gone());
        assert!(Path::new(&path).exists());
    }

    #[test]
    fn test_batch_has_no_rollback() {
        let dir = tempfile::tempdir().unwrap();
        let a = make_file(dir.path(), "a.bin", 100);
        let stuck = make_file(dir.path(), "stuck.bin", 200);
        let c = make_file(dir.path(), "c.bin", 300);

        let outcomes = move_all_to_trash(&RecordingTrash::default(), &[&a, &stuck, &c]);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_moved());
        assert!(!outcomes[1].is_moved());
        assert!(outcomes[2].is_moved());
        let freed: u64 = outcomes.iter().map(TrashOutcome::freed).sum();
        assert_eq!(freed, 400);
        assert!(!Path::new(&a).exists());
        assert!(Path::new(&stuck).exists());
    }
}
