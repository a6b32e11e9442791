use serde::{Deserialize, Serialize};

/// 扫描得到的大文件条目，`size_human` 由 `size` 派生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    pub size_human: String,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            size_human: human_size(size),
        }
    }

    /// 文件名（路径最后一段），取不到时返回完整路径
    pub fn file_name(&self) -> &str {
        std::path::Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}

pub fn human_size(bytes: u64) -> String {
    human_bytes::human_bytes(bytes as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_human_size() {
        let entry = FileEntry::new("/data/movie.mkv", 3 * 1024 * 1024 * 1024);
        assert_eq!(entry.size_human, human_size(entry.size));
        assert!(!entry.size_human.is_empty());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(FileEntry::new("/a/b/c.iso", 1).file_name(), "c.iso");
        assert_eq!(FileEntry::new("/", 1).file_name(), "/");
    }
}
