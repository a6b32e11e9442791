use serde::{Deserialize, Serialize};

use crate::FileEntry;

/// 一次扫描的结果：按大小降序、已截断到 top-N 的大文件列表及各项指标
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub files: Vec<FileEntry>,
    /// 本次遍历到的文件总数（不含目录）
    pub file_count: u64,
    /// 截断前超过大小阈值的文件数
    pub matched_count: u64,
    pub scan_time_ms: u64,
    /// 因权限或 I/O 错误被跳过的路径
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}
