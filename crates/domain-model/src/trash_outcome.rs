use serde::{Deserialize, Serialize};

/// 单个文件移入废纸篓的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrashStatus {
    Moved { freed: u64 },
    /// 执行前文件已不存在
    Missing,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashOutcome {
    pub path: String,
    #[serde(flatten)]
    pub status: TrashStatus,
}

impl TrashOutcome {
    pub fn freed(&self) -> u64 {
        match self.status {
            TrashStatus::Moved { freed } => freed,
            _ => 0,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self.status, TrashStatus::Moved { .. })
    }

    /// 是否应从结果列表中移除（已移走或已不存在）
    pub fn is_gone(&self) -> bool {
        !matches!(self.status, TrashStatus::Failed { .. })
    }
}
