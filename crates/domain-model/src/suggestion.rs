use serde::{Deserialize, Serialize};

use crate::{FileEntry, RiskLevel};

/// 建议的来源：模型正常分类、模型输出格式不对、请求失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Classified,
    Unparseable,
    Failed,
}

/// AI 给出的删除建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub risk: RiskLevel,
    pub reason: String,
    pub status: SuggestionStatus,
}

impl Suggestion {
    pub fn classified(risk: RiskLevel, reason: impl Into<String>) -> Self {
        Self {
            risk,
            reason: reason.into(),
            status: SuggestionStatus::Classified,
        }
    }

    /// 无法解析的输出按「谨慎」处理
    pub fn unparseable(reason: impl Into<String>) -> Self {
        Self {
            risk: RiskLevel::Orange,
            reason: reason.into(),
            status: SuggestionStatus::Unparseable,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            risk: RiskLevel::Orange,
            reason: reason.into(),
            status: SuggestionStatus::Failed,
        }
    }

    pub fn is_classified(&self) -> bool {
        self.status == SuggestionStatus::Classified
    }
}

/// 附带 AI 建议的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedFile {
    #[serde(flatten)]
    pub entry: FileEntry,
    pub suggestion: Suggestion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_cautious() {
        assert_eq!(Suggestion::failed("boom").risk, RiskLevel::Orange);
        assert_eq!(Suggestion::unparseable("??").risk, RiskLevel::Orange);
        assert!(!Suggestion::failed("boom").is_classified());
        assert!(Suggestion::classified(RiskLevel::Green, "installer").is_classified());
    }

    #[test]
    fn test_analyzed_file_serializes_flat() {
        let file = AnalyzedFile {
            entry: FileEntry::new("/tmp/x.dmg", 10),
            suggestion: Suggestion::classified(RiskLevel::Green, "old installer"),
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["path"], "/tmp/x.dmg");
        assert_eq!(value["suggestion"]["risk"], "green");
        assert_eq!(value["suggestion"]["status"], "classified");
    }
}
