use serde::{Deserialize, Serialize};

/// 删除风险等级，四级有序：Green < Yellow < Orange < Red
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Red,
        RiskLevel::Orange,
        RiskLevel::Yellow,
        RiskLevel::Green,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "green",
            RiskLevel::Yellow => "yellow",
            RiskLevel::Orange => "orange",
            RiskLevel::Red => "red",
        }
    }

    /// 图例中的说明文字
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Red => "Highly Unsafe to Delete",
            RiskLevel::Orange => "Potentially Unsafe / Caution",
            RiskLevel::Yellow => "Might be Safe with Caution",
            RiskLevel::Green => "Generally Safe to Delete",
        }
    }

    /// 从模型返回的颜色标签中识别等级（不区分大小写的子串匹配，red 优先）
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        ["red", "orange", "yellow", "green"]
            .iter()
            .zip([
                RiskLevel::Red,
                RiskLevel::Orange,
                RiskLevel::Yellow,
                RiskLevel::Green,
            ])
            .find(|(needle, _)| label.contains(*needle))
            .map(|(_, level)| level)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_scale() {
        assert!(RiskLevel::Green < RiskLevel::Yellow);
        assert!(RiskLevel::Yellow < RiskLevel::Orange);
        assert!(RiskLevel::Orange < RiskLevel::Red);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(RiskLevel::from_label("Red"), Some(RiskLevel::Red));
        assert_eq!(RiskLevel::from_label("[Green]"), Some(RiskLevel::Green));
        assert_eq!(RiskLevel::from_label("  YELLOW "), Some(RiskLevel::Yellow));
        assert_eq!(RiskLevel::from_label("orange-ish"), Some(RiskLevel::Orange));
        assert_eq!(RiskLevel::from_label("purple"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Orange).unwrap();
        assert_eq!(json, "\"orange\"");
    }
}
