use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::{KlinexError, Result};

/// 表单里「显示最大文件数」允许的范围
pub const TOP_N_RANGE: RangeInclusive<usize> = 10..=500;
/// 表单里「最小文件大小（MB）」允许的范围
pub const MIN_SIZE_MB_RANGE: RangeInclusive<u64> = 10..=1000;

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub default_scan_path: PathBuf,
    pub top_n: usize,
    pub min_size_mb: u64,
    pub model: String,
    /// 可选的预置 API key，表单未填写时使用
    pub api_key: Option<String>,
    pub api_base_url: String,
    /// 并发请求数（工作池宽度）
    pub max_workers: usize,
    pub request_timeout_secs: u64,
    /// 只记录、不真正移到废纸篓
    pub dry_run: bool,
    pub open_browser: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            default_scan_path: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            top_n: 50,
            min_size_mb: 50,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout_secs: 60,
            dry_run: false,
            open_browser: true,
        }
    }
}

impl AppConfig {
    /// 默认值 + 进程环境变量
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意 key 查找函数叠加配置，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(bind) = get("KLINEX_BIND") {
            cfg.bind = bind;
        }
        if let Some(model) = get("KLINEX_MODEL") {
            cfg.model = model;
        }
        if let Some(base) = get("KLINEX_API_BASE") {
            cfg.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            cfg.api_key = Some(key);
        }
        if let Some(workers) = get("KLINEX_MAX_WORKERS") {
            cfg.max_workers = workers.parse().map_err(|_| {
                KlinexError::Config(format!("KLINEX_MAX_WORKERS is not a number: {}", workers))
            })?;
        }
        if let Some(dry) = get("KLINEX_DRY_RUN") {
            cfg.dry_run = matches!(dry.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(KlinexError::Config("max_workers must be at least 1".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(KlinexError::Config("model must not be empty".to_string()));
        }
        validate_scan_limits(self.top_n, self.min_size_mb)
    }
}

/// 校验 top-N 与最小大小是否在表单允许的范围内
pub fn validate_scan_limits(top_n: usize, min_size_mb: u64) -> Result<()> {
    if !TOP_N_RANGE.contains(&top_n) {
        return Err(KlinexError::Config(format!(
            "number of files must be between {} and {}, got {}",
            TOP_N_RANGE.start(),
            TOP_N_RANGE.end(),
            top_n
        )));
    }
    if !MIN_SIZE_MB_RANGE.contains(&min_size_mb) {
        return Err(KlinexError::Config(format!(
            "minimum size must be between {} and {} MB, got {}",
            MIN_SIZE_MB_RANGE.start(),
            MIN_SIZE_MB_RANGE.end(),
            min_size_mb
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_workers, 5);
        assert_eq!(cfg.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_env_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("KLINEX_BIND", "127.0.0.1:9000"),
            ("KLINEX_MAX_WORKERS", "8"),
            ("KLINEX_DRY_RUN", "true"),
            ("KLINEX_API_BASE", "http://localhost:1234/"),
            ("GEMINI_API_KEY", "  secret "),
        ]))
        .unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:9000");
        assert_eq!(cfg.max_workers, 8);
        assert!(cfg.dry_run);
        assert_eq!(cfg.api_base_url, "http://localhost:1234");
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_bad_worker_count() {
        let err = AppConfig::from_lookup(lookup_from(&[("KLINEX_MAX_WORKERS", "many")])).unwrap_err();
        assert!(matches!(err, KlinexError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("KLINEX_MAX_WORKERS", "0")])).unwrap_err();
        assert!(matches!(err, KlinexError::Config(_)));
    }

    #[test]
    fn test_scan_limits() {
        assert!(validate_scan_limits(10, 10).is_ok());
        assert!(validate_scan_limits(500, 1000).is_ok());
        assert!(validate_scan_limits(9, 50).is_err());
        assert!(validate_scan_limits(501, 50).is_err());
        assert!(validate_scan_limits(50, 9).is_err());
        assert!(validate_scan_limits(50, 1001).is_err());
    }
}
