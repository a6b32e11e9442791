//! `application/x-www-form-urlencoded` 表单解析与扫描参数校验。

use klinex_common::{validate_scan_limits, AppConfig, KlinexError};

/// 解析后的表单字段，保留顺序与重复键（多选框会出现多个同名字段）
#[derive(Debug, Default, Clone)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(body: &str) -> Self {
        let fields = body
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = decode(parts.next()?)?;
                let value = decode(parts.next().unwrap_or(""))?;
                Some((key, value))
            })
            .collect();
        Self(fields)
    }

    /// 第一个同名字段
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 所有同名字段
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// 表单编码中 `+` 表示空格
fn decode(s: &str) -> Option<String> {
    let s = s.replace('+', " ");
    urlencoding::decode(&s).ok().map(|v| v.into_owned())
}

/// 侧边栏扫描表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanForm {
    pub path: String,
    pub model: String,
    pub top_n: usize,
    pub min_size_mb: u64,
}

impl ScanForm {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            path: config.default_scan_path.display().to_string(),
            model: config.model.clone(),
            top_n: config.top_n,
            min_size_mb: config.min_size_mb,
        }
    }

    /// 从提交的字段构造，缺失的字段沿用 `defaults`
    pub fn from_fields(fields: &FormFields, defaults: &ScanForm) -> Result<Self, KlinexError> {
        let path = fields
            .get("path")
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or_else(|| defaults.path.clone());
        if path.is_empty() {
            return Err(KlinexError::InvalidPath("please enter a directory to scan".to_string()));
        }

        let model = fields
            .get("model")
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| defaults.model.clone());

        let top_n = match fields.get("top_n") {
            Some(v) => v.trim().parse().map_err(|_| {
                KlinexError::Config(format!("number of files is not a number: {}", v))
            })?,
            None => defaults.top_n,
        };
        let min_size_mb = match fields.get("min_size_mb") {
            Some(v) => v.trim().parse().map_err(|_| {
                KlinexError::Config(format!("minimum size is not a number: {}", v))
            })?,
            None => defaults.min_size_mb,
        };
        validate_scan_limits(top_n, min_size_mb)?;

        Ok(Self {
            path,
            model,
            top_n,
            min_size_mb,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ScanForm {
        ScanForm {
            path: "/Users/k".to_string(),
            model: "gemini-2.5-flash".to_string(),
            top_n: 50,
            min_size_mb: 50,
        }
    }

    #[test]
    fn test_parse_decodes_and_keeps_duplicates() {
        let fields = FormFields::parse("selected=%2Fa%2Fb+c.bin&selected=%2Fd.iso&path=&x");
        assert_eq!(fields.get_all("selected"), vec!["/a/b c.bin", "/d.iso"]);
        assert_eq!(fields.get("path"), Some(""));
        assert_eq!(fields.get("x"), Some(""));
        assert_eq!(fields.get("missing"), None);
    }

    #[test]
    fn test_scan_form_from_fields() {
        let fields = FormFields::parse("path=%2Fdata&model=gemini-pro&top_n=100&min_size_mb=200");
        let form = ScanForm::from_fields(&fields, &defaults()).unwrap();
        assert_eq!(form.path, "/data");
        assert_eq!(form.model, "gemini-pro");
        assert_eq!(form.top_n, 100);
        assert_eq!(form.min_size_mb, 200);
    }

    #[test]
    fn test_scan_form_defaults() {
        let form = ScanForm::from_fields(&FormFields::parse(""), &defaults()).unwrap();
        assert_eq!(form, defaults());
    }

    #[test]
    fn test_scan_form_rejects_out_of_range() {
        let fields = FormFields::parse("top_n=5");
        assert!(matches!(
            ScanForm::from_fields(&fields, &defaults()),
            Err(KlinexError::Config(_))
        ));
        let fields = FormFields::parse("min_size_mb=abc");
        assert!(ScanForm::from_fields(&fields, &defaults()).is_err());
        let fields = FormFields::parse("path=+++");
        assert!(matches!(
            ScanForm::from_fields(&fields, &defaults()),
            Err(KlinexError::InvalidPath(_))
        ));
    }
}
