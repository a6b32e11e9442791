use klinex_domain::{RiskLevel, Suggestion};

/// 去掉空白和 markdown 强调符号后，若以 `key` 开头则返回其后的内容。
/// 值为空的行视为缺失。
fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let line = line.trim().trim_start_matches(['*', '_', '-', ' ']);
    let rest = line.strip_prefix(key)?;
    Some(rest.trim().trim_matches(['*', '_']).trim()).filter(|v| !v.is_empty())
}

/// 解析模型输出（`Color: ...` / `Reason: ...`）为建议。
/// 缺少任一行或颜色无法识别时，返回带原文的 `Unparseable` 建议。
pub fn parse_suggestion(text: &str) -> Suggestion {
    let text = text.trim();
    let color = text.lines().find_map(|l| field_value(l, "Color:"));
    let reason = text.lines().find_map(|l| field_value(l, "Reason:"));

    match (color, reason) {
        (Some(color), Some(reason)) => match RiskLevel::from_label(color) {
            Some(level) => Suggestion::classified(level, reason),
            None => Suggestion::unparseable(format!("AI output unparseable: {}", text)),
        },
        _ => Suggestion::unparseable(format!("AI output format mismatch: {}", text)),
    }
}
