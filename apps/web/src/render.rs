use klinex_ai::MODEL_OPTIONS;
use klinex_common::{MIN_SIZE_MB_RANGE, TOP_N_RANGE};
use klinex_domain::{human_size, AnalyzedFile, RiskLevel, SuggestionStatus};

use crate::session::{Notice, NoticeLevel, Session};

fn risk_style(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Red => "background-color: #ffcccc; border: 1px solid #ff0000;",
        RiskLevel::Orange => "background-color: #ffe0b3; border: 1px solid #ffa500;",
        RiskLevel::Yellow => "background-color: #ffffb3; border: 1px solid #cccc00;",
        RiskLevel::Green => "background-color: #ccffcc; border: 1px solid #008000;",
    }
}

fn notice_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "notice info",
        NoticeLevel::Success => "notice success",
        NoticeLevel::Warning => "notice warning",
        NoticeLevel::Error => "notice error",
    }
}

#[must_use]
pub fn render_page(session: &Session, notices: &[Notice], dry_run: bool) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("  <title>Klinex - Large File Cleaner</title>\n");
    html.push_str(&render_styles());
    html.push_str("</head>\n<body>\n");

    html.push_str("<div class=\"layout\">\n");
    html.push_str(&render_sidebar(session));

    html.push_str("<main>\n");
    html.push_str("  <h1>🚀 Klinex - Large File Cleaner</h1>\n");
    if dry_run {
        html.push_str(
            "  <div class=\"notice warning\">Dry run: files are only logged, nothing is moved to Trash.</div>\n",
        );
    }
    html.push_str(&render_intro());

    for notice in notices {
        html.push_str(&format!(
            "  <div class=\"{}\">{}</div>\n",
            notice_class(notice.level),
            escape_html(&notice.message)
        ));
    }

    if session.analysis_completed() {
        html.push_str(&render_results(session));
    } else {
        html.push_str(
            "  <div class=\"notice info\">Click 'Start Scan and AI Analysis' in the sidebar to begin.</div>\n",
        );
    }

    html.push_str("  <hr>\n  <div class=\"footer\">\n");
    html.push_str("    <div>AI suggestions use the Gemini API on file names and paths only.</div>\n");
    html.push_str("    <div>Always exercise caution and verify file importance before deletion.</div>\n");
    html.push_str("  </div>\n</main>\n</div>\n</body>\n</html>\n");
    html
}

fn render_intro() -> String {
    let mut html = String::new();
    html.push_str("  <p>Finds the largest files in a directory and asks an AI model whether they look safe to delete.</p>\n");
    html.push_str("  <div class=\"warning-box\">\n");
    html.push_str("    <h3>⚠️ IMPORTANT WARNING: USE THIS TOOL WITH EXTREME CAUTION! ⚠️</h3>\n");
    html.push_str("    <ul>\n");
    html.push_str("      <li><b>The AI suggestions are based on file names/paths and are NOT infallible.</b> They cannot truly understand your system's dependencies.</li>\n");
    html.push_str("      <li><b>Deleting critical system files, application components, or essential user data can damage your installation or lead to data loss.</b></li>\n");
    html.push_str("      <li><b>ALWAYS manually verify a file's purpose and contents before considering deletion.</b></li>\n");
    html.push_str("      <li><b>Files are moved to Trash, not permanently deleted, but exercise caution.</b></li>\n");
    html.push_str("    </ul>\n  </div>\n");
    html
}

fn render_sidebar(session: &Session) -> String {
    let form = session.form();
    let mut html = String::new();

    html.push_str("<aside>\n  <h2>Configuration &amp; Scan Options</h2>\n");
    html.push_str("  <form method=\"post\" action=\"/scan\">\n");

    let key_hint = if session.api_key().is_some() {
        "Key saved for this session (leave empty to reuse)"
    } else {
        "Get your key from Google AI Studio"
    };
    html.push_str("    <label for=\"api_key\">Gemini API Key</label>\n");
    html.push_str(&format!(
        "    <input type=\"password\" id=\"api_key\" name=\"api_key\" placeholder=\"{}\" autocomplete=\"off\">\n",
        escape_html(key_hint)
    ));
    if session.api_key().is_none() {
        html.push_str("    <div class=\"notice warning\">Please enter your Gemini API Key to enable AI analysis.</div>\n");
    }

    html.push_str("    <label for=\"model\">Gemini Model</label>\n");
    html.push_str("    <select id=\"model\" name=\"model\">\n");
    let mut known = false;
    for (display, id) in MODEL_OPTIONS {
        let selected = if *id == form.model {
            known = true;
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "      <option value=\"{}\"{}>{}</option>\n",
            escape_html(id),
            selected,
            escape_html(display)
        ));
    }
    if !known {
        html.push_str(&format!(
            "      <option value=\"{0}\" selected>{0}</option>\n",
            escape_html(&form.model)
        ));
    }
    html.push_str("    </select>\n");

    html.push_str("    <label for=\"path\">Directory to scan</label>\n");
    html.push_str(&format!(
        "    <input type=\"text\" id=\"path\" name=\"path\" value=\"{}\">\n",
        escape_html(&form.path)
    ));

    html.push_str("    <label for=\"top_n\">Number of largest files to display</label>\n");
    html.push_str(&format!(
        "    <input type=\"number\" id=\"top_n\" name=\"top_n\" min=\"{}\" max=\"{}\" value=\"{}\">\n",
        TOP_N_RANGE.start(),
        TOP_N_RANGE.end(),
        form.top_n
    ));

    html.push_str("    <label for=\"min_size_mb\">Minimum file size (MB) to include</label>\n");
    html.push_str(&format!(
        "    <input type=\"number\" id=\"min_size_mb\" name=\"min_size_mb\" min=\"{}\" max=\"{}\" value=\"{}\">\n",
        MIN_SIZE_MB_RANGE.start(),
        MIN_SIZE_MB_RANGE.end(),
        form.min_size_mb
    ));

    html.push_str("    <button type=\"submit\" class=\"primary\">Start Scan and AI Analysis</button>\n");
    html.push_str("  </form>\n</aside>\n");
    html
}

fn render_legend() -> String {
    let mut html = String::from("  <div class=\"legend\"><b>Color Code Guide:</b>\n");
    for level in RiskLevel::ALL {
        html.push_str(&format!(
            "    <span class=\"tag\" style=\"{}\"><b>{}:</b> {}</span>\n",
            risk_style(level),
            capitalize(level.as_str()),
            level.description()
        ));
    }
    html.push_str("  </div>\n");
    html
}

fn render_results(session: &Session) -> String {
    let mut html = String::new();
    html.push_str("  <h2>Largest Files Found and AI Suggestions</h2>\n");

    if let Some(summary) = session.summary() {
        html.push_str(&format!(
            "  <p class=\"summary\">Scanned {} files in <code>{}</code> ({} ms); {} above the size limit; model {}.</p>\n",
            summary.file_count,
            escape_html(&summary.path),
            summary.scan_time_ms,
            summary.matched_count,
            escape_html(&summary.model)
        ));
    }

    html.push_str(&render_legend());
    html.push_str(&format!(
        "  <div class=\"metric\"><div class=\"metric-label\">Total Space Liberated</div><div class=\"metric-value\">{}</div></div>\n",
        human_size(session.liberated_bytes())
    ));

    let files = session.files();
    if files.is_empty() {
        html.push_str("  <div class=\"notice info\">No large files found matching your criteria.</div>\n");
        return html;
    }

    // 单行按钮使用 formaction 提交到 /trash，字段名 path；勾选框字段名 selected
    html.push_str("  <form method=\"post\" action=\"/trash-selected\">\n");
    html.push_str("    <button type=\"submit\" class=\"danger\">Move Selected Files to Trash</button>\n");
    html.push_str("    <table>\n");
    html.push_str("      <tr><th></th><th>File</th><th>Size</th><th>AI Suggestion</th><th></th></tr>\n");
    for file in files {
        html.push_str(&render_row(file));
    }
    html.push_str("    </table>\n  </form>\n");
    html
}

fn render_row(file: &AnalyzedFile) -> String {
    let path = escape_html(&file.entry.path);
    let label = match file.suggestion.status {
        SuggestionStatus::Classified => capitalize(file.suggestion.risk.as_str()),
        SuggestionStatus::Unparseable | SuggestionStatus::Failed => "Unknown".to_string(),
    };
    format!(
        concat!(
            "      <tr>\n",
            "        <td><input type=\"checkbox\" name=\"selected\" value=\"{path}\"></td>\n",
            "        <td><code>{path}</code></td>\n",
            "        <td>{size}</td>\n",
            "        <td><span class=\"tag\" style=\"{style}\"><b>{label}:</b> {reason}</span></td>\n",
            "        <td><button type=\"submit\" class=\"danger\" formaction=\"/trash\" name=\"path\" value=\"{path}\">Move to Trash ({name})</button></td>\n",
            "      </tr>\n"
        ),
        path = path,
        size = escape_html(&file.entry.size_human),
        style = risk_style(file.suggestion.risk),
        label = label,
        reason = escape_html(&file.suggestion.reason),
        name = escape_html(file.entry.file_name()),
    )
}

fn render_styles() -> String {
    r#"  <style>
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; color: #222; }
    .layout { display: flex; min-height: 100vh; }
    aside { width: 300px; padding: 20px; background: #f0f2f6; }
    aside label { display: block; margin-top: 12px; font-size: 0.9em; }
    aside input, aside select { width: 100%; box-sizing: border-box; padding: 6px; margin-top: 4px; }
    main { flex: 1; padding: 20px 40px; }
    button { color: white; background-color: #4CAF50; border-radius: 8px; border: none; padding: 10px 20px; box-shadow: 2px 2px 5px rgba(0,0,0,0.2); cursor: pointer; }
    button:hover { background-color: #45a049; }
    button.primary { margin-top: 16px; width: 100%; }
    button.danger { background-color: #dc3545; }
    button.danger:hover { background-color: #c82333; }
    .tag { padding: 5px; border-radius: 5px; color: #333333; display: inline-block; margin: 2px; }
    .notice { padding: 10px; border-radius: 6px; margin: 8px 0; }
    .notice.info { background: #e7f1fb; }
    .notice.success { background: #e3f6e5; }
    .notice.warning { background: #fff6d6; }
    .notice.error { background: #fde2e2; }
    .warning-box { border: 1px solid #f0ad4e; border-radius: 6px; padding: 0 12px; margin-bottom: 12px; }
    .metric { margin: 16px 0; }
    .metric-label { font-size: 0.9em; color: #555; }
    .metric-value { font-size: 2em; }
    table { border-collapse: collapse; width: 100%; margin-top: 12px; }
    td, th { border-bottom: 1px solid #ddd; padding: 8px; text-align: left; vertical-align: top; }
    .footer { color: #777; font-size: 0.85em; }
  </style>
"#
    .to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
