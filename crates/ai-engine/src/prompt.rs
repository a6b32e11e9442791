use std::path::Path;

/// 构造让模型按文件路径判断可删除性的提示词。
/// 仅基于文件名与路径的文本信息，不涉及文件内容。
pub fn build_prompt(path: &str) -> String {
    let p = Path::new(path);
    let file_name = component_name(Some(p));
    let parent = p.parent();
    let parent_dir = component_name(parent);
    let grandparent_dir = component_name(parent.and_then(Path::parent));

    format!(
        r#"Analyze the following file path and name to provide a safety suggestion for deletion on a macOS system.
This analysis is based ONLY on the textual information (file name, path components), not on the file's content or its actual system function.

Categorize the file's deletability into one of four categories based on common macOS file types and locations:
- Red (Highly Unsafe): Files likely critical to macOS, applications, or user data (e.g., system libraries, `.app` contents, essential user documents). Deleting these will likely cause system instability or data loss.
- Orange (Potentially Unsafe / Caution Required): Files that might be important or whose function is unclear (e.g., configuration files, unknown binaries, files in sensitive user Library subdirectories).
- Yellow (Might be Safe with Caution): Files that are often temporary, cached, or user-generated but might still have some purpose (e.g., old application caches, logs, general downloads). Review carefully.
- Green (Generally Safe): Files that are very likely safe to delete (e.g., truly temporary files, old installers, large media files explicitly placed in Downloads). Still, always double-check.

Provide a brief, concise reasoning for your suggestion.

File Path: {path}
File Name: {file_name}
Parent Directory: {parent_dir}
Grandparent Directory: {grandparent_dir}

Example Output Format (MUST be followed exactly):
Color: [Red/Orange/Yellow/Green]
Reason: [Your concise reasoning]
"#
    )
}

fn component_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
