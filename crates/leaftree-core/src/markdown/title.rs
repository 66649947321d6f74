use std::path::Path;

use super::Frontmatter;

/// Text of the first level-one heading (`# Title`) in `body`
pub fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Display title for a page file
///
/// Frontmatter title, then the first heading, then the file stem.
pub fn extract_title(frontmatter: &Frontmatter, body: &str, file_path: &Path) -> String {
    if let Some(title) = frontmatter.node_title() {
        return title.to_string();
    }
    if let Some(title) = first_heading(body) {
        return title;
    }
    file_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
