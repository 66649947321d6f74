//! A page file on disk with its parsed frontmatter

use std::fs;
use std::path::{Path, PathBuf};

use leaftree_core::markdown::{build_markdown, extract_title, parse_frontmatter, Frontmatter};

use crate::atomic::atomic_write;
use crate::errors::{io_error, Result};

#[derive(Debug, Clone)]
pub struct MarkdownFile {
    path: PathBuf,
    frontmatter: Frontmatter,
    body: String,
}

impl MarkdownFile {
    /// Read and parse the file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| io_error("read_markdown", path, e))?;
        let parsed = parse_frontmatter(&raw)?;
        Ok(Self {
            path: path.to_path_buf(),
            frontmatter: parsed.frontmatter,
            body: parsed.body,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frontmatter(&self) -> &Frontmatter {
        &self.frontmatter
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Frontmatter title, first heading, or file stem
    pub fn title(&self) -> String {
        extract_title(&self.frontmatter, &self.body, &self.path)
    }

    /// Overwrite the id and title keys, keeping every other key
    pub fn set_identity(&mut self, id: &str, title: &str) {
        set_identity(&mut self.frontmatter, id, title);
    }

    pub fn set_id(&mut self, id: &str) {
        self.frontmatter.id = Some(id.trim().to_string());
    }

    pub fn set_title(&mut self, title: &str) {
        self.frontmatter.title = Some(title.trim().to_string());
    }

    /// Write the file back atomically
    pub fn save(&self) -> Result<()> {
        let rendered = build_markdown(&self.frontmatter, &self.body)?;
        atomic_write(&self.path, rendered.as_bytes())
    }
}

pub(crate) fn set_identity(frontmatter: &mut Frontmatter, id: &str, title: &str) {
    frontmatter.id = Some(id.trim().to_string());
    let title = title.trim();
    frontmatter.title = if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_identity_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "---\nid: old\ntags: [a, b]\n---\n# Page\n").unwrap();

        let mut file = MarkdownFile::load(&path).unwrap();
        file.set_identity("new-id", " Page Title ");
        file.save().unwrap();

        let reloaded = MarkdownFile::load(&path).unwrap();
        assert_eq!(reloaded.frontmatter().node_id(), Some("new-id"));
        assert_eq!(reloaded.frontmatter().node_title(), Some("Page Title"));
        assert!(reloaded.frontmatter().extra.contains_key("tags"));
        assert_eq!(reloaded.body(), "# Page\n");
    }

    #[test]
    fn test_title_falls_back_to_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("getting-started.md");
        fs::write(&path, "plain text\n").unwrap();

        let file = MarkdownFile::load(&path).unwrap();
        assert_eq!(file.title(), "getting-started");
    }
}
