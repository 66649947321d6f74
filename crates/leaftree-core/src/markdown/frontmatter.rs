//! YAML frontmatter embedded at the top of page files
//!
//! A block counts as frontmatter only when the file starts with a `---`
//! line, a closing `---` line follows, and at least one line in between
//! looks like a `key: value` pair. Anything else (a horizontal rule, a
//! block of prose) is left as ordinary body text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Recognized frontmatter keys; any other key is kept verbatim in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    // Legacy spellings, read but never written back
    #[serde(default, rename = "leafwiki_id", skip_serializing)]
    pub(crate) legacy_id: Option<String>,
    #[serde(default, rename = "leafwiki_title", skip_serializing)]
    pub(crate) legacy_title: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Frontmatter {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The id, if present and non-blank
    pub fn node_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The title, if present and non-blank
    pub fn node_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn absorb_legacy_keys(&mut self) {
        if self.node_id().is_none() {
            if let Some(id) = self.legacy_id.take() {
                self.id = Some(id);
            }
        }
        if self.node_title().is_none() {
            if let Some(title) = self.legacy_title.take() {
                self.title = Some(title);
            }
        }
        self.legacy_id = None;
        self.legacy_title = None;
    }
}

/// A page file split into its frontmatter and body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMarkdown {
    pub frontmatter: Frontmatter,
    pub body: String,
    pub has_frontmatter: bool,
}

/// Split a document into `(yaml, body)` when it carries frontmatter
///
/// A leading byte-order mark is ignored and line endings are normalized to
/// `\n` in both halves. Returns `None` when there is no frontmatter block.
pub fn split_frontmatter(content: &str) -> Option<(String, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let text = content.replace("\r\n", "\n").replace('\r', "\n");

    if !text.starts_with("---\n") {
        return None;
    }

    let yaml_start = 4;
    let mut cursor = yaml_start;
    let mut looks_like_yaml = false;
    let mut closing = None;

    while cursor <= text.len() {
        let (line_end, next) = match text[cursor..].find('\n') {
            Some(offset) => (cursor + offset, cursor + offset + 1),
            None => (text.len(), text.len() + 1),
        };
        let line = text[cursor..line_end].trim();

        if line == "---" {
            closing = Some((cursor, line_end));
            break;
        }
        if !line.is_empty() && !line.starts_with('#') && is_key_line(line) {
            looks_like_yaml = true;
        }
        cursor = next;
    }

    let (close_start, close_end) = closing?;
    if !looks_like_yaml {
        return None;
    }

    let block = &text[yaml_start..close_start];
    let yaml = block.strip_suffix('\n').unwrap_or(block).to_string();

    let mut body_start = close_end;
    if text[body_start..].starts_with('\n') {
        body_start += 1;
    }
    Some((yaml, text[body_start..].to_string()))
}

fn is_key_line(line: &str) -> bool {
    match line.find(':') {
        Some(idx) if idx > 0 => {
            let key = line[..idx].trim();
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

/// Parse a page file's frontmatter and body
///
/// Without a frontmatter block the whole input is returned as the body.
///
/// # Errors
/// `FrontmatterParse` if the block is present but is not valid YAML for
/// the recognized keys.
pub fn parse_frontmatter(content: &str) -> Result<ParsedMarkdown> {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return Ok(ParsedMarkdown {
            frontmatter: Frontmatter::default(),
            body: content.to_string(),
            has_frontmatter: false,
        });
    };

    let mut frontmatter: Frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(&yaml)?
    };
    frontmatter.absorb_legacy_keys();

    Ok(ParsedMarkdown {
        frontmatter,
        body,
        has_frontmatter: true,
    })
}

/// Render a frontmatter block followed by `body`
///
/// Frontmatter without an id is not written at all; only the body is
/// returned.
pub fn build_markdown(frontmatter: &Frontmatter, body: &str) -> Result<String> {
    if frontmatter.node_id().is_none() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(frontmatter)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    Ok(out)
}
