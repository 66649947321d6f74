use serde::{Deserialize, Serialize};
use std::fmt;

/// Node kind
///
/// Pages are Markdown files, sections are directories (with an optional
/// `index.md`). Trees written before kinds were recorded deserialize as
/// `Unknown` until the schema migration backfills them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Page,
    Section,
    #[default]
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Page => "page",
            NodeKind::Section => "section",
            NodeKind::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Unknown)
    }
}

impl From<String> for NodeKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "page" => NodeKind::Page,
            "section" => NodeKind::Section,
            _ => NodeKind::Unknown,
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Unknown => write!(f, "unknown"),
            known => write!(f, "{}", known.as_str()),
        }
    }
}
