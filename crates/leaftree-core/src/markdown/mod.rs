pub mod frontmatter;
pub mod title;

pub use frontmatter::{build_markdown, parse_frontmatter, split_frontmatter, Frontmatter, ParsedMarkdown};
pub use title::{extract_title, first_heading};
