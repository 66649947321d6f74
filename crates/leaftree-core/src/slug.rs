//! Slugs: URL-safe path segments naming a node among its siblings

use crate::errors::{Result, TreeError};
use crate::model::Tree;

/// Slugs that would shadow application routes
pub const RESERVED_SLUGS: &[&str] = &["e", "edit", "api", "assets", "index"];

/// Slug used when a title normalizes to nothing
const FALLBACK_SLUG: &str = "untitled";

/// Turn arbitrary text into a lowercase, hyphen-separated slug
///
/// Common accented Latin letters are transliterated (`ä` → `a`, `ß` → `ss`),
/// `&` reads as `and`, and every other run of non-alphanumerics becomes a
/// single hyphen. The result may be empty.
pub fn normalize_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            let mut buf = [0u8; 4];
            push_piece(&mut out, &mut pending_separator, ch.encode_utf8(&mut buf));
        } else if ch == '&' {
            pending_separator = true;
            push_piece(&mut out, &mut pending_separator, "and");
            pending_separator = true;
        } else if let Some(ascii) = transliterate(ch) {
            push_piece(&mut out, &mut pending_separator, ascii);
        } else {
            pending_separator = true;
        }
    }
    out
}

fn push_piece(out: &mut String, pending_separator: &mut bool, piece: &str) {
    if *pending_separator && !out.is_empty() {
        out.push('-');
    }
    *pending_separator = false;
    out.push_str(piece);
}

fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ģ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ł' => "l",
        'ñ' | 'ń' | 'ň' | 'ņ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}

/// Normalize the stem of a file name, keeping its extension
pub fn normalize_filename(filename: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => {
            format!("{}{}", normalize_slug(&filename[..dot]), &filename[dot..])
        }
        _ => normalize_slug(filename),
    }
}

/// Check that `slug` may name a node
///
/// Case is ignored. A valid slug is one or more groups of `[a-z0-9]`
/// joined by single hyphens, and is not one of `RESERVED_SLUGS`.
pub fn validate_slug(slug: &str) -> Result<()> {
    let invalid = |reason: &str| TreeError::InvalidSlug {
        slug: slug.to_string(),
        reason: reason.to_string(),
    };

    if slug.is_empty() {
        return Err(invalid("slug must not be empty"));
    }
    let lowered = slug.to_ascii_lowercase();
    if RESERVED_SLUGS.contains(&lowered.as_str()) {
        return Err(invalid("slug is reserved"));
    }
    let well_formed = lowered.split('-').all(|group| {
        !group.is_empty()
            && group
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    });
    if !well_formed {
        return Err(invalid(
            "slug must contain only lowercase letters, numbers and single hyphens",
        ));
    }
    Ok(())
}

/// A valid slug derived from `desired` that no sibling under `parent_id` uses
///
/// `current_id` is the node being renamed; its own slug never counts as a
/// conflict. Collisions get a numeric suffix (`-1`, `-2`, ...).
pub fn unique_slug(tree: &Tree, parent_id: &str, current_id: Option<&str>, desired: &str) -> String {
    let mut base = normalize_slug(desired);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }

    let taken = |candidate: &str| {
        tree.child_by_slug(parent_id, candidate)
            .is_some_and(|existing| Some(existing.id.as_str()) != current_id)
    };

    let mut candidate = base.clone();
    let mut suffix = 1;
    while taken(&candidate) || validate_slug(&candidate).is_err() {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    candidate
}
