//! File-name legality and truncation helpers
//!
//! Stateless classification of single path components. These never touch the
//! filesystem and operate on names, not full paths.

/// Characters rejected on at least one supported filesystem.
fn is_illegal_char(c: char) -> bool {
    matches!(c, '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Whether `name` is usable as a file name on the filesystems we care about.
///
/// Rejects the empty name, the `.`/`..` components, names with illegal or
/// control characters, and names ending in a space or dot (not representable
/// on Windows).
pub fn is_legal_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.ends_with(' ') || name.ends_with('.') {
        return false;
    }
    !name.chars().any(is_illegal_char)
}

/// Rewrite `name` into a legal file name, replacing offending characters
/// with `_`.
pub fn to_legal_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if is_illegal_char(c) { '_' } else { c })
        .collect();

    let cleaned = cleaned
        .trim_end_matches([' ', '.'])
        .to_string();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Truncate `name` to at most `max_bytes` bytes, preserving the extension.
///
/// The cut always lands on a char boundary, so the result is valid UTF-8 and
/// may be shorter than the budget. An extension that alone exceeds the
/// budget is truncated along with everything else.
pub fn truncate_name(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        // A leading dot marks a hidden file, not an extension.
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    };

    if ext.len() >= max_bytes {
        return cut_on_char_boundary(name, max_bytes).to_string();
    }

    let stem_budget = max_bytes - ext.len();
    format!("{}{}", cut_on_char_boundary(stem, stem_budget), ext)
}

fn cut_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
