//! Query text helpers
//!
//! Normalization and escaping for free-text search terms before they are
//! handed to a repository.

/// Trim a raw query and collapse interior whitespace runs to single spaces.
///
/// Returns `None` when nothing searchable remains.
///
/// # Examples
/// ```
/// # use deals_acquire::utils::string_utils::normalize_query;
/// assert_eq!(normalize_query("  noon   deals "), Some("noon deals".to_string()));
/// assert_eq!(normalize_query(" \t "), None);
/// ```
#[must_use]
pub fn normalize_query(raw: &str) -> Option<String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Case-insensitive substring test.
///
/// Uses Unicode lowercasing, so Arabic text (which has no case) compares
/// byte-for-byte while Latin text ignores case.
#[inline]
#[must_use]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escape a term for use inside a SQL `LIKE`/`ILIKE` pattern.
///
/// `%`, `_` and `\` are backslash-escaped. `*` is removed because the REST
/// layer rewrites it to `%`.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 4);
    for ch in term.chars() {
        match ch {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '*' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Double-quote a value for use inside a PostgREST `or=(...)` group.
///
/// Commas, parentheses and dots are reserved inside logical groups, so every
/// user-supplied value is quoted.
#[must_use]
pub fn quote_filter_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
