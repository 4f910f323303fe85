//! JSON key → exported Go identifier.
use crate::error::{Error, Result};

/// Prefix for keys whose first character cannot start an identifier.
pub const UNSAFE_PREFIX: &str = "Go";

/// Uppercase the first character of `key`, or prefix it with `Go` when it
/// does not start with an ASCII letter. Interior characters pass through.
pub fn exported_name(key: &str) -> Result<String> {
    let mut chars = key.chars();
    let first = chars.next().ok_or(Error::EmptyFieldName)?;
    if !is_char(first) {
        return Ok(format!("{UNSAFE_PREFIX}{key}"));
    }
    Ok(first.to_uppercase().chain(chars).collect())
}

/// Top-level type name from a file stem, same rules as fields.
pub fn type_name(stem: &str) -> Result<String> {
    exported_name(stem).map_err(|_| Error::EmptyInputName)
}

/// `base`, or `base` followed by the smallest suffix ≥ 2 not yet taken.
pub fn unique_name(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub fn is_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}
