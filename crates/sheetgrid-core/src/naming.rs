//! Sheet naming rules

use crate::error::{Axis, Error, Result};
use crate::MAX_SHEET_NAME_LEN;

/// Base name used when a sheet is created without one
pub const DEFAULT_SHEET_BASE: &str = "Sheet";

const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// Validate a sheet name on its own (no uniqueness check)
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name too long (max {} characters)",
            MAX_SHEET_NAME_LEN
        )));
    }
    for c in INVALID_CHARS {
        if name.contains(*c) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }
    }
    Ok(())
}

/// Case-insensitive sheet name comparison
pub fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Pick a name that no existing sheet uses
///
/// An empty request means "default": the base `Sheet` always gets a
/// numeric suffix, starting at 1. A requested name is kept verbatim when
/// free, otherwise the first free `name1`, `name2`, ... is used. The base
/// is shortened so that base and suffix fit in [`MAX_SHEET_NAME_LEN`].
pub fn unique_sheet_name<'a, I>(requested: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<String> = existing.into_iter().map(str::to_lowercase).collect();
    let is_free = |candidate: &str| !taken.contains(&candidate.to_lowercase());

    let (base, mut suffix) = if requested.is_empty() {
        (DEFAULT_SHEET_BASE, 1u32)
    } else {
        if is_free(requested) {
            return requested.to_string();
        }
        (requested, 1u32)
    };

    loop {
        let digits = suffix.to_string();
        let room = MAX_SHEET_NAME_LEN.saturating_sub(digits.len());
        let candidate = match base.char_indices().nth(room) {
            Some((cut, _)) => format!("{}{}", &base[..cut], digits),
            None => format!("{}{}", base, digits),
        };
        if is_free(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Next sheet id: one past the largest in use, or 1
///
/// Fails when the largest id in use is already `u32::MAX`.
pub fn next_sheet_id<I>(existing: I) -> Result<u32>
where
    I: IntoIterator<Item = u32>,
{
    match existing.into_iter().max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(Error::InvalidCoordinate {
            axis: Axis::Sheet,
            index: max,
            max: u32::MAX - 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_are_suffixed() {
        assert_eq!(unique_sheet_name("", []), "Sheet1");
        assert_eq!(unique_sheet_name("", ["Sheet1"]), "Sheet2");
        assert_eq!(unique_sheet_name("", ["sheet1", "SHEET2"]), "Sheet3");
        // A bare "Sheet" does not block the suffixed default
        assert_eq!(unique_sheet_name("", ["Sheet"]), "Sheet1");
    }

    #[test]
    fn test_explicit_names() {
        assert_eq!(unique_sheet_name("Data", ["Sheet1"]), "Data");
        assert_eq!(unique_sheet_name("Data", ["data"]), "Data1");
        assert_eq!(unique_sheet_name("Data", ["Data", "Data1"]), "Data2");
    }

    #[test]
    fn test_suffix_fits_max_length() {
        let full = "x".repeat(MAX_SHEET_NAME_LEN);
        let first = unique_sheet_name(&full, [full.as_str()]);
        assert_eq!(first, format!("{}1", "x".repeat(30)));
        assert!(validate_sheet_name(&first).is_ok());

        let second = unique_sheet_name(&full, [full.as_str(), first.as_str()]);
        assert_eq!(second, format!("{}2", "x".repeat(30)));

        // Cut on a character boundary
        let wide = "é".repeat(MAX_SHEET_NAME_LEN);
        let name = unique_sheet_name(&wide, [wide.as_str()]);
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(name.ends_with("é1"));
    }

    #[test]
    fn test_next_sheet_id() {
        assert_eq!(next_sheet_id([]).unwrap(), 1);
        assert_eq!(next_sheet_id([1, 2, 3]).unwrap(), 4);
        // Gaps are never reused
        assert_eq!(next_sheet_id([1, 7]).unwrap(), 8);
    }

    #[test]
    fn test_next_sheet_id_exhausted() {
        assert!(matches!(
            next_sheet_id([1, u32::MAX]),
            Err(Error::InvalidCoordinate {
                axis: Axis::Sheet,
                index: u32::MAX,
                ..
            })
        ));
        assert_eq!(next_sheet_id([u32::MAX - 1]).unwrap(), u32::MAX);
    }

    #[test]
    fn test_validate_sheet_name() {
        assert!(validate_sheet_name("Budget 2024").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name("[x]").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
    }

    #[test]
    fn test_same_sheet_name() {
        assert!(same_sheet_name("Sheet1", "SHEET1"));
        assert!(!same_sheet_name("Sheet1", "Sheet2"));
    }
}
