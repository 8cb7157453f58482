//! Key normalization.
//!
//! Two rules exist, and they are deliberately different:
//!
//! - **Record keys** (ISBN-like identifiers) keep their case but lose every
//!   ASCII whitespace and hyphen character, so `"978-0 13"` and `"978013"`
//!   collide. Other Unicode spaces (e.g. NBSP) are kept.
//! - **Index keys** (author and category names) are trimmed and lowercased
//!   with Unicode default (locale-independent) case mapping. Inner whitespace
//!   is kept, so `"Ana Silva"` and `"AnaSilva"` are different authors.

/// Normalizes a unique record key by stripping ASCII whitespace (space, tab,
/// line feed, vertical tab, form feed, carriage return) and hyphens.
///
/// ```
/// use shelf_catalog::normalize::record_key;
/// assert_eq!(record_key(" 978-85 333-0227-3 "), "9788533302273");
/// assert_eq!(record_key("AbC-1"), "AbC1");
/// ```
pub fn record_key(raw: impl AsRef<str>) -> String {
    raw.as_ref().chars().filter(|c| !matches!(*c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r' | '-')).collect()
}

/// Normalizes an author or category name for use as a secondary index key.
///
/// ```
/// use shelf_catalog::normalize::index_key;
/// assert_eq!(index_key("  Ana Silva "), "ana silva");
/// ```
pub fn index_key(raw: impl AsRef<str>) -> String {
    raw.as_ref().trim().to_lowercase()
}

/// Normalized record key for a lookup, or `None` when nothing is left.
pub(crate) fn lookup_key(raw: &str) -> Option<String> {
    Some(record_key(raw)).filter(|key| !key.is_empty())
}

/// Whether a lookup term carries anything to look up.
pub(crate) fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("9788533302273", "9788533302273")]
    #[case("978-85-333-0227-3", "9788533302273")]
    #[case(" 978 85\t333\n0227 3 ", "9788533302273")]
    #[case("--", "")]
    #[case("Ab-c", "Abc")]
    #[case("978\x0B85\x0C333\r", "97885333")]
    #[case("978\u{a0}85", "978\u{a0}85")]
    #[case("978\u{2003}85", "978\u{2003}85")]
    fn test_record_key(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(record_key(raw), expected);
    }

    #[rstest]
    #[case("Ana Silva", "ana silva")]
    #[case("  FICTION\t", "fiction")]
    #[case("Ana  Silva", "ana  silva")]
    #[case("ÉMILE Zola", "émile zola")]
    #[case("   ", "")]
    fn test_index_key(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(index_key(raw), expected);
    }

    #[test]
    fn test_record_key_preserves_case() {
        assert_ne!(record_key("abc"), record_key("ABC"));
    }

    #[rstest]
    #[case("978-1", Some("9781"))]
    #[case(" - ", None)]
    #[case("", None)]
    #[case("\u{a0}", Some("\u{a0}"))]
    fn test_lookup_key(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(lookup_key(raw).as_deref(), expected);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" a "));
    }
}
