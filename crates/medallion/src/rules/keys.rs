//! Key stripping so identifiers line up across source systems.

use super::normalize::trimmed;

/// Remove a literal prefix (matched case-insensitively) from an identifier.
pub fn strip_prefix(raw: Option<&str>, prefix: &str) -> Option<String> {
    let value = trimmed(raw)?;
    let head = value.get(..prefix.len());
    match head {
        Some(h) if h.eq_ignore_ascii_case(prefix) => {
            Some(value[prefix.len()..].to_string()).filter(|s| !s.is_empty())
        }
        _ => Some(value),
    }
}

/// Remove every occurrence of a separator character.
pub fn remove_separator(raw: Option<&str>, separator: char) -> Option<String> {
    let value: String = trimmed(raw)?.chars().filter(|c| *c != separator).collect();
    Some(value).filter(|s| !s.is_empty())
}

/// Category id embedded in a composite product key: its first five
/// characters with `-` turned into `_` (`CO-RF-FR-R92B-58` → `CO_RF`).
pub fn category_id(raw: Option<&str>) -> Option<String> {
    let value = trimmed(raw)?;
    Some(value.chars().take(5).map(|c| if c == '-' { '_' } else { c }).collect())
}

/// Product key proper: the composite key from its seventh character on
/// (`CO-RF-FR-R92B-58` → `FR-R92B-58`).
pub fn product_key(raw: Option<&str>) -> Option<String> {
    let value = trimmed(raw)?;
    let key: String = value.chars().skip(6).collect();
    Some(key).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        assert_eq!(
            strip_prefix(Some("NASAW00011000"), "NAS"),
            Some("AW00011000".to_string())
        );
        assert_eq!(
            strip_prefix(Some("nasAW00011000"), "NAS"),
            Some("AW00011000".to_string())
        );
        assert_eq!(
            strip_prefix(Some("AW00011000"), "NAS"),
            Some("AW00011000".to_string())
        );
        assert_eq!(strip_prefix(Some("NAS"), "NAS"), None);
        assert_eq!(strip_prefix(Some("NA"), "NAS"), Some("NA".to_string()));
        assert_eq!(strip_prefix(None, "NAS"), None);
    }

    #[test]
    fn test_strip_prefix_multibyte_boundary() {
        assert_eq!(strip_prefix(Some("éAW1"), "NAS"), Some("éAW1".to_string()));
    }

    #[test]
    fn test_remove_separator() {
        assert_eq!(
            remove_separator(Some("AW-00011000"), '-'),
            Some("AW00011000".to_string())
        );
        assert_eq!(remove_separator(Some("--"), '-'), None);
    }

    #[test]
    fn test_composite_product_key() {
        assert_eq!(category_id(Some("CO-RF-FR-R92B-58")), Some("CO_RF".to_string()));
        assert_eq!(product_key(Some("CO-RF-FR-R92B-58")), Some("FR-R92B-58".to_string()));
        assert_eq!(product_key(Some("CO-RF")), None);
        assert_eq!(category_id(Some("AB")), Some("AB".to_string()));
    }
}
