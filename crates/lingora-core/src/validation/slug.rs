//! Content key (slug) validation and derivation.
//!
//! Editor-supplied keys must match `[a-z0-9_]+`, 3–50 characters, and are
//! checked for uniqueness against other items. Derived keys (from `title.en`)
//! are best-effort: lowercase, non-alphanumerics mapped to underscore,
//! truncated to 50 characters, padded to the 3-character minimum, with no
//! uniqueness pre-check.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

pub const KEY_MIN_LEN: usize = 3;
pub const KEY_MAX_LEN: usize = 50;

fn key_regex() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(r"^[a-z0-9_]{3,50}$").expect("valid key regex"))
}

/// Validate an editor-supplied key against the slug format.
pub fn validate_key(key: &str) -> Result<(), AppError> {
    if key_regex().is_match(key) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid key '{}': keys are {}-{} characters of [a-z0-9_]",
            key, KEY_MIN_LEN, KEY_MAX_LEN
        )))
    }
}

/// Derive a key from an English title: lowercase, every non-alphanumeric
/// character becomes an underscore, truncated to 50 characters. Stems shorter
/// than the 3-character minimum are padded with underscores so every derived
/// key passes [`validate_key`] and stays reachable by key lookup.
pub fn derive_key(title_en: &str) -> String {
    let mut key: String = title_en
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(KEY_MAX_LEN)
        .collect();
    while key.len() < KEY_MIN_LEN {
        key.push('_');
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_keys() {
        for key in ["welcome", "hero_main", "a_1", "abc"] {
            assert!(validate_key(key).is_ok(), "expected '{}' to pass", key);
        }
    }

    #[test]
    fn rejects_bad_format() {
        for key in ["ab", "Hello", "has space", "dash-ed", "", "ümlaut"] {
            assert!(validate_key(key).is_err(), "expected '{}' to fail", key);
        }
        let too_long = "a".repeat(51);
        assert!(validate_key(&too_long).is_err());
    }

    #[test]
    fn derives_from_simple_title() {
        assert_eq!(derive_key("Welcome"), "welcome");
        assert_eq!(derive_key("Hello World"), "hello_world");
        assert_eq!(derive_key("Ana's Bio!"), "ana_s_bio_");
    }

    #[test]
    fn derivation_truncates_to_max_len() {
        let long_title = "x".repeat(80);
        assert_eq!(derive_key(&long_title).len(), KEY_MAX_LEN);
    }

    // A two-letter title used to derive a key below the minimum length,
    // leaving the item unreachable through key lookup.
    #[test]
    fn short_derivations_are_padded_to_valid_keys() {
        assert_eq!(derive_key("Hi"), "hi_");
        assert_eq!(derive_key("A"), "a__");
        for title in ["Hi", "A", "!"] {
            let key = derive_key(title);
            assert!(
                validate_key(&key).is_ok(),
                "derived key '{}' must pass validation",
                key
            );
        }
    }
}
