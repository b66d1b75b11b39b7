//! Localized text values and the resolution rule.
//!
//! Every editor-facing text field is a [`LocalizedText`]: one optional string
//! per supported language. Visitor reads resolve that bag to a single display
//! string with one fallback rule, implemented once here and used identically
//! by content items, songs, and the singleton site configs:
//!
//! requested language (non-empty) → English (non-empty) → `""`.
//!
//! Resolution is total: it never fails and never returns an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of languages the site supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Hi,
    Ru,
    Ko,
    Zh,
    Ja,
    Es,
}

impl LanguageCode {
    /// All supported languages, English first.
    pub const ALL: [LanguageCode; 7] = [
        LanguageCode::En,
        LanguageCode::Hi,
        LanguageCode::Ru,
        LanguageCode::Ko,
        LanguageCode::Zh,
        LanguageCode::Ja,
        LanguageCode::Es,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Hi => "hi",
            LanguageCode::Ru => "ru",
            LanguageCode::Ko => "ko",
            LanguageCode::Zh => "zh",
            LanguageCode::Ja => "ja",
            LanguageCode::Es => "es",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(LanguageCode::En),
            "hi" => Ok(LanguageCode::Hi),
            "ru" => Ok(LanguageCode::Ru),
            "ko" => Ok(LanguageCode::Ko),
            "zh" => Ok(LanguageCode::Zh),
            "ja" => Ok(LanguageCode::Ja),
            "es" => Ok(LanguageCode::Es),
            other => Err(crate::AppError::Validation(format!(
                "Unsupported language code: {}",
                other
            ))),
        }
    }
}

/// A per-language bag of strings with the fallback-to-English resolution rule.
///
/// Stored as a JSONB object keyed by language code. Absent and empty values
/// are treated the same by [`resolve`](LocalizedText::resolve).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<LanguageCode, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A value with only the English string set.
    pub fn english(value: impl Into<String>) -> Self {
        let mut text = Self::new();
        text.set(LanguageCode::En, value);
        text
    }

    pub fn get(&self, language: LanguageCode) -> Option<&str> {
        self.0.get(&language).map(String::as_str)
    }

    pub fn set(&mut self, language: LanguageCode, value: impl Into<String>) {
        self.0.insert(language, value.into());
    }

    /// Resolve to one display string: the requested language if non-empty,
    /// else English if non-empty, else the empty string. Never fails.
    pub fn resolve(&self, language: LanguageCode) -> &str {
        match self.get(language) {
            Some(value) if !value.is_empty() => value,
            _ => match self.get(LanguageCode::En) {
                Some(value) if !value.is_empty() => value,
                _ => "",
            },
        }
    }

    /// Whether the mandatory English value is present and non-empty.
    pub fn has_english(&self) -> bool {
        self.get(LanguageCode::En).is_some_and(|v| !v.is_empty())
    }

    /// True when no language holds a non-empty string.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }

    /// Overlay the languages present in `other` onto this value. Languages
    /// absent from `other` are untouched (partial update semantics).
    pub fn merge(&mut self, other: &LocalizedText) {
        for (lang, value) in &other.0 {
            self.0.insert(*lang, value.clone());
        }
    }
}

impl<const N: usize> From<[(LanguageCode, &str); N]> for LocalizedText {
    fn from(entries: [(LanguageCode, &str); N]) -> Self {
        let mut text = Self::new();
        for (lang, value) in entries {
            text.set(lang, value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_requested_language() {
        let text = LocalizedText::from([(LanguageCode::En, "Welcome"), (LanguageCode::Es, "Hola")]);
        assert_eq!(text.resolve(LanguageCode::Es), "Hola");
        assert_eq!(text.resolve(LanguageCode::En), "Welcome");
    }

    #[test]
    fn resolve_falls_back_to_english() {
        let text = LocalizedText::english("Rise");
        assert_eq!(text.resolve(LanguageCode::Es), "Rise");
        assert_eq!(text.resolve(LanguageCode::Ja), "Rise");
    }

    #[test]
    fn resolve_empty_requested_value_falls_back() {
        let text = LocalizedText::from([(LanguageCode::En, "Welcome"), (LanguageCode::Ru, "")]);
        assert_eq!(text.resolve(LanguageCode::Ru), "Welcome");
    }

    #[test]
    fn resolve_never_fails_on_blank_value() {
        let text = LocalizedText::new();
        for lang in LanguageCode::ALL {
            assert_eq!(text.resolve(lang), "");
        }

        let all_empty = LocalizedText::from([(LanguageCode::En, ""), (LanguageCode::Hi, "")]);
        for lang in LanguageCode::ALL {
            assert_eq!(all_empty.resolve(lang), "");
        }
    }

    /// resolve(v, L) is non-empty iff v[L] or v["en"] is non-empty.
    #[test]
    fn resolve_non_empty_iff_requested_or_english_set() {
        let cases = [
            LocalizedText::new(),
            LocalizedText::english("Welcome"),
            LocalizedText::from([(LanguageCode::Ko, "환영")]),
            LocalizedText::from([(LanguageCode::En, ""), (LanguageCode::Zh, "欢迎")]),
        ];
        for text in &cases {
            for lang in LanguageCode::ALL {
                let expected = text.get(lang).is_some_and(|v| !v.is_empty())
                    || text.get(LanguageCode::En).is_some_and(|v| !v.is_empty());
                assert_eq!(!text.resolve(lang).is_empty(), expected);
            }
        }
    }

    #[test]
    fn merge_overlays_present_languages_only() {
        let mut base =
            LocalizedText::from([(LanguageCode::En, "Welcome"), (LanguageCode::Es, "Hola")]);
        let patch = LocalizedText::from([(LanguageCode::Es, "Bienvenido")]);
        base.merge(&patch);
        assert_eq!(base.resolve(LanguageCode::Es), "Bienvenido");
        assert_eq!(base.resolve(LanguageCode::En), "Welcome");
    }

    #[test]
    fn serializes_as_plain_language_map() {
        let text = LocalizedText::from([(LanguageCode::En, "Welcome"), (LanguageCode::Ja, "ようこそ")]);
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["en"], "Welcome");
        assert_eq!(json["ja"], "ようこそ");

        let round: LocalizedText = serde_json::from_value(json).unwrap();
        assert_eq!(round, text);
    }

    #[test]
    fn rejects_unknown_language_keys() {
        let result: Result<LocalizedText, _> = serde_json::from_str(r#"{"fr": "Bonjour"}"#);
        assert!(result.is_err());
    }
}
