//! Locale-aware message catalogue used by `translate` and `string.format`

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Message templates keyed by locale, then by message id
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "FxHashMap<String, FxHashMap<String, String>>")]
pub struct MessageCatalog {
    locales: FxHashMap<String, FxHashMap<String, String>>,
}

impl MessageCatalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a message
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        id: impl Into<String>,
        template: impl Into<String>,
    ) -> &mut Self {
        self.locales
            .entry(normalize(&locale.into()))
            .or_default()
            .insert(id.into(), template.into());
        self
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_message(
        mut self,
        locale: impl Into<String>,
        id: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.insert(locale, id, template);
        self
    }

    /// Look a message up for `locale`.
    ///
    /// Tries the exact locale (`nl-BE`), then its base language (`nl`), then
    /// `default_locale` and its base language.
    pub fn lookup(&self, locale: &str, default_locale: &str, id: &str) -> Option<&str> {
        candidates(locale)
            .chain(candidates(default_locale))
            .find_map(|candidate| self.locales.get(&candidate)?.get(id))
            .map(String::as_str)
    }

    /// Whether any locale is loaded
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

impl From<FxHashMap<String, FxHashMap<String, String>>> for MessageCatalog {
    fn from(raw: FxHashMap<String, FxHashMap<String, String>>) -> Self {
        let mut catalog = MessageCatalog::new();
        for (locale, messages) in raw {
            let entry = catalog.locales.entry(normalize(&locale)).or_default();
            entry.extend(messages);
        }
        catalog
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

fn candidates(locale: &str) -> impl Iterator<Item = String> {
    let exact = normalize(locale);
    let base = exact
        .split_once('-')
        .map(|(language, _)| language.to_string());
    std::iter::once(exact).chain(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        MessageCatalog::new()
            .with_message("en", "greeting", "Hello {name}")
            .with_message("en", "farewell", "Bye")
            .with_message("nl", "greeting", "Hallo {name}")
            .with_message("nl-BE", "farewell", "Salut")
    }

    #[test]
    fn test_exact_locale() {
        assert_eq!(catalog().lookup("nl-BE", "en", "farewell"), Some("Salut"));
    }

    #[test]
    fn test_base_language_fallback() {
        assert_eq!(catalog().lookup("nl_BE", "en", "greeting"), Some("Hallo {name}"));
    }

    #[test]
    fn test_default_locale_fallback() {
        assert_eq!(catalog().lookup("nl", "en", "farewell"), Some("Bye"));
        assert_eq!(catalog().lookup("fr", "en", "greeting"), Some("Hello {name}"));
        assert_eq!(catalog().lookup("fr", "en", "missing"), None);
    }

    #[test]
    fn test_deserialize() {
        let catalog: MessageCatalog =
            serde_json::from_str(r#"{ "EN_us": { "a": "A" }, "de": { "b": "B" } }"#).unwrap();
        assert_eq!(catalog.lookup("en-US", "de", "a"), Some("A"));
        assert_eq!(catalog.lookup("en-US", "de", "b"), Some("B"));
        assert!(!catalog.is_empty());
    }
}
