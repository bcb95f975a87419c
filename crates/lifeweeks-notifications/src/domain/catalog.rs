//! YAML-backed message catalog.

use std::collections::HashMap;

use lifeweeks_core::i18n::Localizer;
use thiserror::Error;
use tracing::debug;

/// Catalog shipped with the crate.
const EMBEDDED_CATALOG: &str = include_str!("../../locales/messages.yaml");

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not a `language -> context -> template` mapping.
    #[error("invalid message catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but contains no languages.
    #[error("message catalog is empty")]
    Empty,
}

/// Translations keyed by language, then by context key.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    translations: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    /// Parses a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed documents and
    /// `CatalogError::Empty` when no language is defined.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let translations: HashMap<String, HashMap<String, String>> =
            serde_yaml::from_str(source)?;
        if translations.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { translations })
    }

    /// Loads the catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled document is invalid.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml_str(EMBEDDED_CATALOG)
    }

    /// Whether `language` (or its base language, for `en-US` style codes)
    /// has translations.
    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.lookup_language(language).is_some()
    }

    /// Languages present in the catalog, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.translations.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    fn lookup_language(&self, language: &str) -> Option<&HashMap<String, String>> {
        self.translations.get(language).or_else(|| {
            let base = language.split(['-', '_']).next()?;
            self.translations.get(base)
        })
    }
}

impl Localizer for MessageCatalog {
    fn translate(&self, language: &str, context: &str, default: &str) -> String {
        match self
            .lookup_language(language)
            .and_then(|entries| entries.get(context))
        {
            Some(template) => template.clone(),
            None => {
                debug!(language, context, "no translation, using default template");
                default.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages;

    #[test]
    fn test_embedded_catalog_covers_every_message_context() {
        let catalog = MessageCatalog::embedded().unwrap();

        for language in ["en", "ru"] {
            for context in [
                messages::WEEKLY_TITLE,
                messages::WEEKLY_BODY,
                messages::MILESTONE_TITLE,
                messages::MILESTONE_BODY,
            ] {
                assert_ne!(
                    catalog.translate(language, context, "<missing>"),
                    "<missing>",
                    "{language} lacks {context}"
                );
            }
        }
    }

    #[test]
    fn test_english_catalog_matches_built_in_defaults() {
        let catalog = MessageCatalog::embedded().unwrap();

        assert_eq!(
            catalog.translate("en", messages::WEEKLY_BODY, ""),
            messages::WEEKLY_BODY_DEFAULT
        );
        assert_eq!(
            catalog.translate("en", messages::MILESTONE_BODY, ""),
            messages::MILESTONE_BODY_DEFAULT
        );
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let catalog = MessageCatalog::embedded().unwrap();

        assert_eq!(catalog.translate("xx", messages::WEEKLY_TITLE, "fallback"), "fallback");
        assert!(!catalog.supports("xx"));
    }

    #[test]
    fn test_regional_code_uses_base_language() {
        let catalog = MessageCatalog::from_yaml_str("en:\n  greeting: Hello\n").unwrap();

        assert_eq!(catalog.translate("en-GB", "greeting", "?"), "Hello");
        assert!(catalog.supports("en_US"));
    }

    #[test]
    fn test_empty_and_malformed_documents_are_rejected() {
        assert!(matches!(
            MessageCatalog::from_yaml_str("{}"),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            MessageCatalog::from_yaml_str("- just\n- a list\n"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_languages_are_sorted() {
        let catalog = MessageCatalog::embedded().unwrap();

        assert_eq!(catalog.languages(), vec!["en", "ru"]);
    }
}
