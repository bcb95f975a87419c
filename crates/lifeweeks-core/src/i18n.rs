//! Localization port.

/// Resolves translated text for a language.
pub trait Localizer: Send + Sync {
    /// Returns the translation of `context` in `language`, or `default`
    /// when no translation is known.
    fn translate(&self, language: &str, context: &str, default: &str) -> String;
}

/// A [`Localizer`] bound to one language.
#[derive(Clone, Copy)]
pub struct Translator<'a> {
    localizer: &'a dyn Localizer,
    language: &'a str,
}

impl<'a> Translator<'a> {
    /// Binds `localizer` to `language`.
    #[must_use]
    pub fn new(localizer: &'a dyn Localizer, language: &'a str) -> Self {
        Self {
            localizer,
            language,
        }
    }

    /// The language this translator resolves.
    #[must_use]
    pub const fn language(&self) -> &str {
        self.language
    }

    /// Translated text for `context`.
    #[must_use]
    pub fn text(&self, context: &str, default: &str) -> String {
        self.localizer.translate(self.language, context, default)
    }

    /// Translated text for `context` with `{name}` placeholders filled from
    /// `args`.
    #[must_use]
    pub fn format(&self, context: &str, default: &str, args: &[(&str, String)]) -> String {
        interpolate(&self.text(context, default), args)
    }
}

impl std::fmt::Debug for Translator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Replaces every `{name}` in `template` with the matching value from
/// `args`. Unknown placeholders are left untouched. The template is scanned
/// once, so braces inside substituted values are emitted literally.
#[must_use]
pub fn interpolate(template: &str, args: &[(&str, String)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                rendered.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = &tail[1..];
            }
        }
    }
    rendered.push_str(rest);
    rendered
}
