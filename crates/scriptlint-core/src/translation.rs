//! Locale-bound message translation.

use crate::translation_table::{TranslatableMessage, TranslationTable};

/// Resolves message templates for one locale.
///
/// The default translator maps every template to itself. Translators are cheap to copy and are
/// passed to each reporter instead of living in a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    /// Slot in the translation table mapping; `0` is the untranslated locale.
    slot: usize,
}

impl Translator {
    /// Translator which returns templates untranslated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translator for `locale`, or the untranslated one if `locale` is unknown.
    pub fn for_locale(locale: &str) -> Self {
        let mut translator = Self::new();
        translator.use_messages_from_locale(locale);
        translator
    }

    /// Switch to `locale`. The name is matched verbatim against the table (e.g. `en_US@snarky`).
    ///
    /// Returns `false`, and falls back to untranslated templates, if the locale has no
    /// translations.
    pub fn use_messages_from_locale(&mut self, locale: &str) -> bool {
        match TranslationTable::get().find_locale(locale) {
            Some(slot) => {
                self.slot = slot;
                true
            }
            None => {
                tracing::debug!(locale, "no translations for locale; using untranslated messages");
                self.slot = 0;
                false
            }
        }
    }

    /// Switch to the first locale in `locales` which has translations.
    pub fn use_messages_from_locales<'a>(
        &mut self,
        locales: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        let table = TranslationTable::get();
        for locale in locales {
            if let Some(slot) = table.find_locale(locale) {
                self.slot = slot;
                return true;
            }
        }
        self.slot = 0;
        false
    }

    /// The template for `message` in this translator's locale.
    pub fn translate(&self, message: TranslatableMessage) -> &'static str {
        TranslationTable::get().translate(message, self.slot)
    }
}
