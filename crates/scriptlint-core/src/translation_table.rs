//! Packed message translation table.
//!
//! Every user-visible message template is listed here once with its translations. At first use the
//! list is packed into three parts:
//!
//! - `locale_table`: NUL-terminated locale names, ending with an empty name.
//! - a mapping from message index to one string offset per locale (slot 0 is the untranslated
//!   template).
//! - a NUL-separated string pool.
//!
//! Templates are resolved to table indexes at compile time by [`TranslatableMessage::new`].

use std::sync::LazyLock;

/// Locales with translations, in table order.
pub const LOCALES: [&str; 5] = ["de", "en_US@snarky", "fr_FR", "pt_BR", "sv_SE"];

/// [`LOCALES`] as a packed list of NUL-terminated names followed by an empty name.
pub const LOCALE_TABLE: &str = "de\0en_US@snarky\0fr_FR\0pt_BR\0sv_SE\0\0";

/// A translatable message template.
///
/// Templates use `{N}` placeholders referring to the Nth argument of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatableMessage {
    index: u16,
    untranslated: &'static str,
}

const NOT_IN_TABLE: u16 = u16::MAX;

impl TranslatableMessage {
    /// Look `untranslated` up in the translation table.
    ///
    /// Templates missing from the table are still usable; they are never translated.
    pub const fn new(untranslated: &'static str) -> Self {
        let mut i = 0;
        while i < MESSAGES.len() {
            if const_str_eq(MESSAGES[i].untranslated, untranslated) {
                return Self {
                    index: i as u16,
                    untranslated,
                };
            }
            i += 1;
        }
        Self {
            index: NOT_IN_TABLE,
            untranslated,
        }
    }

    /// The original (English) template.
    pub fn untranslated(self) -> &'static str {
        self.untranslated
    }

    /// Index in the translation table, if present.
    pub fn table_index(self) -> Option<usize> {
        (self.index != NOT_IN_TABLE).then_some(usize::from(self.index))
    }
}

const fn const_str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

pub(crate) struct MessageTranslations {
    pub(crate) untranslated: &'static str,
    pub(crate) translations: &'static [(&'static str, &'static str)],
}

/// The packed form of all translations.
pub struct TranslationTable {
    /// `mapping[message][slot]`: offset into `string_table`. Slot 0 is untranslated; slot `i + 1`
    /// is `LOCALES[i]`. Missing translations point at the untranslated string.
    mapping: Vec<[u32; LOCALES.len() + 1]>,
    string_table: String,
}

impl TranslationTable {
    /// The process-wide table.
    pub fn get() -> &'static TranslationTable {
        static TABLE: LazyLock<TranslationTable> = LazyLock::new(TranslationTable::pack);
        &TABLE
    }

    fn pack() -> Self {
        let mut string_table = String::new();
        let mut intern = |text: &str| -> u32 {
            let offset = string_table.len() as u32;
            string_table.push_str(text);
            string_table.push('\0');
            offset
        };

        let mapping = MESSAGES
            .iter()
            .map(|message| {
                let untranslated = intern(message.untranslated);
                let mut slots = [untranslated; LOCALES.len() + 1];
                for (locale_index, locale) in LOCALES.iter().enumerate() {
                    if let Some((_, translated)) = message
                        .translations
                        .iter()
                        .find(|(name, _)| name == locale)
                    {
                        slots[locale_index + 1] = intern(translated);
                    }
                }
                slots
            })
            .collect();

        Self {
            mapping,
            string_table,
        }
    }

    /// Names in the packed `locale_table`, in table order.
    pub fn locale_names(&self) -> impl Iterator<Item = &'static str> {
        LOCALE_TABLE.split('\0').take_while(|name| !name.is_empty())
    }

    /// Slot of `locale` in the mapping (`0` for the untranslated locale).
    pub fn find_locale(&self, locale: &str) -> Option<usize> {
        if locale.is_empty() {
            return Some(0);
        }
        self.locale_names()
            .position(|name| name == locale)
            .map(|i| i + 1)
    }

    /// Look up `message` for the locale in `slot`.
    pub fn translate(&self, message: TranslatableMessage, slot: usize) -> &str {
        let Some(index) = message.table_index() else {
            return message.untranslated();
        };
        let offset = self.mapping[index][slot] as usize;
        let rest = &self.string_table[offset..];
        rest.split('\0').next().unwrap_or(rest)
    }

    /// Number of messages in the table.
    pub fn message_count(&self) -> usize {
        self.mapping.len()
    }
}

/// Every locale with translations, not including the untranslated (empty) locale.
pub fn translation_table_locale_names() -> impl Iterator<Item = &'static str> {
    TranslationTable::get().locale_names()
}

macro_rules! translation_table {
    ($($untranslated:literal => { $($locale:literal : $translated:literal),* $(,)? }),* $(,)?) => {
        pub(crate) const MESSAGES: &[MessageTranslations] = &[
            $(MessageTranslations {
                untranslated: $untranslated,
                translations: &[$(($locale, $translated)),*],
            }),*
        ];
    };
}

translation_table! {
    "variable assigned before its declaration" => {
        "de": "Variable vor ihrer Deklaration zugewiesen",
        "en_US@snarky": "assigned before it was declared. time travel is not a feature",
        "fr_FR": "variable affectée avant sa déclaration",
        "pt_BR": "variável atribuída antes da sua declaração",
        "sv_SE": "variabel tilldelad före dess deklaration",
    },
    "variable declared here" => {
        "de": "Variable hier deklariert",
        "fr_FR": "variable déclarée ici",
        "pt_BR": "variável declarada aqui",
        "sv_SE": "variabel deklarerad här",
    },
    "assignment to const global variable" => {
        "de": "Zuweisung an eine globale const-Variable",
        "en_US@snarky": "you can't change a const global. it's right there in the name",
        "fr_FR": "affectation à une variable globale constante",
        "pt_BR": "atribuição a variável global constante",
        "sv_SE": "tilldelning till konstant global variabel",
    },
    "assignment to const variable" => {
        "de": "Zuweisung an eine const-Variable",
        "en_US@snarky": "const means constant. did you skip that part?",
        "fr_FR": "affectation à une variable constante",
        "pt_BR": "atribuição a variável constante",
        "sv_SE": "tilldelning till konstant variabel",
    },
    "const variable declared here" => {
        "de": "const-Variable hier deklariert",
        "fr_FR": "variable constante déclarée ici",
    },
    "character is not allowed in identifiers" => {
        "de": "Zeichen ist in Bezeichnern nicht erlaubt",
    },
    "invalid expression left of assignment" => {
        "de": "ungültiger Ausdruck links von der Zuweisung",
        "en_US@snarky": "you can't assign to that. what did you expect to happen?",
    },
    "redeclaration of global variable" => {
        "de": "Redeklaration einer globalen Variable",
        "fr_FR": "redéclaration d'une variable globale",
    },
    "redeclaration of variable: {0}" => {
        "de": "Redeklaration der Variable: {0}",
        "en_US@snarky": "you couldn't get enough of {0}, so you had to make two, huh?",
        "fr_FR": "redéclaration de la variable : {0}",
        "pt_BR": "redeclaração de variável: {0}",
        "sv_SE": "omdeklaration av variabel: {0}",
    },
    "variable already declared here" => {
        "de": "Variable bereits hier deklariert",
        "fr_FR": "variable déjà déclarée ici",
        "pt_BR": "variável já declarada aqui",
        "sv_SE": "variabel redan deklarerad här",
    },
    "unclosed block comment" => {
        "de": "nicht geschlossener Blockkommentar",
        "en_US@snarky": "this comment never ends. much like this conversation",
        "fr_FR": "commentaire de bloc non fermé",
    },
    "unclosed string literal" => {
        "de": "nicht geschlossenes String-Literal",
        "fr_FR": "chaîne littérale non fermée",
    },
    "unclosed template" => {
        "de": "nicht geschlossenes Template",
    },
    "unexpected '#'" => {
        "de": "unerwartetes '#'",
        "en_US@snarky": "what's with the random '#'?",
        "fr_FR": "'#' inattendu",
        "pt_BR": "'#' inesperado",
        "sv_SE": "oväntad '#'",
    },
    "unexpected token" => {
        "de": "unerwartetes Token",
        "fr_FR": "symbole inattendu",
        "pt_BR": "token inesperado",
        "sv_SE": "oväntad token",
    },
    "use of undeclared variable: {0}" => {
        "de": "Benutzung einer nicht deklarierten Variable: {0}",
        "en_US@snarky": "{0}? never heard of it",
        "fr_FR": "utilisation d'une variable non déclarée : {0}",
        "pt_BR": "uso de variável não declarada: {0}",
        "sv_SE": "användning av odeklarerad variabel: {0}",
    },
    "variable used before declaration: {0}" => {
        "de": "Variable vor ihrer Deklaration benutzt: {0}",
        "en_US@snarky": "using {0} before declaring it? bold move",
    },
    "assignment to undeclared variable" => {
        "de": "Zuweisung an nicht deklarierte Variable",
        "fr_FR": "affectation à une variable non déclarée",
    },
    "unexpected character" => {
        "de": "unerwartetes Zeichen",
        "fr_FR": "caractère inattendu",
    },
    "missing name in {1}" => {
        "de": "fehlender Name in {1}",
    },
    "unmatched '{1}'" => {
        "de": "'{1}' ohne Gegenstück",
    },
    "expected '{1}'" => {
        "de": "'{1}' erwartet",
        "fr_FR": "'{1}' attendu",
    },
    "JSON syntax error" => {
        "de": "JSON-Syntaxfehler",
        "en_US@snarky": "that's not JSON. not even close",
        "fr_FR": "erreur de syntaxe JSON",
    },
    "\"global-groups\" entries must be strings" => {},
    "\"globals\" must be an object" => {},
    "\"global-groups\" must be a boolean or an array" => {},
    "assignment to imported variable" => {
        "de": "Zuweisung an eine importierte Variable",
    },
    "imported variable declared here" => {},
    "\"globals\" descriptor must be a boolean or an object" => {},
    "\"globals\" descriptor \"shadowable\" property must be a boolean" => {},
    "\"globals\" descriptor \"writable\" property must be a boolean" => {},
    "missing initializer in {1} declaration" => {
        "de": "fehlender Initialisierer in {1}-Deklaration",
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_table_matches_locale_list() {
        let names: Vec<&str> = TranslationTable::get().locale_names().collect();
        assert_eq!(names, LOCALES);
    }

    #[test]
    fn translations_only_name_known_locales() {
        for message in MESSAGES {
            for (locale, _) in message.translations {
                assert!(
                    LOCALES.contains(locale),
                    "{:?} names unknown locale {locale}",
                    message.untranslated
                );
            }
        }
    }

    #[test]
    fn templates_are_unique() {
        for (i, a) in MESSAGES.iter().enumerate() {
            for b in &MESSAGES[i + 1..] {
                assert_ne!(a.untranslated, b.untranslated);
            }
        }
    }

    #[test]
    fn unknown_template_is_not_in_table() {
        let message = TranslatableMessage::new("something happened");
        assert_eq!(message.table_index(), None);
        assert_eq!(
            TranslationTable::get().translate(message, 2),
            "something happened"
        );
    }

    #[test]
    fn missing_translation_falls_back_to_template() {
        let table = TranslationTable::get();
        let message = TranslatableMessage::new("unclosed template");
        let slot = table.find_locale("sv_SE").expect("sv_SE is packed");
        assert_eq!(table.translate(message, slot), "unclosed template");
    }
}
