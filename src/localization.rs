//! Localization store interface and the core plugin's message tables.

use std::collections::HashMap;

use dashmap::DashMap;

/// Language used when a message is missing in the requested language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Message key to localized text.
pub type MessageTable = HashMap<String, String>;

/// The host's localization library.
pub trait LocalizationStore: Send + Sync {
    /// Register `messages` for `owner` in `language`.
    ///
    /// Keys already registered for the owner and language keep their
    /// current text.
    fn register_messages(&self, messages: &MessageTable, owner: &str, language: &str);
}

fn table(entries: &[(&str, &str)]) -> MessageTable {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Messages shipped with the core plugin, keyed by language code.
pub fn default_languages() -> Vec<(&'static str, MessageTable)> {
    vec![
        (
            "en",
            table(&[
                ("CommandUsage", "Usage: {0}"),
                ("NotAllowed", "You are not allowed to use the '{0}' command"),
                ("PlayerNotFound", "No player found matching '{0}'"),
                ("UnknownCommand", "Unknown command: {0}"),
                ("ServerVersion", "Server is running {0} version {1}"),
            ]),
        ),
        (
            "de",
            table(&[
                ("CommandUsage", "Verwendung: {0}"),
                ("NotAllowed", "Du darfst den Befehl '{0}' nicht verwenden"),
                ("UnknownCommand", "Unbekannter Befehl: {0}"),
            ]),
        ),
        (
            "fr",
            table(&[
                ("CommandUsage", "Utilisation : {0}"),
                ("NotAllowed", "Vous n'êtes pas autorisé à utiliser la commande '{0}'"),
                ("UnknownCommand", "Commande inconnue : {0}"),
            ]),
        ),
    ]
}

/// In-memory [`LocalizationStore`].
#[derive(Debug, Default)]
pub struct MemoryLocalizationStore {
    // (owner, language) -> messages
    messages: DashMap<(String, String), MessageTable>,
}

impl MemoryLocalizationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Languages registered for `owner`, sorted.
    pub fn languages(&self, owner: &str) -> Vec<String> {
        let mut languages: Vec<_> = self
            .messages
            .iter()
            .filter(|e| e.key().0 == owner)
            .map(|e| e.key().1.clone())
            .collect();
        languages.sort();
        languages
    }

    /// Look up a message, falling back to [`DEFAULT_LANGUAGE`].
    pub fn get(&self, owner: &str, language: &str, key: &str) -> Option<String> {
        let lookup = |language: &str| {
            self.messages
                .get(&(owner.to_string(), language.to_string()))
                .and_then(|table| table.get(key).cloned())
        };
        lookup(language).or_else(|| lookup(DEFAULT_LANGUAGE))
    }
}

impl LocalizationStore for MemoryLocalizationStore {
    fn register_messages(&self, messages: &MessageTable, owner: &str, language: &str) {
        let mut existing = self
            .messages
            .entry((owner.to_string(), language.to_string()))
            .or_default();
        for (key, text) in messages {
            existing.entry(key.clone()).or_insert_with(|| text.clone());
        }
    }
}
