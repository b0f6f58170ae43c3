use std::env;

use ordbok_types::LanguageOption;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_LANGUAGE: &str = "Chinese (Simplified)";

const SUPPORTED_LANGUAGES: [(&str, &str); 10] = [
    ("Chinese (Simplified)", "Chinese (中文)"),
    ("Spanish", "Spanish (Español)"),
    ("French", "French (Français)"),
    ("German", "German (Deutsch)"),
    ("Arabic", "Arabic (العربية)"),
    ("Japanese", "Japanese (日本語)"),
    ("Hindi", "Hindi (हिन्दी)"),
    ("Russian", "Russian (Русский)"),
    ("Portuguese", "Portuguese (Português)"),
    ("Turkish", "Turkish (Türkçe)"),
];

/// Target languages offered for the secondary gloss
pub fn supported_languages() -> Vec<LanguageOption> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, label)| LanguageOption {
            code: code.to_string(),
            label: label.to_string(),
        })
        .collect()
}

/// Display label for a language code, falling back to the code itself
pub fn language_label(code: &str) -> String {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Resolve user input (code or label prefix, any case) to a supported code
pub fn resolve_language(input: &str) -> Option<String> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, label)| {
            code.to_lowercase() == needle || label.to_lowercase().starts_with(&needle)
        })
        .map(|(code, _)| code.to_string())
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_history_cap() -> usize {
    100
}

fn default_recent_words() -> usize {
    10
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct LookupConfig {
    #[serde(default = "default_target_language")]
    pub default_target_language: String,
    /// Maximum number of history records kept
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// How many distinct words the recent-activity view shows
    #[serde(default = "default_recent_words")]
    pub recent_words: usize,
}

impl LookupConfig {
    pub fn new() -> Self {
        let default_target_language = env::var("TARGET_LANGUAGE")
            .ok()
            .and_then(|v| resolve_language(&v))
            .unwrap_or_else(default_target_language);

        Self {
            default_target_language,
            ..Self::default()
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_target_language: default_target_language(),
            history_cap: default_history_cap(),
            recent_words: default_recent_words(),
        }
    }
}
