use ordbok_types::HelperMode;
use serde_json::json;

/// Language-specific prompt text and response shapes
pub trait LanguageProfile: Send + Sync {
    /// Name of the source language, e.g. "Swedish"
    fn language_name(&self) -> &str;

    /// Locale handed to speech output
    fn speech_locale(&self) -> &str;

    /// System instruction for dictionary lookups
    fn lookup_instruction(&self) -> String;

    fn lookup_prompt(&self, word: &str, target_language: &str) -> String;

    /// Requested shape of a lookup response: an array of entries
    fn entry_schema(&self) -> serde_json::Value;

    fn helper_instruction(&self, mode: HelperMode, target_language: &str) -> String;

    fn helper_schema(&self) -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "output": { "type": "STRING" },
                "explanation": { "type": "STRING" }
            },
            "required": ["output", "explanation"]
        })
    }

    fn chapter_instruction(&self) -> String;

    fn chapter_prompt(&self, number: u32, title: &str, target_language: &str) -> String;
}
