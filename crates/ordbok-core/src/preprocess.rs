use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default query preprocessor
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Composed form so "å" typed two ways hits the same cache slot
        let text: String = text.nfc().collect();

        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

pub struct QueryPreprocessor;
impl Preprocessor for QueryPreprocessor {}

/// Normalized form of a looked-up word
pub fn normalize_word(word: &str) -> String {
    QueryPreprocessor.process(word)
}
