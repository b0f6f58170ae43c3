use ordbok_types::LexicalEntry;

/// Entries the user pinned, most recently added first.
/// Membership is keyed on lowercased word and grammatical class.
#[derive(Debug, Clone, Default)]
pub struct SavedWordSet {
    entries: Vec<LexicalEntry>,
}

impl SavedWordSet {
    pub fn new(entries: Vec<LexicalEntry>) -> Self {
        Self { entries }
    }

    /// Insert `entry` at the front if absent, otherwise remove every entry
    /// with the same key. Returns whether the key is saved afterwards.
    pub fn toggle(&mut self, entry: &LexicalEntry) -> bool {
        let key = entry.saved_key();

        if self.contains(entry) {
            self.entries.retain(|saved| saved.saved_key() != key);
            tracing::debug!("Unsaved '{}' ({})", key.0, key.1);
            false
        } else {
            self.entries.insert(0, entry.clone());
            tracing::debug!("Saved '{}' ({})", key.0, key.1);
            true
        }
    }

    pub fn contains(&self, entry: &LexicalEntry) -> bool {
        let key = entry.saved_key();
        self.entries.iter().any(|saved| saved.saved_key() == key)
    }

    /// Remove every saved sense of `word`, whatever its class
    pub fn remove_word(&mut self, word: &str) -> usize {
        let word = word.to_lowercase();
        let before = self.entries.len();
        self.entries.retain(|saved| saved.word.to_lowercase() != word);
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[LexicalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::entry;

    #[test]
    fn toggle_twice_restores_original_state() {
        let mut saved = SavedWordSet::new(vec![entry("hus", "noun", "Spanish")]);
        let original = saved.entries().to_vec();

        assert!(saved.toggle(&entry("bil", "noun", "Spanish")));
        assert_eq!(saved.entries()[0].word, "bil");
        assert!(!saved.toggle(&entry("bil", "noun", "Spanish")));

        assert_eq!(saved.entries(), original.as_slice());
    }

    #[test]
    fn key_ignores_case_and_language() {
        let mut saved = SavedWordSet::default();
        saved.toggle(&entry("Glass", "Noun", "Spanish"));

        assert!(saved.contains(&entry("glass", "noun", "German")));
        assert!(!saved.contains(&entry("glass", "adjective", "Spanish")));

        assert!(!saved.toggle(&entry("GLASS", "NOUN", "German")));
        assert!(saved.is_empty());
    }

    #[test]
    fn toggle_removes_all_duplicates_of_a_key() {
        let mut saved = SavedWordSet::new(vec![
            entry("bil", "noun", "Spanish"),
            entry("hus", "noun", "Spanish"),
            entry("Bil", "noun", "German"),
        ]);

        assert!(!saved.toggle(&entry("bil", "noun", "French")));
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.entries()[0].word, "hus");
    }

    #[test]
    fn remove_word_drops_every_class() {
        let mut saved = SavedWordSet::new(vec![
            entry("glass", "noun", "Spanish"),
            entry("glass", "adjective", "Spanish"),
            entry("hus", "noun", "Spanish"),
        ]);

        assert_eq!(saved.remove_word("Glass"), 2);
        assert_eq!(saved.len(), 1);
    }
}
