use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ordbok_config::Config;
use ordbok_core::{EntrySource, LookupError, MemoryStore};
use ordbok_types::{Definitions, Gender, LexicalEntry};

use crate::state::AppState;


/// Two senses per word; fails every lookup when `fail` is set
pub struct FakeSource {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntrySource for FakeSource {
    async fn fetch_entries(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<Vec<LexicalEntry>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LookupError::failed("HTTP 429: quota exhausted"));
        }

        Ok(vec![
            entry(word, "noun", target_language),
            entry(word, "verb", target_language),
        ])
    }
}

pub fn entry(word: &str, class: &str, target_language: &str) -> LexicalEntry {
    LexicalEntry {
        word: word.to_string(),
        phonetic_form: "—".into(),
        gender_class: Gender::NotApplicable,
        grammatical_class: class.to_string(),
        definitions: Definitions {
            primary: format!("{word} ({class})"),
            secondary: format!("{word} in {target_language}"),
        },
        examples: vec![],
        compound_forms: vec![],
        inflections: None,
        grammar_note: None,
        target_language: target_language.to_string(),
    }
}

pub fn app_state(source: Arc<FakeSource>) -> Arc<AppState> {
    Arc::new(AppState::new(
        Config::default(),
        source,
        Arc::new(MemoryStore::new()),
    ))
}
