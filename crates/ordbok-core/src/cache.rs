use std::collections::HashMap;
use std::fmt;

use ordbok_types::{HistoryRecord, LexicalEntry};

use crate::preprocess::normalize_word;

const SEPARATOR: char = ':';

/// Cache key: normalized word plus target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(word: &str, target_language: &str) -> Self {
        Self(format!("{}{}{}", normalize_word(word), SEPARATOR, target_language))
    }

    pub fn of(entry: &LexicalEntry) -> Self {
        Self::new(&entry.word, &entry.target_language)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-lifetime map from fingerprint to the senses returned for it.
/// Never persisted and never evicted.
#[derive(Debug, Default, Clone)]
pub struct LookupCache {
    entries: HashMap<Fingerprint, Vec<LexicalEntry>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-warmed from persisted history
    pub fn from_history(records: &[HistoryRecord]) -> Self {
        let mut cache = Self::new();
        cache.hydrate(records);
        cache
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&[LexicalEntry]> {
        self.entries.get(fingerprint).map(Vec::as_slice)
    }

    /// Store the senses for a fingerprint, replacing any previous set
    pub fn put(&mut self, fingerprint: Fingerprint, entries: Vec<LexicalEntry>) {
        self.entries.insert(fingerprint, entries);
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group history records by fingerprint and insert every group not
    /// already cached. Ledger order is kept within a group.
    pub fn hydrate(&mut self, records: &[HistoryRecord]) -> usize {
        let mut order = Vec::new();
        let mut groups: HashMap<Fingerprint, Vec<LexicalEntry>> = HashMap::new();

        for record in records {
            let fingerprint = Fingerprint::of(&record.entry);
            if self.contains(&fingerprint) {
                continue;
            }
            groups
                .entry(fingerprint.clone())
                .or_insert_with(|| {
                    order.push(fingerprint);
                    Vec::new()
                })
                .push(record.entry.clone());
        }

        let inserted = order.len();
        for fingerprint in order {
            if let Some(entries) = groups.remove(&fingerprint) {
                self.entries.insert(fingerprint, entries);
            }
        }

        tracing::debug!("Hydrated {} fingerprints from history", inserted);
        inserted
    }
}
