use std::collections::HashSet;

use ordbok_types::{HistoryRecord, LexicalEntry};

use crate::cache::Fingerprint;
use crate::preprocess::normalize_word;

pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Most-recent-first log of looked-up senses, capped in length.
///
/// A lookup's senses stay contiguous, and a repeated lookup for the same
/// word and language replaces the earlier set instead of duplicating it.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    records: Vec<HistoryRecord>,
    cap: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_HISTORY_CAP)
    }
}

impl HistoryLedger {
    pub fn new(mut records: Vec<HistoryRecord>, cap: usize) -> Self {
        records.truncate(cap);
        Self { records, cap }
    }

    /// Stamp `entries` with `observed_at` and put them at the front
    pub fn record(&mut self, entries: &[LexicalEntry], observed_at: u64) -> &[HistoryRecord] {
        self.record_for(None, entries, observed_at)
    }

    /// Like [`record`](Self::record), additionally evicting records under the
    /// query's own fingerprint (the query can differ from the returned headword)
    pub fn record_for(
        &mut self,
        query: Option<&Fingerprint>,
        entries: &[LexicalEntry],
        observed_at: u64,
    ) -> &[HistoryRecord] {
        if entries.is_empty() {
            return &self.records;
        }

        let mut stale: HashSet<Fingerprint> = entries.iter().map(Fingerprint::of).collect();
        if let Some(query) = query {
            stale.insert(query.clone());
        }

        let fresh = entries.iter().cloned().map(|entry| HistoryRecord {
            entry,
            observed_at,
        });

        let kept = std::mem::take(&mut self.records)
            .into_iter()
            .filter(|record| !stale.contains(&Fingerprint::of(&record.entry)));

        self.records = fresh.chain(kept).take(self.cap).collect();

        &self.records
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Distinct lowercase words in ledger order
    pub fn unique_recent_words(&self, limit: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| normalize_word(&record.entry.word))
            .filter(|word| seen.insert(word.clone()))
            .take(limit)
            .collect()
    }

    /// Target language of the most recent record for `word`
    pub fn language_of(&self, word: &str) -> Option<&str> {
        let word = normalize_word(word);
        self.records
            .iter()
            .find(|record| normalize_word(&record.entry.word) == word)
            .map(|record| record.entry.target_language.as_str())
    }
}
