use ordbok_types::{HistoryRecord, LexicalEntry};

use crate::cache::LookupCache;
use crate::history::HistoryLedger;
use crate::saved::SavedWordSet;
use crate::store::{HISTORY_SLOT, SAVED_WORDS_SLOT, Store, load_slot};

/// Per-process lookup state. Cache and ledger hold their own copies of
/// every entry.
#[derive(Debug, Default)]
pub struct Session {
    pub cache: LookupCache,
    pub history: HistoryLedger,
    pub saved: SavedWordSet,
}

impl Session {
    pub fn new(history: Vec<HistoryRecord>, saved: Vec<LexicalEntry>, history_cap: usize) -> Self {
        let history = HistoryLedger::new(history, history_cap);
        let cache = LookupCache::from_history(history.records());

        Self {
            cache,
            history,
            saved: SavedWordSet::new(saved),
        }
    }

    /// Load both persisted slots and pre-warm the cache from history
    pub fn hydrate(store: &dyn Store, history_cap: usize) -> Self {
        let history: Vec<HistoryRecord> = load_slot(store, HISTORY_SLOT);
        let saved: Vec<LexicalEntry> = load_slot(store, SAVED_WORDS_SLOT);

        tracing::info!(
            "Loaded {} history records and {} saved words",
            history.len(),
            saved.len()
        );

        Self::new(history, saved, history_cap)
    }
}
