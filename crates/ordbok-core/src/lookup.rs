use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use ordbok_types::{HistoryRecord, LexicalEntry};
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::cache::Fingerprint;
use crate::error::LookupError;
use crate::preprocess::normalize_word;
use crate::state::Session;
use crate::store::{HISTORY_SLOT, SAVED_WORDS_SLOT, Store, save_slot};

/// Where fresh entries come from on a cache miss
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Fetch every sense of `word` with secondary glosses in `target_language`.
    /// Returned entries must already be sanitized.
    async fn fetch_entries(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<Vec<LexicalEntry>, LookupError>;
}

#[async_trait]
impl<T: EntrySource + ?Sized> EntrySource for Arc<T> {
    async fn fetch_entries(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<Vec<LexicalEntry>, LookupError> {
        (**self).fetch_entries(word, target_language).await
    }
}

#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub fingerprint: Fingerprint,
    pub entries: Vec<LexicalEntry>,
    pub from_cache: bool,
}

type PendingMap = Mutex<HashMap<Fingerprint, Arc<AsyncMutex<()>>>>;

/// Drops a fingerprint's gate once the lookup that created it ends,
/// whether it finished or its future was dropped mid-fetch
struct GateRelease<'a> {
    pending: &'a PendingMap,
    fingerprint: &'a Fingerprint,
    gate: Arc<AsyncMutex<()>>,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending
            .get(self.fingerprint)
            .is_some_and(|gate| Arc::ptr_eq(gate, &self.gate))
        {
            pending.remove(self.fingerprint);
        }
    }
}

/// Cache-first lookups with history bookkeeping.
///
/// Concurrent lookups of the same fingerprint are serialized so only the
/// first one reaches the source; the others are served from the cache.
/// Slot writes are serialized too, each one taking its snapshot once it
/// holds the persist lock, so the store always ends on the newest state.
pub struct LookupService<S> {
    source: S,
    store: Arc<dyn Store>,
    session: RwLock<Session>,
    pending: PendingMap,
    persist_lock: AsyncMutex<()>,
}

impl<S: EntrySource> LookupService<S> {
    /// Build the service with state hydrated from `store`
    pub fn new(source: S, store: Arc<dyn Store>, history_cap: usize) -> Self {
        let session = Session::hydrate(store.as_ref(), history_cap);
        Self::with_session(source, store, session)
    }

    pub fn with_session(source: S, store: Arc<dyn Store>, session: Session) -> Self {
        Self {
            source,
            store,
            session: RwLock::new(session),
            pending: Mutex::new(HashMap::new()),
            persist_lock: AsyncMutex::new(()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn lookup(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<LookupOutcome, LookupError> {
        let query = normalize_word(word);
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let fingerprint = Fingerprint::new(&query, target_language);
        if let Some(outcome) = self.cached(&fingerprint).await {
            return Ok(outcome);
        }

        let gate = self.gate(&fingerprint);
        let _release = GateRelease {
            pending: &self.pending,
            fingerprint: &fingerprint,
            gate: gate.clone(),
        };
        let _guard = gate.lock().await;

        // An identical lookup may have finished while we waited
        if let Some(outcome) = self.cached(&fingerprint).await {
            return Ok(outcome);
        }

        tracing::debug!("Cache miss for {}, fetching", fingerprint);
        let entries = match self.source.fetch_entries(word.trim(), target_language).await {
            Ok(entries) => self.commit(&fingerprint, entries, target_language).await,
            Err(e) => {
                tracing::warn!("Lookup for {} failed: {}", fingerprint, e);
                return Err(e);
            }
        };

        Ok(LookupOutcome {
            fingerprint: fingerprint.clone(),
            entries,
            from_cache: false,
        })
    }

    /// Cache and record a complete result under one write lock
    async fn commit(
        &self,
        fingerprint: &Fingerprint,
        entries: Vec<LexicalEntry>,
        target_language: &str,
    ) -> Vec<LexicalEntry> {
        let entries: Vec<LexicalEntry> = entries
            .into_iter()
            .map(|mut entry| {
                entry.target_language = target_language.to_string();
                entry
            })
            .collect();

        {
            let mut session = self.session.write().await;
            session.cache.put(fingerprint.clone(), entries.clone());
            session
                .history
                .record_for(Some(fingerprint), &entries, now_millis());
        }

        if !entries.is_empty() {
            self.persist(HISTORY_SLOT, |session| session.history.records().to_vec())
                .await;
        }

        tracing::info!("Looked up {} ({} senses)", fingerprint, entries.len());
        entries
    }

    async fn cached(&self, fingerprint: &Fingerprint) -> Option<LookupOutcome> {
        let session = self.session.read().await;
        let entries = session.cache.get(fingerprint)?.to_vec();
        tracing::debug!("Cache hit for {}", fingerprint);

        Some(LookupOutcome {
            fingerprint: fingerprint.clone(),
            entries,
            from_cache: true,
        })
    }

    fn gate(&self, fingerprint: &Fingerprint) -> Arc<AsyncMutex<()>> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.entry(fingerprint.clone()).or_default().clone()
    }

    /// Toggle an entry in the saved-word set; returns whether it is now saved
    pub async fn toggle_saved(&self, entry: &LexicalEntry) -> bool {
        let saved = self.session.write().await.saved.toggle(entry);

        self.persist(SAVED_WORDS_SLOT, |session| session.saved.entries().to_vec())
            .await;
        saved
    }

    /// Drop every saved sense of `word`
    pub async fn remove_saved_word(&self, word: &str) -> usize {
        let removed = self.session.write().await.saved.remove_word(word);

        if removed > 0 {
            self.persist(SAVED_WORDS_SLOT, |session| session.saved.entries().to_vec())
                .await;
        }
        removed
    }

    pub async fn is_saved(&self, entry: &LexicalEntry) -> bool {
        self.session.read().await.saved.contains(entry)
    }

    pub async fn saved(&self) -> Vec<LexicalEntry> {
        self.session.read().await.saved.entries().to_vec()
    }

    pub async fn history(&self, limit: usize) -> Vec<HistoryRecord> {
        let session = self.session.read().await;
        session.history.records().iter().take(limit).cloned().collect()
    }

    /// Distinct recent words, each with the language it was last looked up in
    pub async fn recent_words(&self, limit: usize) -> Vec<(String, Option<String>)> {
        let session = self.session.read().await;
        session
            .history
            .unique_recent_words(limit)
            .into_iter()
            .map(|word| {
                let language = session.history.language_of(&word).map(str::to_string);
                (word, language)
            })
            .collect()
    }

    /// Write the current contents of a slot off the async runtime.
    /// Failures are logged and never reach the caller.
    async fn persist<T, F>(&self, slot: &'static str, snapshot: F)
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&Session) -> Vec<T>,
    {
        let _order = self.persist_lock.lock().await;
        let records = snapshot(&*self.session.read().await);

        let store = self.store.clone();
        let result =
            tokio::task::spawn_blocking(move || save_slot(store.as_ref(), slot, &records)).await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to persist {}: {}", slot, e),
            Err(e) => tracing::warn!("Persist task for {} failed: {}", slot, e),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::cache::tests::{entry, record};
    use crate::store::{MemoryStore, load_slot};

    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntrySource for CountingSource {
        async fn fetch_entries(
            &self,
            word: &str,
            _target_language: &str,
        ) -> Result<Vec<LexicalEntry>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(LookupError::failed("HTTP 500: upstream down"));
            }
            Ok(vec![entry(word, "noun", ""), entry(word, "verb", "")])
        }
    }

    fn service(source: CountingSource) -> (LookupService<CountingSource>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = LookupService::new(source, store.clone(), 100);
        (service, store)
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let (service, _) = service(CountingSource::new());

        let first = service.lookup("Bil", "Spanish").await.unwrap();
        let second = service.lookup(" bil ", "Spanish").await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.entries, second.entries);
        assert_eq!(service.source().calls(), 1);
        assert!(first.entries.iter().all(|e| e.target_language == "Spanish"));
    }

    #[tokio::test]
    async fn language_is_part_of_the_key() {
        let (service, _) = service(CountingSource::new());

        service.lookup("bil", "Spanish").await.unwrap();
        service.lookup("bil", "German").await.unwrap();

        assert_eq!(service.source().calls(), 2);
        assert_eq!(service.recent_words(10).await, vec![("bil".to_string(), Some("German".to_string()))]);
    }

    #[tokio::test]
    async fn concurrent_identical_lookups_share_one_fetch() {
        let mut source = CountingSource::new();
        source.delay = Duration::from_millis(20);
        let (service, _) = service(source);

        let (a, b) = tokio::join!(service.lookup("hus", "Spanish"), service.lookup("HUS", "Spanish"));

        assert_eq!(a.unwrap().entries, b.unwrap().entries);
        assert_eq!(service.source().calls(), 1);
    }

    #[tokio::test]
    async fn empty_query_never_reaches_source() {
        let (service, _) = service(CountingSource::new());

        assert_eq!(service.lookup("   ", "Spanish").await.unwrap_err(), LookupError::EmptyQuery);
        assert_eq!(service.source().calls(), 0);
    }

    #[tokio::test]
    async fn failure_leaves_no_trace() {
        let mut source = CountingSource::new();
        source.fail = true;
        let (service, store) = service(source);

        let err = service.lookup("bil", "Spanish").await.unwrap_err();

        assert_eq!(err.user_message(), "HTTP 500: upstream down");
        assert!(service.history(10).await.is_empty());
        let persisted: Vec<HistoryRecord> = load_slot(store.as_ref(), HISTORY_SLOT);
        assert!(persisted.is_empty());

        // Not cached either: the next attempt goes back to the source
        let _ = service.lookup("bil", "Spanish").await;
        assert_eq!(service.source().calls(), 2);
    }

    #[tokio::test]
    async fn lookup_persists_history() {
        let (service, store) = service(CountingSource::new());

        service.lookup("bil", "Spanish").await.unwrap();

        let persisted: Vec<HistoryRecord> = load_slot(store.as_ref(), HISTORY_SLOT);
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].entry.grammatical_class, "noun");
        assert!(persisted[0].observed_at > 0);
    }

    #[tokio::test]
    async fn reopening_serves_history_from_cache() {
        let store = Arc::new(MemoryStore::new());
        save_slot(
            store.as_ref(),
            HISTORY_SLOT,
            &[record("glass", "noun", "Spanish", 1), record("glass", "adjective", "Spanish", 1)],
        )
        .unwrap();

        let service = LookupService::new(CountingSource::new(), store, 100);
        let outcome = service.lookup("Glass", "Spanish").await.unwrap();

        assert!(outcome.from_cache);
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(service.source().calls(), 0);
    }

    /// Memory store whose first write stalls
    struct SlowStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl Store for SlowStore {
        fn read(&self, slot: &str) -> Result<Option<String>, crate::StoreError> {
            self.inner.read(slot)
        }

        fn write(&self, slot: &str, data: &str) -> Result<(), crate::StoreError> {
            if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
                std::thread::sleep(Duration::from_millis(200));
            }
            self.inner.write(slot, data)
        }
    }

    fn words(records: &[HistoryRecord]) -> Vec<String> {
        records.iter().map(|r| r.entry.word.clone()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn newest_history_wins_on_disk() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            writes: AtomicUsize::new(0),
        });
        let service = LookupService::new(CountingSource::new(), store.clone(), 100);

        let (first, second) = tokio::join!(service.lookup("hus", "Spanish"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            service.lookup("bil", "Spanish").await
        });
        first.unwrap();
        second.unwrap();

        let in_memory = words(&service.history(10).await);
        let on_disk: Vec<HistoryRecord> = load_slot(store.as_ref(), HISTORY_SLOT);
        assert_eq!(in_memory, vec!["bil", "bil", "hus", "hus"]);
        assert_eq!(words(&on_disk), in_memory);
    }

    #[tokio::test]
    async fn dropped_lookup_releases_its_gate() {
        let mut source = CountingSource::new();
        source.delay = Duration::from_millis(500);
        let (service, _) = service(source);

        let cut_short =
            tokio::time::timeout(Duration::from_millis(20), service.lookup("bil", "Spanish")).await;
        assert!(cut_short.is_err());

        assert!(service.pending.lock().unwrap().is_empty());
        assert!(service.history(10).await.is_empty());
    }

    #[tokio::test]
    async fn finished_lookup_releases_its_gate() {
        let (service, _) = service(CountingSource::new());

        service.lookup("bil", "Spanish").await.unwrap();

        assert!(service.pending.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_toggle_round_trips_through_store() {
        let (service, store) = service(CountingSource::new());
        let sense = entry("bil", "noun", "Spanish");

        assert!(service.toggle_saved(&sense).await);
        assert!(service.is_saved(&sense).await);
        let persisted: Vec<LexicalEntry> = load_slot(store.as_ref(), SAVED_WORDS_SLOT);
        assert_eq!(persisted.len(), 1);

        assert!(!service.toggle_saved(&sense).await);
        let persisted: Vec<LexicalEntry> = load_slot(store.as_ref(), SAVED_WORDS_SLOT);
        assert!(persisted.is_empty());
    }
}
