use std::sync::Arc;

use ordbok_config::Config;
use ordbok_core::{EntrySource, LookupService, Store};
use ordbok_types::LexicalEntry;
use tokio::sync::RwLock;

pub type Dictionary = LookupService<Arc<dyn EntrySource>>;

/// What the interactive session currently shows
#[derive(Debug, Default, Clone)]
pub struct ViewState {
    pub target_language: String,
    /// Query behind the visible results
    pub current_word: Option<String>,
    pub entries: Vec<LexicalEntry>,
    pub selected: usize,
    /// Language the visible entries were produced for
    pub results_language: Option<String>,
    /// Whether the visible entries came from the cache
    pub from_cache: bool,
}

impl ViewState {
    pub fn selected_entry(&self) -> Option<&LexicalEntry> {
        self.entries.get(self.selected)
    }
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub dictionary: Dictionary,
    pub view: RwLock<ViewState>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn EntrySource>, store: Arc<dyn Store>) -> Self {
        let dictionary = LookupService::new(source, store, config.lookup.history_cap);
        let view = ViewState {
            target_language: config.lookup.default_target_language.clone(),
            ..Default::default()
        };

        Self {
            config: Arc::new(RwLock::new(config)),
            dictionary,
            view: RwLock::new(view),
        }
    }
}
