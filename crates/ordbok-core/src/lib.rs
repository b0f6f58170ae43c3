pub mod cache;
pub mod error;
pub mod history;
pub mod lookup;
pub mod preprocess;
pub mod sanitize;
pub mod saved;
pub mod state;
pub mod store;

pub use cache::{Fingerprint, LookupCache};
pub use error::{LookupError, StoreError};
pub use history::HistoryLedger;
pub use lookup::{EntrySource, LookupOutcome, LookupService};
pub use sanitize::{display_title, sanitize, sanitize_entry};
pub use saved::SavedWordSet;
pub use state::Session;
pub use store::{JsonFileStore, MemoryStore, Store};
