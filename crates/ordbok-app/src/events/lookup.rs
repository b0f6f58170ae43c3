use std::sync::Arc;

use kanal::AsyncSender;
use ordbok_core::LookupError;
use ordbok_types::AppEvent;

use crate::state::AppState;

pub async fn handle_lookup(
    state: Arc<AppState>,
    word: String,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let language = state.view.read().await.target_language.clone();
    lookup_in(state, word, language, app_to_ui_tx).await
}

/// Look `word` up in `language` and replace the visible results
pub async fn lookup_in(
    state: Arc<AppState>,
    word: String,
    language: String,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    match state.dictionary.lookup(&word, &language).await {
        Ok(outcome) => {
            let saved = match outcome.entries.first() {
                Some(entry) => state.dictionary.is_saved(entry).await,
                None => false,
            };

            {
                let mut view = state.view.write().await;
                view.current_word = Some(word.trim().to_string());
                view.entries = outcome.entries.clone();
                view.selected = 0;
                view.results_language = Some(language);
                view.from_cache = outcome.from_cache;
            }

            app_to_ui_tx
                .send(AppEvent::ShowResults {
                    entries: outcome.entries,
                    selected: 0,
                    saved,
                    from_cache: outcome.from_cache,
                })
                .await?;
        }
        Err(LookupError::EmptyQuery) => {
            tracing::debug!("Ignoring empty query");
        }
        Err(e) => {
            {
                let mut view = state.view.write().await;
                view.entries.clear();
                view.selected = 0;
                view.results_language = None;
                view.from_cache = false;
            }

            app_to_ui_tx
                .send(AppEvent::LookupFailed(e.user_message()))
                .await?;
        }
    }

    Ok(())
}
