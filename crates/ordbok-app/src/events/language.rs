use std::sync::Arc;

use kanal::AsyncSender;
use ordbok_config::lookup::{language_label, resolve_language};
use ordbok_types::AppEvent;

use crate::events::lookup::lookup_in;
use crate::state::AppState;

/// Switch the target language; visible results from another language are
/// fetched again in the new one
pub async fn handle_language_change(
    state: Arc<AppState>,
    input: String,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(language) = resolve_language(&input) else {
        app_to_ui_tx
            .send(AppEvent::StatusUpdate(format!("Unknown language: {}", input.trim())))
            .await?;
        return Ok(());
    };

    let stale_word = {
        let mut view = state.view.write().await;
        view.target_language = language.clone();

        match (&view.current_word, &view.results_language) {
            (Some(word), Some(results_language)) if *results_language != language => {
                Some(word.clone())
            }
            _ => None,
        }
    };

    tracing::info!("Target language set to {}", language);
    app_to_ui_tx
        .send(AppEvent::StatusUpdate(format!(
            "Target language: {}",
            language_label(&language)
        )))
        .await?;

    if let Some(word) = stale_word {
        tracing::debug!("Re-translating '{}' into {}", word, language);
        lookup_in(state, word, language, app_to_ui_tx).await?;
    }

    Ok(())
}
