use std::sync::Arc;

use kanal::AsyncSender;
use ordbok_types::AppEvent;

use crate::state::AppState;

pub async fn handle_recent(
    state: Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let limit = state.config.read().await.lookup.recent_words;
    let words = state.dictionary.recent_words(limit).await;

    app_to_ui_tx.send(AppEvent::ShowRecentWords(words)).await?;
    Ok(())
}
