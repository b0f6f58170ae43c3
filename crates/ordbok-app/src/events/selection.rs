use std::sync::Arc;

use kanal::AsyncSender;
use ordbok_core::display_title;
use ordbok_types::AppEvent;

use crate::state::AppState;

pub async fn handle_sense_selection(
    state: Arc<AppState>,
    index: usize,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (entries, saved, from_cache) = {
        let mut view = state.view.write().await;
        if index >= view.entries.len() {
            drop(view);
            app_to_ui_tx
                .send(AppEvent::StatusUpdate(format!("No sense #{}", index + 1)))
                .await?;
            return Ok(());
        }

        view.selected = index;
        let saved = state.dictionary.is_saved(&view.entries[index]).await;
        (view.entries.clone(), saved, view.from_cache)
    };

    app_to_ui_tx
        .send(AppEvent::ShowResults {
            entries,
            selected: index,
            saved,
            from_cache,
        })
        .await?;

    Ok(())
}

/// Save or unsave the selected sense
pub async fn handle_toggle_saved(
    state: Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(entry) = state.view.read().await.selected_entry().cloned() else {
        app_to_ui_tx
            .send(AppEvent::StatusUpdate("Nothing to save".to_string()))
            .await?;
        return Ok(());
    };

    let saved = state.dictionary.toggle_saved(&entry).await;
    let title = display_title(&entry);
    let status = if saved {
        format!("Saved {title}")
    } else {
        format!("Removed {title}")
    };

    app_to_ui_tx.send(AppEvent::StatusUpdate(status)).await?;
    Ok(())
}
