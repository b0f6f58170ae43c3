use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use ordbok_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod language;
pub mod lookup;
pub mod recent;
pub mod selection;

use language::handle_language_change;
use lookup::handle_lookup;
use recent::handle_recent;
use selection::{handle_sense_selection, handle_toggle_saved};

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::debug!("Event loop started");

    loop {
        let event = tokio::select! {
            event = ui_to_app_rx.recv() => event?,
            _ = cancel.cancelled() => break,
        };

        tracing::debug!("Event received: {:?}", std::mem::discriminant(&event));
        if !handle_events(state.clone(), &app_to_ui_tx, event).await? {
            break;
        }
    }

    tracing::debug!("Event loop stopping");
    Ok(())
}

/// Handle one event. Returns false once the session should end.
pub async fn handle_events(
    state: Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<bool> {
    match event {
        AppEvent::Lookup(word) => {
            handle_lookup(state, word, app_to_ui_tx).await?;
        }
        AppEvent::SetLanguage(language) => {
            handle_language_change(state, language, app_to_ui_tx).await?;
        }
        AppEvent::SelectSense(index) => {
            handle_sense_selection(state, index, app_to_ui_tx).await?;
        }
        AppEvent::ToggleSaved => {
            handle_toggle_saved(state, app_to_ui_tx).await?;
        }
        AppEvent::ShowRecent => {
            handle_recent(state, app_to_ui_tx).await?;
        }
        AppEvent::Quit => {
            app_to_ui_tx.send(AppEvent::Quit).await?;
            return Ok(false);
        }
        AppEvent::ShowResults { .. }
        | AppEvent::ShowRecentWords(_)
        | AppEvent::StatusUpdate(_)
        | AppEvent::LookupFailed(_) => {
            // Output-only events
        }
    }

    Ok(true)
}
