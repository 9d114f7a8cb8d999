//! Data bridge: connects the [`Watcher`] update channel to TUI actions.
//!
//! Runs as a background task, forwarding every published tick as an
//! [`Action`] through the TUI's action channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use dlwatch_core::Watcher;

use crate::action::Action;

/// Forward watcher ticks to the TUI until cancelled or the watcher stops.
pub async fn spawn_data_bridge(
    watcher: Watcher,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut updates = watcher.updates();

    // Push the current snapshot so the screen has data immediately
    let snapshot = updates.borrow_and_update().clone();
    if let Some(update) = snapshot {
        let _ = action_tx.send(Action::WatchUpdated(Arc::new(update)));
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("watcher stopped publishing updates");
                    break;
                }
                let update = updates.borrow_and_update().clone();
                let Some(update) = update else { continue };
                if action_tx.send(Action::WatchUpdated(Arc::new(update))).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}
