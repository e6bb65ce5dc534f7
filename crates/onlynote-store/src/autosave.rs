// SPDX-License-Identifier: AGPL-3.0-or-later
//! Debounced autosave
//!
//! Every edit hands the autosaver a snapshot of the session. The snapshot is
//! written to the store once no newer edit has arrived for the debounce
//! window, so a burst of keystrokes costs a single write.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::kv::KeyValueStore;
use crate::session::Session;

/// Quiet period after the last edit before saving
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// An edit is waiting out the debounce window
    Saving,
    Saved,
    /// The last write failed; the message is the store error
    Failed(String),
}

impl SaveStatus {
    /// Status-bar caption
    pub fn label(&self) -> &str {
        match self {
            Self::Saving => "Saving...",
            Self::Saved => "Saved ✔",
            Self::Failed(_) => "Save failed",
        }
    }
}

/// Handle to the background autosave task
pub struct Autosaver {
    edits: mpsc::UnboundedSender<Session>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl Autosaver {
    /// Start the autosave task. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>, debounce: Duration) -> Self {
        let (edits, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Saved);
        let task = tokio::spawn(run(rx, store, debounce, status_tx));
        Self {
            edits,
            status,
            task,
        }
    }

    /// Record an edit
    pub fn notify(&self, session: &Session) {
        if self.edits.send(session.clone()).is_err() {
            warn!("autosave task has stopped; edit not recorded");
        }
    }

    /// Subscribe to status changes
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Flush any pending edit and wait for the task to finish
    pub async fn shutdown(self) {
        drop(self.edits);
        if let Err(err) = self.task.await {
            warn!(error = %err, "autosave task ended abnormally");
        }
    }
}

async fn run(
    mut edits: mpsc::UnboundedReceiver<Session>,
    store: Arc<dyn KeyValueStore>,
    debounce: Duration,
    status: watch::Sender<SaveStatus>,
) {
    while let Some(mut pending) = edits.recv().await {
        status.send_replace(SaveStatus::Saving);

        loop {
            tokio::select! {
                next = edits.recv() => match next {
                    Some(newer) => pending = newer,
                    None => break,
                },
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        // Store writes are synchronous file I/O
        let writer = Arc::clone(&store);
        let written = tokio::task::spawn_blocking(move || {
            pending
                .autosave(writer.as_ref())
                .map(|()| pending.content.len())
        })
        .await;

        match written {
            Ok(Ok(bytes)) => {
                debug!(bytes, "autosaved note");
                status.send_replace(SaveStatus::Saved);
            }
            Ok(Err(err)) => {
                warn!(error = %err, "autosave failed");
                status.send_replace(SaveStatus::Failed(err.to_string()));
            }
            Err(err) => {
                warn!(error = %err, "autosave write task panicked");
                status.send_replace(SaveStatus::Failed(err.to_string()));
            }
        }
    }
}
