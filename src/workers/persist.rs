use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::db::Storage;

/// Work queued for the persistence worker
#[derive(Debug)]
pub enum PersistRequest {
    Save { key: &'static str, value: Value },

    /// Answered once every earlier request has been handled
    Flush(oneshot::Sender<FlushReport>),
}

/// Saves handled since the previous flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    pub failed: usize,
}

/// Worker that writes tracker documents to storage in the order they were queued.
///
/// Failures are logged and counted; in-memory state is never touched, so a
/// lost save only costs the latest change if the process exits before the
/// next one succeeds.
pub struct PersistWorker {
    storage: Arc<dyn Storage>,
    request_rx: mpsc::UnboundedReceiver<PersistRequest>,
    report: FlushReport,
}

impl PersistWorker {
    pub fn new(
        storage: Arc<dyn Storage>,
        request_rx: mpsc::UnboundedReceiver<PersistRequest>,
    ) -> Self {
        Self {
            storage,
            request_rx,
            report: FlushReport::default(),
        }
    }

    /// Run the worker loop
    pub async fn run(mut self) {
        info!("Persist worker started");

        while let Some(request) = self.request_rx.recv().await {
            match request {
                PersistRequest::Save { key, value } => self.save(key, value).await,
                PersistRequest::Flush(reply) => {
                    let report = std::mem::take(&mut self.report);
                    // Caller may have stopped waiting
                    let _ = reply.send(report);
                }
            }
        }

        debug!("Persist channel closed");
    }

    async fn save(&mut self, key: &'static str, value: Value) {
        match self.storage.save(key, value).await {
            Ok(()) => {
                self.report.saved += 1;
                debug!("Saved '{}'", key);
            }
            Err(e) => {
                self.report.failed += 1;
                warn!("Failed to save '{}': {}", key, e);
            }
        }
    }
}
