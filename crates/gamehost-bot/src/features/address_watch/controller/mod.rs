use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument};

use crate::features::address_watch::service::{AddressWatchService, WatchOutcome};
use crate::shared::types::ReplyDestination;

/// Owns the background watch task of every instance.
///
/// At most one watch per instance name is kept: spawning a new one aborts
/// the previous task for that name.
pub struct AddressWatchController {
    service: Arc<AddressWatchService>,
    handles: Mutex<HashMap<String, JoinHandle<WatchOutcome>>>,
}

impl AddressWatchController {
    pub fn new(service: Arc<AddressWatchService>) -> Self {
        Self {
            service,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub async fn spawn_watch(&self, name: String, destination: ReplyDestination) {
        let service = self.service.clone();
        let span = info_span!("address_watch", instance = %name);
        let task_name = name.clone();
        let handle = tokio::spawn(
            async move { service.watch(&task_name, destination).await }.instrument(span),
        );

        let mut handles = self.handles.lock().await;
        handles.retain(|_, handle| !handle.is_finished());
        if let Some(previous) = handles.insert(name.clone(), handle) {
            if !previous.is_finished() {
                info!(instance = %name, "Superseding running address watch");
            }
            previous.abort();
        }
    }

    /// Detach the handle for `name` so the caller can await it
    pub async fn take(&self, name: &str) -> Option<JoinHandle<WatchOutcome>> {
        self.handles.lock().await.remove(name)
    }

    /// Abort the watch for `name`. Returns false when none was tracked.
    pub async fn cancel(&self, name: &str) -> bool {
        match self.handles.lock().await.remove(name) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Names with a watch that has not finished yet
    pub async fn active_watches(&self) -> Vec<String> {
        let mut handles = self.handles.lock().await;
        handles.retain(|_, handle| !handle.is_finished());
        let mut names: Vec<String> = handles.keys().cloned().collect();
        names.sort();
        names
    }
}
