use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::features::command_routing::repo::ChatSink;
use crate::features::compute_directory::service::DirectoryService;
use crate::shared::error::BotError;
use crate::shared::types::{AddressReading, AddressStability, ReplyDestination};

/// Fixed-delay polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// How a watch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// A dynamic address appeared and was announced
    Announced(String),
    /// The address is reserved; nothing to announce
    StableAddress,
    InstanceGone,
    AmbiguousTopology(usize),
    /// The name tag matched more than one instance
    Misconfigured,
    Exhausted,
}

pub struct AddressWatchService {
    directory: Arc<DirectoryService>,
    chat: Arc<dyn ChatSink>,
    policy: WatchPolicy,
}

impl AddressWatchService {
    pub fn new(
        directory: Arc<DirectoryService>,
        chat: Arc<dyn ChatSink>,
        policy: WatchPolicy,
    ) -> Self {
        Self {
            directory,
            chat,
            policy,
        }
    }

    pub fn policy(&self) -> WatchPolicy {
        self.policy
    }

    /// Poll until `name` has a public address, reporting it at most once.
    /// Never fails: every error ends in a silent outcome.
    pub async fn watch(&self, name: &str, destination: ReplyDestination) -> WatchOutcome {
        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            let instance = match self.directory.lookup(name).await {
                Ok(Some(instance)) => instance,
                Ok(None) => {
                    debug!(instance = %name, attempt, "Instance disappeared, abandoning watch");
                    return WatchOutcome::InstanceGone;
                }
                Err(BotError::InvariantViolation(detail)) => {
                    error!(instance = %name, error = %detail, "Abandoning watch");
                    return WatchOutcome::Misconfigured;
                }
                Err(e) => {
                    warn!(instance = %name, attempt, error = %e, "Address poll failed");
                    continue;
                }
            };

            match instance.read_address() {
                AddressReading::AmbiguousTopology(count) => {
                    debug!(instance = %name, interfaces = count, "Abandoning watch");
                    return WatchOutcome::AmbiguousTopology(count);
                }
                AddressReading::NotAssociated | AddressReading::Unassigned => {
                    debug!(instance = %name, attempt, "No public address yet");
                }
                AddressReading::Assigned(address) => {
                    if address.stability == AddressStability::Stable {
                        debug!(instance = %name, "Stable address, nothing to announce");
                        return WatchOutcome::StableAddress;
                    }

                    let text = format!("IP for {name}: \n```{}```", address.ip);
                    if let Err(e) = self.chat.send(destination, &text).await {
                        warn!(instance = %name, error = %e, "Failed to announce address");
                    } else {
                        info!(instance = %name, ip = %address.ip, attempt, "Announced dynamic address");
                    }
                    return WatchOutcome::Announced(address.ip);
                }
            }
        }

        debug!(instance = %name, attempts = self.policy.max_attempts, "Watch budget exhausted");
        WatchOutcome::Exhausted
    }
}
