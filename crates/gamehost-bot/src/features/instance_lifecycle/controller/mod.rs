use crate::features::address_watch::controller::AddressWatchController;
use crate::features::command_routing::repo::ChatSink;
use crate::features::instance_lifecycle::service::{CommandOutcome, LifecycleService};
use crate::shared::error::{BotError, BotResult};
use crate::shared::types::Command;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs a command, delivers its replies and starts any address watch
pub struct LifecycleController {
    service: Arc<LifecycleService>,
    watches: Arc<AddressWatchController>,
    chat: Arc<dyn ChatSink>,
}

impl LifecycleController {
    pub fn new(
        service: Arc<LifecycleService>,
        watches: Arc<AddressWatchController>,
        chat: Arc<dyn ChatSink>,
    ) -> Self {
        Self {
            service,
            watches,
            chat,
        }
    }

    pub fn watches(&self) -> &Arc<AddressWatchController> {
        &self.watches
    }

    /// Handle one command end to end. Recoverable failures become a chat
    /// reply; an invariant violation is replied to and then returned.
    pub async fn handle(&self, command: Command) -> BotResult<CommandOutcome> {
        info!(instance = %command.instance_name, keyword = ?command.keyword, "Received command");

        let outcome = match self.service.handle(&command).await {
            Ok(outcome) => outcome,
            Err(BotError::InvariantViolation(detail)) => {
                error!(instance = %command.instance_name, error = %detail, "Refusing command");
                self.deliver(
                    &command,
                    &format!(
                        "Configuration error: more than one instance is tagged {}.",
                        command.instance_name
                    ),
                )
                .await;
                return Err(BotError::InvariantViolation(detail));
            }
            Err(e) => {
                warn!(instance = %command.instance_name, error = %e, code = e.code(), "Command failed");
                CommandOutcome {
                    replies: vec![format!("Failed to look up {}.", command.instance_name)],
                    watch: None,
                }
            }
        };

        for reply in &outcome.replies {
            self.deliver(&command, reply).await;
        }

        if let Some(name) = &outcome.watch {
            self.watches
                .spawn_watch(name.clone(), command.destination)
                .await;
        }

        Ok(outcome)
    }

    async fn deliver(&self, command: &Command, text: &str) {
        if let Err(e) = self.chat.send(command.destination, text).await {
            warn!(
                instance = %command.instance_name,
                destination = %command.destination,
                error = %e,
                "Failed to deliver reply"
            );
        }
    }
}
