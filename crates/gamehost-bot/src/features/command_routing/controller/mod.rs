use std::sync::Arc;

use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::features::command_routing::service::CommandRouter;
use crate::features::instance_lifecycle::controller::LifecycleController;
use crate::features::instance_lifecycle::service::CommandOutcome;
use crate::shared::types::InboundMessage;

/// Entry point for every inbound chat message
pub struct CommandRoutingController {
    router: CommandRouter,
    lifecycle: Arc<LifecycleController>,
}

impl CommandRoutingController {
    pub fn new(router: CommandRouter, lifecycle: Arc<LifecycleController>) -> Self {
        Self { router, lifecycle }
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleController> {
        &self.lifecycle
    }

    /// Route and run one message. `None` when the message was not a command
    /// or the command could not be completed.
    pub async fn on_message(&self, message: InboundMessage) -> Option<CommandOutcome> {
        let command = self.router.route(&message)?;

        let span = info_span!(
            "command",
            command_id = %Uuid::new_v4(),
            instance = %command.instance_name
        );

        async {
            match self.lifecycle.handle(command).await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    error!(error = %e, code = e.code(), "Command aborted");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }
}
