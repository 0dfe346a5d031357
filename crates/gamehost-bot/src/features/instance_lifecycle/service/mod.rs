use crate::features::compute_directory::service::DirectoryService;
use crate::shared::error::BotResult;
use crate::shared::types::{AddressReading, Command, CommandKeyword, Instance, InstanceState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What handling one command produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Chat replies, in delivery order
    pub replies: Vec<String>,
    /// Instance name to start watching for a new address
    pub watch: Option<String>,
}

impl CommandOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    fn reply(text: impl Into<String>) -> Self {
        Self {
            replies: vec![text.into()],
            watch: None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.replies.is_empty() && self.watch.is_none()
    }
}

pub fn not_found_reply(name: &str) -> String {
    format!("Instance not found: {name}")
}

/// Validates each requested transition against freshly observed state
pub struct LifecycleService {
    directory: Arc<DirectoryService>,
}

impl LifecycleService {
    pub fn new(directory: Arc<DirectoryService>) -> Self {
        Self { directory }
    }

    /// Lookup failures propagate; a failed start/stop request is reported
    /// in the outcome instead.
    pub async fn handle(&self, command: &Command) -> BotResult<CommandOutcome> {
        let name = command.instance_name.as_str();

        match &command.keyword {
            CommandKeyword::Start => self.start(name).await,
            CommandKeyword::Stop => self.stop(name).await,
            CommandKeyword::Ip => self.ip(name).await,
            CommandKeyword::Unrecognized(keyword) => {
                debug!(instance = %name, %keyword, "Ignoring unrecognized command");
                Ok(CommandOutcome::ignored())
            }
        }
    }

    async fn start(&self, name: &str) -> BotResult<CommandOutcome> {
        let Some(instance) = self.directory.lookup(name).await? else {
            return Ok(CommandOutcome::reply(not_found_reply(name)));
        };

        let mut outcome = CommandOutcome::reply(format!("Starting {name}..."));

        if instance.state != InstanceState::Stopped {
            outcome.replies.push(format!(
                "Cannot start instance. Instance state: {}",
                instance.state
            ));
            return Ok(outcome);
        }

        if let Err(e) = self.directory.request_start(&instance.instance_id).await {
            warn!(instance = %name, instance_id = %instance.instance_id, error = %e, "Start request failed");
            outcome.replies.push(format!("Failed to start {name}."));
            return Ok(outcome);
        }

        info!(instance = %name, instance_id = %instance.instance_id, "Start requested");
        outcome.replies.push(format!("Started {name}."));
        outcome.watch = Some(name.to_string());
        Ok(outcome)
    }

    async fn stop(&self, name: &str) -> BotResult<CommandOutcome> {
        let Some(instance) = self.directory.lookup(name).await? else {
            return Ok(CommandOutcome::reply(not_found_reply(name)));
        };

        let mut outcome = CommandOutcome::reply(format!("Stopping {name}..."));

        if instance.state != InstanceState::Running {
            outcome.replies.push(format!(
                "Cannot stop instance. Instance state: {}",
                instance.state
            ));
            return Ok(outcome);
        }

        if let Err(e) = self.directory.request_stop(&instance.instance_id).await {
            warn!(instance = %name, instance_id = %instance.instance_id, error = %e, "Stop request failed");
            outcome.replies.push(format!("Failed to stop {name}."));
            return Ok(outcome);
        }

        info!(instance = %name, instance_id = %instance.instance_id, "Stop requested");
        outcome.replies.push(format!("Stopped {name}."));
        Ok(outcome)
    }

    async fn ip(&self, name: &str) -> BotResult<CommandOutcome> {
        let Some(instance) = self.directory.lookup(name).await? else {
            return Ok(CommandOutcome::reply(not_found_reply(name)));
        };

        Ok(CommandOutcome::reply(describe_address(&instance)))
    }
}

fn describe_address(instance: &Instance) -> String {
    let name = &instance.name;
    match instance.read_address() {
        AddressReading::AmbiguousTopology(_) | AddressReading::Unassigned => {
            format!("Unable to get IP address for {name}")
        }
        AddressReading::NotAssociated => {
            format!("Unable to get IP address for {name}. Is the server online?")
        }
        AddressReading::Assigned(address) => format!(
            "IP for {name} ({}): \n```{}```",
            address.stability.label(),
            address.ip
        ),
    }
}
