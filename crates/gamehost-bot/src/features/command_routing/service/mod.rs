use std::collections::HashSet;

use tracing::debug;

use crate::shared::config::BotConfig;
use crate::shared::types::{Command, CommandKeyword, InboundMessage};

/// Maps chat messages onto commands.
///
/// A command channel is a channel named `channel_name` inside a category;
/// the category name is the instance name tag.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    prefix: String,
    channel_name: String,
    allowed_instances: HashSet<String>,
}

impl CommandRouter {
    pub fn new(
        prefix: impl Into<String>,
        channel_name: impl Into<String>,
        allowed_instances: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            channel_name: channel_name.into(),
            allowed_instances: allowed_instances.into_iter().collect(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            config.command_prefix.clone(),
            config.command_channel_name.clone(),
            config.instance_names.iter().cloned(),
        )
    }

    /// Cheap check that needs no channel lookup
    pub fn is_candidate(&self, author_is_self: bool, content: &str) -> bool {
        !author_is_self && content.starts_with(&self.prefix)
    }

    pub fn route(&self, message: &InboundMessage) -> Option<Command> {
        if !self.is_candidate(message.author_is_self, &message.content) {
            return None;
        }

        let Some(category) = message.category_name.as_deref() else {
            debug!(channel = %message.channel, "Channel has no category");
            return None;
        };

        if message.channel_name != self.channel_name {
            return None;
        }

        if !self.allowed_instances.is_empty() && !self.allowed_instances.contains(category) {
            debug!(instance = %category, "Category is not a configured instance");
            return None;
        }

        let keyword = &message.content[self.prefix.len()..];

        Some(Command {
            instance_name: category.to_string(),
            keyword: CommandKeyword::parse(keyword),
            destination: message.channel,
        })
    }
}
