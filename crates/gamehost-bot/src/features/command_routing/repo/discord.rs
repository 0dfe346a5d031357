use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, Context, EventHandler, GatewayIntents, Http, Message, Ready};
use tracing::{debug, info, warn};

use super::ChatSink;
use crate::features::command_routing::controller::CommandRoutingController;
use crate::shared::error::{BotError, BotResult};
use crate::shared::types::{InboundMessage, ReplyDestination};

/// Intents needed to read command messages and resolve their categories.
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

/// Sends replies through the Discord REST API
#[derive(Clone)]
pub struct DiscordChatSink {
    http: Arc<Http>,
}

impl DiscordChatSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatSink for DiscordChatSink {
    async fn send(&self, destination: ReplyDestination, text: &str) -> BotResult<()> {
        ChannelId::new(destination.0)
            .say(&*self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| BotError::ChatDelivery(e.to_string()))
    }
}

/// Gateway event handler feeding the command router
pub struct DiscordHandler {
    routing: Arc<CommandRoutingController>,
}

impl DiscordHandler {
    pub fn new(routing: Arc<CommandRoutingController>) -> Self {
        Self { routing }
    }

    async fn inbound(&self, ctx: &Context, msg: &Message) -> Option<InboundMessage> {
        let channel = match msg.channel(ctx).await {
            Ok(channel) => channel.guild()?,
            Err(e) => {
                warn!(channel_id = %msg.channel_id, error = %e, "Failed to resolve channel");
                return None;
            }
        };

        let category_name = match channel.parent_id {
            Some(parent_id) => match parent_id.to_channel(ctx).await {
                Ok(parent) => parent.guild().map(|category| category.name),
                Err(e) => {
                    warn!(channel_id = %msg.channel_id, error = %e, "Failed to resolve category");
                    None
                }
            },
            None => None,
        };

        Some(InboundMessage {
            author_is_self: false,
            content: msg.content.clone(),
            channel: ReplyDestination(msg.channel_id.get()),
            channel_name: channel.name,
            category_name,
        })
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        let author_is_self = msg.is_own(&ctx.cache);
        if !self.routing.router().is_candidate(author_is_self, &msg.content) {
            return;
        }

        let Some(inbound) = self.inbound(&ctx, &msg).await else {
            debug!(channel_id = %msg.channel_id, "Not a guild channel");
            return;
        };

        self.routing.on_message(inbound).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Logged on to chat gateway");
    }
}
