use std::sync::Arc;

use serenity::all::{Client, Http};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gamehost_bot::features::address_watch::service::WatchPolicy;
use gamehost_bot::features::command_routing::repo::discord::{
    gateway_intents, DiscordChatSink, DiscordHandler,
};
use gamehost_bot::features::command_routing::service::CommandRouter;
use gamehost_bot::features::compute_directory::repo::ec2::Ec2ComputeApi;
use gamehost_bot::shared::config::BotConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gamehost_bot=info,info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = BotConfig::load()?;

    info!(
        region = %config.aws_region,
        channel = %config.command_channel_name,
        instances = config.instance_names.len(),
        "Starting gamehost bot"
    );

    let api = Arc::new(Ec2ComputeApi::from_config(&config).await);
    let chat = Arc::new(DiscordChatSink::new(Arc::new(Http::new(&config.discord_token))));
    let policy = WatchPolicy {
        max_attempts: config.watch_attempts,
        interval: config.watch_interval(),
    };
    let routing = gamehost_bot::assemble(api, chat, CommandRouter::from_config(&config), policy);

    let mut client = Client::builder(&config.discord_token, gateway_intents())
        .event_handler(DiscordHandler::new(routing))
        .await?;

    client.start().await?;

    Ok(())
}
