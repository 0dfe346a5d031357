pub mod discord;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::shared::error::{BotError, BotResult};
use crate::shared::types::ReplyDestination;

/// Outbound side of the chat gateway
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, destination: ReplyDestination, text: &str) -> BotResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: ReplyDestination,
    pub text: String,
}

/// Keeps every message in memory instead of delivering it
#[derive(Clone, Default)]
pub struct RecordingChatSink {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    fail_with: Arc<RwLock<Option<String>>>,
}

impl RecordingChatSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .map(|message| message.text.clone())
            .collect()
    }

    /// Make every following send fail
    pub async fn fail_deliveries(&self, detail: impl Into<String>) {
        *self.fail_with.write().await = Some(detail.into());
    }
}

#[async_trait]
impl ChatSink for RecordingChatSink {
    async fn send(&self, destination: ReplyDestination, text: &str) -> BotResult<()> {
        if let Some(detail) = self.fail_with.read().await.as_ref() {
            return Err(BotError::ChatDelivery(detail.clone()));
        }

        self.sent.write().await.push(SentMessage {
            destination,
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let sink = RecordingChatSink::new();
        sink.send(ReplyDestination(1), "first").await.unwrap();
        sink.send(ReplyDestination(2), "second").await.unwrap();

        assert_eq!(
            sink.sent().await,
            vec![
                SentMessage {
                    destination: ReplyDestination(1),
                    text: "first".to_string(),
                },
                SentMessage {
                    destination: ReplyDestination(2),
                    text: "second".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_delivery_records_nothing() {
        let sink = RecordingChatSink::new();
        sink.fail_deliveries("gateway closed").await;

        let result = sink.send(ReplyDestination(1), "lost").await;
        assert!(matches!(result, Err(BotError::ChatDelivery(_))));
        assert!(sink.texts().await.is_empty());
    }
}
