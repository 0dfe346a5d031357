use gamehost_core::CoreError;
use thiserror::Error;

/// Errors raised while handling a command or talking to a collaborator
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Provider call failed: {0}")]
    ProviderCallFailed(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Chat delivery failed: {0}")]
    ChatDelivery(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for BotError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInstanceName(msg) => BotError::InvalidRequest(msg),
            CoreError::InvalidInstanceRecord(msg) => BotError::ProviderCallFailed(msg),
        }
    }
}

impl BotError {
    /// Stable code used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            BotError::InvalidRequest(_) => "INVALID_REQUEST",
            BotError::ProviderCallFailed(_) => "PROVIDER_CALL_FAILED",
            BotError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            BotError::ChatDelivery(_) => "CHAT_DELIVERY",
            BotError::Config(_) => "CONFIG",
        }
    }
}

pub type BotResult<T> = std::result::Result<T, BotError>;
