// Error types for catalog lookups and workspace workflows

use thiserror::Error;

use crate::step::StepReport;

/// Result type alias for ctfbot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that can occur while serving a command
///
/// Every variant is terminal for the current invocation. None of them is
/// retried; the command surface shows the message to the invoker as-is.
#[derive(Debug, Error)]
pub enum BotError {
    /// Network or HTTP failure while talking to the event catalog
    #[error("Event catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Catalog payload does not have the expected shape
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    /// Catalog timestamp is not `YYYY-MM-DDTHH:MM:SS±HH:MM`
    #[error("Malformed timestamp '{value}': expected YYYY-MM-DDTHH:MM:SS+HH:MM")]
    MalformedTimestamp { value: String },

    /// Actor failed the authorization policy
    #[error("User {actor_id} is not allowed to run this command")]
    Unauthorized { actor_id: u64 },

    /// A provisioning step failed after the workflow started
    #[error("Provisioning stopped: {0}")]
    PartialProvisioning(Box<StepReport>),

    /// A teardown step failed after the workflow started
    #[error("Teardown stopped: {0}")]
    PartialTeardown(Box<StepReport>),

    /// Chat platform rejected or failed a call
    #[error("Platform error: {0}")]
    Platform(String),

    /// Referenced resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Command argument out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Create an upstream unavailable error
    pub fn upstream(msg: impl Into<String>) -> Self {
        BotError::UpstreamUnavailable(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        BotError::MalformedResponse(msg.into())
    }

    /// Create a malformed timestamp error
    pub fn malformed_timestamp(value: impl Into<String>) -> Self {
        BotError::MalformedTimestamp {
            value: value.into(),
        }
    }

    /// Create a platform error
    pub fn platform(msg: impl Into<String>) -> Self {
        BotError::Platform(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        BotError::NotFound(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        BotError::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        BotError::Configuration(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        BotError::Internal(msg.into())
    }

    /// Step report attached to a partial provisioning or teardown failure
    pub fn step_report(&self) -> Option<&StepReport> {
        match self {
            BotError::PartialProvisioning(report) | BotError::PartialTeardown(report) => {
                Some(report)
            }
            _ => None,
        }
    }
}
