//! Discord REST client for posting and maintaining channel messages.

pub mod api;

/// Discord JSON error code for an unknown channel.
pub const UNKNOWN_CHANNEL: u32 = 10003;
/// Discord JSON error code for an unknown message.
pub const UNKNOWN_MESSAGE: u32 = 10008;

/// Unified error type for the discord-client crate.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Discord API error (status {status}, code {code:?}): {message}")]
    ApiError {
        status: u16,
        code: Option<u32>,
        message: String,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DiscordError {
    /// The channel or message no longer exists.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ApiError { status: 404, .. } => true,
            Self::ApiError {
                code: Some(code), ..
            } => matches!(*code, UNKNOWN_CHANNEL | UNKNOWN_MESSAGE),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::ApiError { status: 429, .. })
    }
}
