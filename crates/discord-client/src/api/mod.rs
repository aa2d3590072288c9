//! Discord REST API client.
//!
//! Typed access to the channel message endpoints with `Bot` token header
//! injection. Error bodies are decoded into their JSON error code.

mod messages;
mod request;

pub mod models;

pub use messages::BULK_DELETE_MAX;
pub use models::{
    ApiErrorBody, CreateMessage, Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage,
    EditMessage, Message,
};

use crate::DiscordError;

const DISCORD_BASE: &str = "https://discord.com/api/v10";

/// Discord REST client authenticated as a bot.
pub struct DiscordClient {
    pub(super) http: reqwest::Client,
    pub(super) bot_token: String,
    pub(super) base_url: String,
}
