//! Twitch Helix REST API client.
//!
//! Typed access to the endpoints used for live detection, with Bearer
//! token + Client-ID header injection.

mod games;
mod request;
mod streams;
mod users;

pub mod models;

pub use models::{
    Game, HelixPaginatedResponse, HelixPagination, HelixResponse, StreamInfo, TwitchUser,
};
pub use streams::MAX_IDS_PER_REQUEST;

use crate::{Token, TwitchError};

const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix API client with automatic auth header injection.
pub struct TwitchApiClient {
    pub(super) http: reqwest::Client,
    pub(super) client_id: String,
    pub(super) base_url: String,
}
