use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Twitch Helix responses.
#[derive(Debug, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct HelixPagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HelixPaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<HelixPagination>,
}

impl<T> HelixPaginatedResponse<T> {
    /// Cursor for the next page; Helix sends `{}` on the last one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.cursor.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Stream information from GET /helix/streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    pub game_name: String,
    pub title: String,
    pub viewer_count: u64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(rename = "type")]
    pub stream_type: String,
}

impl StreamInfo {
    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.started_at.as_deref()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!(stream = %self.id, raw, error = %e, "Unparseable started_at");
                None
            }
        }
    }

    /// Thumbnail URL with the `{width}x{height}` template filled in.
    pub fn thumbnail(&self, width: u32, height: u32) -> String {
        self.thumbnail_url
            .replace("{width}", &width.to_string())
            .replace("{height}", &height.to_string())
    }
}

/// User information from GET /helix/users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub profile_image_url: String,
}

/// Category (game) from GET /helix/games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub box_art_url: String,
}
