use live_sync::{
    BroadcastId, BroadcasterId, CategoryId, DisplayMetadata, LiveBroadcastInfo, SourceError,
    StreamSource,
};
use twitch_client::api::{StreamInfo, TwitchApiClient};
use twitch_client::{Token, TwitchError};

const THUMBNAIL_WIDTH: u32 = 440;
const THUMBNAIL_HEIGHT: u32 = 248;

/// Live lookups against Twitch Helix.
pub struct HelixSource {
    client: TwitchApiClient,
    token: Token,
    category_max_pages: usize,
}

impl HelixSource {
    pub fn new(client: TwitchApiClient, token: Token, category_max_pages: usize) -> Self {
        Self {
            client,
            token,
            category_max_pages,
        }
    }
}

fn source_error(e: TwitchError) -> SourceError {
    if e.is_unauthorized() {
        tracing::error!("Twitch rejected the access token; live lookups will keep failing");
    }
    SourceError(e.to_string())
}

/// Normalize a Helix stream into the pipeline's view of a live broadcast.
pub fn to_live_info(stream: StreamInfo) -> LiveBroadcastInfo {
    let started_at = stream.started_at_utc();
    let thumbnail_url = stream.thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT);
    LiveBroadcastInfo {
        broadcast_id: BroadcastId::new(stream.id),
        broadcaster_id: BroadcasterId::new(stream.user_id),
        category_id: CategoryId::new(stream.game_id),
        title: stream.title,
        started_at,
        display: DisplayMetadata {
            broadcaster_name: if stream.user_name.is_empty() {
                stream.user_login.clone()
            } else {
                stream.user_name
            },
            broadcaster_login: stream.user_login,
            category_name: stream.game_name,
            viewer_count: stream.viewer_count,
            thumbnail_url,
        },
    }
}

impl StreamSource for HelixSource {
    async fn live_by_broadcaster_ids(
        &self,
        ids: &[BroadcasterId],
    ) -> Result<Vec<LiveBroadcastInfo>, SourceError> {
        let user_ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let streams = self
            .client
            .get_streams_by_user_ids(&self.token, &user_ids)
            .await
            .map_err(source_error)?;
        Ok(streams
            .into_iter()
            .filter(|s| s.stream_type == "live")
            .map(to_live_info)
            .collect())
    }

    async fn live_by_category_ids(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<LiveBroadcastInfo>, SourceError> {
        let game_ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let streams = self
            .client
            .get_streams_by_game_ids(&self.token, &game_ids, self.category_max_pages)
            .await
            .map_err(source_error)?;
        Ok(streams
            .into_iter()
            .filter(|s| s.stream_type == "live")
            .map(to_live_info)
            .collect())
    }
}
