use super::*;

/// Helix accepts at most this many `user_id` / `game_id` values per request.
pub const MAX_IDS_PER_REQUEST: usize = 100;

impl TwitchApiClient {
    /// Live streams for up to 100 broadcasters. Offline ones are absent.
    pub async fn get_streams_by_user_ids(
        &self,
        token: &Token,
        user_ids: &[String],
    ) -> Result<Vec<StreamInfo>, TwitchError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("streams", build_streams_query("user_id", user_ids, None))?;
        let body = self.authenticated_get(url, token).await?;
        let resp: HelixResponse<StreamInfo> = serde_json::from_str(&body)?;
        Ok(resp.data)
    }

    /// Live streams in up to 100 categories, following the cursor for at
    /// most `max_pages` pages.
    pub async fn get_streams_by_game_ids(
        &self,
        token: &Token,
        game_ids: &[String],
        max_pages: usize,
    ) -> Result<Vec<StreamInfo>, TwitchError> {
        if game_ids.is_empty() {
            return Ok(Vec::new());
        }

        let max_pages = max_pages.max(1);
        let mut streams = Vec::new();
        let mut cursor: Option<String> = None;
        for page in 0..max_pages {
            let query = build_streams_query("game_id", game_ids, cursor.as_deref());
            let url = self.endpoint("streams", query)?;
            let body = self.authenticated_get(url, token).await?;
            let resp: HelixPaginatedResponse<StreamInfo> = serde_json::from_str(&body)?;
            let next = resp.next_cursor().map(str::to_string);
            streams.extend(resp.data);

            match next {
                Some(c) => cursor = Some(c),
                None => return Ok(streams),
            }
            if page + 1 == max_pages {
                tracing::debug!(
                    categories = game_ids.len(),
                    streams = streams.len(),
                    "Category page limit reached"
                );
            }
        }
        Ok(streams)
    }
}

/// Query pairs for GET /streams. Ids past [`MAX_IDS_PER_REQUEST`] are dropped.
pub(super) fn build_streams_query(
    key: &'static str,
    ids: &[String],
    after: Option<&str>,
) -> Vec<(&'static str, String)> {
    let limited = &ids[..ids.len().min(MAX_IDS_PER_REQUEST)];
    let first = limited.len().clamp(1, MAX_IDS_PER_REQUEST);
    let mut pairs = Vec::with_capacity(limited.len() + 2);
    pairs.push(("first", first.to_string()));
    pairs.extend(limited.iter().map(|id| (key, id.clone())));
    if let Some(after) = after {
        pairs.push(("after", after.to_string()));
    }
    pairs
}
