use super::*;

impl TwitchApiClient {
    /// Resolve category names to games (up to 100). Unknown names are absent.
    pub async fn get_games_by_names(
        &self,
        token: &Token,
        names: &[String],
    ) -> Result<Vec<Game>, TwitchError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let pairs = names
            .iter()
            .take(MAX_IDS_PER_REQUEST)
            .map(|name| ("name", name.trim()));
        let url = self.endpoint("games", pairs)?;
        let body = self.authenticated_get(url, token).await?;
        let resp: HelixResponse<Game> = serde_json::from_str(&body)?;
        Ok(resp.data)
    }

    pub async fn get_game_by_name(
        &self,
        token: &Token,
        name: &str,
    ) -> Result<Option<Game>, TwitchError> {
        let games = self.get_games_by_names(token, &[name.to_string()]).await?;
        Ok(games.into_iter().next())
    }
}
