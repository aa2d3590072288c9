use super::*;

impl TwitchApiClient {
    /// Get users by login name (up to 100). Unknown logins are absent.
    pub async fn get_users_by_logins(
        &self,
        token: &Token,
        logins: &[String],
    ) -> Result<Vec<TwitchUser>, TwitchError> {
        if logins.is_empty() {
            return Ok(Vec::new());
        }

        let pairs = logins
            .iter()
            .take(MAX_IDS_PER_REQUEST)
            .map(|login| ("login", login.trim().to_lowercase()));
        let url = self.endpoint("users", pairs)?;
        let body = self.authenticated_get(url, token).await?;
        let resp: HelixResponse<TwitchUser> = serde_json::from_str(&body)?;
        Ok(resp.data)
    }

    /// Get user profile by login name.
    pub async fn get_user_by_login(
        &self,
        token: &Token,
        login: &str,
    ) -> Result<Option<TwitchUser>, TwitchError> {
        let users = self
            .get_users_by_logins(token, &[login.to_string()])
            .await?;
        Ok(users.into_iter().next())
    }
}
