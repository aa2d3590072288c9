use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use super::*;

impl DiscordClient {
    pub fn new(bot_token: String) -> Self {
        Self::with_base_url(bot_token, DISCORD_BASE.to_string())
    }

    /// Point the client at another Discord-compatible host.
    pub fn with_base_url(bot_token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            base_url,
        }
    }

    fn auth_headers(&self) -> Result<HeaderMap, DiscordError> {
        let mut headers = HeaderMap::new();
        let bot = format!("Bot {}", self.bot_token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bot)?);
        Ok(headers)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request with auth headers and an optional JSON body.
    /// Returns the response body, empty for 204.
    pub(super) async fn authenticated_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<String, DiscordError> {
        let headers = self.auth_headers()?;
        let mut req = self
            .http
            .request(method.clone(), self.url(path))
            .headers(headers);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(String::new());
        }
        let text = resp.text().await?;

        if !status.is_success() {
            let err = api_error(status, &text);
            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!(%method, path, "Discord rate limit hit");
            }
            return Err(err);
        }

        Ok(text)
    }
}

/// Decode Discord's `{"code": .., "message": ..}` error body when present.
pub(super) fn api_error(status: StatusCode, body: &str) -> DiscordError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => DiscordError::ApiError {
            status: status.as_u16(),
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => DiscordError::ApiError {
            status: status.as_u16(),
            code: None,
            message: body.to_string(),
        },
    }
}
