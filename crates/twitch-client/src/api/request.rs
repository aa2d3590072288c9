use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

use super::*;

impl TwitchApiClient {
    pub fn new(client_id: String) -> Self {
        Self::with_base_url(client_id, HELIX_BASE.to_string())
    }

    /// Point the client at another Helix-compatible host.
    pub fn with_base_url(client_id: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            base_url,
        }
    }

    /// Build auth headers from the given token.
    fn auth_headers(&self, token: &Token) -> Result<HeaderMap, TwitchError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", token.access_token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
        headers.insert("Client-Id", HeaderValue::from_str(&self.client_id)?);
        Ok(headers)
    }

    /// Build `{base}/{path}?{pairs}` with every value percent-encoded.
    pub(super) fn endpoint<I, K, V>(&self, path: &str, pairs: I) -> Result<Url, TwitchError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))?;
        url.query_pairs_mut().extend_pairs(pairs);
        Ok(url)
    }

    /// Execute a GET request with auth headers.
    pub(super) async fn authenticated_get(
        &self,
        url: Url,
        token: &Token,
    ) -> Result<String, TwitchError> {
        let headers = self.auth_headers(token)?;
        let resp = self.http.get(url.as_str()).headers(headers).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(path = url.path(), "Got 401, access token needs to be replaced");
        }

        if !status.is_success() {
            return Err(TwitchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }
}
