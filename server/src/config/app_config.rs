//! Runtime application configuration loaded from the environment.

use std::time::Duration;

use anyhow::{Context, bail};
use live_sync::{FetchLimits, SyncOptions};

use super::defaults::{self, DEFAULT_SETTINGS};
use super::validation::validate_setting;

/// Runtime configuration populated from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    pub twitch_client_id: String,
    pub twitch_access_token: String,
    pub discord_bot_token: String,
    pub poll_interval_secs: u64,
    pub query_batch_size: usize,
    pub max_ids_per_cycle: usize,
    pub fetch_retries: u32,
    pub tenant_concurrency: usize,
    pub category_max_pages: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            twitch_client_id: String::new(),
            twitch_access_token: String::new(),
            discord_bot_token: String::new(),
            poll_interval_secs: 60,
            query_batch_size: 100,
            max_ids_per_cycle: 5000,
            fetch_retries: 1,
            tenant_concurrency: 8,
            category_max_pages: 10,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("twitch_client_id", &self.twitch_client_id)
            .field("twitch_access_token", &"***")
            .field("discord_bot_token", &"***")
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("query_batch_size", &self.query_batch_size)
            .field("max_ids_per_cycle", &self.max_ids_per_cycle)
            .field("fetch_retries", &self.fetch_retries)
            .field("tenant_concurrency", &self.tenant_concurrency)
            .field("category_max_pages", &self.category_max_pages)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    ///
    /// Every value is validated; missing required settings are an error.
    pub fn load_with<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        for key in defaults::keys() {
            let value = lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
            if value.is_empty() {
                if DEFAULT_SETTINGS.get(key).is_some_and(|d| d.required) {
                    missing.push(key);
                }
                continue;
            }
            if let Err(msg) = validate_setting(key, &value) {
                bail!("{key}: {msg}");
            }
        }
        if !missing.is_empty() {
            bail!("missing required settings: {}", missing.join(", "));
        }

        let g = |key: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| defaults::get_default(key).map(str::to_string))
                .unwrap_or_default()
        };

        Ok(Self {
            twitch_client_id: g("TWITCH_CLIENT_ID"),
            twitch_access_token: g("TWITCH_ACCESS_TOKEN"),
            discord_bot_token: g("DISCORD_BOT_TOKEN"),
            poll_interval_secs: parse(&g("POLL_INTERVAL_SECS"), "POLL_INTERVAL_SECS")?,
            query_batch_size: parse(&g("QUERY_BATCH_SIZE"), "QUERY_BATCH_SIZE")?,
            max_ids_per_cycle: parse(&g("MAX_IDS_PER_CYCLE"), "MAX_IDS_PER_CYCLE")?,
            fetch_retries: parse(&g("FETCH_RETRIES"), "FETCH_RETRIES")?,
            tenant_concurrency: parse(&g("TENANT_CONCURRENCY"), "TENANT_CONCURRENCY")?,
            category_max_pages: parse(&g("CATEGORY_MAX_PAGES"), "CATEGORY_MAX_PAGES")?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            limits: FetchLimits {
                batch_size: self.query_batch_size,
                max_ids_per_cycle: self.max_ids_per_cycle,
                retries: self.fetch_retries,
            },
            concurrency: self.tenant_concurrency,
        }
    }
}

fn parse<T: std::str::FromStr>(s: &str, key: &str) -> Result<T, anyhow::Error>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse().with_context(|| format!("{key}: cannot parse {s:?}"))
}
