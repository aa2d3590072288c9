//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("TWITCH_CLIENT_ID", "", false, true, "Twitch application client id"),
    ("TWITCH_ACCESS_TOKEN", "", true, true, "Twitch app or user access token"),
    ("DISCORD_BOT_TOKEN", "", true, true, "Discord bot token"),
    ("POLL_INTERVAL_SECS", "60", false, false, "Seconds between polling cycles"),
    ("QUERY_BATCH_SIZE", "100", false, false, "Ids per upstream query"),
    ("MAX_IDS_PER_CYCLE", "5000", false, false, "Upper bound on ids queried per cycle"),
    ("FETCH_RETRIES", "1", false, false, "Retries per failed query chunk"),
    ("TENANT_CONCURRENCY", "8", false, false, "Guilds processed at the same time"),
    ("CATEGORY_MAX_PAGES", "10", false, false, "Result pages read per category query"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

/// Keys in declaration order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    DEFS.iter().map(|d| d.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_a_definition() {
        for key in keys() {
            assert!(DEFAULT_SETTINGS.contains_key(key), "{key}");
        }
        assert_eq!(get_default("POLL_INTERVAL_SECS"), Some("60"));
        assert_eq!(get_default("NOPE"), None);
    }

    #[test]
    fn secrets_are_required() {
        let secrets: Vec<_> = DEFAULT_SETTINGS.values().filter(|d| d.secret).collect();
        assert_eq!(secrets.len(), 2);
        assert!(secrets.iter().all(|d| d.required));
    }
}
