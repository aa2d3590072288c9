//! Live stream announcements for Discord guilds.
//!
//! Wires the Twitch, Discord and SQLite adapters into the live-sync
//! engine and drives it from a polling loop.

pub mod adapters;
pub mod background;
pub mod config;

use std::path::PathBuf;

use discord_client::api::DiscordClient;
use guild_db::Database;
use twitch_client::Token;
use twitch_client::api::TwitchApiClient;

use adapters::{DiscordSurface, Engine, HelixSource, SqliteConfigStore};
use config::AppConfig;

/// Determine the data directory for the application.
/// Priority: LIVE_NOTIFIER_DATA_DIR env var > ~/.live-notifier
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LIVE_NOTIFIER_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".live-notifier")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load config and open the guild database.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let config = AppConfig::from_env()?;

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("guilds.db");

    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    Ok((db, config, dir))
}

/// Build the sync engine from config and an open database.
pub fn build_engine(db: Database, config: &AppConfig) -> Engine {
    let source = HelixSource::new(
        TwitchApiClient::new(config.twitch_client_id.clone()),
        Token::new(config.twitch_access_token.clone()),
        config.category_max_pages,
    );
    let surface = DiscordSurface::new(DiscordClient::new(config.discord_bot_token.clone()));
    let store = SqliteConfigStore::new(db);
    Engine::new(source, surface, store, config.sync_options())
}
