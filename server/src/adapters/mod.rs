//! Concrete collaborators for the sync engine.

mod discord;
mod helix;
mod store;

pub use discord::{DiscordSurface, announcement_embed};
pub use helix::{HelixSource, to_live_info};
pub use store::SqliteConfigStore;

use live_sync::SyncEngine;

/// The engine wired to Twitch, Discord and SQLite.
pub type Engine = SyncEngine<HelixSource, DiscordSurface, SqliteConfigStore>;
