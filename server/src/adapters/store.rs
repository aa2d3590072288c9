use guild_db::{Database, DbError};
use live_sync::{ConfigStore, GuildId, StoreError, TenantWatchConfig};

/// Guild configs as JSON documents in SQLite.
#[derive(Clone)]
pub struct SqliteConfigStore {
    db: Database,
}

impl SqliteConfigStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every guild with a stored config.
    pub fn list_guilds(&self) -> Result<Vec<GuildId>, StoreError> {
        let ids = self.db.list_guild_ids().map_err(backend)?;
        Ok(ids.into_iter().map(GuildId::from).collect())
    }

    pub fn remove(&self, guild: &GuildId) -> Result<bool, StoreError> {
        self.db.delete_guild_config(guild.as_str()).map_err(backend)
    }
}

fn backend(e: DbError) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl ConfigStore for SqliteConfigStore {
    async fn get(&self, guild: &GuildId) -> Result<Option<TenantWatchConfig>, StoreError> {
        let Some(row) = self.db.get_guild_config(guild.as_str()).map_err(backend)? else {
            return Ok(None);
        };
        serde_json::from_str(&row.config_json)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn set(&self, guild: &GuildId, config: &TenantWatchConfig) -> Result<(), StoreError> {
        let json = serde_json::to_string(config).map_err(|e| StoreError::Backend(e.to_string()))?;
        self.db
            .set_guild_config(guild.as_str(), &json)
            .map_err(backend)
    }
}
