//! Guild watch configurations, stored as JSON documents.

use chrono::Utc;

use crate::{Database, DbError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConfigRow {
    pub guild_id: String,
    pub config_json: String,
    /// Unix seconds of the last write.
    pub updated_at: i64,
}

impl Database {
    pub fn get_guild_config(&self, guild_id: &str) -> Result<Option<GuildConfigRow>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT guild_id, config_json, updated_at FROM guild_configs WHERE guild_id = ?1",
            )?;
            let row = stmt
                .query_row([guild_id], |row| {
                    Ok(GuildConfigRow {
                        guild_id: row.get(0)?,
                        config_json: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    /// Insert or replace the guild's document, stamping `updated_at` with now.
    pub fn set_guild_config(&self, guild_id: &str, config_json: &str) -> Result<(), DbError> {
        if guild_id.trim().is_empty() {
            return Err(DbError::InvalidData("empty guild id".into()));
        }
        let now = Utc::now().timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO guild_configs (guild_id, config_json, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(guild_id) DO UPDATE SET
                    config_json = excluded.config_json,
                    updated_at = excluded.updated_at",
                rusqlite::params![guild_id, config_json, now],
            )?;
            Ok(())
        })
    }

    /// Every stored guild id, sorted.
    pub fn list_guild_ids(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT guild_id FROM guild_configs ORDER BY guild_id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Returns whether a row was removed.
    pub fn delete_guild_config(&self, guild_id: &str) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let removed =
                conn.execute("DELETE FROM guild_configs WHERE guild_id = ?1", [guild_id])?;
            Ok(removed > 0)
        })
    }

    /// Write several documents in one transaction.
    pub fn set_guild_configs_batch(&self, rows: &[(String, String)]) -> Result<(), DbError> {
        if rows.is_empty() {
            return Ok(());
        }
        let now = Utc::now().timestamp();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO guild_configs (guild_id, config_json, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(guild_id) DO UPDATE SET
                        config_json = excluded.config_json,
                        updated_at = excluded.updated_at",
                )?;
                for (guild_id, config_json) in rows {
                    stmt.execute(rusqlite::params![guild_id, config_json, now])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}

trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
