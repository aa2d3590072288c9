//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    add_missing_updated_at(conn)?;
    Ok(())
}

/// Early databases stored only the JSON blob.
fn add_missing_updated_at(conn: &Connection) -> Result<(), DbError> {
    if column_exists(conn, "guild_configs", "updated_at")? {
        return Ok(());
    }
    tracing::info!("Adding updated_at column to guild_configs");
    conn.execute_batch(
        "ALTER TABLE guild_configs ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0;",
    )?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS guild_configs (
    guild_id TEXT PRIMARY KEY,
    config_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT 0
);
"#;
