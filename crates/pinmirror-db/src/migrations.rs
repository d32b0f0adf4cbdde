use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const CURRENT_VERSION: i64 = 2;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE pins (
                guild_id            TEXT NOT NULL,
                message_id          TEXT NOT NULL,
                channel_id          TEXT NOT NULL,
                pinned_by           TEXT,
                pinned_at           TEXT NOT NULL,
                mirror_message_id   TEXT NOT NULL,
                mirror_channel_id   TEXT NOT NULL,
                UNIQUE(guild_id, message_id),
                UNIQUE(guild_id, mirror_message_id)
            );

            CREATE TABLE settings (
                guild_id        TEXT PRIMARY KEY,
                auto_mode       INTEGER NOT NULL DEFAULT 0,
                vote_threshold  INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE webhooks (
                guild_id    TEXT PRIMARY KEY,
                webhook_id  TEXT NOT NULL,
                token       TEXT NOT NULL,
                channel_id  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (pin channel index)");
        conn.execute_batch(
            "
            BEGIN;
            CREATE INDEX IF NOT EXISTS idx_pins_channel ON pins(guild_id, channel_id);
            INSERT INTO schema_version (version) VALUES (2);
            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| {
        r.get(0)
    })?;
    Ok(version)
}
