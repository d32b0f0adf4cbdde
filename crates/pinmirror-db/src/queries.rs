use anyhow::{Result, anyhow};
use rusqlite::{Connection, ErrorCode, params};
use tracing::debug;

use pinmirror_core::{InsertOutcome, PinStore};
use pinmirror_types::models::{GuildSettings, PinRecord, WebhookRecord};
use pinmirror_types::{GuildId, MessageId};

use crate::Database;
use crate::models::{PIN_COLUMNS, PinRow, SettingsRow, WebhookRow};

impl PinStore for Database {
    // -- Pins --

    fn pin_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<Option<PinRecord>> {
        self.with_conn(|conn| query_pin(conn, "message_id", guild_id, message_id))
    }

    fn pin_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<Option<PinRecord>> {
        self.with_conn(|conn| query_pin(conn, "mirror_message_id", guild_id, mirror_message_id))
    }

    fn insert_pin(&self, record: &PinRecord) -> Result<InsertOutcome> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                &format!("INSERT INTO pins ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)", PIN_COLUMNS),
                params![
                    record.guild_id.to_string(),
                    record.message_id.to_string(),
                    record.channel_id.to_string(),
                    record.pinned_by.map(|id| id.to_string()),
                    record.pinned_at.to_rfc3339(),
                    record.mirror_message_id.to_string(),
                    record.mirror_channel_id.to_string(),
                ],
            );

            match inserted {
                Ok(_) => Ok(InsertOutcome::Inserted),
                Err(e) if is_unique_violation(&e) => {
                    debug!(message = %record.message_id, "Pin insert lost to an existing record");
                    let existing = match query_pin(conn, "message_id", record.guild_id, record.message_id)? {
                        Some(existing) => existing,
                        None => query_pin(conn, "mirror_message_id", record.guild_id, record.mirror_message_id)?
                            .ok_or_else(|| anyhow!("unique violation without a conflicting pin"))?,
                    };
                    Ok(InsertOutcome::Conflict(existing))
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn delete_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM pins WHERE guild_id = ?1 AND message_id = ?2",
                params![guild_id.to_string(), message_id.to_string()],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM pins WHERE guild_id = ?1 AND mirror_message_id = ?2",
                params![guild_id.to_string(), mirror_message_id.to_string()],
            )?;
            Ok(n > 0)
        })
    }

    // -- Settings --

    fn settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT auto_mode, vote_threshold FROM settings WHERE guild_id = ?1",
                    [guild_id.to_string()],
                    |row| {
                        Ok(SettingsRow {
                            auto_mode: row.get(0)?,
                            vote_threshold: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row.map(GuildSettings::from))
        })
    }

    fn set_auto_mode(&self, guild_id: GuildId, enabled: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (guild_id, auto_mode) VALUES (?1, ?2)
                 ON CONFLICT(guild_id) DO UPDATE SET auto_mode = excluded.auto_mode",
                params![guild_id.to_string(), enabled],
            )?;
            Ok(())
        })
    }

    fn set_vote_threshold(&self, guild_id: GuildId, count: u32) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (guild_id, vote_threshold) VALUES (?1, ?2)
                 ON CONFLICT(guild_id) DO UPDATE SET vote_threshold = excluded.vote_threshold",
                params![guild_id.to_string(), count],
            )?;
            Ok(())
        })
    }

    // -- Webhooks --

    fn webhook(&self, guild_id: GuildId) -> Result<Option<WebhookRecord>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT guild_id, webhook_id, token, channel_id FROM webhooks WHERE guild_id = ?1",
                    [guild_id.to_string()],
                    |row| {
                        Ok(WebhookRow {
                            guild_id: row.get(0)?,
                            webhook_id: row.get(1)?,
                            token: row.get(2)?,
                            channel_id: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            row.map(WebhookRow::into_record).transpose()
        })
    }

    fn set_webhook(&self, record: &WebhookRecord) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO webhooks (guild_id, webhook_id, token, channel_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.guild_id.to_string(),
                    record.webhook_id.to_string(),
                    record.token,
                    record.channel_id.to_string(),
                ],
            )?;
            Ok(())
        })
    }
}

fn query_pin(conn: &Connection, column: &str, guild_id: GuildId, id: MessageId) -> Result<Option<PinRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM pins WHERE guild_id = ?1 AND {} = ?2",
        PIN_COLUMNS, column
    ))?;

    let row = stmt
        .query_row([guild_id.to_string(), id.to_string()], PinRow::from_row)
        .optional()?;

    row.map(PinRow::into_record).transpose()
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
