//! Row types as stored. Snowflakes are kept as TEXT and parsed on the way out.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Row;

use pinmirror_types::models::{GuildSettings, PinRecord, WebhookRecord};
use pinmirror_types::{ChannelId, GuildId, MessageId, UserId, WebhookId};

pub const PIN_COLUMNS: &str =
    "guild_id, message_id, channel_id, pinned_by, pinned_at, mirror_message_id, mirror_channel_id";

pub struct PinRow {
    pub guild_id: String,
    pub message_id: String,
    pub channel_id: String,
    pub pinned_by: Option<String>,
    pub pinned_at: String,
    pub mirror_message_id: String,
    pub mirror_channel_id: String,
}

impl PinRow {
    /// Maps a row selected with [`PIN_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            guild_id: row.get(0)?,
            message_id: row.get(1)?,
            channel_id: row.get(2)?,
            pinned_by: row.get(3)?,
            pinned_at: row.get(4)?,
            mirror_message_id: row.get(5)?,
            mirror_channel_id: row.get(6)?,
        })
    }

    pub fn into_record(self) -> Result<PinRecord> {
        let pinned_at = DateTime::parse_from_rfc3339(&self.pinned_at)
            .with_context(|| format!("bad pinned_at {:?}", self.pinned_at))?
            .with_timezone(&Utc);

        Ok(PinRecord {
            guild_id: self.guild_id.parse::<GuildId>().context("bad guild_id")?,
            message_id: self.message_id.parse::<MessageId>().context("bad message_id")?,
            channel_id: self.channel_id.parse::<ChannelId>().context("bad channel_id")?,
            pinned_by: self
                .pinned_by
                .map(|id| id.parse::<UserId>())
                .transpose()
                .context("bad pinned_by")?,
            pinned_at,
            mirror_message_id: self.mirror_message_id.parse::<MessageId>().context("bad mirror_message_id")?,
            mirror_channel_id: self.mirror_channel_id.parse::<ChannelId>().context("bad mirror_channel_id")?,
        })
    }
}

pub struct SettingsRow {
    pub auto_mode: bool,
    pub vote_threshold: i64,
}

impl From<SettingsRow> for GuildSettings {
    fn from(row: SettingsRow) -> Self {
        GuildSettings {
            auto_mode: row.auto_mode,
            vote_threshold: u32::try_from(row.vote_threshold).unwrap_or(0),
        }
    }
}

pub struct WebhookRow {
    pub guild_id: String,
    pub webhook_id: String,
    pub token: String,
    pub channel_id: String,
}

impl WebhookRow {
    pub fn into_record(self) -> Result<WebhookRecord> {
        Ok(WebhookRecord {
            webhook_id: self.webhook_id.parse::<WebhookId>().context("bad webhook_id")?,
            guild_id: self.guild_id.parse::<GuildId>().context("bad guild_id")?,
            token: self.token,
            channel_id: self.channel_id.parse::<ChannelId>().context("bad channel_id")?,
        })
    }
}
