use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embed::Embed;
use crate::ids::{ChannelId, GuildId, MessageId, UserId, WebhookId};

const JUMP_URL_BASE: &str = "https://discord.com/channels";

/// Link that opens a message in the client.
pub fn jump_url(guild_id: GuildId, channel_id: ChannelId, message_id: MessageId) -> String {
    format!("{}/{}/{}/{}", JUMP_URL_BASE, guild_id, channel_id, message_id)
}

/// One active mirrored pin. Never updated in place: a record is inserted once
/// and later deleted as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    pub message_id: MessageId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    /// `None` when an automated process (backlog catch-up, API caller) pinned it.
    pub pinned_by: Option<UserId>,
    pub pinned_at: DateTime<Utc>,
    pub mirror_message_id: MessageId,
    pub mirror_channel_id: ChannelId,
}

impl PinRecord {
    pub fn original_url(&self) -> String {
        jump_url(self.guild_id, self.channel_id, self.message_id)
    }

    pub fn mirror_url(&self) -> String {
        jump_url(self.guild_id, self.mirror_channel_id, self.mirror_message_id)
    }

    pub fn mirror_ref(&self) -> MessageRef {
        MessageRef {
            channel_id: self.mirror_channel_id,
            message_id: self.mirror_message_id,
        }
    }
}

/// Posting identity for a guild's mirror channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRecord {
    pub webhook_id: WebhookId,
    pub guild_id: GuildId,
    pub token: String,
    pub channel_id: ChannelId,
}

impl fmt::Debug for WebhookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookRecord")
            .field("webhook_id", &self.webhook_id)
            .field("guild_id", &self.guild_id)
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// Per-guild behaviour. A guild with no stored row gets `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub auto_mode: bool,
    /// 0 disables pin voting.
    pub vote_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub can_manage_messages: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// A message as seen on the origin side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// `None` for direct-message channels.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl SourceMessage {
    pub fn jump_url(&self) -> Option<String> {
        self.guild_id
            .map(|guild_id| jump_url(guild_id, self.channel_id, self.id))
    }

    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id,
            message_id: self.id,
        }
    }
}

/// Address of a message without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A message posted by the mirror webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}
