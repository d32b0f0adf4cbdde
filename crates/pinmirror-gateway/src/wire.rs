//! Payload shapes as the platform sends and expects them.

use serde::{Deserialize, Serialize};

use pinmirror_types::models::{Attachment, Author, ChannelInfo, MirrorMessage, SourceMessage};
use pinmirror_types::{ChannelId, Embed, GuildId, MessageId, UserId, WebhookId};

#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl WireUser {
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Deserialize)]
pub struct WireAttachment {
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    pub author: WireUser,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<WireAttachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl WireMessage {
    /// Manage-messages is not derivable from a REST message; fetched messages
    /// are only ever pin targets, where it does not matter.
    pub fn into_source(self) -> SourceMessage {
        SourceMessage {
            id: self.id,
            channel_id: self.channel_id,
            guild_id: self.guild_id,
            author: Author {
                id: self.author.id,
                name: self.author.display_name().to_string(),
                is_bot: self.author.bot,
                can_manage_messages: false,
            },
            content: self.content,
            attachments: self
                .attachments
                .into_iter()
                .map(|a| Attachment {
                    url: a.url,
                    content_type: a.content_type,
                    filename: a.filename,
                })
                .collect(),
        }
    }

    pub fn into_mirror(self) -> MirrorMessage {
        MirrorMessage {
            id: self.id,
            channel_id: self.channel_id,
            embeds: self.embeds,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireChannel {
    pub id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<WireChannel> for ChannelInfo {
    fn from(c: WireChannel) -> Self {
        ChannelInfo {
            id: c.id,
            guild_id: c.guild_id,
            name: c.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireWebhook {
    pub id: WebhookId,
    /// Only present for incoming webhooks created by this bot.
    #[serde(default)]
    pub token: Option<String>,
}

/// Response to an executed webhook. The id is absent when the platform did not
/// wait for the message to be created.
#[derive(Debug, Default, Deserialize)]
pub struct WireSent {
    #[serde(default)]
    pub id: Option<MessageId>,
}

#[derive(Debug, Serialize)]
pub struct CreateWebhook<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WebhookBody<'a> {
    pub embeds: &'a [Embed],
    pub allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
pub struct CreateMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
    pub allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
pub struct MessageReference {
    pub message_id: MessageId,
    /// Post anyway when the replied-to message is gone.
    pub fail_if_not_exists: bool,
}

/// Mirrors and notices quote user text; never let them ping anyone.
#[derive(Debug, Default, Serialize)]
pub struct AllowedMentions {
    pub parse: [&'static str; 0],
}
