use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, GuildId, MessageId, UserId};
use crate::models::SourceMessage;

/// Platform events forwarded to the service. Whatever holds the gateway
/// connection decodes the raw payloads and posts these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundEvent {
    /// A message was posted, including the native "pinned a message" notice
    MessageCreate(MessageCreate),

    /// A message was edited; carries the new contents
    MessageUpdate(SourceMessage),

    /// A message was deleted (origin unknown: could be an original or a mirror)
    MessageDelete(MessageDelete),

    /// A reaction was added to a message
    ReactionAdd(ReactionAdd),
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageCreate(_) => "message_create",
            Self::MessageUpdate(_) => "message_update",
            Self::MessageDelete(_) => "message_delete",
            Self::ReactionAdd(_) => "reaction_add",
        }
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        match self {
            Self::MessageCreate(e) => e.message.guild_id,
            Self::MessageUpdate(m) => m.guild_id,
            Self::MessageDelete(e) => e.guild_id,
            Self::ReactionAdd(e) => e.guild_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Regular,
    /// The system notice posted when someone pins a message natively.
    PinNotice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub message: SourceMessage,
    #[serde(default)]
    pub kind: MessageKind,
    /// For pin notices: the pinned message. For replies: the replied-to message.
    #[serde(default)]
    pub referenced_message_id: Option<MessageId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDelete {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Set when the cached copy shows the deleted message was a pin notice.
    #[serde(default)]
    pub was_pin_notice: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAdd {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
    #[serde(default)]
    pub user_is_bot: bool,
    pub emoji: String,
    /// Count of `emoji` on the message after this reaction was applied.
    pub count: u32,
    /// A bounded sample of users who reacted with `emoji`.
    #[serde(default)]
    pub reactors: Vec<UserId>,
}
