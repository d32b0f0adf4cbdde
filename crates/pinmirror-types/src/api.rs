use serde::{Deserialize, Serialize};

use crate::embed::Embed;
use crate::ids::{ChannelId, GuildId, MessageId, WebhookId};

// -- Mirror channel --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetMirrorChannelRequest {
    pub channel_id: ChannelId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MirrorChannelResponse {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub webhook_id: WebhookId,
}

// -- Settings --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetAutoModeRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetVoteThresholdRequest {
    /// 0 disables pin voting.
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub guild_id: GuildId,
    pub auto_mode: bool,
    pub vote_threshold: u32,
}

// -- Pins --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualPinRequest {
    /// Display name credited in the mirror.
    pub actor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinStatus {
    Created,
    AlreadyPinned,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PinResponse {
    pub status: PinStatus,
    pub mirror_channel_id: ChannelId,
    pub mirror_message_id: MessageId,
    pub confirmation: Embed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatchUpResponse {
    pub channel_id: ChannelId,
    pub total: usize,
    pub created: usize,
    pub already_pinned: usize,
    pub failed: usize,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
}
