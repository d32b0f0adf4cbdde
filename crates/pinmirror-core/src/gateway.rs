use async_trait::async_trait;

use pinmirror_types::models::{ChannelInfo, MessageRef, MirrorMessage, SourceMessage, WebhookRecord};
use pinmirror_types::{ChannelId, Embed, MessageId, WebhookId};

use crate::error::GatewayError;

/// Operations against the mirror channel's webhook.
///
/// Lookups answer `Ok(None)` for resources that no longer exist and reserve
/// `Err` for requests that could not be completed.
#[async_trait]
pub trait MirrorGateway: Send + Sync {
    /// Returns the new webhook's id and token.
    async fn create_webhook(&self, channel_id: ChannelId, name: &str) -> Result<(WebhookId, String), GatewayError>;

    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<(), GatewayError>;

    /// Posts all embeds as one message. `None` when the platform accepted the
    /// request but did not hand back a message id.
    async fn send(&self, webhook: &WebhookRecord, embeds: &[Embed]) -> Result<Option<MessageId>, GatewayError>;

    async fn fetch(&self, webhook: &WebhookRecord, message_id: MessageId) -> Result<Option<MirrorMessage>, GatewayError>;

    async fn edit(&self, webhook: &WebhookRecord, message_id: MessageId, embeds: &[Embed]) -> Result<(), GatewayError>;

    async fn delete_message(&self, webhook: &WebhookRecord, message_id: MessageId) -> Result<(), GatewayError>;
}

/// Channel operations performed as the bot itself.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<ChannelInfo>, GatewayError>;

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, GatewayError>;

    /// Currently pinned messages, newest pin first.
    async fn pinned_messages(&self, channel_id: ChannelId) -> Result<Vec<SourceMessage>, GatewayError>;

    async fn unpin(&self, message: MessageRef) -> Result<(), GatewayError>;

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError>;

    async fn post(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageId, GatewayError>;
}

/// A bot-authored message: plain text, an embed, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notice {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub reply_to: Option<MessageId>,
}

impl Notice {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Self::default()
        }
    }

    pub fn replying_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}
