use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use pinmirror_core::{ChannelApi, GatewayError, MirrorGateway, Notice};
use pinmirror_types::models::{ChannelInfo, MessageRef, MirrorMessage, SourceMessage, WebhookRecord};
use pinmirror_types::{ChannelId, Embed, MessageId, WebhookId};

use crate::wire::{
    AllowedMentions, CreateMessage, CreateWebhook, MessageReference, WebhookBody, WireChannel, WireMessage,
    WireSent, WireWebhook,
};

/// Platform REST client authenticated as the bot.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl DiscordClient {
    pub fn new(api_base: impl Into<String>, bot_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pinmirror/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// A request carrying the bot's credentials.
    fn bot(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Authorization", format!("Bot {}", self.bot_token))
    }

    /// A request authenticated by the webhook token in its path.
    fn hook(&self, method: Method, webhook: &WebhookRecord, suffix: &str) -> RequestBuilder {
        let path = format!("/webhooks/{}/{}{}", webhook.webhook_id, webhook.token, suffix);
        self.http.request(method, self.url(&path))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(url = %response.url().path(), status = status.as_u16(), "Platform response");

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Platform request failed: {}", body);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let bytes = self
            .execute(request)
            .await?
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn empty(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        self.execute(request).await.map(|_| ())
    }
}

/// Folds a 404 into `None` for lookups.
fn found<T>(result: Result<T, GatewayError>) -> Result<Option<T>, GatewayError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GatewayError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl MirrorGateway for DiscordClient {
    async fn create_webhook(&self, channel_id: ChannelId, name: &str) -> Result<(WebhookId, String), GatewayError> {
        let request = self
            .bot(Method::POST, &format!("/channels/{}/webhooks", channel_id))
            .json(&CreateWebhook { name });
        let webhook: WireWebhook = self.json(request).await?;
        let token = webhook
            .token
            .ok_or_else(|| GatewayError::Decode("created webhook has no token".into()))?;
        Ok((webhook.id, token))
    }

    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<(), GatewayError> {
        self.empty(self.bot(Method::DELETE, &format!("/webhooks/{}", webhook_id)))
            .await
    }

    async fn send(&self, webhook: &WebhookRecord, embeds: &[Embed]) -> Result<Option<MessageId>, GatewayError> {
        let request = self.hook(Method::POST, webhook, "?wait=true").json(&WebhookBody {
            embeds,
            allowed_mentions: AllowedMentions::default(),
        });
        let bytes = self
            .execute(request)
            .await?
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let sent: WireSent = serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(sent.id)
    }

    async fn fetch(&self, webhook: &WebhookRecord, message_id: MessageId) -> Result<Option<MirrorMessage>, GatewayError> {
        let request = self.hook(Method::GET, webhook, &format!("/messages/{}", message_id));
        Ok(found(self.json::<WireMessage>(request).await)?.map(WireMessage::into_mirror))
    }

    async fn edit(&self, webhook: &WebhookRecord, message_id: MessageId, embeds: &[Embed]) -> Result<(), GatewayError> {
        let request = self
            .hook(Method::PATCH, webhook, &format!("/messages/{}", message_id))
            .json(&WebhookBody {
                embeds,
                allowed_mentions: AllowedMentions::default(),
            });
        self.empty(request).await
    }

    async fn delete_message(&self, webhook: &WebhookRecord, message_id: MessageId) -> Result<(), GatewayError> {
        self.empty(self.hook(Method::DELETE, webhook, &format!("/messages/{}", message_id)))
            .await
    }
}

#[async_trait]
impl ChannelApi for DiscordClient {
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<ChannelInfo>, GatewayError> {
        let request = self.bot(Method::GET, &format!("/channels/{}", channel_id));
        Ok(found(self.json::<WireChannel>(request).await)?.map(ChannelInfo::from))
    }

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, GatewayError> {
        let request = self.bot(Method::GET, &format!("/channels/{}/messages/{}", channel_id, message_id));
        Ok(found(self.json::<WireMessage>(request).await)?.map(WireMessage::into_source))
    }

    async fn pinned_messages(&self, channel_id: ChannelId) -> Result<Vec<SourceMessage>, GatewayError> {
        let request = self.bot(Method::GET, &format!("/channels/{}/pins", channel_id));
        let pins: Vec<WireMessage> = self.json(request).await?;
        Ok(pins.into_iter().map(WireMessage::into_source).collect())
    }

    async fn unpin(&self, message: MessageRef) -> Result<(), GatewayError> {
        let path = format!("/channels/{}/pins/{}", message.channel_id, message.message_id);
        self.empty(self.bot(Method::DELETE, &path)).await
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError> {
        let path = format!("/channels/{}/messages/{}", message.channel_id, message.message_id);
        self.empty(self.bot(Method::DELETE, &path)).await
    }

    async fn post(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageId, GatewayError> {
        let body = CreateMessage {
            content: notice.content,
            embeds: notice.embed.into_iter().collect(),
            message_reference: notice.reply_to.map(|message_id| MessageReference {
                message_id,
                fail_if_not_exists: false,
            }),
            allowed_mentions: AllowedMentions::default(),
        };
        let request = self
            .bot(Method::POST, &format!("/channels/{}/messages", channel_id))
            .json(&body);
        let sent: WireSent = self.json(request).await?;
        sent.id
            .ok_or_else(|| GatewayError::Decode("created message has no id".into()))
    }
}
