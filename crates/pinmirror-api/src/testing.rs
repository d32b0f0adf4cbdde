//! In-memory store and platform behind a fully routed app.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pinmirror_core::{
    ChannelApi, EventRouter, GatewayError, InsertOutcome, MirrorGateway, Notice, PinEngine, PinStore, RouterConfig,
};
use pinmirror_types::models::{
    Author, ChannelInfo, GuildSettings, MessageRef, MirrorMessage, PinRecord, SourceMessage, WebhookRecord,
};
use pinmirror_types::{ChannelId, Embed, GuildId, MessageId, UserId, WebhookId};

use crate::router;
use crate::state::AppStateInner;

pub const TOKEN: &str = "test-admin-token";
pub const GUILD: GuildId = GuildId(1);
pub const ORIGIN: ChannelId = ChannelId(20);

#[derive(Default)]
pub struct MemoryStore {
    pub pins: Mutex<Vec<PinRecord>>,
    pub settings: Mutex<HashMap<GuildId, GuildSettings>>,
    pub webhooks: Mutex<HashMap<GuildId, WebhookRecord>>,
}

impl PinStore for MemoryStore {
    fn pin_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<Option<PinRecord>> {
        let pins = self.pins.lock().unwrap();
        Ok(pins
            .iter()
            .find(|p| p.guild_id == guild_id && p.message_id == message_id)
            .cloned())
    }

    fn pin_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<Option<PinRecord>> {
        let pins = self.pins.lock().unwrap();
        Ok(pins
            .iter()
            .find(|p| p.guild_id == guild_id && p.mirror_message_id == mirror_message_id)
            .cloned())
    }

    fn insert_pin(&self, record: &PinRecord) -> Result<InsertOutcome> {
        let mut pins = self.pins.lock().unwrap();
        if let Some(existing) = pins
            .iter()
            .find(|p| p.guild_id == record.guild_id && p.message_id == record.message_id)
        {
            return Ok(InsertOutcome::Conflict(existing.clone()));
        }
        pins.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    fn delete_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<bool> {
        let mut pins = self.pins.lock().unwrap();
        let before = pins.len();
        pins.retain(|p| !(p.guild_id == guild_id && p.message_id == message_id));
        Ok(pins.len() < before)
    }

    fn delete_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<bool> {
        let mut pins = self.pins.lock().unwrap();
        let before = pins.len();
        pins.retain(|p| !(p.guild_id == guild_id && p.mirror_message_id == mirror_message_id));
        Ok(pins.len() < before)
    }

    fn settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>> {
        Ok(self.settings.lock().unwrap().get(&guild_id).copied())
    }

    fn set_auto_mode(&self, guild_id: GuildId, enabled: bool) -> Result<()> {
        self.settings.lock().unwrap().entry(guild_id).or_default().auto_mode = enabled;
        Ok(())
    }

    fn set_vote_threshold(&self, guild_id: GuildId, count: u32) -> Result<()> {
        self.settings.lock().unwrap().entry(guild_id).or_default().vote_threshold = count;
        Ok(())
    }

    fn webhook(&self, guild_id: GuildId) -> Result<Option<WebhookRecord>> {
        Ok(self.webhooks.lock().unwrap().get(&guild_id).cloned())
    }

    fn set_webhook(&self, record: &WebhookRecord) -> Result<()> {
        self.webhooks.lock().unwrap().insert(record.guild_id, record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct PlatformState {
    /// Channel id to owning guild.
    pub channels: HashMap<ChannelId, GuildId>,
    pub messages: HashMap<MessageId, SourceMessage>,
    pub pins: HashMap<ChannelId, Vec<MessageId>>,
    pub mirrors: BTreeMap<MessageId, MirrorMessage>,
    pub webhooks_created: Vec<(ChannelId, String)>,
    pub webhooks_deleted: Vec<WebhookId>,
    pub posted: Vec<(ChannelId, Notice)>,
    pub send_fails: bool,
}

pub struct FakePlatform {
    state: Mutex<PlatformState>,
    next_id: AtomicU64,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            state: Mutex::default(),
            next_id: AtomicU64::new(10_000),
        }
    }
}

impl FakePlatform {
    pub fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl MirrorGateway for FakePlatform {
    async fn create_webhook(&self, channel_id: ChannelId, name: &str) -> Result<(WebhookId, String), GatewayError> {
        let id = WebhookId(self.next_id());
        self.state().webhooks_created.push((channel_id, name.to_string()));
        Ok((id, format!("token-{}", id)))
    }

    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<(), GatewayError> {
        self.state().webhooks_deleted.push(webhook_id);
        Ok(())
    }

    async fn send(&self, webhook: &WebhookRecord, embeds: &[Embed]) -> Result<Option<MessageId>, GatewayError> {
        let id = MessageId(self.next_id());
        let mut state = self.state();
        if state.send_fails {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        state.mirrors.insert(
            id,
            MirrorMessage {
                id,
                channel_id: webhook.channel_id,
                embeds: embeds.to_vec(),
            },
        );
        Ok(Some(id))
    }

    async fn fetch(&self, webhook: &WebhookRecord, message_id: MessageId) -> Result<Option<MirrorMessage>, GatewayError> {
        Ok(self
            .state()
            .mirrors
            .get(&message_id)
            .filter(|m| m.channel_id == webhook.channel_id)
            .cloned())
    }

    async fn edit(&self, _webhook: &WebhookRecord, message_id: MessageId, embeds: &[Embed]) -> Result<(), GatewayError> {
        let mut state = self.state();
        let mirror = state.mirrors.get_mut(&message_id).ok_or(GatewayError::NotFound)?;
        mirror.embeds = embeds.to_vec();
        Ok(())
    }

    async fn delete_message(&self, _webhook: &WebhookRecord, message_id: MessageId) -> Result<(), GatewayError> {
        self.state().mirrors.remove(&message_id);
        Ok(())
    }
}

#[async_trait]
impl ChannelApi for FakePlatform {
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<ChannelInfo>, GatewayError> {
        Ok(self.state().channels.get(&channel_id).map(|guild_id| ChannelInfo {
            id: channel_id,
            guild_id: Some(*guild_id),
            name: None,
        }))
    }

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, GatewayError> {
        let state = self.state();
        if let Some(message) = state.messages.get(&message_id) {
            return Ok((message.channel_id == channel_id).then(|| message.clone()));
        }
        // Mirrors read back as webhook-authored messages.
        Ok(state
            .mirrors
            .get(&message_id)
            .filter(|m| m.channel_id == channel_id)
            .map(|m| SourceMessage {
                id: m.id,
                channel_id: m.channel_id,
                guild_id: None,
                author: Author {
                    id: UserId(m.id.get()),
                    name: "PinMirror (Webhook)".into(),
                    is_bot: true,
                    can_manage_messages: false,
                },
                content: String::new(),
                attachments: vec![],
            }))
    }

    async fn pinned_messages(&self, channel_id: ChannelId) -> Result<Vec<SourceMessage>, GatewayError> {
        let state = self.state();
        let ids = state.pins.get(&channel_id).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|id| state.messages.get(id)).cloned().collect())
    }

    async fn unpin(&self, message: MessageRef) -> Result<(), GatewayError> {
        if let Some(pins) = self.state().pins.get_mut(&message.channel_id) {
            pins.retain(|id| *id != message.message_id);
        }
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.mirrors.remove(&message.message_id);
        state.messages.remove(&message.message_id);
        Ok(())
    }

    async fn post(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageId, GatewayError> {
        let id = MessageId(self.next_id());
        self.state().posted.push((channel_id, notice));
        Ok(id)
    }
}

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub platform: Arc<FakePlatform>,
}

/// Guild 1 owns channels 20 (origin) and 900; guild 2 owns 2000.
pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let platform = Arc::new(FakePlatform::default());
    {
        let mut state = platform.state();
        state.channels.insert(ORIGIN, GUILD);
        state.channels.insert(ChannelId(900), GUILD);
        state.channels.insert(ChannelId(2000), GuildId(2));
    }

    let engine = PinEngine::new(store.clone(), platform.clone(), platform.clone());
    let events = EventRouter::new(engine, RouterConfig::default());
    let app = router(Arc::new(AppStateInner {
        events,
        admin_token: TOKEN.to_string(),
        webhook_name: "PinMirror (Webhook)".to_string(),
    }));

    TestApp { app, store, platform }
}

pub fn message(id: u64, content: &str) -> SourceMessage {
    SourceMessage {
        id: MessageId(id),
        channel_id: ORIGIN,
        guild_id: None,
        author: Author {
            id: UserId(5),
            name: "ana".into(),
            is_bot: false,
            can_manage_messages: false,
        },
        content: content.into(),
        attachments: vec![],
    }
}

impl TestApp {
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        self.call_with_token(method, uri, body, Some(TOKEN)).await
    }

    pub async fn call_with_token(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response: Response<Body> = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
