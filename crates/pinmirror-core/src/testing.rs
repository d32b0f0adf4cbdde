//! In-memory store and platform for engine and router tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::engine::{PinActor, PinEngine, PromptCleanup};
use crate::error::GatewayError;
use crate::gateway::{ChannelApi, MirrorGateway, Notice};
use crate::store::{InsertOutcome, PinStore};
use pinmirror_types::models::{
    Attachment, Author, ChannelInfo, GuildSettings, MessageRef, MirrorMessage, PinRecord, SourceMessage,
    WebhookRecord,
};
use pinmirror_types::{ChannelId, Embed, GuildId, MessageId, UserId, WebhookId};

pub const GUILD: GuildId = GuildId(1);
pub const ORIGIN: ChannelId = ChannelId(20);
pub const MIRROR_CHANNEL: ChannelId = ChannelId(900);

// -- Store --

#[derive(Default)]
pub struct StoreState {
    pub pins: Vec<PinRecord>,
    pub settings: HashMap<GuildId, GuildSettings>,
    pub webhooks: HashMap<GuildId, WebhookRecord>,
    pub fail_inserts: bool,
    /// Inserted right before the next insert, as if a concurrent
    /// reconciliation had won the race.
    pub race_winner: Option<PinRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    pub fn pins(&self) -> Vec<PinRecord> {
        self.state().pins.clone()
    }
}

impl PinStore for MemoryStore {
    fn pin_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<Option<PinRecord>> {
        Ok(self
            .state()
            .pins
            .iter()
            .find(|p| p.guild_id == guild_id && p.message_id == message_id)
            .cloned())
    }

    fn pin_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<Option<PinRecord>> {
        Ok(self
            .state()
            .pins
            .iter()
            .find(|p| p.guild_id == guild_id && p.mirror_message_id == mirror_message_id)
            .cloned())
    }

    fn insert_pin(&self, record: &PinRecord) -> Result<InsertOutcome> {
        let mut state = self.state();
        if state.fail_inserts {
            bail!("database is locked");
        }
        if let Some(winner) = state.race_winner.take() {
            state.pins.push(winner);
        }
        let existing = state.pins.iter().find(|p| {
            p.guild_id == record.guild_id
                && (p.message_id == record.message_id || p.mirror_message_id == record.mirror_message_id)
        });
        if let Some(existing) = existing {
            return Ok(InsertOutcome::Conflict(existing.clone()));
        }
        state.pins.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    fn delete_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<bool> {
        let mut state = self.state();
        let before = state.pins.len();
        state
            .pins
            .retain(|p| !(p.guild_id == guild_id && p.message_id == message_id));
        Ok(state.pins.len() < before)
    }

    fn delete_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<bool> {
        let mut state = self.state();
        let before = state.pins.len();
        state
            .pins
            .retain(|p| !(p.guild_id == guild_id && p.mirror_message_id == mirror_message_id));
        Ok(state.pins.len() < before)
    }

    fn settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>> {
        Ok(self.state().settings.get(&guild_id).copied())
    }

    fn set_auto_mode(&self, guild_id: GuildId, enabled: bool) -> Result<()> {
        self.state().settings.entry(guild_id).or_default().auto_mode = enabled;
        Ok(())
    }

    fn set_vote_threshold(&self, guild_id: GuildId, count: u32) -> Result<()> {
        self.state().settings.entry(guild_id).or_default().vote_threshold = count;
        Ok(())
    }

    fn webhook(&self, guild_id: GuildId) -> Result<Option<WebhookRecord>> {
        Ok(self.state().webhooks.get(&guild_id).cloned())
    }

    fn set_webhook(&self, record: &WebhookRecord) -> Result<()> {
        self.state().webhooks.insert(record.guild_id, record.clone());
        Ok(())
    }
}

// -- Platform --

#[derive(Default)]
pub struct PlatformState {
    /// Known channels and the guild each belongs to.
    pub channels: HashMap<ChannelId, GuildId>,
    pub messages: HashMap<MessageId, SourceMessage>,
    /// Pinned message ids per channel, newest pin first.
    pub pins: HashMap<ChannelId, Vec<MessageId>>,
    /// Live mirror messages.
    pub mirrors: BTreeMap<MessageId, MirrorMessage>,
    /// Every successful send, in order.
    pub sent: Vec<MessageId>,
    pub edits: Vec<(MessageId, Vec<Embed>)>,
    pub unpinned: Vec<MessageRef>,
    pub deleted: Vec<MessageRef>,
    pub rolled_back: Vec<MessageId>,
    pub posted: Vec<(ChannelId, Notice)>,
    pub deleted_webhooks: HashSet<WebhookId>,
    pub fail_send: bool,
    pub send_without_id: bool,
    pub fail_unpin: bool,
}

pub struct FakePlatform {
    state: Mutex<PlatformState>,
    next_id: AtomicU64,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            state: Mutex::new(PlatformState::default()),
            next_id: AtomicU64::new(10_000),
        }
    }
}

impl FakePlatform {
    pub fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap()
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn add_message(&self, message: SourceMessage) {
        self.state().messages.insert(message.id, message);
    }

    /// Pins `message_id` natively; later calls are newer pins.
    pub fn pin(&self, channel_id: ChannelId, message_id: MessageId) {
        self.state().pins.entry(channel_id).or_default().insert(0, message_id);
    }

    pub fn live_mirrors(&self) -> usize {
        self.state().mirrors.len()
    }

    pub fn remove_mirror(&self, id: MessageId) {
        self.state().mirrors.remove(&id);
    }
}

#[async_trait]
impl MirrorGateway for FakePlatform {
    async fn create_webhook(&self, _channel_id: ChannelId, _name: &str) -> Result<(WebhookId, String), GatewayError> {
        Ok((WebhookId(self.next_id().get()), "token".to_string()))
    }

    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<(), GatewayError> {
        self.state().deleted_webhooks.insert(webhook_id);
        Ok(())
    }

    async fn send(&self, webhook: &WebhookRecord, embeds: &[Embed]) -> Result<Option<MessageId>, GatewayError> {
        let id = self.next_id();
        let mut state = self.state();
        if state.fail_send {
            return Err(GatewayError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        if state.send_without_id {
            return Ok(None);
        }
        state.mirrors.insert(
            id,
            MirrorMessage {
                id,
                channel_id: webhook.channel_id,
                embeds: embeds.to_vec(),
            },
        );
        state.sent.push(id);
        Ok(Some(id))
    }

    /// A webhook only sees messages it posted itself.
    async fn fetch(&self, webhook: &WebhookRecord, message_id: MessageId) -> Result<Option<MirrorMessage>, GatewayError> {
        let state = self.state();
        if state.deleted_webhooks.contains(&webhook.webhook_id) {
            return Err(GatewayError::NotFound);
        }
        Ok(state
            .mirrors
            .get(&message_id)
            .filter(|m| m.channel_id == webhook.channel_id)
            .cloned())
    }

    async fn edit(&self, _webhook: &WebhookRecord, message_id: MessageId, embeds: &[Embed]) -> Result<(), GatewayError> {
        let mut state = self.state();
        let Some(mirror) = state.mirrors.get_mut(&message_id) else {
            return Err(GatewayError::NotFound);
        };
        mirror.embeds = embeds.to_vec();
        state.edits.push((message_id, embeds.to_vec()));
        Ok(())
    }

    async fn delete_message(&self, _webhook: &WebhookRecord, message_id: MessageId) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.mirrors.remove(&message_id);
        state.rolled_back.push(message_id);
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

    /// Mirrors are readable by the bot like any other message.
    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, GatewayError> {
        let state = self.state();
        if let Some(message) = state.messages.get(&message_id) {
            return Ok((message.channel_id == channel_id).then(|| message.clone()));
        }
        Ok(state
            .mirrors
            .get(&message_id)
            .filter(|m| m.channel_id == channel_id)
            .map(|m| SourceMessage {
                id: m.id,
                channel_id: m.channel_id,
                guild_id: Some(GUILD),
                author: Author {
                    id: UserId(77),
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
        Ok(ids
            .iter()
            .filter_map(|id| state.messages.get(id))
            .map(|m| SourceMessage {
                guild_id: None,
                ..m.clone()
            })
            .collect())
    }

    async fn unpin(&self, message: MessageRef) -> Result<(), GatewayError> {
        let mut state = self.state();
        if state.fail_unpin {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        if let Some(pins) = state.pins.get_mut(&message.channel_id) {
            pins.retain(|id| *id != message.message_id);
        }
        state.unpinned.push(message);
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.mirrors.remove(&message.message_id);
        state.messages.remove(&message.message_id);
        state.deleted.push(message);
        Ok(())
    }

    async fn post(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageId, GatewayError> {
        let id = self.next_id();
        self.state().posted.push((channel_id, notice));
        Ok(id)
    }
}

// -- Fixtures --

pub struct Harness {
    pub engine: PinEngine,
    pub store: Arc<MemoryStore>,
    pub platform: Arc<FakePlatform>,
}

/// Guild 1 with a working mirror channel.
pub fn harness() -> Harness {
    let h = unconfigured();
    h.store
        .set_webhook(&WebhookRecord {
            webhook_id: WebhookId(77),
            guild_id: GUILD,
            token: "token".into(),
            channel_id: MIRROR_CHANNEL,
        })
        .unwrap();
    h.platform.state().channels.insert(MIRROR_CHANNEL, GUILD);
    h
}

/// Guild 1 without a mirror channel.
pub fn unconfigured() -> Harness {
    let store = Arc::new(MemoryStore::default());
    let platform = Arc::new(FakePlatform::default());
    platform.state().channels.insert(ORIGIN, GUILD);
    let engine = PinEngine::new(store.clone(), platform.clone(), platform.clone());
    Harness {
        engine,
        store,
        platform,
    }
}

pub fn message(id: u64, content: &str) -> SourceMessage {
    SourceMessage {
        id: MessageId(id),
        channel_id: ORIGIN,
        guild_id: Some(GUILD),
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

pub fn image(url: &str) -> Attachment {
    Attachment {
        url: url.into(),
        content_type: Some("image/png".into()),
        filename: Some("shot.png".into()),
    }
}

/// Mirrors `message` (with one image) through the harness and returns its record.
pub async fn pinned(h: &Harness, id: u64, content: &str) -> PinRecord {
    let mut msg = message(id, content);
    msg.attachments = vec![image("https://cdn/a.png")];
    h.platform.add_message(msg.clone());
    h.engine
        .reconcile(&msg, &PinActor::named("mod"), PromptCleanup::None)
        .await
        .unwrap()
        .record
}
