use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info_span, warn};

use pinmirror_types::GuildId;
use pinmirror_types::events::{InboundEvent, MessageCreate, MessageDelete, ReactionAdd};
use pinmirror_types::models::{GuildSettings, SourceMessage};

use crate::classifier::{self, PinIntent, PinTrigger, TriggerSource};
use crate::edits::Propagation;
use crate::embeds;
use crate::engine::PinEngine;
use crate::gateway::Notice;
use crate::store;

const PIN_FAILED_TEXT: &str = "There was an error pinning this message.";
const UNPIN_FAILED_TEXT: &str = "There was an error unpinning this message from the channel.";

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Emoji used for pin votes and manual pin replies.
    pub pin_emoji: String,
    /// Name credited for pins made by the bot itself.
    pub bot_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            pin_emoji: "📌".to_string(),
            bot_name: "PinMirror".to_string(),
        }
    }
}

/// Runs each inbound event to completion as its own task.
#[derive(Clone)]
pub struct EventRouter {
    engine: PinEngine,
    config: Arc<RouterConfig>,
}

impl EventRouter {
    pub fn new(engine: PinEngine, config: RouterConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    pub fn engine(&self) -> &PinEngine {
        &self.engine
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Fire-and-forget dispatch.
    pub fn spawn(&self, event: InboundEvent) -> JoinHandle<()> {
        let router = self.clone();
        tokio::spawn(async move { router.handle(event).await })
    }

    pub async fn handle(&self, event: InboundEvent) {
        let span = info_span!(
            "event",
            kind = event.kind(),
            guild = event.guild_id().map(|g| g.get()).unwrap_or_default()
        );

        async move {
            match event {
                InboundEvent::MessageCreate(e) => self.on_message_create(e).await,
                InboundEvent::MessageUpdate(m) => self.on_message_update(m).await,
                InboundEvent::MessageDelete(e) => self.on_message_delete(e).await,
                InboundEvent::ReactionAdd(e) => self.on_reaction_add(e).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn on_message_create(&self, event: MessageCreate) {
        let Some(guild_id) = event.message.guild_id else {
            return;
        };
        if !classifier::is_pin_related(&event, &self.config.pin_emoji) {
            return;
        }
        let Some(settings) = self.load_settings(guild_id).await else {
            return;
        };

        match classifier::classify_message(&event, &settings, &self.config.pin_emoji) {
            PinIntent::Ignore => {}
            PinIntent::Prompt { pinned, .. } => {
                let notice = Notice::embed(embeds::prompt_notice(&self.config.pin_emoji))
                    .replying_to(pinned.message_id);
                if let Err(e) = self.engine.channels().post(pinned.channel_id, notice).await {
                    warn!(channel = %pinned.channel_id, "Could not post pin prompt: {}", e);
                }
            }
            PinIntent::Trigger(trigger) => self.run_trigger(trigger).await,
        }
    }

    async fn on_reaction_add(&self, event: ReactionAdd) {
        let Some(guild_id) = event.guild_id else {
            return;
        };
        if event.emoji != self.config.pin_emoji {
            return;
        }
        let Some(settings) = self.load_settings(guild_id).await else {
            return;
        };

        if let PinIntent::Trigger(trigger) =
            classifier::classify_reaction(&event, &settings, &self.config.pin_emoji)
        {
            self.run_trigger(trigger).await;
        }
    }

    async fn on_message_update(&self, message: SourceMessage) {
        match self.engine.propagate_edit(&message).await {
            Propagation::Applied | Propagation::Untracked => {}
            Propagation::Skipped(reason) => {
                debug!(message = %message.id, "Edit not propagated: {}", reason);
            }
        }
    }

    async fn on_message_delete(&self, event: MessageDelete) {
        if event.was_pin_notice {
            return;
        }
        let Some(guild_id) = event.guild_id else {
            warn!(channel = %event.channel_id, "Unable to resolve guild of deleted message");
            return;
        };

        if let Err(e) = self.engine.propagate_delete(guild_id, event.message_id).await {
            error!(message = %event.message_id, "Failed to propagate deletion: {}", e);
        }
    }

    async fn run_trigger(&self, trigger: PinTrigger) {
        let channels = self.engine.channels();
        let target = trigger.target;

        let mut message = match channels.message(target.channel_id, target.message_id).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                warn!(message = %target.message_id, "Message to pin no longer exists");
                return;
            }
            Err(e) => {
                warn!(message = %target.message_id, "Could not fetch message to pin: {}", e);
                return;
            }
        };
        message.guild_id.get_or_insert(trigger.guild_id);

        // Vote pins are autonomous: failures are only logged.
        let announce_failures = trigger.source != TriggerSource::Vote;

        let outcome = match self.engine.reconcile(&message, &trigger.actor, trigger.cleanup).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(message = %message.id, "Pin failed: {}", e);
                if announce_failures {
                    self.post_text(&trigger, PIN_FAILED_TEXT).await;
                }
                return;
            }
        };

        // Votes never touch the native pin list.
        if matches!(trigger.source, TriggerSource::NativePin | TriggerSource::ManualReply) {
            if let Err(e) = channels.unpin(target).await {
                warn!(message = %target.message_id, "Could not unpin mirrored message: {}", e);
                self.post_text(&trigger, UNPIN_FAILED_TEXT).await;
            }
        }

        let notice = Notice::embed(outcome.confirmation).replying_to(target.message_id);
        if let Err(e) = channels.post(target.channel_id, notice).await {
            warn!(channel = %target.channel_id, "Could not post pin confirmation: {}", e);
        }
    }

    async fn post_text(&self, trigger: &PinTrigger, text: &str) {
        if let Err(e) = self
            .engine
            .channels()
            .post(trigger.target.channel_id, Notice::text(text))
            .await
        {
            warn!(channel = %trigger.target.channel_id, "Could not post notice: {}", e);
        }
    }

    async fn load_settings(&self, guild_id: GuildId) -> Option<GuildSettings> {
        match store::blocking(self.engine.store(), move |s| s.settings(guild_id)).await {
            Ok(settings) => Some(settings.unwrap_or_default()),
            Err(e) => {
                error!(guild = %guild_id, "Could not load guild settings: {:#}", e);
                None
            }
        }
    }
}
