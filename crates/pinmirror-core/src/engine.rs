use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use pinmirror_types::api::PinStatus;
use pinmirror_types::models::{MessageRef, PinRecord, SourceMessage, WebhookRecord, jump_url};
use pinmirror_types::{Embed, MessageId, UserId};

use crate::embeds;
use crate::error::PinError;
use crate::gateway::{ChannelApi, MirrorGateway};
use crate::store::{self, InsertOutcome, PinStore};

/// Who gets credit for a pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinActor {
    pub id: Option<UserId>,
    pub display_name: String,
}

impl PinActor {
    pub fn user(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            display_name: display_name.into(),
        }
    }

    /// An actor without a platform identity (the bot itself, an API caller).
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
        }
    }
}

/// Transient message to delete once the mirror exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCleanup {
    None,
    CleanupTarget(MessageRef),
}

#[derive(Debug, Clone)]
pub struct PinOutcome {
    pub status: PinStatus,
    /// The record now mapping the original to its mirror.
    pub record: PinRecord,
    /// Confirmation linking original and mirror.
    pub confirmation: Embed,
}

/// Creates mirrors and keeps the original/mirror mapping consistent.
#[derive(Clone)]
pub struct PinEngine {
    pub(crate) store: Arc<dyn PinStore>,
    pub(crate) mirror: Arc<dyn MirrorGateway>,
    pub(crate) channels: Arc<dyn ChannelApi>,
}

impl PinEngine {
    pub fn new(
        store: Arc<dyn PinStore>,
        mirror: Arc<dyn MirrorGateway>,
        channels: Arc<dyn ChannelApi>,
    ) -> Self {
        Self {
            store,
            mirror,
            channels,
        }
    }

    pub fn store(&self) -> &Arc<dyn PinStore> {
        &self.store
    }

    pub fn mirror(&self) -> &Arc<dyn MirrorGateway> {
        &self.mirror
    }

    pub fn channels(&self) -> &Arc<dyn ChannelApi> {
        &self.channels
    }

    /// Mirror `message`, or return the mirror it already has.
    ///
    /// Idempotent per original message: a live mirror is returned as
    /// `AlreadyPinned`; a record whose mirror no longer resolves is dropped and
    /// replaced. A failure after the mirror was posted deletes that mirror
    /// again, so no unmapped mirror is left behind. Nothing is retried.
    pub async fn reconcile(
        &self,
        message: &SourceMessage,
        actor: &PinActor,
        cleanup: PromptCleanup,
    ) -> Result<PinOutcome, PinError> {
        let guild_id = message.guild_id.ok_or(PinError::InvalidChannel)?;
        let message_id = message.id;
        let original_url = jump_url(guild_id, message.channel_id, message_id);

        let webhook = store::blocking(&self.store, move |s| s.webhook(guild_id))
            .await?
            .ok_or(PinError::NoMirrorConfigured)?;

        let existing = store::blocking(&self.store, move |s| s.pin_by_original(guild_id, message_id)).await?;
        if let Some(existing) = existing {
            // Looked up in the channel it was posted to: the webhook may have
            // been replaced since.
            let live = self
                .channels
                .message(existing.mirror_channel_id, existing.mirror_message_id)
                .await?;
            if live.is_some() {
                debug!(
                    guild = %guild_id,
                    message = %message_id,
                    mirror = %existing.mirror_message_id,
                    "Message already mirrored"
                );
                return Ok(already_pinned(existing, actor));
            }

            warn!(
                guild = %guild_id,
                message = %message_id,
                mirror = %existing.mirror_message_id,
                "Mirror no longer resolves, replacing stale pin record"
            );
            store::blocking(&self.store, move |s| s.delete_by_original(guild_id, message_id)).await?;
        }

        if self.channels.channel(webhook.channel_id).await?.is_none() {
            return Err(PinError::MirrorChannelMissing(webhook.channel_id));
        }

        let embeds = embeds::build_mirror_embeds(message, &actor.display_name, &original_url);
        let mirror_id = match self.mirror.send(&webhook, &embeds).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(PinError::SendFailed("no message id returned".into())),
            Err(e) => return Err(PinError::SendFailed(e.to_string())),
        };

        let record = PinRecord {
            message_id,
            guild_id,
            channel_id: message.channel_id,
            pinned_by: actor.id,
            pinned_at: Utc::now(),
            mirror_message_id: mirror_id,
            mirror_channel_id: webhook.channel_id,
        };

        let to_insert = record.clone();
        match store::blocking(&self.store, move |s| s.insert_pin(&to_insert)).await {
            Ok(InsertOutcome::Inserted) => {}
            Ok(InsertOutcome::Conflict(winner)) => {
                // A concurrent reconciliation of the same message got there first.
                warn!(
                    guild = %guild_id,
                    message = %message_id,
                    mirror = %winner.mirror_message_id,
                    "Lost pin insert race, removing duplicate mirror {}",
                    mirror_id
                );
                self.rollback_mirror(&webhook, mirror_id).await;
                return Ok(already_pinned(winner, actor));
            }
            Err(e) => {
                error!(
                    guild = %guild_id,
                    message = %message_id,
                    "Failed to save pin, removing mirror {}: {:#}",
                    mirror_id,
                    e
                );
                self.rollback_mirror(&webhook, mirror_id).await;
                return Err(PinError::PersistFailed(format!("{:#}", e)));
            }
        }

        if let PromptCleanup::CleanupTarget(prompt) = cleanup {
            if let Err(e) = self.channels.delete_message(prompt).await {
                warn!(message = %prompt.message_id, "Could not delete prompt message: {}", e);
            }
        }

        info!(
            guild = %guild_id,
            message = %message_id,
            mirror = %mirror_id,
            "{} pinned a message",
            actor.display_name
        );

        let confirmation =
            embeds::pinned_confirmation(&actor.display_name, &original_url, &record.mirror_url());
        Ok(PinOutcome {
            status: PinStatus::Created,
            record,
            confirmation,
        })
    }

    async fn rollback_mirror(&self, webhook: &WebhookRecord, mirror_id: MessageId) {
        if let Err(e) = self.mirror.delete_message(webhook, mirror_id).await {
            error!(mirror = %mirror_id, "Rollback failed, mirror left orphaned: {}", e);
        }
    }
}

fn already_pinned(record: PinRecord, actor: &PinActor) -> PinOutcome {
    let confirmation = embeds::already_pinned_confirmation(
        &actor.display_name,
        &record.original_url(),
        &record.mirror_url(),
    );
    PinOutcome {
        status: PinStatus::AlreadyPinned,
        record,
        confirmation,
    }
}
