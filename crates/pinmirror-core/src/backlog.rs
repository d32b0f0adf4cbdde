use tracing::{info, warn};

use pinmirror_types::api::PinStatus;
use pinmirror_types::{ChannelId, GuildId};

use crate::engine::{PinActor, PinEngine, PromptCleanup};
use crate::error::PinError;
use crate::store;

/// Tally of a catch-up run. Per-message failures are counted here but never
/// fail the run itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacklogReport {
    pub total: usize,
    pub created: usize,
    pub already_pinned: usize,
    pub failed: usize,
}

impl PinEngine {
    /// Mirror every message currently pinned in `channel_id`, oldest pin first,
    /// clearing the native pin of each message that was mirrored.
    ///
    /// Runs strictly sequentially so mirrors appear in the order the originals
    /// were pinned. Only missing configuration, a channel outside the guild or
    /// an unreadable pin list fail the whole run.
    pub async fn process_backlog(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        actor: &PinActor,
    ) -> Result<BacklogReport, PinError> {
        let webhook = store::blocking(&self.store, move |s| s.webhook(guild_id))
            .await?
            .ok_or(PinError::NoMirrorConfigured)?;

        if self.channels.channel(webhook.channel_id).await?.is_none() {
            return Err(PinError::MirrorChannelMissing(webhook.channel_id));
        }

        // Pins are stamped with `guild_id` below, so the channel must really
        // belong to it.
        let source = self.channels.channel(channel_id).await?;
        if source.and_then(|c| c.guild_id) != Some(guild_id) {
            warn!(guild = %guild_id, channel = %channel_id, "Catch-up channel is not in this guild");
            return Err(PinError::InvalidChannel);
        }

        // The platform lists pins newest first.
        let mut pins = self.channels.pinned_messages(channel_id).await?;
        pins.reverse();

        let mut report = BacklogReport {
            total: pins.len(),
            ..BacklogReport::default()
        };

        for mut message in pins {
            // Pin listings omit the guild.
            message.guild_id.get_or_insert(guild_id);

            let outcome = match self.reconcile(&message, actor, PromptCleanup::None).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        guild = %guild_id,
                        channel = %channel_id,
                        message = %message.id,
                        "Could not mirror pinned message: {}",
                        e
                    );
                    report.failed += 1;
                    continue;
                }
            };

            match outcome.status {
                PinStatus::Created => report.created += 1,
                PinStatus::AlreadyPinned => report.already_pinned += 1,
            }

            if let Err(e) = self.channels.unpin(message.message_ref()).await {
                warn!(message = %message.id, "Could not unpin mirrored message: {}", e);
            }
        }

        info!(
            guild = %guild_id,
            channel = %channel_id,
            "Catch-up finished: {} pins, {} mirrored, {} already mirrored, {} failed",
            report.total,
            report.created,
            report.already_pinned,
            report.failed
        );

        Ok(report)
    }
}
