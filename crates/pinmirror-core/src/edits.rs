use tracing::{debug, error, warn};

use pinmirror_types::models::{SourceMessage, jump_url};

use crate::embeds;
use crate::engine::PinEngine;
use crate::store;

/// What happened to an edit. Edits only keep mirrors fresh, so every
/// non-applied outcome is logged and dropped by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagation {
    Applied,
    /// The edited message has no mirror.
    Untracked,
    Skipped(&'static str),
}

impl PinEngine {
    /// Push the edited body of `message` into its mirror's primary embed.
    /// Attachment embeds are left exactly as first posted.
    pub async fn propagate_edit(&self, message: &SourceMessage) -> Propagation {
        let Some(guild_id) = message.guild_id else {
            return Propagation::Skipped("not a guild message");
        };
        let message_id = message.id;

        let record = match store::blocking(&self.store, move |s| s.pin_by_original(guild_id, message_id)).await {
            Ok(Some(record)) => record,
            Ok(None) => return Propagation::Untracked,
            Err(e) => {
                error!(guild = %guild_id, message = %message_id, "Pin lookup failed: {:#}", e);
                return Propagation::Skipped("store error");
            }
        };

        let webhook = match store::blocking(&self.store, move |s| s.webhook(guild_id)).await {
            Ok(Some(webhook)) => webhook,
            Ok(None) => {
                warn!(guild = %guild_id, "Could not retrieve webhook for edited pin");
                return Propagation::Skipped("no webhook");
            }
            Err(e) => {
                error!(guild = %guild_id, "Webhook lookup failed: {:#}", e);
                return Propagation::Skipped("store error");
            }
        };

        let mirror = match self.mirror.fetch(&webhook, record.mirror_message_id).await {
            Ok(Some(mirror)) => mirror,
            Ok(None) => {
                warn!(mirror = %record.mirror_message_id, "No mirror found to edit");
                return Propagation::Skipped("mirror missing");
            }
            Err(e) => {
                warn!(mirror = %record.mirror_message_id, "Could not fetch mirror: {}", e);
                return Propagation::Skipped("gateway error");
            }
        };

        let url = jump_url(guild_id, message.channel_id, message_id);
        let Some(embeds) = embeds::rebuild_primary(&mirror.embeds, message, &url) else {
            warn!(mirror = %mirror.id, "Mirror has no embeds to update");
            return Propagation::Skipped("mirror has no embeds");
        };

        match self.mirror.edit(&webhook, mirror.id, &embeds).await {
            Ok(()) => {
                debug!(message = %message_id, mirror = %mirror.id, "Mirror updated after edit");
                Propagation::Applied
            }
            Err(e) => {
                warn!(mirror = %mirror.id, "Could not edit mirror: {}", e);
                Propagation::Skipped("gateway error")
            }
        }
    }
}
