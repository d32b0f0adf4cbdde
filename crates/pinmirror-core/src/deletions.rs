use tracing::{debug, info, warn};

use pinmirror_types::models::PinRecord;
use pinmirror_types::{GuildId, MessageId};

use crate::engine::PinEngine;
use crate::error::{GatewayError, PinError};
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cascade {
    /// The original was deleted: record and mirror removed.
    Forward(PinRecord),
    /// The mirror was deleted: record removed, original untouched.
    Backward(PinRecord),
    Untracked,
}

impl PinEngine {
    /// React to a deleted message that may be either an original or a mirror.
    pub async fn propagate_delete(&self, guild_id: GuildId, message_id: MessageId) -> Result<Cascade, PinError> {
        let by_original = store::blocking(&self.store, move |s| s.pin_by_original(guild_id, message_id)).await?;

        if let Some(record) = by_original {
            let removed = store::blocking(&self.store, move |s| s.delete_by_original(guild_id, message_id)).await?;
            if !removed {
                debug!(message = %message_id, "Pin record already gone");
                return Ok(Cascade::Untracked);
            }

            match self.channels.delete_message(record.mirror_ref()).await {
                Ok(()) | Err(GatewayError::NotFound) => {}
                Err(e) => warn!(
                    mirror = %record.mirror_message_id,
                    channel = %record.mirror_channel_id,
                    "Could not delete mirror of deleted message: {}",
                    e
                ),
            }

            info!(guild = %guild_id, message = %message_id, "Original deleted, mirror removed");
            return Ok(Cascade::Forward(record));
        }

        let by_mirror = store::blocking(&self.store, move |s| s.pin_by_mirror(guild_id, message_id)).await?;
        let Some(record) = by_mirror else {
            return Ok(Cascade::Untracked);
        };

        let removed = store::blocking(&self.store, move |s| s.delete_by_mirror(guild_id, message_id)).await?;
        if !removed {
            debug!(mirror = %message_id, "Pin record already gone");
            return Ok(Cascade::Untracked);
        }

        info!(guild = %guild_id, mirror = %message_id, "Mirror deleted, pin record removed");
        Ok(Cascade::Backward(record))
    }
}
