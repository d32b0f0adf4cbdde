use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::error;

use pinmirror_types::models::{GuildSettings, PinRecord, WebhookRecord};
use pinmirror_types::{GuildId, MessageId};

/// Result of an insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another record already holds the original or the mirror id.
    Conflict(PinRecord),
}

/// Durable storage for pins, per-guild settings and mirror webhooks.
///
/// Calls are blocking; async callers go through [`blocking`].
pub trait PinStore: Send + Sync + 'static {
    fn pin_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<Option<PinRecord>>;

    fn pin_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<Option<PinRecord>>;

    /// Atomically insert `record` unless its original or mirror id is already
    /// mapped in the guild.
    fn insert_pin(&self, record: &PinRecord) -> Result<InsertOutcome>;

    /// Returns whether a row was removed.
    fn delete_by_original(&self, guild_id: GuildId, message_id: MessageId) -> Result<bool>;

    /// Returns whether a row was removed.
    fn delete_by_mirror(&self, guild_id: GuildId, mirror_message_id: MessageId) -> Result<bool>;

    fn settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>>;

    fn set_auto_mode(&self, guild_id: GuildId, enabled: bool) -> Result<()>;

    fn set_vote_threshold(&self, guild_id: GuildId, count: u32) -> Result<()>;

    fn webhook(&self, guild_id: GuildId) -> Result<Option<WebhookRecord>>;

    /// Replaces the guild's webhook record wholesale.
    fn set_webhook(&self, record: &WebhookRecord) -> Result<()>;
}

/// Run a store call on the blocking pool.
pub async fn blocking<T, F>(store: &Arc<dyn PinStore>, f: F) -> Result<T>
where
    F: FnOnce(&dyn PinStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&*store))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow!("store task failed: {}", e)
        })?
}
