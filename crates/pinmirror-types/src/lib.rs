pub mod api;
pub mod embed;
pub mod events;
pub mod ids;
pub mod models;

pub use embed::{Embed, EmbedField, EmbedImage};
pub use ids::{ChannelId, GuildId, MessageId, UserId, WebhookId};
