//! Pin mirroring: decide when a message becomes a pin, copy it into the
//! guild's mirror channel through a webhook, and keep the original/mirror
//! mapping consistent as either side is edited or deleted.

pub mod backlog;
pub mod classifier;
pub mod deletions;
pub mod edits;
pub mod embeds;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod router;
pub mod store;

#[cfg(test)]
mod testing;

pub use backlog::BacklogReport;
pub use classifier::{PinIntent, PinTrigger, TriggerSource};
pub use deletions::Cascade;
pub use edits::Propagation;
pub use engine::{PinActor, PinEngine, PinOutcome, PromptCleanup};
pub use error::{ErrorCategory, GatewayError, PinError};
pub use gateway::{ChannelApi, MirrorGateway, Notice};
pub use router::{EventRouter, RouterConfig};
pub use store::{InsertOutcome, PinStore};
