use pinmirror_types::{ChannelId, MessageId};
use thiserror::Error;

/// Failure talking to the chat platform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("resource not found")]
    NotFound,

    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode platform response: {0}")]
    Decode(String),
}

/// Terminal outcome of a failed pin attempt. Nothing is retried.
#[derive(Debug, Error)]
pub enum PinError {
    #[error("channel on message was not a valid guild channel")]
    InvalidChannel,

    #[error("no mirror channel configured for this guild")]
    NoMirrorConfigured,

    #[error("could not retrieve mirror channel {0}")]
    MirrorChannelMissing(ChannelId),

    #[error("message {0} no longer exists")]
    MessageMissing(MessageId),

    #[error("failed to send the mirror: {0}")]
    SendFailed(String),

    #[error("failed to save pin: {0}")]
    PersistFailed(String),

    #[error("pin store error: {0}")]
    Store(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The guild has not been set up.
    Configuration,
    /// A referenced channel or message is gone.
    Resolution,
    /// A request to the platform failed.
    Transport,
    /// The pin store failed.
    Persistence,
}

impl PinError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoMirrorConfigured => ErrorCategory::Configuration,
            Self::InvalidChannel | Self::MirrorChannelMissing(_) | Self::MessageMissing(_) => {
                ErrorCategory::Resolution
            }
            Self::Gateway(GatewayError::NotFound) => ErrorCategory::Resolution,
            Self::SendFailed(_) | Self::Gateway(_) => ErrorCategory::Transport,
            Self::PersistFailed(_) | Self::Store(_) => ErrorCategory::Persistence,
        }
    }
}

impl From<anyhow::Error> for PinError {
    fn from(e: anyhow::Error) -> Self {
        Self::Store(format!("{:#}", e))
    }
}
