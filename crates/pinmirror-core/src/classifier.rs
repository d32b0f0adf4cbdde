//! Turns inbound events into pin intents. Pure: no store or platform access.

use tracing::warn;

use pinmirror_types::events::{MessageCreate, MessageKind, ReactionAdd};
use pinmirror_types::models::{GuildSettings, MessageRef};
use pinmirror_types::{GuildId, UserId};

use crate::engine::{PinActor, PromptCleanup};

/// Mentions shown before collapsing the rest of the voters into "and more".
pub const VOTER_SAMPLE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Native pin with auto mode on.
    NativePin,
    /// Pin-emoji reply from a moderator with auto mode off.
    ManualReply,
    /// Reaction count reached the guild's threshold.
    Vote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinTrigger {
    pub guild_id: GuildId,
    pub target: MessageRef,
    pub actor: PinActor,
    pub source: TriggerSource,
    pub cleanup: PromptCleanup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinIntent {
    Ignore,
    /// Native pin with auto mode off: ask instead of mirroring.
    Prompt { guild_id: GuildId, pinned: MessageRef },
    Trigger(PinTrigger),
}

/// Cheap filter run before settings are loaded.
pub fn is_pin_related(event: &MessageCreate, pin_emoji: &str) -> bool {
    event.kind == MessageKind::PinNotice || event.message.content.contains(pin_emoji)
}

pub fn classify_message(event: &MessageCreate, settings: &GuildSettings, pin_emoji: &str) -> PinIntent {
    let message = &event.message;
    let Some(guild_id) = message.guild_id else {
        return PinIntent::Ignore;
    };
    let Some(referenced) = event.referenced_message_id else {
        if event.kind == MessageKind::PinNotice {
            warn!(notice = %message.id, "Pin notice without a message reference");
        }
        return PinIntent::Ignore;
    };
    let target = MessageRef {
        channel_id: message.channel_id,
        message_id: referenced,
    };

    match event.kind {
        MessageKind::PinNotice if settings.auto_mode => PinIntent::Trigger(PinTrigger {
            guild_id,
            target,
            actor: PinActor::user(message.author.id, message.author.name.clone()),
            source: TriggerSource::NativePin,
            cleanup: PromptCleanup::CleanupTarget(message.message_ref()),
        }),
        MessageKind::PinNotice => PinIntent::Prompt {
            guild_id,
            pinned: target,
        },
        MessageKind::Regular => {
            let manual = !settings.auto_mode
                && !message.author.is_bot
                && message.author.can_manage_messages
                && message.content.contains(pin_emoji);
            if !manual {
                return PinIntent::Ignore;
            }
            PinIntent::Trigger(PinTrigger {
                guild_id,
                target,
                actor: PinActor::user(message.author.id, message.author.name.clone()),
                source: TriggerSource::ManualReply,
                cleanup: PromptCleanup::CleanupTarget(message.message_ref()),
            })
        }
    }
}

/// Fires only when the count lands exactly on the threshold, so a message is
/// triggered once on the way up rather than on every later vote.
pub fn classify_reaction(event: &ReactionAdd, settings: &GuildSettings, pin_emoji: &str) -> PinIntent {
    let Some(guild_id) = event.guild_id else {
        return PinIntent::Ignore;
    };
    if event.user_is_bot || event.emoji != pin_emoji {
        return PinIntent::Ignore;
    }
    if settings.vote_threshold == 0 || event.count != settings.vote_threshold {
        return PinIntent::Ignore;
    }

    PinIntent::Trigger(PinTrigger {
        guild_id,
        target: MessageRef {
            channel_id: event.channel_id,
            message_id: event.message_id,
        },
        actor: PinActor::user(event.user_id, vote_display_name(event.count, &event.reactors)),
        source: TriggerSource::Vote,
        cleanup: PromptCleanup::None,
    })
}

pub fn vote_display_name(count: u32, reactors: &[UserId]) -> String {
    if reactors.is_empty() {
        return format!("{} Votes", count);
    }

    let mut names: Vec<String> = reactors
        .iter()
        .take(VOTER_SAMPLE)
        .map(|id| format!("<@{}>", id))
        .collect();
    if count as usize > names.len() {
        names.push("and more".to_string());
    }
    names.join(", ")
}
