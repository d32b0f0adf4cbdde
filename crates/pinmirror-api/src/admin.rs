use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, warn};

use pinmirror_core::{PinActor, PinError, PromptCleanup, store};
use pinmirror_types::api::{
    CatchUpResponse, ManualPinRequest, MirrorChannelResponse, PinResponse, SetAutoModeRequest,
    SetMirrorChannelRequest, SetVoteThresholdRequest, SettingsResponse, VersionResponse,
};
use pinmirror_types::models::WebhookRecord;
use pinmirror_types::{ChannelId, GuildId, MessageId};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: "pinmirror".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// -- Mirror channel --

pub async fn get_mirror_channel(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
) -> Result<Json<MirrorChannelResponse>, ApiError> {
    let guild_id = GuildId(guild_id);
    let webhook = store::blocking(state.engine().store(), move |s| s.webhook(guild_id))
        .await?
        .ok_or_else(|| ApiError::not_found("no mirror channel configured"))?;

    Ok(Json(MirrorChannelResponse {
        guild_id,
        channel_id: webhook.channel_id,
        webhook_id: webhook.webhook_id,
    }))
}

/// Point the guild at a new mirror channel. Mirrors already posted stay where
/// they are.
pub async fn set_mirror_channel(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(req): Json<SetMirrorChannelRequest>,
) -> Result<Json<MirrorChannelResponse>, ApiError> {
    let guild_id = GuildId(guild_id);
    let engine = state.engine();

    let channel = engine
        .channels()
        .channel(req.channel_id)
        .await?
        .ok_or(PinError::MirrorChannelMissing(req.channel_id))?;
    if channel.guild_id != Some(guild_id) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "mirror channel must belong to the guild",
        ));
    }

    let previous = store::blocking(engine.store(), move |s| s.webhook(guild_id)).await?;
    if let Some(previous) = previous {
        if let Err(e) = engine.mirror().delete_webhook(previous.webhook_id).await {
            warn!(guild = %guild_id, webhook = %previous.webhook_id, "Could not delete previous webhook: {}", e);
        }
    }

    let (webhook_id, token) = engine
        .mirror()
        .create_webhook(req.channel_id, &state.webhook_name)
        .await?;
    let record = WebhookRecord {
        webhook_id,
        guild_id,
        token,
        channel_id: req.channel_id,
    };
    store::blocking(engine.store(), move |s| s.set_webhook(&record)).await?;

    info!(guild = %guild_id, channel = %req.channel_id, "Mirror channel set");
    Ok(Json(MirrorChannelResponse {
        guild_id,
        channel_id: req.channel_id,
        webhook_id,
    }))
}

// -- Settings --

pub async fn get_settings(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
) -> Result<Json<SettingsResponse>, ApiError> {
    settings_response(&state, GuildId(guild_id)).await.map(Json)
}

pub async fn set_auto_mode(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(req): Json<SetAutoModeRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let guild_id = GuildId(guild_id);
    store::blocking(state.engine().store(), move |s| s.set_auto_mode(guild_id, req.enabled)).await?;
    info!(guild = %guild_id, enabled = req.enabled, "Auto mode updated");
    settings_response(&state, guild_id).await.map(Json)
}

pub async fn set_vote_threshold(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(req): Json<SetVoteThresholdRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let guild_id = GuildId(guild_id);
    store::blocking(state.engine().store(), move |s| s.set_vote_threshold(guild_id, req.count)).await?;
    info!(guild = %guild_id, count = req.count, "Vote threshold updated");
    settings_response(&state, guild_id).await.map(Json)
}

async fn settings_response(state: &AppState, guild_id: GuildId) -> Result<SettingsResponse, ApiError> {
    let settings = store::blocking(state.engine().store(), move |s| s.settings(guild_id))
        .await?
        .unwrap_or_default();

    Ok(SettingsResponse {
        guild_id,
        auto_mode: settings.auto_mode,
        vote_threshold: settings.vote_threshold,
    })
}

// -- Pins --

pub async fn catch_up(
    State(state): State<AppState>,
    Path((guild_id, channel_id)): Path<(u64, u64)>,
) -> Result<Json<CatchUpResponse>, ApiError> {
    let channel_id = ChannelId(channel_id);
    let report = state
        .engine()
        .process_backlog(GuildId(guild_id), channel_id, &PinActor::named(state.bot_name()))
        .await?;

    Ok(Json(CatchUpResponse {
        channel_id,
        total: report.total,
        created: report.created,
        already_pinned: report.already_pinned,
        failed: report.failed,
    }))
}

pub async fn pin_message(
    State(state): State<AppState>,
    Path((guild_id, channel_id, message_id)): Path<(u64, u64, u64)>,
    Json(req): Json<ManualPinRequest>,
) -> Result<Json<PinResponse>, ApiError> {
    let guild_id = GuildId(guild_id);
    let message_id = MessageId(message_id);
    let engine = state.engine();

    let mut message = engine
        .channels()
        .message(ChannelId(channel_id), message_id)
        .await?
        .ok_or(PinError::MessageMissing(message_id))?;
    message.guild_id.get_or_insert(guild_id);

    let outcome = engine
        .reconcile(&message, &PinActor::named(req.actor), PromptCleanup::None)
        .await?;

    Ok(Json(PinResponse {
        status: outcome.status,
        mirror_channel_id: outcome.record.mirror_channel_id,
        mirror_message_id: outcome.record.mirror_message_id,
        confirmation: outcome.confirmation,
    }))
}
