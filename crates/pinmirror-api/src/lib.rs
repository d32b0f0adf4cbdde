//! HTTP surface: event ingestion plus the admin commands.

pub mod admin;
pub mod error;
pub mod events;
pub mod middleware;
pub mod state;

#[cfg(test)]
mod testing;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All routes, admin ones behind the bearer token. Tracing and other outer
/// layers are left to the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(admin::health))
        .route("/version", get(admin::version));

    let protected_routes = Router::new()
        .route("/events", post(events::ingest))
        .route(
            "/guilds/{guild_id}/mirror-channel",
            get(admin::get_mirror_channel).put(admin::set_mirror_channel),
        )
        .route("/guilds/{guild_id}/settings", get(admin::get_settings))
        .route("/guilds/{guild_id}/settings/auto-mode", put(admin::set_auto_mode))
        .route("/guilds/{guild_id}/settings/vote-threshold", put(admin::set_vote_threshold))
        .route("/guilds/{guild_id}/channels/{channel_id}/catch-up", post(admin::catch_up))
        .route(
            "/guilds/{guild_id}/channels/{channel_id}/messages/{message_id}/pin",
            post(admin::pin_message),
        )
        .layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_admin));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
