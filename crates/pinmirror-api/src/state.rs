use std::sync::Arc;

use pinmirror_core::{EventRouter, PinEngine};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub events: EventRouter,
    /// Bearer token required on every admin route.
    pub admin_token: String,
    /// Name given to webhooks created in mirror channels.
    pub webhook_name: String,
}

impl AppStateInner {
    pub fn engine(&self) -> &PinEngine {
        self.events.engine()
    }

    pub fn bot_name(&self) -> &str {
        &self.events.config().bot_name
    }
}
