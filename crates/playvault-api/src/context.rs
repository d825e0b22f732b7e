// Shared SDK context
//
// Session state and the event bus, owned once per SDK instance and handed
// to every component that needs them instead of living in globals.

use std::sync::Arc;

use crate::events::EventBus;
use crate::session::SessionState;

/// One logical SDK instance's shared state.
#[derive(Debug, Clone, Default)]
pub struct SdkContext {
    session: Arc<SessionState>,
    bus: Arc<EventBus>,
}

impl SdkContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context around existing state (e.g. a bus shared with the host app).
    pub fn with_parts(session: Arc<SessionState>, bus: Arc<EventBus>) -> Self {
        Self { session, bus }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }
}
