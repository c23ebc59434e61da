use {repolink_config::ConfigLoadError, tracing::error};

use crate::{flow::RepoFlow, selection::SelectionDispatcher};

/// Shared, read-only state behind every route.
pub struct GatewayState {
    /// Absent when the provider config failed to load; OAuth routes then
    /// answer 503.
    flow: Result<RepoFlow, ConfigLoadError>,
    pub dispatcher: SelectionDispatcher,
}

impl GatewayState {
    pub fn new(flow: Result<RepoFlow, ConfigLoadError>, dispatcher: SelectionDispatcher) -> Self {
        if let Err(e) = &flow {
            error!(error = %e, "provider config unavailable, OAuth routes disabled");
        }
        Self { flow, dispatcher }
    }

    pub fn flow(&self) -> Result<&RepoFlow, &ConfigLoadError> {
        self.flow.as_ref()
    }
}
