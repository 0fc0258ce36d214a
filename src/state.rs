use crate::config::Config;
use crate::coordinator::Coordinator;

/// Shared application state available to all request handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub coordinator: Coordinator,
}

impl AppState {
    /// Build state with a fresh coordinator configured from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let coordinator = Coordinator::new(
            crate::hub::ConnectionHub::new(),
            config.match_on_announce,
        );
        Self {
            config,
            coordinator,
        }
    }
}
