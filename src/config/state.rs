// Application state module
// Immutable state shared by every connection task

use super::root::ServeRoot;
use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    pub root: ServeRoot,

    // Cached for the hot path
    pub access_log: bool,
}

impl AppState {
    pub fn new(config: Config, root: ServeRoot) -> Self {
        let access_log = config.logging.access_log;
        Self {
            config,
            root,
            access_log,
        }
    }
}
