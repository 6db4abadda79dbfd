//! Shared per-process state.

use gradebook_auth::OAuthClient;
use gradebook_core::AppConfig;

/// Built once at startup and passed by `Arc` into every handler. Nothing in
/// here is mutable after construction.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub oauth: OAuthClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let oauth = OAuthClient::new(&config);
        Self { config, oauth }
    }
}
