use std::sync::Arc;

use comicvault_core::{
    AccountClient, CacheStore, CharacterSource, Config, PaginationController, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    roster: PaginationController,
    account: Option<AccountClient>,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn CharacterSource>,
        cache: CacheStore,
        account: Option<AccountClient>,
    ) -> Self {
        let roster = PaginationController::new(source, cache, &config.roster);
        Self {
            config,
            roster,
            account,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// The pagination session shared by every client of this server.
    pub fn roster(&self) -> &PaginationController {
        &self.roster
    }

    pub fn account(&self) -> Option<&AccountClient> {
        self.account.as_ref()
    }
}
