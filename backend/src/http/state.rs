//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::{Authenticator, StaticTokenAuthenticator};
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Resolves bearer tokens to users
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// State whose authenticator accepts no tokens. Protected routes answer
    /// 401/403.
    pub fn without_auth(repository: Arc<dyn FullRepository>) -> Self {
        Self::new(repository, Arc::new(StaticTokenAuthenticator::new()))
    }
}
