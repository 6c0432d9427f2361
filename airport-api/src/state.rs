use std::sync::Arc;

use airport_core::Store;
use airport_shared::User;
use airport_store::app_config::PaginationConfig;

use crate::error::AppError;
use crate::middleware::Claims;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// The booking user behind a verified token, created on first sight.
    pub async fn current_user(&self, claims: &Claims) -> Result<User, AppError> {
        Ok(self
            .store
            .get_or_create_user(&claims.sub, claims.is_admin())
            .await?)
    }
}
