use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::{CatalogStore, CredentialStore};
use crate::services::{AuthService, CatalogService};

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub accounts: AuthService,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        products: Arc<dyn CatalogStore>,
        users: Arc<dyn CredentialStore>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            catalog: CatalogService::new(products, config.catalog.default_page_limit),
            accounts: AuthService::new(users, tokens.clone()),
            tokens,
        }
    }
}
