use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{AccountView, TokenView};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{JwtError, TokenIssuer};
use crate::database::models::User;
use crate::database::{CredentialStore, StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AuthError::UsernameTaken,
            other => AuthError::Store(other),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Body of `/auth/register` and `/auth/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    fn validated(self) -> AuthResult<(String, String)> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(AuthError::Validation("username is required"))?
            .to_string();
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or(AuthError::Validation("password is required"))?;
        Ok((username, password))
    }
}

/// Account registration and token issuing
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, credentials: Credentials) -> AuthResult<AccountView> {
        let (username, password) = credentials.validated()?;

        // Cheap rejection before paying for a hash; the store still enforces it
        if self.store.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let user = self
            .store
            .create_user(User::new(username, password_hash))
            .await?;

        info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(AccountView::from(&user))
    }

    pub async fn login(&self, credentials: Credentials) -> AuthResult<TokenView> {
        let (username, password) = credentials.validated()?;

        let Some(user) = self.store.find_by_username(&username).await? else {
            debug!(username = %username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !matches {
            debug!(username = %username, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok(TokenView {
            token,
            token_type: "Bearer",
            expires_in: self.tokens.lifetime().num_seconds(),
        })
    }
}
