use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Product, User};
use crate::database::record_id::RecordId;
use crate::filter::{PageSpec, ProductFilter};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate value for {0}")]
    Duplicate(&'static str),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Product persistence
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, product: Product) -> StoreResult<Product>;

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Product>>;

    /// Persist the mutable fields of `product`. `None` if the record is gone.
    async fn update(&self, product: Product) -> StoreResult<Option<Product>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &RecordId) -> StoreResult<bool>;

    /// Remove every listed record in one store operation, returning how many
    /// actually existed
    async fn delete_many(&self, ids: &[RecordId]) -> StoreResult<u64>;

    async fn count(&self, filter: &ProductFilter) -> StoreResult<u64>;

    /// Matching records in natural order, windowed by `page`
    async fn find(&self, filter: &ProductFilter, page: PageSpec) -> StoreResult<Vec<Product>>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Username / password-hash pairs
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `StoreError::Duplicate("username")` if the name is taken
    async fn create_user(&self, user: User) -> StoreResult<User>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}
