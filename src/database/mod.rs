pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod record_id;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use record_id::{InvalidId, RecordId};
pub use store::{CatalogStore, CredentialStore, StoreError, StoreResult};
