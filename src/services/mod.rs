pub mod auth_service;
pub mod catalog_service;

pub use auth_service::{AuthError, AuthService, Credentials};
pub use catalog_service::{CatalogError, CatalogService};
