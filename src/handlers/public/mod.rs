// handlers/public/mod.rs - Public handlers (no authentication)
//
// Token acquisition plus the read side of the catalog.

pub mod auth;
pub mod products;
