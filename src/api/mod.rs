pub mod format;

pub use format::{AccountView, ProductPage, ProductView, TokenView};
