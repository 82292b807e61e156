pub mod product;
pub mod user;

pub use product::{FieldError, NumberInput, Product, ProductFields, ProductInput, ProductRow};
pub use user::{User, UserRow};
