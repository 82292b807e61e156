pub mod collection;
pub mod record;

pub use collection::delete as products_delete_many;
pub use collection::post as product_create;
pub use record::delete as product_delete;
pub use record::put as product_update;
