pub mod list;
pub mod show;

pub use list::get as products_list;
pub use show::get as product_show;
