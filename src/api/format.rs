use serde::Serialize;

use crate::database::models::{Product, User};
use crate::filter::PageSpec;

/// Public wire shape of a product: `{ id, name, price, quantity }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price,
            quantity: product.quantity,
        }
    }
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// Paginated listing envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub total_products: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub data: Vec<ProductView>,
}

impl ProductPage {
    pub fn new(page: PageSpec, total_products: u64, products: Vec<Product>) -> Self {
        Self {
            total_products,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total_products),
            data: products.into_iter().map(ProductView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: String,
    pub username: String,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}
