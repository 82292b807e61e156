use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::api::{ProductPage, ProductView};
use crate::database::models::{FieldError, Product, ProductInput};
use crate::database::{CatalogStore, InvalidId, RecordId, StoreError};
use crate::filter::{Filter, FilterError, ListParams};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{0}")]
    Validation(&'static str),

    #[error("Invalid ID format")]
    InvalidId,

    #[error("Page {page} is out of bounds. There are only {total_pages} pages.")]
    PageOutOfRange { page: u64, total_pages: u64 },

    #[error("Product not found")]
    NotFound,

    #[error("No products found to delete")]
    NothingDeleted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InvalidId> for CatalogError {
    fn from(_: InvalidId) -> Self {
        CatalogError::InvalidId
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Product listing, lookup and mutation on top of a [`CatalogStore`]
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    default_page_limit: u64,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, default_page_limit: u64) -> Self {
        Self {
            store,
            default_page_limit: default_page_limit.max(1),
        }
    }

    pub async fn list(&self, params: &ListParams) -> CatalogResult<ProductPage> {
        let filter = Filter::from_params(params, self.default_page_limit)?;

        let total = self.store.count(&filter.products).await?;
        let total_pages = filter.page.total_pages(total);
        if filter.page.page > total_pages && total_pages > 0 {
            return Err(CatalogError::PageOutOfRange {
                page: filter.page.page,
                total_pages,
            });
        }

        let products = self.store.find(&filter.products, filter.page).await?;
        Ok(ProductPage::new(filter.page, total, products))
    }

    pub async fn get(&self, raw_id: &str) -> CatalogResult<ProductView> {
        let id = RecordId::parse(raw_id)?;
        let product = self.store.get(&id).await?.ok_or(CatalogError::NotFound)?;
        Ok(product.into())
    }

    pub async fn create(&self, input: ProductInput) -> CatalogResult<ProductView> {
        let fields = input.into_fields()?;
        let product = self.store.insert(Product::new(fields)).await?;

        info!(product_id = %product.id, name = %product.name, "Created product");
        Ok(product.into())
    }

    pub async fn update(&self, raw_id: &str, input: ProductInput) -> CatalogResult<ProductView> {
        let id = RecordId::parse(raw_id)?;
        let mut product = self.store.get(&id).await?.ok_or(CatalogError::NotFound)?;

        let fields = input.merge_into(&product)?;
        product.apply(fields);

        // The record can vanish between the read and the write
        let updated = self
            .store
            .update(product)
            .await?
            .ok_or(CatalogError::NotFound)?;

        info!(product_id = %updated.id, "Updated product");
        Ok(updated.into())
    }

    pub async fn delete(&self, raw_id: &str) -> CatalogResult<()> {
        let id = RecordId::parse(raw_id)?;
        if !self.store.delete(&id).await? {
            return Err(CatalogError::NotFound);
        }

        info!(product_id = %id, "Deleted product");
        Ok(())
    }

    /// Delete every id in `body.ids`. All ids are validated before anything
    /// is removed.
    pub async fn delete_many(&self, body: &Value) -> CatalogResult<u64> {
        let ids = parse_ids(body)?;

        let deleted = self.store.delete_many(&ids).await?;
        if deleted == 0 {
            return Err(CatalogError::NothingDeleted);
        }

        info!(requested = ids.len(), deleted, "Bulk deleted products");
        Ok(deleted)
    }

    pub async fn ping(&self) -> CatalogResult<()> {
        Ok(self.store.ping().await?)
    }
}

fn parse_ids(body: &Value) -> CatalogResult<Vec<RecordId>> {
    let raw = body
        .get("ids")
        .and_then(Value::as_array)
        .ok_or(CatalogError::Validation("IDs should be an array"))?;

    raw.iter()
        .map(|v| v.as_str().and_then(|s| RecordId::parse(s).ok()))
        .collect::<Option<Vec<_>>>()
        .ok_or(CatalogError::Validation("Some IDs are invalid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::new()), 10)
    }

    fn input(value: Value) -> ProductInput {
        serde_json::from_value(value).unwrap()
    }

    async fn seed(service: &CatalogService, count: usize) -> Vec<ProductView> {
        let mut created = vec![];
        for i in 0..count {
            let view = service
                .create(input(json!({"name": format!("Item {i}"), "price": i, "quantity": 1})))
                .await
                .unwrap();
            created.push(view);
        }
        created
    }

    fn params(page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_paginates_and_reports_totals() {
        let service = service();
        seed(&service, 25).await;

        let page = service.list(&params(Some("3"), None)).await.unwrap();
        assert_eq!(page.total_products, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.data[0].name, "Item 20");
    }

    #[tokio::test]
    async fn page_past_the_end_is_rejected() {
        let service = service();
        seed(&service, 3).await;

        let err = service.list(&params(Some("3"), Some("2"))).await.unwrap_err();
        assert!(matches!(err, CatalogError::PageOutOfRange { page: 3, total_pages: 2 }));
        assert_eq!(
            err.to_string(),
            "Page 3 is out of bounds. There are only 2 pages."
        );
    }

    #[tokio::test]
    async fn empty_catalog_serves_any_page() {
        let page = service().list(&params(Some("7"), None)).await.unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_name_and_price() {
        let service = service();
        seed(&service, 10).await;
        service
            .create(input(json!({"name": "ITEM special", "price": 100, "quantity": 1})))
            .await
            .unwrap();

        let page = service
            .list(&ListParams {
                name: Some("item".into()),
                min_price: Some("5".into()),
                max_price: Some("100".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_products, 6);
        assert!(page.data.iter().all(|p| p.price >= 5.0));
    }

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let service = service();
        let created = service
            .create(input(json!({"name": "Widget", "price": 9.99, "quantity": 5})))
            .await
            .unwrap();

        let updated = service
            .update(&created.id, input(json!({"price": 12.5})))
            .await
            .unwrap();
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.quantity, 5);
        assert_eq!(service.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn id_errors_are_distinguished() {
        let service = service();
        assert!(matches!(service.get("nope").await, Err(CatalogError::InvalidId)));
        assert!(matches!(
            service.get(&RecordId::new().to_string()).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            service.delete(&RecordId::new().to_string()).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn bulk_delete_validates_before_deleting() {
        let service = service();
        let created = seed(&service, 2).await;

        let err = service
            .delete_many(&json!({"ids": [created[0].id, "bogus"]}))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation("Some IDs are invalid")));
        assert_eq!(service.list(&ListParams::default()).await.unwrap().total_products, 2);

        let err = service.delete_many(&json!({"ids": "nope"})).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation("IDs should be an array")));

        let deleted = service
            .delete_many(&json!({"ids": [created[0].id, created[1].id]}))
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let err = service
            .delete_many(&json!({"ids": [created[0].id]}))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NothingDeleted));
    }
}
