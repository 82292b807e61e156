use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::models::{Product, User};
use crate::database::record_id::RecordId;
use crate::database::store::{CatalogStore, CredentialStore, StoreError, StoreResult};
use crate::filter::{PageSpec, ProductFilter};

/// In-process store for development and tests. Products are kept in
/// insertion order, which is also their natural listing order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    products: Arc<RwLock<Vec<Product>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert(&self, product: Product) -> StoreResult<Product> {
        let mut products = self.products.write().await;
        products.push(product.clone());
        Ok(product)
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == *id).cloned())
    }

    async fn update(&self, product: Product) -> StoreResult<Option<Product>> {
        let mut products = self.products.write().await;
        let Some(slot) = products.iter_mut().find(|p| p.id == product.id) else {
            return Ok(None);
        };
        slot.name = product.name;
        slot.price = product.price;
        slot.quantity = product.quantity;
        slot.updated_at = product.updated_at;
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != *id);
        Ok(products.len() < before)
    }

    async fn delete_many(&self, ids: &[RecordId]) -> StoreResult<u64> {
        let targets: HashSet<&RecordId> = ids.iter().collect();
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| !targets.contains(&p.id));
        Ok((before - products.len()) as u64)
    }

    async fn count(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn find(&self, filter: &ProductFilter, page: PageSpec) -> StoreResult<Vec<Product>> {
        let products = self.products.read().await;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        Ok(products
            .iter()
            .filter(|p| filter.matches(p))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::Duplicate("username"));
        }
        users.insert(user.username.clone(), user.clone());

        tracing::debug!(user_id = %user.id, username = %user.username, "Stored user");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ProductFields;

    fn product(name: &str, price: f64) -> Product {
        Product::new(ProductFields::validate(name, price, 1.0).unwrap())
    }

    #[tokio::test]
    async fn find_windows_in_insertion_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(product(&format!("item {i}"), i as f64)).await.unwrap();
        }

        let page = store
            .find(&ProductFilter::default(), PageSpec::new(2, 2))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["item 2", "item 3"]);

        let last = store
            .find(&ProductFilter::default(), PageSpec::new(3, 2))
            .await
            .unwrap();
        assert_eq!(last.len(), 1);
    }

    #[tokio::test]
    async fn delete_many_counts_only_existing() {
        let store = MemoryStore::new();
        let a = store.insert(product("a", 1.0)).await.unwrap();
        let b = store.insert(product("b", 1.0)).await.unwrap();

        let removed = store.delete_many(&[a.id, RecordId::new()]).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(&a.id).await.unwrap().is_none());
        assert!(store.get(&b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_missing_record_is_none() {
        let store = MemoryStore::new();
        assert!(store.update(product("ghost", 1.0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("alice".into(), "hash".into()))
            .await
            .unwrap();
        let err = store
            .create_user(User::new("alice".into(), "other".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("username")));
    }
}
