use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Product, ProductRow, User, UserRow};
use crate::database::record_id::RecordId;
use crate::database::store::{CatalogStore, CredentialStore, StoreError, StoreResult};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::{PageSpec, ProductFilter};

const PRODUCT_COLUMNS: &str = r#""id", "name", "price", "quantity", "created_at", "updated_at""#;
const USER_COLUMNS: &str = r#""id", "username", "password_hash", "created_at", "updated_at""#;

/// PostgreSQL-backed catalog and credential store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations become `Duplicate`, pool exhaustion becomes `Unavailable`
fn classify(err: sqlx::Error, unique_field: &'static str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Duplicate(unique_field);
        }
    }
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Sqlx(other),
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert(&self, product: Product) -> StoreResult<Product> {
        let sql = format!(
            r#"INSERT INTO "products" ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRODUCT_COLUMNS}"#
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(product.price)
            .bind(product.quantity)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(row.into())
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Product>> {
        let sql = format!(r#"SELECT {PRODUCT_COLUMNS} FROM "products" WHERE "id" = $1"#);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(row.map(Product::from))
    }

    async fn update(&self, product: Product) -> StoreResult<Option<Product>> {
        let sql = format!(
            r#"UPDATE "products" SET "name" = $2, "price" = $3, "quantity" = $4, "updated_at" = $5
               WHERE "id" = $1 RETURNING {PRODUCT_COLUMNS}"#
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(product.price)
            .bind(product.quantity)
            .bind(product.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        let result = sqlx::query(r#"DELETE FROM "products" WHERE "id" = $1"#)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[RecordId]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let uuids: Vec<Uuid> = ids.iter().map(RecordId::as_uuid).collect();
        let result = sqlx::query(r#"DELETE FROM "products" WHERE "id" = ANY($1)"#)
            .bind(uuids)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(result.rows_affected())
    }

    async fn count(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(r#"SELECT COUNT(*) FROM "products""#);
        FilterWhere::push(&mut builder, filter);
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(count.max(0) as u64)
    }

    async fn find(&self, filter: &ProductFilter, page: PageSpec) -> StoreResult<Vec<Product>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!(r#"SELECT {PRODUCT_COLUMNS} FROM "products""#));
        FilterWhere::push(&mut builder, filter);
        builder.push(FilterOrder::NATURAL_SQL);
        builder.push(" LIMIT ").push_bind(to_i64(page.limit));
        builder.push(" OFFSET ").push_bind(to_i64(page.offset()));

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, "id"))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let sql = format!(
            r#"INSERT INTO "users" ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "username"))?;
        Ok(row.into())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "users" WHERE "username" = $1"#);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "username"))?;
        Ok(row.map(User::from))
    }
}
