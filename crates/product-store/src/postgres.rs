//! PostgreSQL record store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sync_core::{
    DeletedFilter, PageRequest, Paginated, Product, ProductFilter, Result, StoredProduct,
    SyncError,
};
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};

use crate::traits::{RecordStore, UpsertOutcome};

const COLUMNS: &str = "id, external_id, name, sku, brand_id, categories, price, stock, images, \
                       description, slug, tags, website, is_deleted, created_at, updated_at";

type Param = Box<dyn ToSql + Sync + Send>;

/// Create a new PostgreSQL client with connection handling
pub async fn connect(connection_string: &str) -> Result<Arc<Mutex<Client>>> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
        .await
        .map_err(SyncError::store)?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {e}");
        }
    });

    Ok(Arc::new(Mutex::new(client)))
}

/// Products in the `products` table.
pub struct PostgresRecordStore {
    client: Arc<Mutex<Client>>,
}

impl PostgresRecordStore {
    pub fn new(client: Arc<Mutex<Client>>) -> Self {
        Self { client }
    }

    /// Create the `products` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.client.lock().await;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS products (
                    id BIGSERIAL PRIMARY KEY,
                    external_id TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    sku TEXT,
                    brand_id TEXT,
                    categories TEXT[] NOT NULL DEFAULT '{}',
                    price NUMERIC CHECK (price >= 0),
                    stock BIGINT CHECK (stock >= 0),
                    images TEXT[] NOT NULL DEFAULT '{}',
                    description TEXT,
                    slug TEXT,
                    tags TEXT[] NOT NULL DEFAULT '{}',
                    website TEXT,
                    is_deleted BOOLEAN NOT NULL DEFAULT false,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );
                CREATE INDEX IF NOT EXISTS products_created_at_idx ON products (created_at);",
            )
            .await
            .map_err(SyncError::store)?;
        Ok(())
    }
}

fn row_to_product(row: &Row) -> StoredProduct {
    let categories: Vec<String> = row.get("categories");
    let price: Option<Decimal> = row.get("price");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");
    StoredProduct {
        id: row.get("id"),
        product: Product {
            external_id: row.get("external_id"),
            name: row.get("name"),
            sku: row.get("sku"),
            brand_id: row.get("brand_id"),
            categories: categories.into_iter().collect(),
            price,
            stock: row.get("stock"),
            images: row.get("images"),
            description: row.get("description"),
            slug: row.get("slug"),
            tags: row.get("tags"),
            website: row.get("website"),
            is_deleted: row.get("is_deleted"),
            created_at,
            updated_at,
        },
    }
}

/// Escape LIKE wildcards so the user's text matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Build a WHERE clause and its positional parameters for `filter`.
fn where_clause(filter: &ProductFilter) -> (String, Vec<Param>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Param> = Vec::new();

    if let Some(name) = &filter.name {
        params.push(Box::new(like_pattern(name)));
        conditions.push(format!("name ILIKE ${}", params.len()));
    }
    if let Some(category) = &filter.category {
        params.push(Box::new(category.clone()));
        conditions.push(format!("${} = ANY(categories)", params.len()));
    }
    if let Some(min) = filter.price_min {
        params.push(Box::new(min));
        conditions.push(format!("price >= ${}", params.len()));
    }
    if let Some(max) = filter.price_max {
        params.push(Box::new(max));
        conditions.push(format!("price <= ${}", params.len()));
    }
    match filter.has_price {
        Some(true) => conditions.push("price IS NOT NULL".to_string()),
        Some(false) => conditions.push("price IS NULL".to_string()),
        None => {}
    }
    if let Some(from) = filter.created_from {
        params.push(Box::new(from));
        conditions.push(format!("created_at >= ${}", params.len()));
    }
    if let Some(to) = filter.created_to {
        params.push(Box::new(to));
        conditions.push(format!("created_at <= ${}", params.len()));
    }
    match filter.deleted {
        DeletedFilter::Include => {}
        DeletedFilter::Exclude => conditions.push("NOT is_deleted".to_string()),
        DeletedFilter::Only => conditions.push("is_deleted".to_string()),
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

fn as_refs(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| &**p as &(dyn ToSql + Sync))
        .collect()
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn exists(&self) -> Result<bool> {
        let client = self.client.lock().await;
        let row = client
            .query_one("SELECT EXISTS (SELECT 1 FROM products)", &[])
            .await
            .map_err(SyncError::store)?;
        Ok(row.get(0))
    }

    async fn upsert(&self, product: &Product) -> Result<UpsertOutcome> {
        let categories: Vec<&str> = product.categories.iter().map(String::as_str).collect();
        let client = self.client.lock().await;
        let row = client
            .query_one(
                "INSERT INTO products (external_id, name, sku, brand_id, categories, price, stock,
                                       images, description, slug, tags, website, is_deleted,
                                       created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                 ON CONFLICT (external_id) DO UPDATE SET
                     name = EXCLUDED.name,
                     sku = EXCLUDED.sku,
                     brand_id = EXCLUDED.brand_id,
                     categories = EXCLUDED.categories,
                     price = EXCLUDED.price,
                     stock = EXCLUDED.stock,
                     images = EXCLUDED.images,
                     description = EXCLUDED.description,
                     slug = EXCLUDED.slug,
                     tags = EXCLUDED.tags,
                     website = EXCLUDED.website,
                     is_deleted = EXCLUDED.is_deleted,
                     updated_at = now()
                 RETURNING (xmax = 0) AS inserted",
                &[
                    &product.external_id,
                    &product.name,
                    &product.sku,
                    &product.brand_id,
                    &categories,
                    &product.price,
                    &product.stock,
                    &product.images,
                    &product.description,
                    &product.slug,
                    &product.tags,
                    &product.website,
                    &product.is_deleted,
                    &product.created_at,
                    &product.updated_at,
                ],
            )
            .await
            .map_err(SyncError::store)?;

        let inserted: bool = row.get("inserted");
        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn mark_deleted(&self, external_id: &str) -> Result<bool> {
        let client = self.client.lock().await;
        let affected = client
            .execute(
                "UPDATE products SET is_deleted = true, updated_at = now() WHERE external_id = $1",
                &[&external_id],
            )
            .await
            .map_err(SyncError::store)?;
        Ok(affected > 0)
    }

    async fn get(&self, external_id: &str) -> Result<Option<StoredProduct>> {
        let client = self.client.lock().await;
        let row = client
            .query_opt(
                &format!("SELECT {COLUMNS} FROM products WHERE external_id = $1"),
                &[&external_id],
            )
            .await
            .map_err(SyncError::store)?;
        Ok(row.as_ref().map(row_to_product))
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64> {
        let (clause, params) = where_clause(filter);
        let client = self.client.lock().await;
        let row = client
            .query_one(
                &format!("SELECT COUNT(*) FROM products{clause}"),
                &as_refs(&params),
            )
            .await
            .map_err(SyncError::store)?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Paginated<StoredProduct>> {
        let total = self.count(filter).await?;

        let (clause, mut params) = where_clause(filter);
        params.push(Box::new(i64::from(page.limit)));
        let limit_idx = params.len();
        params.push(Box::new(i64::try_from(page.offset()).unwrap_or(i64::MAX)));
        let offset_idx = params.len();

        let sql = format!(
            "SELECT {COLUMNS} FROM products{clause} ORDER BY id LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );
        let client = self.client.lock().await;
        let rows = client
            .query(&sql, &as_refs(&params))
            .await
            .map_err(SyncError::store)?;

        let items = rows.iter().map(row_to_product).collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn top_by_price(&self, limit: u32) -> Result<Vec<StoredProduct>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM products WHERE price IS NOT NULL \
                     ORDER BY price DESC, id LIMIT $1"
                ),
                &[&i64::from(limit)],
            )
            .await
            .map_err(SyncError::store)?;
        Ok(rows.iter().map(row_to_product).collect())
    }
}
