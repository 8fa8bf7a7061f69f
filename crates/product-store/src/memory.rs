//! In-process record store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sync_core::{PageRequest, Paginated, Product, ProductFilter, Result, StoredProduct};
use tokio::sync::RwLock;

use crate::traits::{RecordStore, UpsertOutcome};

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, StoredProduct>,
    by_external_id: HashMap<String, i64>,
}

/// Keeps products in memory, ordered by surrogate id.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record, in id order.
    pub async fn snapshot(&self) -> Vec<StoredProduct> {
        self.inner.read().await.rows.values().cloned().collect()
    }

    /// Number of stored records, deleted included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(&self) -> Result<bool> {
        Ok(!self.inner.read().await.rows.is_empty())
    }

    async fn upsert(&self, product: &Product) -> Result<UpsertOutcome> {
        let mut inner = self.inner.write().await;
        if let Some(&id) = inner.by_external_id.get(&product.external_id) {
            if let Some(row) = inner.rows.get_mut(&id) {
                let created_at = row.product.created_at;
                row.product = product.clone();
                row.product.created_at = created_at;
                row.product.updated_at = Utc::now();
                return Ok(UpsertOutcome::Updated);
            }
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.by_external_id.insert(product.external_id.clone(), id);
        inner.rows.insert(
            id,
            StoredProduct {
                id,
                product: product.clone(),
            },
        );
        Ok(UpsertOutcome::Inserted)
    }

    async fn mark_deleted(&self, external_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(&id) = inner.by_external_id.get(external_id) else {
            return Ok(false);
        };
        match inner.rows.get_mut(&id) {
            Some(row) => {
                row.product.is_deleted = true;
                row.product.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, external_id: &str) -> Result<Option<StoredProduct>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_external_id
            .get(external_id)
            .and_then(|id| inner.rows.get(id))
            .cloned())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .filter(|row| filter.matches(&row.product))
            .count() as u64)
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Paginated<StoredProduct>> {
        let inner = self.inner.read().await;
        let matching: Vec<&StoredProduct> = inner
            .rows
            .values()
            .filter(|row| filter.matches(&row.product))
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn top_by_price(&self, limit: u32) -> Result<Vec<StoredProduct>> {
        let inner = self.inner.read().await;
        let mut priced: Vec<&StoredProduct> = inner
            .rows
            .values()
            .filter(|row| row.product.price.is_some())
            .collect();
        // Highest price first, ties by id.
        priced.sort_by(|a, b| {
            b.product
                .price
                .cmp(&a.product.price)
                .then(a.id.cmp(&b.id))
        });
        Ok(priced.into_iter().take(limit as usize).cloned().collect())
    }
}
