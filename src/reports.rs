//! Aggregate reports over the record store.
//!
//! Percentages are in the range `0.0..=100.0` and are `0.0` when there is
//! nothing to divide by.

use chrono::{DateTime, Utc};
use product_store::RecordStore;
use rust_decimal::Decimal;
use serde::Serialize;
use sync_core::{DeletedFilter, PageRequest, ProductFilter, Result, StoredProduct};

/// Default number of products in the top-priced report.
pub const DEFAULT_TOP_LIMIT: u32 = 5;

/// Page size used when a report walks the store.
const SCAN_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedReport {
    pub total: u64,
    pub deleted: u64,
    pub deleted_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCoverage {
    /// Non-deleted products considered.
    pub active: u64,
    pub with_price: u64,
    pub without_price: u64,
    pub with_price_percentage: f64,
    pub without_price_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProduct {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCreatedReport {
    pub total: u64,
    pub active_created: u64,
    pub percentage: f64,
}

/// An inclusive `created_at` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    fn filter(&self, deleted: DeletedFilter) -> ProductFilter {
        ProductFilter {
            created_from: Some(self.from),
            created_to: Some(self.to),
            deleted,
            ..ProductFilter::default()
        }
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Share of all products that are soft-deleted.
pub async fn deleted_percentage<R: RecordStore>(store: &R) -> Result<DeletedReport> {
    let total = store.count(&ProductFilter::all()).await?;
    let deleted = store.count(&ProductFilter::deleted_only()).await?;
    Ok(DeletedReport {
        total,
        deleted,
        deleted_percentage: percentage(deleted, total),
    })
}

/// Share of non-deleted products with and without a price.
pub async fn price_coverage<R: RecordStore>(store: &R) -> Result<PriceCoverage> {
    let active = store.count(&ProductFilter::active()).await?;
    let with_price = store
        .count(&ProductFilter {
            has_price: Some(true),
            ..ProductFilter::active()
        })
        .await?;
    let without_price = active.saturating_sub(with_price);
    Ok(PriceCoverage {
        active,
        with_price,
        without_price,
        with_price_percentage: percentage(with_price, active),
        without_price_percentage: percentage(without_price, active),
    })
}

/// Every product created within `range`, deleted ones included, in id order.
pub async fn created_between<R: RecordStore>(
    store: &R,
    range: &DateRange,
) -> Result<Vec<StoredProduct>> {
    let filter = range.filter(DeletedFilter::Include);
    let mut products = Vec::new();
    let mut page = PageRequest::new(1, SCAN_PAGE_SIZE);
    loop {
        let batch = store.list(&filter, &page).await?;
        let last = page.page >= batch.total_pages;
        products.extend(batch.items);
        if last {
            break;
        }
        page = PageRequest::new(page.page + 1, SCAN_PAGE_SIZE);
    }
    Ok(products)
}

/// The `limit` most expensive priced products.
pub async fn top_priced<R: RecordStore>(store: &R, limit: u32) -> Result<Vec<PricedProduct>> {
    let products = store.top_by_price(limit).await?;
    Ok(products
        .into_iter()
        .filter_map(|stored| {
            stored.product.price.map(|price| PricedProduct {
                id: stored.id,
                name: stored.product.name,
                price,
            })
        })
        .collect())
}

/// Non-deleted products created within `range`, as a share of all products.
pub async fn active_created_between<R: RecordStore>(
    store: &R,
    range: &DateRange,
) -> Result<ActiveCreatedReport> {
    let total = store.count(&ProductFilter::all()).await?;
    let active_created = store.count(&range.filter(DeletedFilter::Exclude)).await?;
    Ok(ActiveCreatedReport {
        total,
        active_created,
        percentage: percentage(active_created, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_product;
    use product_store::MemoryRecordStore;

    fn at(day: u32) -> DateTime<Utc> {
        format!("2024-05-{day:02}T12:00:00Z").parse().unwrap()
    }

    async fn seeded() -> MemoryRecordStore {
        let store = MemoryRecordStore::new();
        for (id, day, price) in [("a", 1, Some(5)), ("b", 2, None), ("c", 3, Some(30)), ("d", 4, Some(12))] {
            let mut product = sample_product(id);
            product.name = id.to_uppercase();
            product.created_at = at(day);
            product.price = price.map(Decimal::from);
            store.upsert(&product).await.unwrap();
        }
        store.mark_deleted("d").await.unwrap();
        store
    }

    #[tokio::test]
    async fn empty_store_reports_zero() {
        let store = MemoryRecordStore::new();
        assert_eq!(deleted_percentage(&store).await.unwrap().deleted_percentage, 0.0);
        let coverage = price_coverage(&store).await.unwrap();
        assert_eq!(coverage.with_price_percentage, 0.0);
        assert_eq!(coverage.without_price_percentage, 0.0);
        assert!(top_priced(&store, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_share() {
        let report = deleted_percentage(&seeded().await).await.unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.deleted_percentage, 25.0);
    }

    #[tokio::test]
    async fn price_coverage_ignores_deleted() {
        let coverage = price_coverage(&seeded().await).await.unwrap();
        assert_eq!(coverage.active, 3);
        assert_eq!(coverage.with_price, 2);
        assert_eq!(coverage.without_price, 1);
        assert!((coverage.with_price_percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn created_range_is_inclusive() {
        let store = seeded().await;
        let products = created_between(&store, &DateRange::new(at(2), at(4)))
            .await
            .unwrap();
        let ids: Vec<&str> = products
            .iter()
            .map(|p| p.product.external_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn created_range_spans_scan_pages() {
        let store = MemoryRecordStore::new();
        for i in 0..250 {
            let mut product = sample_product(&format!("p-{i}"));
            product.created_at = at(10);
            store.upsert(&product).await.unwrap();
        }
        let products = created_between(&store, &DateRange::new(at(1), at(20)))
            .await
            .unwrap();
        assert_eq!(products.len(), 250);
    }

    #[tokio::test]
    async fn top_priced_orders_descending() {
        let top = top_priced(&seeded().await, DEFAULT_TOP_LIMIT).await.unwrap();
        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "D", "A"]);
        assert_eq!(top[0].price, Decimal::from(30));
    }

    #[tokio::test]
    async fn active_created_share_of_all_products() {
        let report = active_created_between(&seeded().await, &DateRange::new(at(3), at(4)))
            .await
            .unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.active_created, 1);
        assert_eq!(report.percentage, 25.0);
    }
}
