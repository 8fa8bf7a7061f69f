//! RecordStore trait definition.

use sync_core::{PageRequest, Paginated, Product, ProductFilter, Result, StoredProduct};

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Trait for reading and writing product records.
///
/// # Usage Pattern
///
/// The engine and the reports take the store as a generic parameter:
///
/// ```ignore
/// pub async fn deleted_percentage<R: RecordStore>(store: &R) -> Result<f64> {
///     let total = store.count(&ProductFilter::all()).await?;
///     // ...
/// }
/// ```
///
/// The CLI entry point picks the implementation once, and after that all
/// code is monomorphized for it.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// True iff at least one record is present, deleted or not.
    async fn exists(&self) -> Result<bool>;

    /// Insert or fully replace the record with `product.external_id`.
    ///
    /// On insert the product's own timestamps are kept. On update every
    /// mutable field is replaced, `created_at` is preserved and
    /// `updated_at` is set by the store.
    async fn upsert(&self, product: &Product) -> Result<UpsertOutcome>;

    /// Soft-delete the record with `external_id`.
    ///
    /// Returns false, not an error, when no such record exists.
    async fn mark_deleted(&self, external_id: &str) -> Result<bool>;

    /// Look up one record by its external id.
    async fn get(&self, external_id: &str) -> Result<Option<StoredProduct>>;

    /// Count records matching `filter`.
    async fn count(&self, filter: &ProductFilter) -> Result<u64>;

    /// One page of records matching `filter`, ordered by surrogate id.
    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Paginated<StoredProduct>>;

    /// Up to `limit` priced records, most expensive first.
    async fn top_by_price(&self, limit: u32) -> Result<Vec<StoredProduct>>;
}
