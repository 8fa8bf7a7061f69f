//! The canonical product record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// A product as described by the content source.
///
/// `external_id` is the natural key: the sync engine matches records by it
/// and never sees the local surrogate key. Every other field is replaced
/// wholesale on each write, so an optional field that the source omits
/// clears whatever value was stored before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identifier assigned by the source system.
    pub external_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub brand_id: Option<String>,
    /// Category ids. Order carries no meaning.
    #[serde(default)]
    pub categories: BTreeSet<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    /// Image asset ids, in source order.
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with only the required fields set.
    pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            external_id: external_id.into(),
            name: name.into(),
            sku: None,
            brand_id: None,
            categories: BTreeSet::new(),
            price: None,
            stock: None,
            images: Vec::new(),
            description: None,
            slug: None,
            tags: Vec::new(),
            website: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the record invariants: non-empty id and name, non-negative price and stock.
    pub fn validate(&self) -> Result<()> {
        if self.external_id.trim().is_empty() {
            return Err(SyncError::malformed(None, "empty external id"));
        }
        let id = Some(self.external_id.as_str());
        if self.name.trim().is_empty() {
            return Err(SyncError::malformed(id, "empty name"));
        }
        if let Some(price) = self.price {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(SyncError::malformed(id, format!("negative price {price}")));
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err(SyncError::malformed(id, format!("negative stock {stock}")));
            }
        }
        Ok(())
    }

    /// Returns true when both products carry the same source content.
    ///
    /// Timestamps are ignored: the store manages `updated_at` after the
    /// first write.
    pub fn same_content(&self, other: &Product) -> bool {
        self.external_id == other.external_id
            && self.name == other.name
            && self.sku == other.sku
            && self.brand_id == other.brand_id
            && self.categories == other.categories
            && self.price == other.price
            && self.stock == other.stock
            && self.images == other.images
            && self.description == other.description
            && self.slug == other.slug
            && self.tags == other.tags
            && self.website == other.website
            && self.is_deleted == other.is_deleted
    }
}

/// A product as held by a record store, with its local surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    /// Local row id. Never used for sync matching.
    pub id: i64,
    #[serde(flatten)]
    pub product: Product,
}
