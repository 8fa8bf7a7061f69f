//! Read-side queries over stored products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::product::Product;

/// How soft-deleted records are treated by a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletedFilter {
    /// Return deleted and active records alike.
    #[default]
    Include,
    /// Return active records only.
    Exclude,
    /// Return deleted records only.
    Only,
}

/// Predicate over stored products. Every populated field narrows the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Category id the product must belong to.
    pub category: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    /// `Some(true)` keeps priced products, `Some(false)` unpriced ones.
    pub has_price: Option<bool>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
    pub deleted: DeletedFilter,
}

impl ProductFilter {
    /// A filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Active (not soft-deleted) records only.
    pub fn active() -> Self {
        Self {
            deleted: DeletedFilter::Exclude,
            ..Self::default()
        }
    }

    /// Soft-deleted records only.
    pub fn deleted_only() -> Self {
        Self {
            deleted: DeletedFilter::Only,
            ..Self::default()
        }
    }

    /// Evaluates the filter against a product.
    ///
    /// Mirrors SQL semantics: a product without a price never satisfies a
    /// price bound.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(name) = &self.name {
            if !product.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !product.categories.contains(category) {
                return false;
            }
        }
        if let Some(min) = self.price_min {
            if !product.price.is_some_and(|price| price >= min) {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if !product.price.is_some_and(|price| price <= max) {
                return false;
            }
        }
        if let Some(has_price) = self.has_price {
            if product.price.is_some() != has_price {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if product.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if product.created_at > to {
                return false;
            }
        }
        match self.deleted {
            DeletedFilter::Include => true,
            DeletedFilter::Exclude => !product.is_deleted,
            DeletedFilter::Only => product.is_deleted,
        }
    }
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Default page size used by listings.
    pub const DEFAULT_LIMIT: u32 = 5;

    /// Creates a page request; zero values are raised to 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit));
        Self {
            items,
            total,
            current_page: request.page,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}
