//! Test doubles for driving the sync engine without a network.
//!
//! [`ScriptedSource`] replays a queue of pages (or errors) in order and
//! records every request it receives. Once the queue is exhausted it
//! answers with empty pages.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sync_core::{Product, RequestDescriptor, Result, SourceClient, SourcePage, SyncError};

/// Base URL of scripted requests.
pub const SCRIPTED_SYNC_URL: &str = "scripted://catalog/sync";

/// A native item of the scripted source.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedItem {
    /// Canonicalizes to this product, subject to its invariants.
    Valid(Product),
    /// Fails canonicalization.
    Malformed { id: Option<String>, reason: String },
}

/// A source that serves pre-scripted pages.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<SourcePage<ScriptedItem>>>>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page.
    pub fn with_page(self, page: SourcePage<ScriptedItem>) -> Self {
        self.push(Ok(page));
        self
    }

    /// Queue a fetch failure.
    pub fn with_error(self, error: SyncError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue a page or failure on a shared source.
    pub fn push(&self, page: Result<SourcePage<ScriptedItem>>) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.push_back(page);
        }
    }

    /// Every request fetched so far, in order.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of pages still queued.
    pub fn remaining(&self) -> usize {
        self.pages.lock().map(|pages| pages.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SourceClient for ScriptedSource {
    type Item = ScriptedItem;

    fn initial_request(&self) -> RequestDescriptor {
        RequestDescriptor::initial(format!("{SCRIPTED_SYNC_URL}?initial=true"))
    }

    fn continuation_request(&self, cursor: &str) -> Result<RequestDescriptor> {
        if cursor.is_empty() {
            return Err(SyncError::InvalidCursor("empty cursor".to_string()));
        }
        Ok(RequestDescriptor::continuation(format!(
            "{SCRIPTED_SYNC_URL}?sync_token={cursor}"
        )))
    }

    async fn fetch_page(&self, request: &RequestDescriptor) -> Result<SourcePage<ScriptedItem>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.pages.lock().ok().and_then(|mut pages| pages.pop_front());
        next.unwrap_or_else(|| Ok(SourcePage::empty()))
    }

    fn canonicalize(&self, items: &[ScriptedItem]) -> Vec<Result<Product>> {
        items
            .iter()
            .map(|item| match item {
                ScriptedItem::Valid(product) => product.validate().map(|_| product.clone()),
                ScriptedItem::Malformed { id, reason } => {
                    Err(SyncError::malformed(id.as_deref(), reason.clone()))
                }
            })
            .collect()
    }
}

/// A fully populated product with a deterministic shape.
pub fn sample_product(external_id: &str) -> Product {
    let mut product = Product::new(external_id, format!("Product {external_id}"));
    product.sku = Some(format!("SKU-{external_id}"));
    product.brand_id = Some("brand-1".to_string());
    product.categories.insert("catalog".to_string());
    product.price = Some(Decimal::new(1999, 2));
    product.stock = Some(10);
    product.images = vec![format!("img-{external_id}")];
    product.slug = Some(external_id.to_lowercase());
    product.tags = vec!["sample".to_string()];
    product
}

/// A valid scripted item for `external_id`.
pub fn item(external_id: &str) -> ScriptedItem {
    ScriptedItem::Valid(sample_product(external_id))
}

/// A scripted item that fails canonicalization.
pub fn malformed(id: Option<&str>, reason: &str) -> ScriptedItem {
    ScriptedItem::Malformed {
        id: id.map(str::to_string),
        reason: reason.to_string(),
    }
}

/// A page of `items` and `deleted` ids with no continuation.
pub fn page(items: Vec<ScriptedItem>, deleted: &[&str]) -> SourcePage<ScriptedItem> {
    SourcePage {
        new_items: items,
        deleted_ids: deleted.iter().map(|id| id.to_string()).collect(),
        next_page: None,
        next_cursor: None,
    }
}
