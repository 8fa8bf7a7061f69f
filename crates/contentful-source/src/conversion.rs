//! Entry to product conversion.
//!
//! Product entries carry these localized fields:
//!
//! | field                | product field | shape                  |
//! |----------------------|---------------|------------------------|
//! | `productName`        | `name`        | string, required       |
//! | `sku`                | `sku`         | string                 |
//! | `brand`              | `brand_id`    | link, `sys.id`         |
//! | `categories`         | `categories`  | array of links         |
//! | `price`              | `price`       | number                 |
//! | `quantity`           | `stock`       | integer                |
//! | `image`              | `images`      | array of links         |
//! | `productDescription` | `description` | string                 |
//! | `slug`               | `slug`        | string                 |
//! | `tags`               | `tags`        | array of strings       |
//! | `website`            | `website`     | absolute http(s) URL   |
//!
//! Optional fields that are absent, null or of an unexpected shape map to
//! `None` or an empty collection.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use reqwest::Url;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sync_core::{Product, Result, SyncError};

use crate::wire::Entry;

/// Convert one sync entry into a product, reading fields in `locale`.
pub fn entry_to_product(entry: &Entry, locale: &str) -> Result<Product> {
    let id = entry
        .id()
        .ok_or_else(|| SyncError::malformed(None, "missing or non-string sys.id"))?;
    let fields = Localized {
        fields: &entry.fields,
        locale,
    };

    let name = fields
        .string("productName")
        .ok_or_else(|| SyncError::malformed(Some(id), "missing productName"))?;

    let created_at = timestamp(entry.sys.created_at.as_deref());
    let updated_at = entry
        .sys
        .updated_at
        .as_deref()
        .map(|ts| timestamp(Some(ts)))
        .unwrap_or(created_at);

    let mut product = Product::new(id, name);
    product.sku = fields.string("sku");
    product.brand_id = fields.get("brand").and_then(link_id);
    product.categories = fields.links("categories").into_iter().collect();
    product.price = fields.get("price").and_then(decimal);
    product.stock = fields.get("quantity").and_then(integer);
    product.images = fields.links("image");
    product.description = fields.string("productDescription");
    product.slug = fields.string("slug");
    product.tags = fields.strings("tags");
    product.website = fields.string("website").filter(|url| is_web_url(url));
    product.created_at = created_at;
    product.updated_at = updated_at;

    product.validate()?;
    Ok(product)
}

struct Localized<'a> {
    fields: &'a Map<String, Value>,
    locale: &'a str,
}

impl<'a> Localized<'a> {
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields
            .get(field)
            .and_then(|by_locale| by_locale.get(self.locale))
            .filter(|value| !value.is_null())
    }

    /// Non-blank string value.
    fn string(&self, field: &str) -> Option<String> {
        self.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    }

    fn strings(&self, field: &str) -> Vec<String> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn links(&self, field: &str) -> Vec<String> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(link_id).collect())
            .unwrap_or_default()
    }
}

/// `sys.id` of a link object.
fn link_id(value: &Value) -> Option<String> {
    value
        .get("sys")
        .and_then(|sys| sys.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_web_url(text: &str) -> bool {
    Url::parse(text)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Parse an RFC 3339 timestamp, falling back to now.
fn timestamp(text: Option<&str>) -> DateTime<Utc> {
    text.and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
