//! Sync endpoint response shapes and their normalization.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sync_core::{RequestDescriptor, SourcePage};

/// Top-level sync response.
///
/// Only the envelope is strict. Items accept any JSON shape so that one
/// badly formed entry fails canonicalization on its own instead of the
/// whole page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    #[serde(default)]
    pub items: Option<WireItems>,
    pub next_page_url: Option<String>,
    pub next_sync_url: Option<String>,
}

/// `items` arrives either flat or grouped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireItems {
    Flat(Vec<Entry>),
    Grouped(GroupedItems),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedItems {
    #[serde(default)]
    pub new_entries: Option<Vec<Entry>>,
    #[serde(default)]
    pub deleted_entries: Option<Vec<DeletedRef>>,
}

/// A deleted entry reference: a bare id or a `DeletedEntry` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeletedRef {
    Id(String),
    Entry(Entry),
}

impl DeletedRef {
    fn id(&self) -> Option<&str> {
        match self {
            DeletedRef::Id(id) => Some(id.as_str()).filter(|id| !id.trim().is_empty()),
            DeletedRef::Entry(entry) => entry.id(),
        }
    }
}

/// One sync item. Fields are keyed by field id, then by locale.
///
/// Deserializes from any JSON value. Members of the wrong type read as
/// absent: a numeric `sys.id` leaves `id` empty, a non-object `fields`
/// leaves no fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Entry {
    pub sys: Sys,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        let Value::Object(mut object) = value else {
            return Entry::default();
        };
        let sys = object.remove("sys").map(Sys::from).unwrap_or_default();
        let fields = match object.remove("fields") {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        Entry { sys, fields }
    }
}

impl From<Value> for Sys {
    fn from(value: Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Sys {
            id: text("id"),
            kind: text("type"),
            created_at: text("createdAt"),
            updated_at: text("updatedAt"),
        }
    }
}

impl Entry {
    /// Non-empty `sys.id`, if any.
    pub fn id(&self) -> Option<&str> {
        self.sys.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn kind(&self) -> ItemKind {
        match self.sys.kind.as_deref() {
            None | Some("Entry") => ItemKind::Entry,
            Some("DeletedEntry") => ItemKind::DeletedEntry,
            Some(_) => ItemKind::Other,
        }
    }
}

enum ItemKind {
    Entry,
    DeletedEntry,
    Other,
}

impl SyncResponse {
    /// Reduce the response to the page shape the engine consumes.
    pub fn into_page(self) -> SourcePage<Entry> {
        let mut page = SourcePage::empty();

        match self.items {
            None => {}
            Some(WireItems::Flat(items)) => {
                for item in items {
                    match item.kind() {
                        ItemKind::Entry => page.new_items.push(item),
                        ItemKind::DeletedEntry => push_deleted(&mut page, item.id()),
                        ItemKind::Other => {
                            tracing::debug!(
                                "Ignoring sync item of type {:?}",
                                item.sys.kind.as_deref()
                            );
                        }
                    }
                }
            }
            Some(WireItems::Grouped(grouped)) => {
                page.new_items = grouped.new_entries.unwrap_or_default();
                for deleted in &grouped.deleted_entries.unwrap_or_default() {
                    push_deleted(&mut page, deleted.id());
                }
            }
        }

        page.next_page = self
            .next_page_url
            .filter(|url| !url.trim().is_empty())
            .map(RequestDescriptor::next_page);
        page.next_cursor = self
            .next_sync_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .map(|url| extract_sync_token(&url).unwrap_or(url));
        page
    }
}

fn push_deleted(page: &mut SourcePage<Entry>, id: Option<&str>) {
    match id {
        Some(id) => page.deleted_ids.push(id.to_string()),
        None => tracing::warn!("Ignoring deleted entry without sys.id"),
    }
}

/// The `sync_token` query value of a `nextSyncUrl`, if it has one.
pub fn extract_sync_token(next_sync_url: &str) -> Option<String> {
    let url = Url::parse(next_sync_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "sync_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> SourcePage<Entry> {
        serde_json::from_value::<SyncResponse>(value)
            .unwrap()
            .into_page()
    }

    #[test]
    fn flat_items_split_by_sys_type() {
        let page = parse(json!({
            "items": [
                {"sys": {"id": "a", "type": "Entry"}, "fields": {}},
                {"sys": {"id": "b", "type": "DeletedEntry"}},
                {"sys": {"id": "c", "type": "Asset"}},
                {"sys": {"id": "d", "type": "DeletedAsset"}},
                {"sys": {"type": "DeletedEntry"}}
            ],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s/sync?sync_token=tok-1"
        }));
        assert_eq!(page.new_items.len(), 1);
        assert_eq!(page.new_items[0].id(), Some("a"));
        assert_eq!(page.deleted_ids, vec!["b".to_string()]);
        assert_eq!(page.next_cursor.as_deref(), Some("tok-1"));
        assert!(page.next_page.is_none());
    }

    #[test]
    fn grouped_items_accept_ids_and_objects() {
        let page = parse(json!({
            "items": {
                "newEntries": [{"sys": {"id": "a", "type": "Entry"}, "fields": {}}],
                "deletedEntries": ["b", {"sys": {"id": "c", "type": "DeletedEntry"}}]
            },
            "nextPageUrl": "https://cdn.contentful.com/spaces/s/sync?sync_token=page-2"
        }));
        assert_eq!(page.new_items.len(), 1);
        assert_eq!(page.deleted_ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(
            page.next_page,
            Some(RequestDescriptor::next_page(
                "https://cdn.contentful.com/spaces/s/sync?sync_token=page-2"
            ))
        );
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn grouped_items_without_deletions() {
        let page = parse(json!({
            "items": {"newEntries": []},
            "nextSyncUrl": "tok-raw"
        }));
        assert!(page.is_empty());
        assert_eq!(page.next_cursor.as_deref(), Some("tok-raw"));
    }

    #[test]
    fn missing_items_is_an_empty_page() {
        let page = parse(json!({}));
        assert!(page.is_empty());
        assert!(page.next_page.is_none());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn next_sync_url_without_token_is_kept_whole() {
        let page = parse(json!({
            "items": [],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s/sync?other=1"
        }));
        assert_eq!(
            page.next_cursor.as_deref(),
            Some("https://cdn.contentful.com/spaces/s/sync?other=1")
        );
    }

    #[test]
    fn sync_token_extraction() {
        assert_eq!(
            extract_sync_token("https://x.test/sync?sync_token=abc%3D&x=1").as_deref(),
            Some("abc=")
        );
        assert_eq!(extract_sync_token("not a url"), None);
        assert_eq!(extract_sync_token("https://x.test/sync?sync_token="), None);
    }

    #[test]
    fn badly_shaped_item_does_not_reject_the_page() {
        let page = parse(json!({
            "items": [
                {"sys": {"id": "a", "type": "Entry"}, "fields": {"productName": {"en-US": "Lamp"}}},
                {"sys": {"id": 42, "type": "Entry"}, "fields": {}},
                {"sys": null, "fields": null},
                {"sys": {"id": "c", "type": "Entry", "createdAt": 1700000000}, "fields": null},
                "not an object"
            ],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s/sync?sync_token=tok-1"
        }));
        assert_eq!(page.new_items.len(), 5);
        assert_eq!(page.new_items[0].id(), Some("a"));
        assert_eq!(page.new_items[1].id(), None);
        assert_eq!(page.new_items[2], Entry::default());
        assert_eq!(page.new_items[3].id(), Some("c"));
        assert!(page.new_items[3].sys.created_at.is_none());
        assert!(page.new_items[3].fields.is_empty());
        assert_eq!(page.next_cursor.as_deref(), Some("tok-1"));
    }

    #[test]
    fn null_collections_read_as_empty() {
        let page = parse(json!({
            "items": {"newEntries": null, "deletedEntries": [7, "", {"sys": {"id": "x"}}]},
            "nextSyncUrl": "tok-2"
        }));
        assert!(page.new_items.is_empty());
        assert_eq!(page.deleted_ids, vec!["x".to_string()]);

        let page = parse(json!({"items": null, "nextSyncUrl": "tok-3"}));
        assert!(page.is_empty());
        assert_eq!(page.next_cursor.as_deref(), Some("tok-3"));
    }

    #[test]
    fn blank_continuations_are_dropped() {
        let page = parse(json!({
            "items": [{"sys": {"id": "a", "type": "Entry"}, "fields": {}}],
            "nextPageUrl": "",
            "nextSyncUrl": "  "
        }));
        assert_eq!(page.new_items.len(), 1);
        assert!(page.next_page.is_none());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn page_of_only_other_item_types_is_empty_but_keeps_its_cursor() {
        let page = parse(json!({
            "items": [
                {"sys": {"id": "img-1", "type": "Asset"}},
                {"sys": {"id": "img-2", "type": "DeletedAsset"}}
            ],
            "nextSyncUrl": "https://cdn.contentful.com/spaces/s/sync?sync_token=tok-4"
        }));
        assert!(page.is_empty());
        assert_eq!(page.next_cursor.as_deref(), Some("tok-4"));
    }
}
