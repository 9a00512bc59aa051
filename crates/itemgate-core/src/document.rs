use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

pub const ITEMS_COLLECTION: &str = "items";

/// Field the store attaches to every inserted document. Never handed back to clients.
pub const STORAGE_ID_FIELD: &str = "_id";

/// Text form of an item id. Update and delete filters compare ids by this text, so a
/// numeric `7` and a string `"7"` address the same item.
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

pub fn document_id(document: &Document) -> Option<String> {
    document.get("id").and_then(id_key)
}

pub fn strip_storage_id(mut document: Document) -> Document {
    document.remove(STORAGE_ID_FIELD);
    document
}
