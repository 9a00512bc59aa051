use serde_json::Value;

use crate::{
    document_id, id_key, Action, ClassificationError, Document, OperationPlan, Payload,
    WriteOperation, STORAGE_ID_FIELD,
};

#[derive(Clone, Debug, PartialEq)]
pub struct MoveEntry {
    pub id: String,
    pub order: Value,
    pub column: Value,
}

/// The document shapes accepted by `update`. One endpoint serves both apps, so the shape
/// is recognised from which fields are present.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateShape {
    /// Ticket completion toggle, touches only `done`.
    HotUpdate { id: String, done: Value },
    FullTicketUpdate {
        id: String,
        name: Value,
        description: Value,
    },
    FullCardUpdate {
        id: String,
        name: Value,
        files: Value,
    },
    Move(Vec<MoveEntry>),
    Unrecognized,
}

impl UpdateShape {
    /// First match wins: `done` without `description`, then `description`, then `files`
    /// without `order`, then a `move` array. A field shape without an `id` matches nothing
    /// and is `Unrecognized`.
    pub fn classify(mut document: Document) -> UpdateShape {
        let has = |document: &Document, field: &str| document.contains_key(field);
        let id = document_id(&document);

        if has(&document, "done") && !has(&document, "description") {
            return match id {
                Some(id) => UpdateShape::HotUpdate {
                    id,
                    done: take(&mut document, "done"),
                },
                None => UpdateShape::Unrecognized,
            };
        }

        if has(&document, "description") {
            return match id {
                Some(id) => UpdateShape::FullTicketUpdate {
                    id,
                    name: take(&mut document, "name"),
                    description: take(&mut document, "description"),
                },
                None => UpdateShape::Unrecognized,
            };
        }

        if has(&document, "files") && !has(&document, "order") {
            return match id {
                Some(id) => UpdateShape::FullCardUpdate {
                    id,
                    name: take(&mut document, "name"),
                    files: take(&mut document, "files"),
                },
                None => UpdateShape::Unrecognized,
            };
        }

        if let Some(Value::Array(entries)) = document.remove("move") {
            return UpdateShape::Move(
                entries
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, entry)| move_entry(index, entry))
                    .collect(),
            );
        }

        UpdateShape::Unrecognized
    }

    pub fn into_plan(self) -> OperationPlan {
        match self {
            UpdateShape::HotUpdate { id, done } => OperationPlan::UpdateFields {
                id,
                fields: fields([("done", done)]),
            },
            UpdateShape::FullTicketUpdate {
                id,
                name,
                description,
            } => OperationPlan::UpdateFields {
                id,
                fields: fields([("name", name), ("description", description)]),
            },
            UpdateShape::FullCardUpdate { id, name, files } => OperationPlan::UpdateFields {
                id,
                fields: fields([("name", name), ("files", files)]),
            },
            UpdateShape::Move(entries) => OperationPlan::BulkUnordered(
                entries
                    .into_iter()
                    .map(|entry| WriteOperation::UpdateOne {
                        id: entry.id,
                        fields: fields([("order", entry.order), ("column", entry.column)]),
                    })
                    .collect(),
            ),
            UpdateShape::Unrecognized => OperationPlan::NoOp,
        }
    }
}

/// Decides which store operations a request stands for. Performs no I/O.
pub fn dispatch(action: &str, payload: Payload) -> Result<OperationPlan, ClassificationError> {
    let action: Action = action.parse()?;

    let document = match (action, payload) {
        (Action::Fetch, _) => return Ok(OperationPlan::Fetch),
        (Action::New, Payload::Bulk(documents)) => {
            return Ok(OperationPlan::InsertMany(documents))
        }
        (_, Payload::Bulk(_)) => return Err(ClassificationError::BulkNotSupported(action)),
        (_, Payload::Single(document)) => document,
    };

    match action {
        Action::Fetch => Ok(OperationPlan::Fetch),
        Action::New => Ok(OperationPlan::Insert(document)),
        Action::Update => Ok(UpdateShape::classify(document).into_plan()),
        Action::Delete => match document_id(&document) {
            Some(id) => Ok(OperationPlan::Delete { id }),
            None => Err(ClassificationError::MissingId(Action::Delete)),
        },
        Action::Batch => classify_batch(document),
    }
}

fn classify_batch(document: Document) -> Result<OperationPlan, ClassificationError> {
    let operations = match document.get("operations") {
        Some(Value::Object(operations)) => operations,
        Some(_) => return Err(ClassificationError::MalformedOperations),
        None => return Err(ClassificationError::MissingOperations),
    };

    let mut writes = Vec::new();

    for entry in batch_list(operations, "create")? {
        writes.push(WriteOperation::InsertOne(entry));
    }

    for (index, mut entry) in batch_list(operations, "update")?.into_iter().enumerate() {
        if !entry.contains_key("name") {
            return Err(ClassificationError::BatchUpdateMissingName(index));
        }

        let id = document_id(&entry).ok_or(ClassificationError::BatchEntryMissingId {
            list: "update",
            index,
        })?;

        entry.remove("id");
        entry.remove(STORAGE_ID_FIELD);

        writes.push(WriteOperation::UpdateOne { id, fields: entry });
    }

    for (index, entry) in batch_list(operations, "delete")?.into_iter().enumerate() {
        let id = entry
            .get("id")
            .and_then(id_key)
            .ok_or(ClassificationError::BatchEntryMissingId {
                list: "delete",
                index,
            })?;

        writes.push(WriteOperation::DeleteOne { id });
    }

    Ok(OperationPlan::Batch {
        operations: writes,
        snapshot: document,
    })
}

fn batch_list(
    operations: &Document,
    list: &'static str,
) -> Result<Vec<Document>, ClassificationError> {
    match operations.get(list) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(entry) => Ok(entry.clone()),
                _ => Err(ClassificationError::MalformedBatchEntry { list, index }),
            })
            .collect(),
        Some(_) => Err(ClassificationError::MalformedBatchList(list)),
    }
}

// Entries are independent: one without an `id` is skipped and its siblings still move.
fn move_entry(index: usize, entry: Value) -> Option<MoveEntry> {
    let mut entry = match entry {
        Value::Object(entry) => entry,
        _ => {
            tracing::warn!("move entry {} is not an object, skipped", index);
            return None;
        }
    };

    match document_id(&entry) {
        Some(id) => Some(MoveEntry {
            id,
            order: take(&mut entry, "order"),
            column: take(&mut entry, "column"),
        }),
        None => {
            tracing::warn!("move entry {} has no `id`, skipped", index);
            None
        }
    }
}

// Named fields missing from the request are written as null, matching a `$set` of an
// undefined value.
fn take(document: &mut Document, field: &str) -> Value {
    document.remove(field).unwrap_or(Value::Null)
}

fn fields<const N: usize>(entries: [(&str, Value); N]) -> Document {
    entries
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}
