use serde_json::Value;

use crate::{Document, NormalizeError};

/// Field whose presence turns parallel per-field arrays into one document per position.
pub const BULK_MARKER: &str = "isBulk";

#[derive(Clone, Debug, PartialEq)]
pub enum RawBody {
    Empty,
    /// URL-encoded pairs in arrival order. Repeated keys carry multi-select values.
    Form(Vec<(String, String)>),
    Json(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Single(Document),
    Bulk(Vec<Document>),
}

pub fn normalize(body: RawBody) -> Result<Payload, NormalizeError> {
    match body {
        RawBody::Empty => Ok(Payload::Single(Document::new())),
        RawBody::Form(pairs) => Ok(normalize_form(pairs)),
        RawBody::Json(Value::Object(document)) => Ok(normalize_object(document)),
        RawBody::Json(Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(document) => Ok(document),
                _ => Err(NormalizeError::BulkEntryNotObject(index)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Payload::Bulk),
        RawBody::Json(other) => Err(NormalizeError::NotADocument(json_type_name(&other))),
    }
}

fn normalize_form(pairs: Vec<(String, String)>) -> Payload {
    let mut fields: Vec<(String, Vec<Value>)> = Vec::new();

    for (key, value) in pairs {
        let value = Value::String(value);
        match fields.iter_mut().find(|(field, _)| *field == key) {
            Some((_, values)) => values.push(value),
            None => fields.push((key, vec![value])),
        }
    }

    if fields.iter().any(|(field, _)| field == BULK_MARKER) {
        return Payload::Bulk(zip_fields(fields));
    }

    let document = fields
        .into_iter()
        .filter_map(|(field, values)| values.into_iter().next().map(|value| (field, value)))
        .collect();

    Payload::Single(document)
}

fn normalize_object(document: Document) -> Payload {
    if !document.contains_key(BULK_MARKER) {
        return Payload::Single(document);
    }

    let fields = document
        .into_iter()
        .map(|(field, value)| match value {
            Value::Array(values) => (field, values),
            value => (field, vec![value]),
        })
        .collect();

    Payload::Bulk(zip_fields(fields))
}

// fields[k][i] -> documents[i][k]. Arrays are never reordered; a short array leaves its
// field out of the trailing documents.
fn zip_fields(fields: Vec<(String, Vec<Value>)>) -> Vec<Document> {
    let count = fields
        .iter()
        .filter(|(field, _)| field != BULK_MARKER)
        .map(|(_, values)| values.len())
        .max()
        .unwrap_or(0);

    let mut documents = vec![Document::new(); count];

    for (field, values) in fields {
        if field == BULK_MARKER {
            continue;
        }

        for (document, value) in documents.iter_mut().zip(values) {
            document.insert(field.clone(), value);
        }
    }

    documents
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
