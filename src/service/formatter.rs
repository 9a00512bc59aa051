use itemgate_core::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::Outcome;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Status {
    Added,
    Updated,
    Removed,
    Fetched,
    #[serde(rename = "Batch applied")]
    BatchApplied,
    Error,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub data: Value,
}

impl Envelope {
    /// The message is passed through unsanitised.
    pub fn error(err: &anyhow::Error) -> Self {
        Envelope {
            status: Status::Error,
            data: Value::String(format!("{:#}", err)),
        }
    }
}

impl From<Outcome> for Envelope {
    fn from(outcome: Outcome) -> Self {
        let (status, data) = match outcome {
            Outcome::Added => (Status::Added, Value::Null),
            Outcome::Updated => (Status::Updated, Value::Null),
            Outcome::Removed => (Status::Removed, Value::Null),
            Outcome::Fetched(documents) => (
                Status::Fetched,
                Value::Array(
                    documents
                        .into_iter()
                        .map(coerce_legacy_done)
                        .map(Value::Object)
                        .collect(),
                ),
            ),
            Outcome::BatchApplied(snapshot) => (Status::BatchApplied, Value::Object(snapshot)),
        };

        Envelope { status, data }
    }
}

/// Tickets saved from form posts hold `done` as a string. Read-side only: `"true"` becomes
/// `true`, any other string `false`. The stored value is left as it is.
pub fn coerce_legacy_done(mut document: Document) -> Document {
    let coerced = match document.get("done") {
        Some(Value::String(done)) => Some(done == "true"),
        _ => None,
    };

    if let Some(done) = coerced {
        document.insert("done".to_string(), Value::Bool(done));
    }

    document
}

#[cfg(test)]
mod tests {
    use itemgate_core::test::document;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_coerce_legacy_done() {
        let coerced =
            |done: Value| coerce_legacy_done(document(json!({ "done": done })))["done"].clone();

        assert_eq!(coerced(json!(true)), json!(true));
        assert_eq!(coerced(json!(false)), json!(false));
        assert_eq!(coerced(json!("true")), json!(true));
        assert_eq!(coerced(json!("false")), json!(false));
        assert_eq!(coerced(json!("TRUE")), json!(false));
        assert_eq!(coerced(json!("")), json!(false));
        assert_eq!(coerced(json!(1)), json!(1));
    }

    #[test]
    fn test_documents_without_done_are_untouched() {
        let card = document(json!({ "id": "c-1", "column": "done" }));

        assert_eq!(coerce_legacy_done(card.clone()), card);
    }

    #[test]
    fn test_envelope_wire_format() {
        let envelope = Envelope::from(Outcome::Fetched(vec![document(
            json!({ "id": "t-1", "done": "true" }),
        )]));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": "Fetched", "data": [{ "id": "t-1", "done": true }] })
        );

        let envelope =
            Envelope::from(Outcome::BatchApplied(document(json!({ "operations": {} }))));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": "Batch applied", "data": { "operations": {} } })
        );

        let envelope = Envelope::from(Outcome::Removed);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": "Removed", "data": null })
        );
    }

    #[test]
    fn test_error_envelope_keeps_context() {
        let err =
            anyhow::anyhow!("connection refused").context("failed to open help-desk database");

        let envelope = Envelope::error(&err);

        assert_eq!(envelope.status, Status::Error);
        assert_eq!(
            envelope.data,
            json!("failed to open help-desk database: connection refused")
        );
    }
}
