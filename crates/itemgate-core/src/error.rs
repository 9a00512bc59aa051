use crate::models::Action;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("request body must be a JSON object or an array of objects, got {0}")]
    NotADocument(&'static str),

    #[error("bulk entry {0} is not a JSON object")]
    BulkEntryNotObject(usize),
}

/// Reasons a request cannot be turned into an operation plan. Nothing has touched the
/// store when one of these is returned.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("no action requested: unknown app `{0}`")]
    UnknownApp(String),

    #[error("no action requested: unknown action `{0}`")]
    UnknownAction(String),

    #[error("no action requested: {0} needs an `id`")]
    MissingId(Action),

    #[error("no action requested: {0} does not accept bulk payloads")]
    BulkNotSupported(Action),

    #[error("batch request is missing `operations`")]
    MissingOperations,

    #[error("batch `operations` must be an object")]
    MalformedOperations,

    #[error("batch `{0}` must be an array")]
    MalformedBatchList(&'static str),

    #[error("batch {list} entry {index} is not an object")]
    MalformedBatchEntry { list: &'static str, index: usize },

    #[error("batch {list} entry {index} is missing `id`")]
    BatchEntryMissingId { list: &'static str, index: usize },

    #[error("batch update entry {0} is missing `name`")]
    BatchUpdateMissingName(usize),
}
