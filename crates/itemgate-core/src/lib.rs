mod dispatcher;
mod document;
mod error;
mod normalizer;
mod plan;
mod store;

pub mod models;

pub use dispatcher::{dispatch, MoveEntry, UpdateShape};
pub use document::{
    document_id, id_key, strip_storage_id, Document, ITEMS_COLLECTION, STORAGE_ID_FIELD,
};
pub use error::{ClassificationError, NormalizeError};
pub use models::{Action, App};
pub use normalizer::{normalize, Payload, RawBody, BULK_MARKER};
pub use plan::{OperationPlan, WriteOperation};
pub use store::{write_unordered, BulkWriteFailure, BulkWriteOutcome, DocumentStore, StoreSession};
