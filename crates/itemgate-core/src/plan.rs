use crate::Document;

/// One entry of an unordered multi-operation write.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOperation {
    InsertOne(Document),
    UpdateOne { id: String, fields: Document },
    DeleteOne { id: String },
}

/// What the store has to do for one request. Entries of `BulkUnordered` and `Batch` carry
/// no ordering or atomicity guarantee between each other.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationPlan {
    Insert(Document),
    InsertMany(Vec<Document>),
    UpdateFields { id: String, fields: Document },
    BulkUnordered(Vec<WriteOperation>),
    Delete { id: String },
    Fetch,
    Batch {
        operations: Vec<WriteOperation>,
        snapshot: Document,
    },
    /// An update whose document matched no known shape. Still reported as updated.
    NoOp,
}
