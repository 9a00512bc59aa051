use async_trait::async_trait;

use crate::{Document, WriteOperation};

/// Hands out one connection per request. Implementations keep no connection between calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn connect(&self, database: &str) -> anyhow::Result<Box<dyn StoreSession>>;
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BulkWriteOutcome {
    pub applied: usize,
    pub failures: Vec<BulkWriteFailure>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BulkWriteFailure {
    pub index: usize,
    pub message: String,
}

/// A connection to one logical database. Callers must `close` it on every path.
#[async_trait]
pub trait StoreSession: Send {
    /// Attaches the storage identifier to `document` and returns it.
    async fn insert_one(&mut self, collection: &str, document: &mut Document)
        -> anyhow::Result<String>;

    /// Sets `fields` on the first document whose `id` matches. Returns the match count.
    async fn update_one(
        &mut self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> anyhow::Result<u64>;

    async fn delete_one(&mut self, collection: &str, id: &str) -> anyhow::Result<u64>;

    async fn find_all(&mut self, collection: &str) -> anyhow::Result<Vec<Document>>;

    async fn close(&mut self) -> anyhow::Result<()>;

    /// Ordered: stops at the first failing insert.
    async fn insert_many(
        &mut self,
        collection: &str,
        documents: &mut [Document],
    ) -> anyhow::Result<Vec<String>> {
        let mut storage_ids = Vec::with_capacity(documents.len());
        for document in documents.iter_mut() {
            storage_ids.push(self.insert_one(collection, document).await?);
        }

        Ok(storage_ids)
    }

    async fn bulk_write(
        &mut self,
        collection: &str,
        operations: Vec<WriteOperation>,
    ) -> anyhow::Result<BulkWriteOutcome> {
        Ok(write_unordered(self, collection, operations).await)
    }
}

/// Applies every operation independently. A failure is recorded and the remaining
/// operations still run; nothing is rolled back.
pub async fn write_unordered<S>(
    session: &mut S,
    collection: &str,
    operations: Vec<WriteOperation>,
) -> BulkWriteOutcome
where
    S: StoreSession + ?Sized,
{
    let mut outcome = BulkWriteOutcome::default();

    for (index, operation) in operations.into_iter().enumerate() {
        let result = match operation {
            WriteOperation::InsertOne(mut document) => session
                .insert_one(collection, &mut document)
                .await
                .map(|_| ()),
            WriteOperation::UpdateOne { id, fields } => session
                .update_one(collection, &id, &fields)
                .await
                .map(|_| ()),
            WriteOperation::DeleteOne { id } => {
                session.delete_one(collection, &id).await.map(|_| ())
            }
        };

        match result {
            Ok(()) => outcome.applied += 1,
            Err(err) => outcome.failures.push(BulkWriteFailure {
                index,
                message: format!("{:#}", err),
            }),
        }
    }

    tracing::debug!(
        "unordered write on {}: {} applied, {} failed",
        collection,
        outcome.applied,
        outcome.failures.len()
    );

    outcome
}
