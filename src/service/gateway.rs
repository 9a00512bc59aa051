use anyhow::Context;
use itemgate_core::{
    strip_storage_id, App, BulkWriteOutcome, Document, DocumentStore, OperationPlan, StoreSession,
    ITEMS_COLLECTION,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Added,
    Updated,
    Removed,
    Fetched(Vec<Document>),
    BatchApplied(Document),
}

/// Runs a plan against the `items` collection of the app's database. The connection is
/// opened here and closed before returning, whether the plan succeeded or not.
#[tracing::instrument(name = "gateway::execute", skip(store, plan))]
pub async fn execute(
    store: &dyn DocumentStore,
    app: App,
    plan: OperationPlan,
) -> anyhow::Result<Outcome> {
    let mut session = store
        .connect(app.database_name())
        .await
        .with_context(|| format!("failed to open {} database", app))?;

    let result = run(session.as_mut(), plan).await;

    if let Err(err) = session.close().await {
        tracing::warn!("closing {} connection failed: {:#}", app, err);
    }

    result
}

async fn run(session: &mut dyn StoreSession, plan: OperationPlan) -> anyhow::Result<Outcome> {
    match plan {
        OperationPlan::Insert(mut document) => {
            session.insert_one(ITEMS_COLLECTION, &mut document).await?;
            Ok(Outcome::Added)
        }
        OperationPlan::InsertMany(mut documents) => {
            session.insert_many(ITEMS_COLLECTION, &mut documents).await?;
            Ok(Outcome::Added)
        }
        OperationPlan::UpdateFields { id, fields } => {
            let matched = session.update_one(ITEMS_COLLECTION, &id, &fields).await?;
            tracing::debug!("update of {} matched {} documents", id, matched);
            Ok(Outcome::Updated)
        }
        OperationPlan::BulkUnordered(operations) => {
            let outcome = session.bulk_write(ITEMS_COLLECTION, operations).await?;
            log_failures(&outcome);
            Ok(Outcome::Updated)
        }
        OperationPlan::Delete { id } => {
            let deleted = session.delete_one(ITEMS_COLLECTION, &id).await?;
            tracing::debug!("delete of {} removed {} documents", id, deleted);
            Ok(Outcome::Removed)
        }
        OperationPlan::Fetch => {
            let documents = session.find_all(ITEMS_COLLECTION).await?;
            Ok(Outcome::Fetched(
                documents.into_iter().map(strip_storage_id).collect(),
            ))
        }
        OperationPlan::Batch {
            operations,
            snapshot,
        } => {
            if !operations.is_empty() {
                let outcome = session.bulk_write(ITEMS_COLLECTION, operations).await?;
                log_failures(&outcome);
            }
            Ok(Outcome::BatchApplied(snapshot))
        }
        OperationPlan::NoOp => {
            tracing::info!("update had no `id` or no known document shape, nothing written");
            Ok(Outcome::Updated)
        }
    }
}

fn log_failures(outcome: &BulkWriteOutcome) {
    for failure in &outcome.failures {
        tracing::warn!(
            "unordered write {} failed: {}",
            failure.index,
            failure.message
        );
    }
}
