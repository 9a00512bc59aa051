use async_trait::async_trait;
use itemgate_core::{document_id, Document, DocumentStore, StoreSession, STORAGE_ID_FIELD};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};
use uuid::Uuid;

type Databases = HashMap<String, HashMap<String, Vec<Document>>>;

#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentStore {
    databases: Arc<Mutex<Databases>>,

    connections_opened: Arc<AtomicUsize>,
    open_sessions: Arc<AtomicUsize>,
}

impl MemoryDocumentStore {
    /// Sessions handed out and not closed yet.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn connections_opened(&self) -> usize {
        self.connections_opened.load(Ordering::SeqCst)
    }

    /// Stored documents as persisted, storage identifier included.
    pub fn documents(&self, database: &str, collection: &str) -> anyhow::Result<Vec<Document>> {
        let databases = get_databases_locked(&self.databases)?;

        Ok(databases
            .get(database)
            .and_then(|collections| collections.get(collection))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    #[tracing::instrument(name = "memory::connect", skip(self))]
    async fn connect(&self, database: &str) -> anyhow::Result<Box<dyn StoreSession>> {
        self.connections_opened.fetch_add(1, Ordering::SeqCst);
        self.open_sessions.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemorySession {
            database: database.to_string(),
            databases: Arc::clone(&self.databases),
            open_sessions: Arc::clone(&self.open_sessions),
            closed: false,
        }))
    }
}

#[derive(Debug)]
pub struct MemorySession {
    database: String,
    databases: Arc<Mutex<Databases>>,
    open_sessions: Arc<AtomicUsize>,
    closed: bool,
}

impl MemorySession {
    fn ensure_open(&self) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!(
                "session for database {} is closed",
                self.database
            ));
        }

        Ok(())
    }

    fn with_collection<T>(
        &self,
        collection: &str,
        apply: impl FnOnce(&mut Vec<Document>) -> T,
    ) -> anyhow::Result<T> {
        self.ensure_open()?;

        let mut databases = get_databases_locked(&self.databases)?;
        let documents = databases
            .entry(self.database.clone())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        Ok(apply(documents))
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn insert_one(
        &mut self,
        collection: &str,
        document: &mut Document,
    ) -> anyhow::Result<String> {
        let storage_id = Uuid::new_v4().to_string();
        document.insert(
            STORAGE_ID_FIELD.to_string(),
            Value::String(storage_id.clone()),
        );

        let stored = document.clone();
        self.with_collection(collection, |documents| documents.push(stored))?;

        Ok(storage_id)
    }

    async fn update_one(
        &mut self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> anyhow::Result<u64> {
        self.with_collection(collection, |documents| {
            match documents
                .iter_mut()
                .find(|document| document_id(document).as_deref() == Some(id))
            {
                Some(document) => {
                    for (field, value) in fields {
                        document.insert(field.clone(), value.clone());
                    }
                    1
                }
                None => 0,
            }
        })
    }

    async fn delete_one(&mut self, collection: &str, id: &str) -> anyhow::Result<u64> {
        self.with_collection(collection, |documents| {
            match documents
                .iter()
                .position(|document| document_id(document).as_deref() == Some(id))
            {
                Some(position) => {
                    documents.remove(position);
                    1
                }
                None => 0,
            }
        })
    }

    async fn find_all(&mut self, collection: &str) -> anyhow::Result<Vec<Document>> {
        self.with_collection(collection, |documents| documents.clone())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if !self.closed {
            self.closed = true;
            self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }

        Ok(())
    }
}

fn get_databases_locked(databases: &Mutex<Databases>) -> anyhow::Result<MutexGuard<'_, Databases>> {
    match databases.lock() {
        Ok(locked_databases) => Ok(locked_databases),
        Err(_) => Err(anyhow::anyhow!("failed to acquire lock")),
    }
}

#[cfg(test)]
mod tests {
    use itemgate_core::test::{document, get_ticket_document_fixture};
    use itemgate_core::ITEMS_COLLECTION;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_insert_update_delete() {
        let store = MemoryDocumentStore::default();
        let mut session = store.connect("help-desk").await.unwrap();

        let mut ticket = get_ticket_document_fixture(None);
        let storage_id = session
            .insert_one(ITEMS_COLLECTION, &mut ticket)
            .await
            .unwrap();

        assert_eq!(ticket[STORAGE_ID_FIELD], json!(storage_id));

        let matched = session
            .update_one(
                ITEMS_COLLECTION,
                "ticket-fixture",
                &document(json!({ "done": true })),
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let fetched = session.find_all(ITEMS_COLLECTION).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0]["done"], json!(true));
        assert_eq!(fetched[0]["name"], ticket["name"]);

        let deleted = session
            .delete_one(ITEMS_COLLECTION, "ticket-fixture")
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let deleted = session
            .delete_one(ITEMS_COLLECTION, "ticket-fixture")
            .await
            .unwrap();
        assert_eq!(deleted, 0);

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_without_match_does_not_create() {
        let store = MemoryDocumentStore::default();
        let mut session = store.connect("help-desk").await.unwrap();

        let matched = session
            .update_one(ITEMS_COLLECTION, "missing", &document(json!({ "done": true })))
            .await
            .unwrap();

        assert_eq!(matched, 0);
        assert!(session.find_all(ITEMS_COLLECTION).await.unwrap().is_empty());

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_numeric_and_string_ids_match() {
        let store = MemoryDocumentStore::default();
        let mut session = store.connect("like-a-trello").await.unwrap();

        let mut card = document(json!({ "id": 7, "order": 0 }));
        session.insert_one(ITEMS_COLLECTION, &mut card).await.unwrap();

        let matched = session
            .update_one(ITEMS_COLLECTION, "7", &document(json!({ "order": 4 })))
            .await
            .unwrap();

        assert_eq!(matched, 1);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let store = MemoryDocumentStore::default();

        let mut help_desk = store.connect("help-desk").await.unwrap();
        let mut ticket = get_ticket_document_fixture(None);
        help_desk
            .insert_one(ITEMS_COLLECTION, &mut ticket)
            .await
            .unwrap();
        help_desk.close().await.unwrap();

        let mut board = store.connect("like-a-trello").await.unwrap();
        assert!(board.find_all(ITEMS_COLLECTION).await.unwrap().is_empty());
        board.close().await.unwrap();

        assert_eq!(store.documents("help-desk", ITEMS_COLLECTION).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_session_accounting() {
        let store = MemoryDocumentStore::default();

        let mut session = store.connect("help-desk").await.unwrap();
        assert_eq!(store.open_sessions(), 1);

        session.close().await.unwrap();
        session.close().await.unwrap();

        assert_eq!(store.open_sessions(), 0);
        assert_eq!(store.connections_opened(), 1);
        assert!(session.find_all(ITEMS_COLLECTION).await.is_err());
    }
}
