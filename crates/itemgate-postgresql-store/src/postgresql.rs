use anyhow::Context;
use async_trait::async_trait;
use itemgate_core::{Document, DocumentStore, StoreSession, STORAGE_ID_FIELD};
use serde_json::Value;
use sqlx::{migrate::Migrator, types::Json, Connection, PgConnection};
use uuid::Uuid;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Documents are JSONB rows keyed by logical database and collection. Every session
/// opens its own connection; nothing is pooled.
pub struct PostgresqlDocumentStore {
    database_url: String,
}

impl PostgresqlDocumentStore {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    #[tracing::instrument(name = "postgresql::migrate", skip_all)]
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let mut connection = PgConnection::connect(&self.database_url).await?;

        MIGRATOR.run(&mut connection).await?;

        connection.close().await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresqlDocumentStore {
    #[tracing::instrument(name = "postgresql::connect", skip(self))]
    async fn connect(&self, database: &str) -> anyhow::Result<Box<dyn StoreSession>> {
        let connection = PgConnection::connect(&self.database_url)
            .await
            .context("failed to connect to DATABASE_URL")?;

        Ok(Box::new(PostgresqlSession {
            database: database.to_string(),
            connection: Some(connection),
        }))
    }
}

pub struct PostgresqlSession {
    database: String,
    connection: Option<PgConnection>,
}

fn open(connection: &mut Option<PgConnection>) -> anyhow::Result<&mut PgConnection> {
    connection
        .as_mut()
        .ok_or_else(|| anyhow::anyhow!("connection already closed"))
}

#[async_trait]
impl StoreSession for PostgresqlSession {
    #[tracing::instrument(name = "postgresql::insert_one", skip_all)]
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

        let connection = open(&mut self.connection)?;
        sqlx::query(
            r#"
            INSERT INTO documents
               (storage_id, database_name, collection_name, body)
            VALUES
               ($1, $2, $3, $4)
            "#,
        )
        .bind(&storage_id)
        .bind(&self.database)
        .bind(collection)
        .bind(Json(&*document))
        .execute(&mut *connection)
        .await?;

        Ok(storage_id)
    }

    #[tracing::instrument(name = "postgresql::update_one", skip(self, fields))]
    async fn update_one(
        &mut self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> anyhow::Result<u64> {
        let connection = open(&mut self.connection)?;
        let result = sqlx::query(
            r#"
            UPDATE documents SET body = body || $4
            WHERE storage_id = (
                SELECT storage_id FROM documents
                WHERE database_name = $1 AND collection_name = $2 AND body->>'id' = $3
                ORDER BY seq
                LIMIT 1
            )
            "#,
        )
        .bind(&self.database)
        .bind(collection)
        .bind(id)
        .bind(Json(fields))
        .execute(&mut *connection)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "postgresql::delete_one", skip(self))]
    async fn delete_one(&mut self, collection: &str, id: &str) -> anyhow::Result<u64> {
        let connection = open(&mut self.connection)?;
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE storage_id = (
                SELECT storage_id FROM documents
                WHERE database_name = $1 AND collection_name = $2 AND body->>'id' = $3
                ORDER BY seq
                LIMIT 1
            )
            "#,
        )
        .bind(&self.database)
        .bind(collection)
        .bind(id)
        .execute(&mut *connection)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "postgresql::find_all", skip(self))]
    async fn find_all(&mut self, collection: &str) -> anyhow::Result<Vec<Document>> {
        let connection = open(&mut self.connection)?;
        let rows = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body FROM documents
            WHERE database_name = $1 AND collection_name = $2
            ORDER BY seq
            "#,
        )
        .bind(&self.database)
        .bind(collection)
        .fetch_all(&mut *connection)
        .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close().await?;
        }

        Ok(())
    }
}
