mod postgresql;

pub use postgresql::{PostgresqlDocumentStore, PostgresqlSession};
