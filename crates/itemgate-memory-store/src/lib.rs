mod memory;

pub use memory::{MemoryDocumentStore, MemorySession};
