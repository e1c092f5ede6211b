//! Core services for brandflow.
//!
//! Configuration loading and stage result storage.

mod config;
mod store;

pub use config::{Config, GenerationConfig, OllamaConfig, StorageConfig, LOCAL_CONFIG_FILE};
pub use store::{result_key, FileStore, MemoryStore, ResultStore, StoredResult};
