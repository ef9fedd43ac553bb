pub mod file_store;
pub mod memory_store;
pub mod persistence;

use crate::error::AppError;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
pub use persistence::{PersistedState, Persistence};

/// Opaque durable text store addressed by fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}
