// Key-value persistence for the metronome settings

pub mod file;
pub mod memory;

pub use file::{APP_DIR_NAME, JsonFileStore};
pub use memory::MemoryStore;

/// Persistence error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data directory available on this system")]
    NoDataDir,

    #[error("Invalid store key: {0}")]
    InvalidKey(String),
}

/// String key-value store
///
/// Values are opaque strings; callers own their encoding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
