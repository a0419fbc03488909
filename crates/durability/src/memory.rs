//! In-memory catalog store
//!
//! [`MemoryStore`] keeps the catalog in an ordered in-memory index. Unlike
//! the journal store it keeps types that have no entries, so a directory can
//! list a type whose uid list is empty.

use crate::index::CatalogIndex;
use txjournal_core::{CatalogStore, PackedBuffer, StoreError, StoreResult, Uid};

/// Ordered in-memory [`CatalogStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    index: CatalogIndex,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type that has no entries yet (builder pattern)
    pub fn with_type(mut self, type_name: &str) -> Self {
        self.index.register_type(type_name);
        self
    }

    /// Add an entry with empty state (builder pattern)
    pub fn with_entry(mut self, type_name: &str, uid: Uid) -> Self {
        self.index.upsert(type_name, uid, Vec::new());
        self
    }

    /// Add an entry with the given state (builder pattern)
    pub fn with_state(mut self, type_name: &str, uid: Uid, state: Vec<u8>) -> Self {
        self.index.upsert(type_name, uid, state);
        self
    }

    /// Number of entries across all types
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.index.len() == 0
    }

    /// Whether an entry exists
    pub fn contains(&self, uid: &Uid, type_name: &str) -> bool {
        self.index.contains(type_name, uid)
    }
}

impl CatalogStore for MemoryStore {
    fn list_types(&self) -> StoreResult<Option<PackedBuffer>> {
        if self.index.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.index.type_directory()))
    }

    fn list_uids(&self, type_name: &str) -> StoreResult<Option<PackedBuffer>> {
        Ok(self.index.uid_list(type_name))
    }

    fn read_committed(&self, uid: &Uid, type_name: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.index.get(type_name, uid).map(<[u8]>::to_vec))
    }

    fn write_committed(&mut self, uid: &Uid, type_name: &str, state: &[u8]) -> StoreResult<()> {
        validate_key(uid, type_name)?;
        self.index.upsert(type_name, *uid, state.to_vec());
        Ok(())
    }

    fn remove_committed(&mut self, uid: &Uid, type_name: &str) -> StoreResult<()> {
        self.index
            .remove(type_name, uid, false)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                uid: *uid,
                type_name: type_name.to_string(),
            })
    }
}

/// Reject keys no entry can have
pub(crate) fn validate_key(uid: &Uid, type_name: &str) -> StoreResult<()> {
    if type_name.is_empty() {
        return Err(StoreError::invalid_input("type name must not be empty"));
    }
    if uid.is_null() {
        return Err(StoreError::invalid_input(format!(
            "the null uid cannot be stored under '{}'",
            type_name
        )));
    }
    Ok(())
}
