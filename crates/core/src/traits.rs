//! Catalog store abstraction
//!
//! This module defines the [`CatalogStore`] trait that the scanner, pruner
//! and recovered views consume. Storage engines implement it; upper layers
//! never see their on-disk format.

use crate::error::StoreResult;
use crate::packed::PackedBuffer;
use crate::uid::Uid;

/// Store contract consumed by catalog scans and prunes
///
/// Directory and uid lists are handed out as self-describing packed buffers:
/// - the type directory is a run of strings terminated by `""`
/// - a uid list is a run of uids terminated by [`Uid::NULL`]
///
/// Scans borrow the store shared, prunes borrow it exclusively. No method is
/// expected to be called concurrently.
pub trait CatalogStore {
    /// Packed type directory, or `None` when the store has no directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be produced.
    fn list_types(&self) -> StoreResult<Option<PackedBuffer>>;

    /// Packed uid list of one type, or `None` when the type has no entries
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be produced.
    fn list_uids(&self, type_name: &str) -> StoreResult<Option<PackedBuffer>>;

    /// Stored state of one committed entry, or `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be read.
    fn read_committed(&self, uid: &Uid, type_name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write (or replace) the state of a committed entry
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty type name or the null uid, or an
    /// error if the write fails.
    fn write_committed(&mut self, uid: &Uid, type_name: &str, state: &[u8]) -> StoreResult<()>;

    /// Remove one committed entry
    ///
    /// Only valid for entries that have reached a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no such entry exists, or an error if the
    /// removal fails.
    fn remove_committed(&mut self, uid: &Uid, type_name: &str) -> StoreResult<()>;
}

impl<S: CatalogStore + ?Sized> CatalogStore for &mut S {
    fn list_types(&self) -> StoreResult<Option<PackedBuffer>> {
        (**self).list_types()
    }

    fn list_uids(&self, type_name: &str) -> StoreResult<Option<PackedBuffer>> {
        (**self).list_uids(type_name)
    }

    fn read_committed(&self, uid: &Uid, type_name: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).read_committed(uid, type_name)
    }

    fn write_committed(&mut self, uid: &Uid, type_name: &str, state: &[u8]) -> StoreResult<()> {
        (**self).write_committed(uid, type_name, state)
    }

    fn remove_committed(&mut self, uid: &Uid, type_name: &str) -> StoreResult<()> {
        (**self).remove_committed(uid, type_name)
    }
}

impl<S: CatalogStore + ?Sized> CatalogStore for Box<S> {
    fn list_types(&self) -> StoreResult<Option<PackedBuffer>> {
        (**self).list_types()
    }

    fn list_uids(&self, type_name: &str) -> StoreResult<Option<PackedBuffer>> {
        (**self).list_uids(type_name)
    }

    fn read_committed(&self, uid: &Uid, type_name: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).read_committed(uid, type_name)
    }

    fn write_committed(&mut self, uid: &Uid, type_name: &str, state: &[u8]) -> StoreResult<()> {
        (**self).write_committed(uid, type_name, state)
    }

    fn remove_committed(&mut self, uid: &Uid, type_name: &str) -> StoreResult<()> {
        (**self).remove_committed(uid, type_name)
    }
}
