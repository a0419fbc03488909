//! Testing utilities for catalog stores
//!
//! [`RecordingStore`] wraps any [`CatalogStore`], records every request made
//! through it and can inject failures. Tests use it to check which uid lists
//! a scan asked for and how a prune reacts to a failed removal.
//!
//! # Example
//!
//! ```ignore
//! use txjournal_durability::{MemoryStore, testing::{RecordingStore, StoreRequest}};
//!
//! let mut store = RecordingStore::new(MemoryStore::new()).fail_removal_at(2);
//! // ... run a prune ...
//! assert_eq!(store.removal_attempts(), 2);
//! ```

use parking_lot::Mutex;
use txjournal_core::{CatalogStore, PackedBuffer, StoreError, StoreResult, Uid};

/// One request made through a [`RecordingStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// `list_types`
    ListTypes,
    /// `list_uids(type)`
    ListUids(String),
    /// `read_committed(uid, type)`
    Read(Uid, String),
    /// `write_committed(uid, type)`
    Write(Uid, String),
    /// `remove_committed(uid, type)`
    Remove(Uid, String),
}

/// Store wrapper that records requests and injects failures
pub struct RecordingStore<S> {
    inner: S,
    requests: Mutex<Vec<StoreRequest>>,
    fail_removal_at: Option<usize>,
    fail_uids_of: Option<String>,
    fail_list_types: bool,
}

impl<S: CatalogStore> RecordingStore<S> {
    /// Wrap a store
    pub fn new(inner: S) -> Self {
        RecordingStore {
            inner,
            requests: Mutex::new(Vec::new()),
            fail_removal_at: None,
            fail_uids_of: None,
            fail_list_types: false,
        }
    }

    /// Fail the k-th (1-indexed) removal attempt (builder pattern)
    pub fn fail_removal_at(mut self, attempt: usize) -> Self {
        self.fail_removal_at = Some(attempt);
        self
    }

    /// Fail `list_uids` for one type (builder pattern)
    pub fn fail_uids_of(mut self, type_name: &str) -> Self {
        self.fail_uids_of = Some(type_name.to_string());
        self
    }

    /// Fail `list_types` (builder pattern)
    pub fn fail_list_types(mut self) -> Self {
        self.fail_list_types = true;
        self
    }

    /// All requests in the order they were made
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.requests.lock().clone()
    }

    /// Types whose uid list was requested, in order
    pub fn uid_requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| match r {
                StoreRequest::ListUids(type_name) => Some(type_name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of removal attempts, failed ones included
    pub fn removal_attempts(&self) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| matches!(r, StoreRequest::Remove(..)))
            .count()
    }

    /// Forget recorded requests
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn record(&self, request: StoreRequest) {
        self.requests.lock().push(request);
    }
}

impl<S: CatalogStore> CatalogStore for RecordingStore<S> {
    fn list_types(&self) -> StoreResult<Option<PackedBuffer>> {
        self.record(StoreRequest::ListTypes);
        if self.fail_list_types {
            return Err(StoreError::corruption("injected directory failure"));
        }
        self.inner.list_types()
    }

    fn list_uids(&self, type_name: &str) -> StoreResult<Option<PackedBuffer>> {
        self.record(StoreRequest::ListUids(type_name.to_string()));
        if self.fail_uids_of.as_deref() == Some(type_name) {
            return Err(StoreError::corruption(format!(
                "injected uid list failure for '{}'",
                type_name
            )));
        }
        self.inner.list_uids(type_name)
    }

    fn read_committed(&self, uid: &Uid, type_name: &str) -> StoreResult<Option<Vec<u8>>> {
        self.record(StoreRequest::Read(*uid, type_name.to_string()));
        self.inner.read_committed(uid, type_name)
    }

    fn write_committed(&mut self, uid: &Uid, type_name: &str, state: &[u8]) -> StoreResult<()> {
        self.record(StoreRequest::Write(*uid, type_name.to_string()));
        self.inner.write_committed(uid, type_name, state)
    }

    fn remove_committed(&mut self, uid: &Uid, type_name: &str) -> StoreResult<()> {
        self.record(StoreRequest::Remove(*uid, type_name.to_string()));
        if self.fail_removal_at == Some(self.removal_attempts()) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected removal failure",
            )));
        }
        self.inner.remove_committed(uid, type_name)
    }
}
