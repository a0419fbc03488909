//! Catalog scanner
//!
//! Walks the store's type directory and, for every type the selector admits,
//! that type's uid list. Each uid becomes a [`ScannedEntry`] handed to the
//! visitor, in directory order and then uid-list order.
//!
//! The scanner only reads. A failure aborts the scan; entries already handed
//! to the visitor stay handed out.

use crate::cursor::{DirectoryCursor, UidCursor};
use crate::recovered::RecoveredTransaction;
use tracing::{debug, trace};
use txjournal_core::{
    CatalogEntry, CatalogError, CatalogResult, CatalogStore, StoreError, TypeName, TypeSelector,
};

/// One entry found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    /// The `(type, uid)` pair
    pub entry: CatalogEntry,
    /// Recovered view, present when the type is a recoverable transaction type
    pub view: Option<RecoveredTransaction>,
}

impl ScannedEntry {
    /// Drop the view and keep the entry
    pub fn into_entry(self) -> CatalogEntry {
        self.entry
    }
}

/// Scan the store, calling `visit` once per entry.
///
/// Returns the number of entries visited. A store without a type directory
/// yields nothing. Uid lists of types the selector rejects are never requested.
///
/// # Errors
///
/// - `DirectoryRead` if the directory cannot be read or is malformed
/// - `IdentifierRead` if a selected type's uid list cannot be read or is malformed
pub fn scan<S, F>(store: &S, selector: &TypeSelector, mut visit: F) -> CatalogResult<usize>
where
    S: CatalogStore + ?Sized,
    F: FnMut(ScannedEntry),
{
    let directory = store
        .list_types()
        .map_err(|source| CatalogError::DirectoryRead { source })?;
    let Some(directory) = directory else {
        debug!(target: "txjournal::scan", "Store has no type directory");
        return Ok(0);
    };

    let mut types = DirectoryCursor::new(directory);
    let mut visited = 0usize;

    while let Some(name) = types
        .next_type()
        .map_err(|e| CatalogError::DirectoryRead {
            source: StoreError::Packed(e),
        })?
    {
        if !selector.matches(&name) {
            trace!(target: "txjournal::scan", type_name = %name, "Type not selected");
            continue;
        }
        let type_name = TypeName::new(name)?;
        visited += scan_type(store, &type_name, &mut visit)?;
    }

    debug!(
        target: "txjournal::scan",
        selector = %selector,
        visited,
        "Scan complete"
    );
    Ok(visited)
}

fn scan_type<S, F>(store: &S, type_name: &TypeName, visit: &mut F) -> CatalogResult<usize>
where
    S: CatalogStore + ?Sized,
    F: FnMut(ScannedEntry),
{
    let identifier_error = |source: StoreError| CatalogError::IdentifierRead {
        type_name: type_name.to_string(),
        source,
    };

    let Some(list) = store
        .list_uids(type_name.as_str())
        .map_err(identifier_error)?
    else {
        trace!(target: "txjournal::scan", type_name = %type_name, "Type has no uid list");
        return Ok(0);
    };

    let recoverable = type_name.kind().is_recoverable();
    let mut uids = UidCursor::new(list);
    let mut visited = 0usize;

    while let Some(uid) = uids
        .next_uid()
        .map_err(|e| identifier_error(StoreError::Packed(e)))?
    {
        let view = recoverable.then(|| RecoveredTransaction::new(uid, type_name.clone()));
        visit(ScannedEntry {
            entry: CatalogEntry::new(type_name.clone(), uid),
            view,
        });
        visited += 1;
    }

    trace!(
        target: "txjournal::scan",
        type_name = %type_name,
        visited,
        recoverable,
        "Type scanned"
    );
    Ok(visited)
}
