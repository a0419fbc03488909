//! Catalog pruner
//!
//! Removes every committed entry of the selected types. The whole selection
//! is enumerated before the first removal, so the store is never mutated while
//! its uid lists are being read. Removal stops at the first failure.

use crate::scanner::scan;
use tracing::{debug, info, warn};
use txjournal_core::{CatalogEntry, CatalogError, CatalogResult, CatalogStore, TypeSelector};

/// Remove all entries of the selected types, returning how many were removed.
///
/// Pruning every type is not supported: the selector must name at least one
/// type.
///
/// # Errors
///
/// - `InvalidArgument` for a selector naming no type; the store is not touched
/// - `DirectoryRead` / `IdentifierRead` if enumeration fails; nothing is removed
/// - `Removal` on the first failed removal, carrying the count removed before it
pub fn prune<S>(store: &mut S, selector: &TypeSelector) -> CatalogResult<usize>
where
    S: CatalogStore + ?Sized,
{
    match selector {
        TypeSelector::All => {
            return Err(CatalogError::invalid_argument(
                "pruning requires at least one type name",
            ))
        }
        TypeSelector::Only(names) if names.is_empty() => {
            return Err(CatalogError::invalid_argument(
                "pruning requires at least one type name",
            ))
        }
        TypeSelector::Only(_) => {}
    }

    let mut entries: Vec<CatalogEntry> = Vec::new();
    scan(&*store, selector, |scanned| entries.push(scanned.into_entry()))?;
    debug!(
        target: "txjournal::prune",
        selector = %selector,
        matched = entries.len(),
        "Entries enumerated"
    );

    let mut removed = 0usize;
    for entry in &entries {
        if let Err(source) = store.remove_committed(&entry.uid, entry.type_name.as_str()) {
            warn!(
                target: "txjournal::prune",
                selector = %selector,
                uid = %entry.uid,
                type_name = %entry.type_name,
                removed,
                error = %source,
                "Removal failed, prune stopped"
            );
            return Err(CatalogError::Removal {
                selector: selector.to_string(),
                uid: entry.uid,
                type_name: entry.type_name.to_string(),
                removed,
                source,
            });
        }
        removed += 1;
    }

    info!(target: "txjournal::prune", selector = %selector, removed, "Prune complete");
    Ok(removed)
}
