//! Catalog scanning and pruning for txjournal
//!
//! Everything here runs against the [`CatalogStore`](txjournal_core::CatalogStore)
//! trait and never sees a store's on-disk format:
//!
//! - Scanner: walks the type directory and each selected uid list in store order
//! - Pruner: enumerates matching entries, then removes them one by one
//! - Printer / collector: renders or gathers the scanned entries
//! - Recovered views: activatable transaction state for recoverable types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor; // Terminator-aware cursors over packed streams
pub mod printer; // collect_entries, print_entries
pub mod pruner; // prune
pub mod recovered; // RecoveredTransaction and its activation guard
pub mod scanner; // scan

pub use cursor::{DirectoryCursor, UidCursor};
pub use printer::{collect_entries, print_entries, OutputFormat, PrintSummary};
pub use pruner::prune;
pub use recovered::{ActiveTransaction, RecoveredTransaction, TransactionSummary};
pub use scanner::{scan, ScannedEntry};
