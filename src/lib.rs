//! txjournal - inspect and prune transaction-log catalogs
//!
//! A catalog store files committed entries under type names. txjournal walks
//! a store's type directory and uid lists, prints what it finds, and can
//! remove every entry of a chosen set of types.
//!
//! # Quick Start
//!
//! ```ignore
//! use txjournal::{collect_entries, prune, JournalConfig, JournalStore, TypeSelector};
//!
//! let mut store = JournalStore::open("/var/tx-store", JournalConfig::default())?;
//!
//! // Everything in the store, in directory order
//! let entries = collect_entries(&store, &TypeSelector::All)?;
//!
//! // Drop every entry of one type
//! let removed = prune(&mut store, &TypeSelector::from_list("Alpha")?)?;
//! ```
//!
//! # Architecture
//!
//! - `txjournal-core`: uids, type selectors, packed buffers, the `CatalogStore` trait
//! - `txjournal-durability`: the on-disk journal store and an in-memory store
//! - `txjournal-catalog`: scanner, pruner, printer and recovered transaction views

pub use txjournal_catalog::*;
pub use txjournal_core::*;
pub use txjournal_durability::{
    CompactInfo, ConfigError, JournalConfig, JournalStats, JournalStore, MemoryStore,
    RecordingStore, StoreRequest, CONFIG_FILE_NAME,
};
