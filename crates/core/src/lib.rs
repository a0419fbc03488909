//! Core types and traits for txjournal
//!
//! This crate defines the foundational types used throughout the system:
//! - Uid: Fixed-format identifier of a catalog entry (null uid = end-of-list marker)
//! - TypeName / TypeKind: Catalog partitions and their classification
//! - TypeSelector: Caller-supplied filter over type names
//! - CatalogEntry: The `(type, uid)` pair produced by a scan
//! - PackedBuffer / PackedWriter: Length-prefixed binary cursor over directory data
//! - ParticipantStatus / TransactionState: Recoverable transaction payloads
//! - CatalogStore: The store contract consumed by the scanner and pruner
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod packed;
pub mod participant;
pub mod traits;
pub mod types;
pub mod uid;

pub use error::{CatalogError, CatalogResult, PackedError, StoreError, StoreResult};
pub use packed::{PackedBuffer, PackedWriter};
pub use participant::{ParticipantRecord, ParticipantStatus, TransactionState};
pub use traits::CatalogStore;
pub use types::{CatalogEntry, TypeKind, TypeName, TypeSelector, RECOVERABLE_TYPE_MARKER};
pub use uid::Uid;
