//! Catalog stores for txjournal
//!
//! This crate provides the backing stores a catalog scan runs against:
//!
//! - Journal store: segmented append-only journal on disk, replayed on open
//! - Memory store: ordered in-memory catalog for tests and embedding
//! - Journal configuration loaded from `txjournal.toml`
//! - Journal compaction
//! - Request recording and failure injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compaction; // Rewrites live entries and deletes dead segments
pub mod config; // JournalConfig and TOML loading
pub mod format; // Segment files and journal records
mod index; // Ordered in-memory index shared by both stores
pub mod journal; // JournalStore
pub mod memory; // MemoryStore
pub mod testing; // RecordingStore

pub use compaction::CompactInfo;
pub use config::{ConfigError, JournalConfig, CONFIG_FILE_NAME};
pub use format::{JournalRecord, JournalRecordError, JournalSegment, SegmentHeader};
pub use journal::{JournalStats, JournalStore};
pub use memory::MemoryStore;
pub use testing::{RecordingStore, StoreRequest};
