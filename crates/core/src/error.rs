//! Error types for txjournal
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! - [`PackedError`]: malformed or over-read packed buffers
//! - [`StoreError`]: failures reported by a catalog store
//! - [`CatalogError`]: failures of the scan / prune / print operations, carrying
//!   the type and uid that were being processed

use crate::uid::Uid;
use std::io;
use thiserror::Error;

/// Result type alias for catalog store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Errors raised while unpacking a [`PackedBuffer`](crate::PackedBuffer)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackedError {
    /// A read needed more bytes than the buffer has left
    #[error("packed buffer exhausted at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Exhausted {
        /// Offset of the failed read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// A packed string was not valid UTF-8
    #[error("packed string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Offset of the string's length prefix
        offset: usize,
    },

    /// A stream was read again after its terminator had been consumed
    #[error("read past the terminator of a {stream} stream")]
    PastTerminator {
        /// Which stream was over-read ("type" or "uid")
        stream: &'static str,
    },
}

/// Errors reported by a catalog store
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored data failed validation (bad checksum, bad header)
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Malformed packed data
    #[error("Packed data error: {0}")]
    Packed(#[from] PackedError),

    /// The request itself was invalid (empty type name, null uid)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No committed entry with this uid exists under the type
    #[error("No entry {uid} of type '{type_name}'")]
    NotFound {
        /// Requested uid
        uid: Uid,
        /// Requested type
        type_name: String,
    },
}

impl StoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        StoreError::InvalidInput(msg.into())
    }

    /// Create a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        StoreError::Corruption(msg.into())
    }
}

/// Errors of the scan, prune and print operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Bad selector or bad path, rejected before the store is touched
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The type directory could not be obtained or parsed
    #[error("Failed to read the type directory")]
    DirectoryRead {
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// The uid list of one type could not be obtained or parsed
    #[error("Failed to read uids of type '{type_name}'")]
    IdentifierRead {
        /// Type being processed
        type_name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// The store rejected a removal; the prune stopped part way
    #[error(
        "Failed to remove {uid} of type '{type_name}' while pruning '{selector}'; \
         {removed} entries were removed before the failure and the work may be unfinished"
    )]
    Removal {
        /// Selector the prune was run with
        selector: String,
        /// Uid whose removal failed
        uid: Uid,
        /// Type of the failed entry
        type_name: String,
        /// Entries removed before the failure
        removed: usize,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// A recovered transaction view could not be activated
    #[error("Failed to activate transaction {uid} of type '{type_name}'")]
    ViewActivation {
        /// Uid of the transaction
        uid: Uid,
        /// Type of the transaction
        type_name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// Rendered entries could not be written out
    #[error("Failed to write catalog output")]
    Output {
        /// Underlying write failure
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CatalogError::InvalidArgument(msg.into())
    }

    /// Type name the failed operation was processing, if known
    pub fn type_name(&self) -> Option<&str> {
        match self {
            CatalogError::IdentifierRead { type_name, .. }
            | CatalogError::Removal { type_name, .. }
            | CatalogError::ViewActivation { type_name, .. } => Some(type_name),
            CatalogError::InvalidArgument(_)
            | CatalogError::DirectoryRead { .. }
            | CatalogError::Output { .. } => None,
        }
    }
}
