//! Catalog entry identifiers
//!
//! A [`Uid`] names exactly one entry within a catalog type. The all-zero
//! value is the null uid: it never names a real entry and terminates every
//! identifier stream handed out by a catalog store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Size of a packed uid in bytes
pub const UID_SIZE: usize = 16;

/// Unique identifier of a catalog entry
///
/// A Uid is a wrapper around a UUID. Fresh uids are random (v4); the nil UUID
/// is reserved as [`Uid::NULL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uid(Uuid);

impl Uid {
    /// The null uid, used only as an end-of-list marker
    pub const NULL: Uid = Uid(Uuid::nil());

    /// Create a new random Uid using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a Uid from raw bytes
    pub fn from_bytes(bytes: [u8; UID_SIZE]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the raw bytes of this Uid
    pub fn as_bytes(&self) -> &[u8; UID_SIZE] {
        self.0.as_bytes()
    }

    /// Whether this is the null (end-of-list) uid
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uid {
    type Err = uuid::Error;

    /// Accepts standard UUID format (with or without hyphens).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
