//! Journal store configuration
//!
//! Configuration is passed to [`JournalStore::open`](crate::JournalStore::open);
//! nothing here is process-global. It can be built in code or read from a
//! `txjournal.toml` file.
//!
//! # Example
//!
//! ```toml
//! # Maximum segment size in bytes before a new segment is started
//! segment_size = 10485760
//! # Minimum number of segments before compaction is considered
//! compact_min_files = 1
//! # Compact when live data falls below this percentage (0 disables)
//! compact_percentage = 50
//! # fsync after every append
//! sync_writes = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up in the store directory
pub const CONFIG_FILE_NAME: &str = "txjournal.toml";

/// Smallest accepted segment size
pub const MIN_SEGMENT_SIZE: u64 = 1024;

/// Journal store configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// Maximum segment size in bytes (default: 10MB).
    ///
    /// When an append would exceed this size, a new segment is created.
    pub segment_size: u64,

    /// Minimum number of segments before compaction starts (default: 1).
    pub compact_min_files: u32,

    /// Live data threshold in percent (default: 50).
    ///
    /// Compaction runs when live bytes are below this share of all record
    /// bytes. Zero disables automatic compaction.
    pub compact_percentage: u8,

    /// Whether every append is followed by an fsync (default: true).
    pub sync_writes: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        JournalConfig {
            segment_size: 10 * 1024 * 1024, // 10MB
            compact_min_files: 1,
            compact_percentage: 50,
            sync_writes: true,
        }
    }
}

impl JournalConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set segment size (builder pattern).
    pub fn with_segment_size(mut self, size: u64) -> Self {
        self.segment_size = size;
        self
    }

    /// Set the minimum segment count for compaction (builder pattern).
    pub fn with_compact_min_files(mut self, files: u32) -> Self {
        self.compact_min_files = files;
        self
    }

    /// Set the compaction live-data threshold (builder pattern).
    pub fn with_compact_percentage(mut self, percentage: u8) -> Self {
        self.compact_percentage = percentage;
        self
    }

    /// Set whether appends are fsynced (builder pattern).
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_size < MIN_SEGMENT_SIZE {
            return Err(ConfigError::SegmentSizeTooSmall(self.segment_size));
        }
        if self.compact_min_files == 0 {
            return Err(ConfigError::CompactMinFilesZero);
        }
        if self.compact_percentage > 100 {
            return Err(ConfigError::CompactPercentageOutOfRange(
                self.compact_percentage,
            ));
        }
        Ok(())
    }

    /// Create a configuration optimized for testing (small segments, no fsync).
    pub fn for_testing() -> Self {
        JournalConfig {
            segment_size: 4 * 1024, // 4KB for faster rotation in tests
            compact_min_files: 1,
            compact_percentage: 50,
            sync_writes: false,
        }
    }

    /// Read and validate config from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let config: JournalConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `txjournal.toml` from a store directory, or defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Segment size is too small (minimum 1KB).
    #[error("Segment size must be at least 1KB, got {0}")]
    SegmentSizeTooSmall(u64),

    /// compact_min_files is zero.
    #[error("compact_min_files must be at least 1")]
    CompactMinFilesZero,

    /// compact_percentage exceeds 100.
    #[error("compact_percentage must be between 0 and 100, got {0}")]
    CompactPercentageOutOfRange(u8),

    /// Config file could not be read.
    #[error("Failed to read config file '{path}': {detail}")]
    Read {
        /// File path
        path: String,
        /// Underlying error
        detail: String,
    },

    /// Config file could not be parsed.
    #[error("Failed to parse config file '{path}': {detail}")]
    Parse {
        /// File path
        path: String,
        /// Underlying error
        detail: String,
    },
}
