//! Journal compaction
//!
//! Removed and overwritten entries leave dead records behind. Compaction
//! rewrites the live entries into a fresh segment and deletes the segments
//! that preceded it.
//!
//! # Algorithm
//!
//! 1. Write every live entry, in directory order, to `journal-NNNNNN.seg.tmp`
//! 2. Sync it and rename it to `journal-NNNNNN.seg` (NNNNNN = last segment + 1)
//! 3. Keep writing to it as the active segment
//! 4. Delete the older segments, oldest first
//!
//! # Safety
//!
//! - A crash before step 2 leaves only a `.tmp` file, which replay ignores
//! - Replaying old segments and then the compacted one yields the same index,
//!   because a rewrite of an existing uid replaces it in place
//! - Deletion stops at the first failure, so the remaining old segments are
//!   always a contiguous suffix and no removed entry can reappear

use crate::format::{segment_path, JournalRecord, JournalSegment, SEGMENT_HEADER_SIZE};
use crate::journal::JournalStore;
use std::time::Instant;
use tracing::{info, warn};
use txjournal_core::StoreResult;

/// Result of a compaction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactInfo {
    /// Segment files deleted
    pub segments_removed: usize,
    /// Bytes reclaimed on disk
    pub reclaimed_bytes: u64,
    /// Entries rewritten into the compacted segment
    pub live_entries: usize,
    /// Wall-clock duration
    pub duration_ms: u64,
}

impl JournalStore {
    /// Whether the configured thresholds call for compaction
    ///
    /// True when at least `compact_min_files` segments exist and live bytes
    /// are below `compact_percentage` percent of all record bytes.
    pub fn needs_compaction(&self) -> bool {
        let percentage = u64::from(self.config.compact_percentage);
        if percentage == 0 || self.total_bytes == 0 || self.is_read_only() {
            return false;
        }
        self.segments.len() >= self.config.compact_min_files as usize
            && self.live_bytes * 100 < self.total_bytes * percentage
    }

    pub(crate) fn maybe_compact(&mut self) -> StoreResult<Option<CompactInfo>> {
        if !self.needs_compaction() {
            return Ok(None);
        }
        self.compact().map(Some)
    }

    /// Rewrite live entries into a fresh segment and delete older segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is read-only or the compacted segment
    /// cannot be written. Failing to delete an old segment is logged and
    /// leaves it for the next run.
    pub fn compact(&mut self) -> StoreResult<CompactInfo> {
        self.active_mut()?;
        info!(target: "txjournal::compaction", "Journal compaction started");
        let start_time = Instant::now();

        let last = self.segments.last().copied().unwrap_or(0);
        let target = last + 1;
        let final_path = segment_path(&self.dir, target);
        let tmp_path = final_path.with_extension("seg.tmp");
        if tmp_path.exists() {
            std::fs::remove_file(&tmp_path)?;
        }

        let mut segment = JournalSegment::create_at(tmp_path, target)?;
        let mut live_bytes = 0u64;
        let mut live_entries = 0usize;
        for (type_name, uid, state) in self.index.iter() {
            let record = JournalRecord::Write {
                type_name: type_name.to_string(),
                uid: *uid,
                state: state.to_vec(),
            };
            let bytes = record.to_bytes();
            segment.write(&bytes)?;
            live_bytes += bytes.len() as u64;
            live_entries += 1;
        }
        segment.sync()?;
        segment.persist(final_path)?;

        // Nothing fallible between the rename and switching segments
        self.active = Some(segment);
        let old_segments = std::mem::take(&mut self.segments);
        let mut kept = Vec::new();
        let mut info = CompactInfo {
            live_entries,
            ..CompactInfo::default()
        };
        let mut kept_bytes = 0u64;
        let mut deleting = true;

        for segment_number in old_segments {
            let path = segment_path(&self.dir, segment_number);
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            if deleting {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        info.segments_removed += 1;
                        info.reclaimed_bytes += size;
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            target: "txjournal::compaction",
                            segment = segment_number,
                            error = %e,
                            "Failed to remove journal segment, keeping the rest"
                        );
                        deleting = false;
                    }
                }
            }
            kept_bytes += size.saturating_sub(SEGMENT_HEADER_SIZE as u64);
            kept.push(segment_number);
        }
        kept.push(target);
        self.segments = kept;

        self.live_bytes = live_bytes;
        self.total_bytes = live_bytes + kept_bytes;
        info.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            target: "txjournal::compaction",
            segments_removed = info.segments_removed,
            reclaimed_bytes = info.reclaimed_bytes,
            live_entries = info.live_entries,
            "Journal compaction completed"
        );
        Ok(info)
    }
}
