//! Journal-backed catalog store
//!
//! [`JournalStore`] keeps the catalog in a directory of append-only segment
//! files (see [`crate::format`]). Opening the store replays every segment in
//! order into an in-memory index; writes and removals are appended to the
//! active segment and applied to the index.
//!
//! # Replay rules
//!
//! - A `Write` of an existing uid replaces its state in place
//! - A `Remove` of an unknown entry is ignored (its write was compacted away)
//! - A partial record at the end of the last segment is truncated away
//! - Any other malformed record is reported as corruption

use crate::config::JournalConfig;
use crate::format::{
    list_segments, read_segment, JournalRecord, JournalRecordError, JournalSegment,
    SEGMENT_HEADER_SIZE,
};
use crate::index::CatalogIndex;
use crate::memory::validate_key;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use txjournal_core::{CatalogStore, PackedBuffer, StoreError, StoreResult, Uid};

/// Space accounting of an open journal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalStats {
    /// Number of segment files
    pub segments: usize,
    /// Number of live entries
    pub entries: usize,
    /// Bytes of records still needed to rebuild the live entries
    pub live_bytes: u64,
    /// Bytes of all records in all segments
    pub total_bytes: u64,
}

/// Journal-backed [`CatalogStore`]
#[derive(Debug)]
pub struct JournalStore {
    pub(crate) dir: PathBuf,
    pub(crate) config: JournalConfig,
    pub(crate) index: CatalogIndex,
    pub(crate) segments: Vec<u64>,
    /// `None` when opened read-only
    pub(crate) active: Option<JournalSegment>,
    pub(crate) total_bytes: u64,
    pub(crate) live_bytes: u64,
}

/// Index and accounting rebuilt from the segment files
struct Replay {
    index: CatalogIndex,
    total_bytes: u64,
    live_bytes: u64,
    /// Valid length of the last segment when it ends in a partial record
    valid_end: Option<u64>,
}

impl JournalStore {
    /// Open (or create) a journal store in `dir`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the configuration is invalid or `dir` is not a directory
    /// - `Corruption` if a segment fails validation
    /// - `Io` on file system errors
    pub fn open(dir: impl AsRef<Path>, config: JournalConfig) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        validate_config(&config)?;

        std::fs::create_dir_all(&dir)?;
        ensure_directory(&dir)?;

        let mut segments = list_segments(&dir)?;
        if segments.is_empty() {
            JournalSegment::create(&dir, 1)?;
            segments.push(1);
        }

        let replay = replay(&dir, &segments)?;
        let last = segments[segments.len() - 1];
        let mut active = JournalSegment::open_append(&dir, last)?;
        if let Some(end) = replay.valid_end {
            active.truncate(end)?;
        }

        info!(
            target: "txjournal::journal",
            dir = %dir.display(),
            segments = segments.len(),
            entries = replay.index.len(),
            "Journal store opened"
        );

        Ok(JournalStore {
            dir,
            config,
            index: replay.index,
            segments,
            active: Some(active),
            total_bytes: replay.total_bytes,
            live_bytes: replay.live_bytes,
        })
    }

    /// Open an existing journal directory without writing to it.
    ///
    /// Nothing is created: a directory without segments opens as an empty
    /// store, and a partial trailing record is skipped rather than truncated.
    /// Writes and removals fail with `InvalidInput`.
    pub fn open_read_only(dir: impl AsRef<Path>, config: JournalConfig) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        validate_config(&config)?;
        ensure_directory(&dir)?;

        let segments = list_segments(&dir)?;
        let replay = replay(&dir, &segments)?;

        info!(
            target: "txjournal::journal",
            dir = %dir.display(),
            segments = segments.len(),
            entries = replay.index.len(),
            "Journal store opened read-only"
        );

        Ok(JournalStore {
            dir,
            config,
            index: replay.index,
            segments,
            active: None,
            total_bytes: replay.total_bytes,
            live_bytes: replay.live_bytes,
        })
    }

    /// Whether the store was opened with [`JournalStore::open_read_only`]
    pub fn is_read_only(&self) -> bool {
        self.active.is_none()
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Configuration the store was opened with
    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current space accounting
    pub fn stats(&self) -> JournalStats {
        JournalStats {
            segments: self.segments.len(),
            entries: self.index.len(),
            live_bytes: self.live_bytes,
            total_bytes: self.total_bytes,
        }
    }

    /// Sync the active segment to disk. No-op when read-only.
    pub fn sync(&mut self) -> StoreResult<()> {
        if let Some(active) = self.active.as_mut() {
            active.sync()?;
        }
        Ok(())
    }

    pub(crate) fn active_mut(&mut self) -> StoreResult<&mut JournalSegment> {
        let dir = &self.dir;
        self.active.as_mut().ok_or_else(|| {
            StoreError::invalid_input(format!(
                "journal store '{}' is open read-only",
                dir.display()
            ))
        })
    }

    fn append(&mut self, record: &JournalRecord) -> StoreResult<u64> {
        let bytes = record.to_bytes();
        let len = bytes.len() as u64;
        let segment_size = self.config.segment_size;
        let active = self.active_mut()?;
        if !active.is_empty() && active.size() + len > segment_size {
            self.rotate()?;
        }
        let sync_writes = self.config.sync_writes;
        let active = self.active_mut()?;
        active.write(&bytes)?;
        if sync_writes {
            active.sync()?;
        }
        self.total_bytes += len;
        Ok(len)
    }

    fn rotate(&mut self) -> StoreResult<()> {
        let active = self.active_mut()?;
        let next = active.segment_number() + 1;
        active.sync()?;
        let segment = JournalSegment::create(&self.dir, next)?;
        self.active = Some(segment);
        self.segments.push(next);
        debug!(target: "txjournal::journal", segment = next, "Rotated to new segment");
        Ok(())
    }
}

fn validate_config(config: &JournalConfig) -> StoreResult<()> {
    config
        .validate()
        .map_err(|e| StoreError::invalid_input(e.to_string()))
}

fn ensure_directory(dir: &Path) -> StoreResult<()> {
    if !dir.is_dir() {
        return Err(StoreError::invalid_input(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }
    Ok(())
}

/// Replay `segments` in order into a fresh index.
fn replay(dir: &Path, segments: &[u64]) -> StoreResult<Replay> {
    let mut index = CatalogIndex::new();
    let mut total_bytes = 0u64;
    let mut live_bytes = 0u64;
    let mut valid_end = None;

    for (pos, &segment_number) in segments.iter().enumerate() {
        let is_last = pos + 1 == segments.len();
        let body = read_segment(dir, segment_number).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                StoreError::corruption(format!("segment {}: {}", segment_number, e))
            } else {
                StoreError::Io(e)
            }
        })?;

        let mut offset = 0usize;
        while offset < body.len() {
            match JournalRecord::from_bytes(&body[offset..]) {
                Ok((record, consumed)) => {
                    apply(&mut index, &mut live_bytes, record, consumed as u64);
                    total_bytes += consumed as u64;
                    offset += consumed;
                }
                Err(JournalRecordError::InsufficientData) if is_last => {
                    warn!(
                        target: "txjournal::journal",
                        segment = segment_number,
                        offset,
                        dropped = body.len() - offset,
                        "Partial record at end of journal"
                    );
                    valid_end = Some((SEGMENT_HEADER_SIZE + offset) as u64);
                    break;
                }
                Err(e) => {
                    return Err(StoreError::corruption(format!(
                        "segment {} offset {}: {}",
                        segment_number, offset, e
                    )));
                }
            }
        }
    }

    Ok(Replay {
        index,
        total_bytes,
        live_bytes,
        valid_end,
    })
}

/// Apply one record to the index, keeping live-byte accounting.
fn apply(index: &mut CatalogIndex, live_bytes: &mut u64, record: JournalRecord, len: u64) {
    match record {
        JournalRecord::Write {
            type_name,
            uid,
            state,
        } => {
            if let Some(old) = index.upsert(&type_name, uid, state) {
                *live_bytes -= JournalRecord::write_len(&type_name, old.len());
            }
            *live_bytes += len;
        }
        JournalRecord::Remove { type_name, uid } => {
            match index.remove(&type_name, &uid, true) {
                Some(old) => *live_bytes -= JournalRecord::write_len(&type_name, old.len()),
                None => debug!(
                    target: "txjournal::journal",
                    %uid,
                    type_name = %type_name,
                    "Remove of unknown entry ignored"
                ),
            }
        }
    }
}

impl CatalogStore for JournalStore {
    fn list_types(&self) -> StoreResult<Option<PackedBuffer>> {
        if self.index.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.index.type_directory()))
    }

    fn list_uids(&self, type_name: &str) -> StoreResult<Option<PackedBuffer>> {
        Ok(self.index.uid_list(type_name))
    }

    fn read_committed(&self, uid: &Uid, type_name: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.index.get(type_name, uid).map(<[u8]>::to_vec))
    }

    fn write_committed(&mut self, uid: &Uid, type_name: &str, state: &[u8]) -> StoreResult<()> {
        validate_key(uid, type_name)?;
        let record = JournalRecord::Write {
            type_name: type_name.to_string(),
            uid: *uid,
            state: state.to_vec(),
        };
        let len = self.append(&record)?;
        apply(&mut self.index, &mut self.live_bytes, record, len);
        Ok(())
    }

    fn remove_committed(&mut self, uid: &Uid, type_name: &str) -> StoreResult<()> {
        if !self.index.contains(type_name, uid) {
            return Err(StoreError::NotFound {
                uid: *uid,
                type_name: type_name.to_string(),
            });
        }
        let record = JournalRecord::Remove {
            type_name: type_name.to_string(),
            uid: *uid,
        };
        let len = self.append(&record)?;
        apply(&mut self.index, &mut self.live_bytes, record, len);

        // The removal is durable; a failed compaction only leaves dead bytes behind.
        if let Err(e) = self.maybe_compact() {
            warn!(
                target: "txjournal::compaction",
                error = %e,
                "Compaction after removal failed"
            );
        }
        Ok(())
    }
}
