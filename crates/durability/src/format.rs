//! Journal segment file and record format.
//!
//! Journal segments are named `journal-NNNNNN.seg` where `NNNNNN` is a
//! zero-padded segment number.
//!
//! # Segment Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Segment Header (32 bytes)          │
//! ├────────────────────────────────────┤
//! │ Record 1                           │
//! ├────────────────────────────────────┤
//! │ ...                                │
//! └────────────────────────────────────┘
//! ```
//!
//! # Record Layout
//!
//! ```text
//! ┌─────────────────┬──────────┬─────────────────────────┬──────────┐
//! │ Length (4 bytes)│ Kind (1) │ Payload (variable)      │ CRC32 (4)│
//! └─────────────────┴──────────┴─────────────────────────┴──────────┘
//!
//! Write payload:  [type: string][uid: 16][state: bytes]
//! Remove payload: [type: string][uid: 16]
//! ```
//!
//! Length covers kind + payload + CRC. The CRC covers kind + payload.
//! Payload fields use the packed encoding of [`txjournal_core::packed`].

use crc32fast::Hasher;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use txjournal_core::{PackedBuffer, PackedWriter, Uid};

/// Magic bytes identifying a journal segment file: "TXJL"
pub const SEGMENT_MAGIC: [u8; 4] = *b"TXJL";

/// Current segment format version
pub const SEGMENT_FORMAT_VERSION: u32 = 1;

/// Size of segment header in bytes
pub const SEGMENT_HEADER_SIZE: usize = 32;

/// Record kind tag: write (or replace) committed state
pub const KIND_WRITE: u8 = 1;

/// Record kind tag: remove a committed entry
pub const KIND_REMOVE: u8 = 2;

/// Length prefix + kind + CRC
const RECORD_OVERHEAD: usize = 4 + 1 + 4;

/// Journal segment header (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Magic bytes: "TXJL"
    pub magic: [u8; 4],

    /// Format version for forward compatibility
    pub format_version: u32,

    /// Segment number (monotonically increasing)
    pub segment_number: u64,
}

impl SegmentHeader {
    /// Create a new segment header.
    pub fn new(segment_number: u64) -> Self {
        SegmentHeader {
            magic: SEGMENT_MAGIC,
            format_version: SEGMENT_FORMAT_VERSION,
            segment_number,
        }
    }

    /// Serialize header to bytes. Bytes 16..32 are reserved (zero).
    pub fn to_bytes(&self) -> [u8; SEGMENT_HEADER_SIZE] {
        let mut bytes = [0u8; SEGMENT_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.segment_number.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes.
    pub fn from_bytes(bytes: &[u8; SEGMENT_HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        SegmentHeader {
            magic,
            format_version: le_u32(&bytes[4..8]),
            segment_number: le_u64(&bytes[8..16]),
        }
    }

    /// Validate magic bytes and version.
    pub fn is_valid(&self) -> bool {
        self.magic == SEGMENT_MAGIC && self.format_version == SEGMENT_FORMAT_VERSION
    }
}

/// Generate segment file path.
///
/// Format: `journal-NNNNNN.seg` where NNNNNN is zero-padded segment number.
pub fn segment_path(dir: &Path, segment_number: u64) -> PathBuf {
    dir.join(format!("journal-{:06}.seg", segment_number))
}

/// Parse a segment number out of a file name, if it names a segment.
pub fn parse_segment_name(name: &str) -> Option<u64> {
    // "journal-" (8) + 6 digits + ".seg" (4)
    if name.len() == 18 && name.starts_with("journal-") && name.ends_with(".seg") {
        name[8..14].parse().ok()
    } else {
        None
    }
}

/// List segment numbers in a directory, sorted ascending.
pub fn list_segments(dir: &Path) -> std::io::Result<Vec<u64>> {
    let mut segments = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(number) = parse_segment_name(&entry.file_name().to_string_lossy()) {
            segments.push(number);
        }
    }
    segments.sort_unstable();
    Ok(segments)
}

/// Read a whole segment file, validating its header.
///
/// Returns the record bytes that follow the header.
pub fn read_segment(dir: &Path, segment_number: u64) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(segment_path(dir, segment_number))?;
    let mut header_bytes = [0u8; SEGMENT_HEADER_SIZE];
    file.read_exact(&mut header_bytes)?;
    validate_header(&header_bytes, segment_number)?;

    let mut records = Vec::new();
    file.read_to_end(&mut records)?;
    Ok(records)
}

fn validate_header(bytes: &[u8; SEGMENT_HEADER_SIZE], segment_number: u64) -> std::io::Result<()> {
    let header = SegmentHeader::from_bytes(bytes);
    if !header.is_valid() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Invalid segment magic bytes or version",
        ));
    }
    if header.segment_number != segment_number {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Segment number mismatch: expected {}, got {}",
                segment_number, header.segment_number
            ),
        ));
    }
    Ok(())
}

/// Writable journal segment.
///
/// Only the active segment is written; older segments are read during
/// replay and deleted by compaction.
#[derive(Debug)]
pub struct JournalSegment {
    file: File,
    segment_number: u64,
    write_position: u64,
    path: PathBuf,
}

impl JournalSegment {
    /// Create a new segment file and write its header.
    pub fn create(dir: &Path, segment_number: u64) -> std::io::Result<Self> {
        let path = segment_path(dir, segment_number);
        Self::create_at(path, segment_number)
    }

    /// Create a segment at an explicit path (used for compaction temp files).
    pub fn create_at(path: PathBuf, segment_number: u64) -> std::io::Result<Self> {
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .read(true)
            .open(&path)?;

        file.write_all(&SegmentHeader::new(segment_number).to_bytes())?;

        Ok(JournalSegment {
            file,
            segment_number,
            write_position: SEGMENT_HEADER_SIZE as u64,
            path,
        })
    }

    /// Open an existing segment for appending.
    pub fn open_append(dir: &Path, segment_number: u64) -> std::io::Result<Self> {
        let path = segment_path(dir, segment_number);
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header_bytes = [0u8; SEGMENT_HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        validate_header(&header_bytes, segment_number)?;

        let write_position = file.seek(SeekFrom::End(0))?;

        Ok(JournalSegment {
            file,
            segment_number,
            write_position,
            path,
        })
    }

    /// Get segment number.
    pub fn segment_number(&self) -> u64 {
        self.segment_number
    }

    /// Get current segment size in bytes (header included).
    pub fn size(&self) -> u64 {
        self.write_position
    }

    /// Whether the segment holds no records.
    pub fn is_empty(&self) -> bool {
        self.write_position <= SEGMENT_HEADER_SIZE as u64
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the segment file to `path`, keeping the open handle.
    ///
    /// Compaction writes to a `.tmp` path and moves the synced file into place.
    pub fn persist(&mut self, path: PathBuf) -> std::io::Result<()> {
        std::fs::rename(&self.path, &path)?;
        self.path = path;
        Ok(())
    }

    /// Append bytes and update the write position.
    pub fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.file.write_all(data)?;
        self.write_position += data.len() as u64;
        Ok(())
    }

    /// Sync segment data to disk.
    pub fn sync(&mut self) -> std::io::Result<()> {
        self.file.sync_data()
    }

    /// Truncate segment at the given position.
    ///
    /// Used during replay to drop a partial trailing record.
    pub fn truncate(&mut self, position: u64) -> std::io::Result<()> {
        self.file.set_len(position)?;
        self.write_position = position;
        self.file.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

/// One journal record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalRecord {
    /// Write (or replace) the committed state of an entry
    Write {
        /// Catalog type
        type_name: String,
        /// Entry uid
        uid: Uid,
        /// Committed state
        state: Vec<u8>,
    },
    /// Remove a committed entry
    Remove {
        /// Catalog type
        type_name: String,
        /// Entry uid
        uid: Uid,
    },
}

impl JournalRecord {
    /// Encoded size of a write record, without building it.
    pub fn write_len(type_name: &str, state_len: usize) -> u64 {
        (RECORD_OVERHEAD + 4 + type_name.len() + 16 + 4 + state_len) as u64
    }

    /// Encoded size of this record.
    pub fn encoded_len(&self) -> u64 {
        match self {
            JournalRecord::Write {
                type_name, state, ..
            } => Self::write_len(type_name, state.len()),
            JournalRecord::Remove { type_name, .. } => {
                (RECORD_OVERHEAD + 4 + type_name.len() + 16) as u64
            }
        }
    }

    fn kind(&self) -> u8 {
        match self {
            JournalRecord::Write { .. } => KIND_WRITE,
            JournalRecord::Remove { .. } => KIND_REMOVE,
        }
    }

    /// Serialize record to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = PackedWriter::new();
        match self {
            JournalRecord::Write {
                type_name,
                uid,
                state,
            } => {
                body.put_string(type_name).put_uid(uid).put_bytes(state);
            }
            JournalRecord::Remove { type_name, uid } => {
                body.put_string(type_name).put_uid(uid);
            }
        }
        let body = body.into_bytes();
        let kind = self.kind();
        let crc = compute_crc(kind, &body);

        let total_len = 1 + body.len() + 4;
        let mut record = Vec::with_capacity(4 + total_len);
        record.extend_from_slice(&(total_len as u32).to_le_bytes());
        record.push(kind);
        record.extend_from_slice(&body);
        record.extend_from_slice(&crc.to_le_bytes());
        record
    }

    /// Deserialize record from bytes.
    ///
    /// Returns (record, bytes_consumed) on success.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), JournalRecordError> {
        if bytes.len() < 4 {
            return Err(JournalRecordError::InsufficientData);
        }
        let length = le_u32(&bytes[0..4]) as usize;
        if length < 5 {
            // Minimum: 1 byte kind + 4 bytes CRC
            return Err(JournalRecordError::InvalidLength(length));
        }
        if bytes.len() < 4 + length {
            return Err(JournalRecordError::InsufficientData);
        }

        let kind = bytes[4];
        let body = &bytes[5..4 + length - 4];
        let stored_crc = le_u32(&bytes[4 + length - 4..4 + length]);
        let computed_crc = compute_crc(kind, body);
        if computed_crc != stored_crc {
            return Err(JournalRecordError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let mut buffer = PackedBuffer::new(body.to_vec());
        let malformed = |e: txjournal_core::PackedError| JournalRecordError::Malformed(e.to_string());
        let record = match kind {
            KIND_WRITE => JournalRecord::Write {
                type_name: buffer.next_string().map_err(malformed)?,
                uid: buffer.next_uid().map_err(malformed)?,
                state: buffer.next_bytes().map_err(malformed)?,
            },
            KIND_REMOVE => JournalRecord::Remove {
                type_name: buffer.next_string().map_err(malformed)?,
                uid: buffer.next_uid().map_err(malformed)?,
            },
            other => return Err(JournalRecordError::UnknownKind(other)),
        };
        if buffer.has_more() {
            return Err(JournalRecordError::Malformed(format!(
                "{} trailing bytes after record body",
                buffer.remaining()
            )));
        }

        Ok((record, 4 + length))
    }
}

/// Journal record errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalRecordError {
    /// Not enough bytes for a whole record (partial trailing write)
    #[error("Insufficient data for record")]
    InsufficientData,

    /// Length prefix is too small to be a record
    #[error("Invalid record length {0}")]
    InvalidLength(usize),

    /// CRC mismatch
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// CRC stored in the record
        expected: u32,
        /// CRC computed over the record
        computed: u32,
    },

    /// Unknown kind tag
    #[error("Unknown record kind {0}")]
    UnknownKind(u8),

    /// CRC was valid but the body could not be parsed
    #[error("Malformed record body: {0}")]
    Malformed(String),
}

fn compute_crc(kind: u8, body: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[kind]);
    hasher.update(body);
    hasher.finalize()
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(raw)
}
