//! Recoverable transaction state
//!
//! Entries of recoverable transaction types store the participant records of
//! the transaction. The packed form is a run of
//! `(status name, record type, uid)` triples ending with an empty status name.

use crate::error::{StoreError, StoreResult};
use crate::packed::{PackedBuffer, PackedWriter};
use crate::uid::Uid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome bucket of a transaction participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    /// Participant failed to complete
    Failed,
    /// Participant is prepared and awaiting the outcome
    Prepared,
    /// Participant made a heuristic decision
    Heuristic,
    /// Participant has not been prepared yet
    Pending,
    /// Participant voted read-only
    ReadOnly,
}

impl ParticipantStatus {
    /// All statuses in reporting order
    pub const ALL: [ParticipantStatus; 5] = [
        ParticipantStatus::Failed,
        ParticipantStatus::Prepared,
        ParticipantStatus::Heuristic,
        ParticipantStatus::Pending,
        ParticipantStatus::ReadOnly,
    ];

    /// Stable name, as written into packed state
    pub fn name(&self) -> &'static str {
        match self {
            ParticipantStatus::Failed => "FAILED",
            ParticipantStatus::Prepared => "PREPARED",
            ParticipantStatus::Heuristic => "HEURISTIC",
            ParticipantStatus::Pending => "PENDING",
            ParticipantStatus::ReadOnly => "READONLY",
        }
    }

    /// Look a status up by its stable name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.name() == name)
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One participant of a recoverable transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Which bucket the participant sits in
    pub status: ParticipantStatus,
    /// Record type of the participant (e.g. an XA resource record)
    pub record_type: String,
    /// Uid of the participant record
    pub uid: Uid,
}

impl fmt::Display for ParticipantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.record_type, self.uid)
    }
}

/// Participant records of one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    records: Vec<ParticipantRecord>,
}

impl TransactionState {
    /// State with no participants
    pub const EMPTY: TransactionState = TransactionState {
        records: Vec::new(),
    };

    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant record (builder pattern)
    pub fn with_record(
        mut self,
        status: ParticipantStatus,
        record_type: impl Into<String>,
        uid: Uid,
    ) -> Self {
        self.records.push(ParticipantRecord {
            status,
            record_type: record_type.into(),
            uid,
        });
        self
    }

    /// All participant records, in stored order
    pub fn all_records(&self) -> &[ParticipantRecord] {
        &self.records
    }

    /// Participant records with the given status
    pub fn records(&self, status: ParticipantStatus) -> Vec<&ParticipantRecord> {
        self.records.iter().filter(|r| r.status == status).collect()
    }

    /// Encode to the packed state format
    pub fn pack(&self) -> Vec<u8> {
        let mut writer = PackedWriter::new();
        for record in &self.records {
            writer
                .put_string(record.status.name())
                .put_string(&record.record_type)
                .put_uid(&record.uid);
        }
        writer.put_string("");
        writer.into_bytes()
    }

    /// Decode from the packed state format
    ///
    /// # Errors
    ///
    /// `StoreError::Packed` for truncated data, `StoreError::Corruption` for an
    /// unknown status name.
    pub fn unpack(bytes: &[u8]) -> StoreResult<Self> {
        let mut buffer = PackedBuffer::new(bytes.to_vec());
        let mut records = Vec::new();
        loop {
            let status_name = buffer.next_string()?;
            if status_name.is_empty() {
                break;
            }
            let status = ParticipantStatus::from_name(&status_name).ok_or_else(|| {
                StoreError::corruption(format!("unknown participant status '{}'", status_name))
            })?;
            let record_type = buffer.next_string()?;
            let uid = buffer.next_uid()?;
            records.push(ParticipantRecord {
                status,
                record_type,
                uid,
            });
        }
        Ok(TransactionState { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        for status in ParticipantStatus::ALL {
            assert_eq!(ParticipantStatus::from_name(status.name()), Some(status));
        }
        assert_eq!(ParticipantStatus::ReadOnly.to_string(), "READONLY");
        assert_eq!(ParticipantStatus::from_name("COMMITTED"), None);
    }

    #[test]
    fn test_pack_unpack() {
        let state = TransactionState::new()
            .with_record(ParticipantStatus::Prepared, "XAResourceRecord", Uid::new())
            .with_record(ParticipantStatus::Heuristic, "XAResourceRecord", Uid::new())
            .with_record(ParticipantStatus::Prepared, "LastResource", Uid::new());

        let decoded = TransactionState::unpack(&state.pack()).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.records(ParticipantStatus::Prepared).len(), 2);
        assert_eq!(decoded.records(ParticipantStatus::Failed).len(), 0);
    }

    #[test]
    fn test_unpack_empty_state() {
        let state = TransactionState::unpack(&TransactionState::new().pack()).unwrap();
        assert!(state.all_records().is_empty());
    }

    #[test]
    fn test_unpack_truncated() {
        let mut bytes = TransactionState::new()
            .with_record(ParticipantStatus::Pending, "XAResourceRecord", Uid::new())
            .pack();
        bytes.truncate(bytes.len() - 10);
        assert!(matches!(
            TransactionState::unpack(&bytes),
            Err(StoreError::Packed(_))
        ));
    }

    #[test]
    fn test_unpack_unknown_status() {
        let mut writer = PackedWriter::new();
        writer.put_string("COMMITTED").put_string("X").put_uid(&Uid::new());
        writer.put_string("");
        assert!(matches!(
            TransactionState::unpack(writer.as_bytes()),
            Err(StoreError::Corruption(_))
        ));
    }
}
