//! Recovered transaction views
//!
//! Entries of a recoverable transaction type carry a [`RecoveredTransaction`].
//! The view holds no state until it is activated against the store. Activation
//! hands out an [`ActiveTransaction`] guard, and dropping the guard deactivates
//! the view again, so the loaded state never outlives its use.

use std::fmt;
use txjournal_core::{
    CatalogError, CatalogResult, CatalogStore, ParticipantRecord, ParticipantStatus, StoreError,
    TransactionState, TypeName, Uid,
};

/// Lazily activatable view of one recoverable transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredTransaction {
    uid: Uid,
    type_name: TypeName,
    state: Option<TransactionState>,
}

impl RecoveredTransaction {
    /// Create an inactive view
    pub fn new(uid: Uid, type_name: TypeName) -> Self {
        RecoveredTransaction {
            uid,
            type_name,
            state: None,
        }
    }

    /// Uid of the transaction
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Type the transaction is filed under
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Whether state is currently loaded
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Load the committed state and return a guard over it.
    ///
    /// The view is deactivated when the guard drops, and also when activation
    /// fails part way.
    ///
    /// # Errors
    ///
    /// `ViewActivation` when the store has no state for the transaction, the
    /// read fails, or the state cannot be decoded.
    pub fn activate<S: CatalogStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> CatalogResult<ActiveTransaction<'_>> {
        match self.load(store) {
            Ok(state) => {
                self.state = Some(state);
                Ok(ActiveTransaction { view: self })
            }
            Err(source) => {
                self.deactivate();
                Err(CatalogError::ViewActivation {
                    uid: self.uid,
                    type_name: self.type_name.to_string(),
                    source,
                })
            }
        }
    }

    /// Drop any loaded state
    pub fn deactivate(&mut self) {
        self.state = None;
    }

    fn load<S: CatalogStore + ?Sized>(&self, store: &S) -> Result<TransactionState, StoreError> {
        let bytes = store
            .read_committed(&self.uid, self.type_name.as_str())?
            .ok_or_else(|| StoreError::NotFound {
                uid: self.uid,
                type_name: self.type_name.to_string(),
            })?;
        TransactionState::unpack(&bytes)
    }
}

/// Activated view; deactivates on drop
#[derive(Debug)]
pub struct ActiveTransaction<'a> {
    view: &'a mut RecoveredTransaction,
}

impl ActiveTransaction<'_> {
    /// Uid of the transaction
    pub fn uid(&self) -> &Uid {
        &self.view.uid
    }

    /// Type the transaction is filed under
    pub fn type_name(&self) -> &TypeName {
        &self.view.type_name
    }

    /// Loaded state
    pub fn state(&self) -> &TransactionState {
        // activate() always loads before handing out the guard
        static EMPTY: TransactionState = TransactionState::EMPTY;
        self.view.state.as_ref().unwrap_or(&EMPTY)
    }

    /// Participant records with the given status
    pub fn records(&self, status: ParticipantStatus) -> Vec<&ParticipantRecord> {
        self.state().records(status)
    }

    /// Two-line summary of the transaction and its participants
    pub fn summary(&self) -> TransactionSummary<'_> {
        TransactionSummary { active: self }
    }
}

impl Drop for ActiveTransaction<'_> {
    fn drop(&mut self) {
        self.view.deactivate();
    }
}

/// Display adapter rendering an activated transaction
///
/// ```text
/// For uid: <uid> of type <type>, participants:
///   [FAILED:[..], PREPARED:[..], HEURISTIC:[..], PENDING:[..], READONLY:[..]]
/// ```
pub struct TransactionSummary<'a> {
    active: &'a ActiveTransaction<'a>,
}

impl fmt::Display for TransactionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "For uid: {} of type {}, participants:",
            self.active.uid(),
            self.active.type_name()
        )?;
        f.write_str("  [")?;
        for (i, status) in ParticipantStatus::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:[", status)?;
            for (j, record) in self.active.records(*status).iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", record)?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txjournal_durability::MemoryStore;

    const TYPE: &str = "/StateManager/BasicAction/TwoPhaseCoordinator/AtomicAction";

    fn view(uid: Uid) -> RecoveredTransaction {
        RecoveredTransaction::new(uid, TypeName::new(TYPE).unwrap())
    }

    #[test]
    fn test_activate_and_drop_deactivates() {
        let uid = Uid::new();
        let participant = Uid::new();
        let state =
            TransactionState::new().with_record(ParticipantStatus::Prepared, "XAResourceRecord", participant);
        let store = MemoryStore::new().with_state(TYPE, uid, state.pack());

        let mut view = view(uid);
        assert!(!view.is_active());
        {
            let active = view.activate(&store).unwrap();
            assert_eq!(active.records(ParticipantStatus::Prepared).len(), 1);
            assert!(active.records(ParticipantStatus::Failed).is_empty());
        }
        assert!(!view.is_active());
    }

    #[test]
    fn test_missing_state_is_activation_failure() {
        let uid = Uid::new();
        let store = MemoryStore::new().with_type(TYPE);
        let mut view = view(uid);

        let err = view.activate(&store).unwrap_err();
        match err {
            CatalogError::ViewActivation {
                uid: failed,
                type_name,
                source,
            } => {
                assert_eq!(failed, uid);
                assert_eq!(type_name, TYPE);
                assert!(matches!(source, StoreError::NotFound { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!view.is_active());
    }

    #[test]
    fn test_malformed_state_is_activation_failure() {
        let uid = Uid::new();
        let store = MemoryStore::new().with_state(TYPE, uid, vec![9, 0, 0]);
        let mut view = view(uid);
        assert!(matches!(
            view.activate(&store),
            Err(CatalogError::ViewActivation { .. })
        ));
        assert!(!view.is_active());
    }

    #[test]
    fn test_summary_format() {
        let uid = Uid::new();
        let (p1, p2) = (Uid::new(), Uid::new());
        let state = TransactionState::new()
            .with_record(ParticipantStatus::Heuristic, "XAResourceRecord", p1)
            .with_record(ParticipantStatus::Heuristic, "XAResourceRecord", p2);
        let store = MemoryStore::new().with_state(TYPE, uid, state.pack());

        let mut view = view(uid);
        let active = view.activate(&store).unwrap();
        let expected = format!(
            "For uid: {} of type {}, participants:\n  \
             [FAILED:[], PREPARED:[], HEURISTIC:[XAResourceRecord {}, XAResourceRecord {}], \
             PENDING:[], READONLY:[]]",
            uid, TYPE, p1, p2
        );
        assert_eq!(active.summary().to_string(), expected);
    }
}
