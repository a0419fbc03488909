//! Journal store end-to-end: populate on disk, reopen, list, print and prune.

use tempfile::TempDir;

use txjournal::{
    collect_entries, print_entries, prune, CatalogStore, JournalConfig, JournalStore,
    OutputFormat, ParticipantStatus, TransactionState, TypeSelector, Uid,
};

const ACTION: &str = "/StateManager/BasicAction/TwoPhaseCoordinator/AtomicAction";
const RESOURCE: &str = "XAResourceRecord";

struct Fixture {
    dir: TempDir,
    action: Uid,
    participant: Uid,
    plain: Vec<Uid>,
}

fn populate() -> Fixture {
    let dir = TempDir::new().unwrap();
    let action = Uid::new();
    let participant = Uid::new();
    let plain: Vec<Uid> = (0..3).map(|_| Uid::new()).collect();

    let mut store = JournalStore::open(dir.path(), JournalConfig::for_testing()).unwrap();
    let state =
        TransactionState::new().with_record(ParticipantStatus::Prepared, RESOURCE, participant);
    store.write_committed(&action, ACTION, &state.pack()).unwrap();
    for uid in &plain {
        store.write_committed(uid, RESOURCE, b"resource").unwrap();
    }
    store.sync().unwrap();

    Fixture {
        dir,
        action,
        participant,
        plain,
    }
}

#[test]
fn reopened_store_lists_entries_in_write_order() {
    let fixture = populate();
    let store = JournalStore::open(fixture.dir.path(), JournalConfig::for_testing()).unwrap();

    let entries = collect_entries(&store, &TypeSelector::All).unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].uid, fixture.action);
    assert_eq!(entries[0].type_name.as_str(), ACTION);
    let plain: Vec<Uid> = entries[1..].iter().map(|e| e.uid).collect();
    assert_eq!(plain, fixture.plain);
}

#[test]
fn printed_listing_includes_participants() {
    let fixture = populate();
    let store = JournalStore::open(fixture.dir.path(), JournalConfig::for_testing()).unwrap();

    let mut out = Vec::new();
    let summary =
        print_entries(&store, &TypeSelector::All, &mut out, OutputFormat::Text).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(summary.printed, 4);
    assert_eq!(summary.view_failures, 0);
    assert_eq!(
        lines[0],
        format!("For uid: {} of type {}, participants:", fixture.action, ACTION)
    );
    assert_eq!(
        lines[1],
        format!(
            "  [FAILED:[], PREPARED:[{} {}], HEURISTIC:[], PENDING:[], READONLY:[]]",
            RESOURCE, fixture.participant
        )
    );
    assert_eq!(lines[2], format!("{}, {}", fixture.plain[0], RESOURCE));
}

#[test]
fn pruned_entries_stay_gone_after_reopen() {
    let fixture = populate();
    {
        let mut store =
            JournalStore::open(fixture.dir.path(), JournalConfig::for_testing()).unwrap();
        let removed = prune(&mut store, &TypeSelector::from_list(RESOURCE).unwrap()).unwrap();
        assert_eq!(removed, 3);
    }

    let store = JournalStore::open(fixture.dir.path(), JournalConfig::for_testing()).unwrap();
    let entries = collect_entries(&store, &TypeSelector::All).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].uid, fixture.action);
    // The emptied type is gone from the directory
    assert!(store.list_uids(RESOURCE).unwrap().is_none());
}
