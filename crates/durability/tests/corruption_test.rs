//! Journal crash and corruption tests
//!
//! These tests damage or rearrange segment files on disk and reopen the store:
//! - A torn record is only tolerated at the end of the last segment
//! - A compaction interrupted before deleting old segments replays cleanly
//! - Entries spread over rotated segments survive reopen in order

use tempfile::TempDir;
use txjournal_core::{CatalogStore, StoreError, Uid};
use txjournal_durability::format::{list_segments, segment_path, JournalRecord, JournalSegment};
use txjournal_durability::{JournalConfig, JournalStore};

fn no_compaction() -> JournalConfig {
    JournalConfig::for_testing().with_compact_percentage(0)
}

fn listed(store: &JournalStore, type_name: &str) -> Vec<Uid> {
    let mut uids = Vec::new();
    if let Some(mut list) = store.list_uids(type_name).unwrap() {
        loop {
            let uid = list.next_uid().unwrap();
            if uid.is_null() {
                break;
            }
            uids.push(uid);
        }
    }
    uids
}

#[test]
fn test_torn_record_in_older_segment_is_corruption() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = JournalStore::open(dir.path(), no_compaction()).unwrap();
        for _ in 0..30 {
            store.write_committed(&Uid::new(), "Alpha", &[7u8; 300]).unwrap();
        }
        assert!(store.stats().segments > 1);
    }

    let first = segment_path(dir.path(), 1);
    let len = std::fs::metadata(&first).unwrap().len();
    let file = std::fs::OpenOptions::new().write(true).open(&first).unwrap();
    file.set_len(len - 5).unwrap();

    let err = JournalStore::open(dir.path(), no_compaction()).unwrap_err();
    assert!(
        matches!(err, StoreError::Corruption(_)),
        "expected corruption, got {:?}",
        err
    );
}

#[test]
fn test_interrupted_compaction_replays_to_same_state() {
    let dir = TempDir::new().unwrap();
    let uids: Vec<Uid> = (0..5).map(|_| Uid::new()).collect();
    {
        let mut store = JournalStore::open(dir.path(), no_compaction()).unwrap();
        for uid in &uids {
            store.write_committed(uid, "Alpha", b"live").unwrap();
        }
        store.remove_committed(&uids[1], "Alpha").unwrap();
        store.remove_committed(&uids[3], "Alpha").unwrap();
    }

    // Compacted segment written and renamed, old segment not yet deleted
    let mut compacted = JournalSegment::create(dir.path(), 2).unwrap();
    for uid in [uids[0], uids[2], uids[4]] {
        let record = JournalRecord::Write {
            type_name: "Alpha".to_string(),
            uid,
            state: b"live".to_vec(),
        };
        compacted.write(&record.to_bytes()).unwrap();
    }
    compacted.sync().unwrap();
    drop(compacted);
    assert_eq!(list_segments(dir.path()).unwrap(), vec![1, 2]);

    let mut store = JournalStore::open(dir.path(), no_compaction()).unwrap();
    assert_eq!(listed(&store, "Alpha"), vec![uids[0], uids[2], uids[4]]);

    // Finishing the compaction keeps the same view
    store.compact().unwrap();
    drop(store);
    let store = JournalStore::open(dir.path(), no_compaction()).unwrap();
    assert_eq!(listed(&store, "Alpha"), vec![uids[0], uids[2], uids[4]]);
}

#[test]
fn test_entries_survive_rotation_and_reopen() {
    let dir = TempDir::new().unwrap();
    let uids: Vec<Uid> = (0..40).map(|_| Uid::new()).collect();
    {
        let mut store = JournalStore::open(dir.path(), no_compaction()).unwrap();
        for uid in &uids {
            store.write_committed(uid, "Alpha", &[1u8; 200]).unwrap();
        }
        assert!(store.stats().segments > 1);
    }

    let store = JournalStore::open(dir.path(), no_compaction()).unwrap();
    assert_eq!(listed(&store, "Alpha"), uids);
}

#[test]
fn test_configured_store_reads_toml() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(txjournal_durability::CONFIG_FILE_NAME),
        "segment_size = 2048\nsync_writes = false\n",
    )
    .unwrap();

    let config = JournalConfig::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.segment_size, 2048);
    let mut store = JournalStore::open(dir.path(), config).unwrap();
    for _ in 0..10 {
        store.write_committed(&Uid::new(), "Alpha", &[0u8; 400]).unwrap();
    }
    assert!(store.stats().segments >= 3);
}
