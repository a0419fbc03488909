//! Ordered in-memory catalog index
//!
//! Both stores keep their committed entries here. Types are kept in the order
//! they were first written, uids within a type in insertion order. Replacing
//! the state of an existing uid keeps its position.

use std::collections::HashMap;
use txjournal_core::{PackedBuffer, PackedWriter, Uid};

/// Entries of one type.
///
/// `slots` holds entries in insertion order; a removed entry leaves `None`
/// behind until the bucket is repacked. `positions` maps each live uid to
/// its slot.
#[derive(Debug, Clone)]
struct TypeBucket {
    name: String,
    slots: Vec<Option<(Uid, Vec<u8>)>>,
    positions: HashMap<Uid, usize>,
}

impl TypeBucket {
    fn new(name: &str) -> Self {
        TypeBucket {
            name: name.to_string(),
            slots: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn get(&self, uid: &Uid) -> Option<&[u8]> {
        let pos = *self.positions.get(uid)?;
        self.slots[pos].as_ref().map(|(_, state)| state.as_slice())
    }

    fn upsert(&mut self, uid: Uid, state: Vec<u8>) -> Option<Vec<u8>> {
        match self.positions.get(&uid) {
            Some(&pos) => self.slots[pos]
                .as_mut()
                .map(|(_, old)| std::mem::replace(old, state)),
            None => {
                self.positions.insert(uid, self.slots.len());
                self.slots.push(Some((uid, state)));
                None
            }
        }
    }

    fn remove(&mut self, uid: &Uid) -> Option<Vec<u8>> {
        let pos = self.positions.remove(uid)?;
        let (_, state) = self.slots[pos].take()?;
        if self.slots.len() - self.len() > self.len() {
            self.repack();
        }
        Some(state)
    }

    /// Drop tombstones once they outnumber live entries.
    fn repack(&mut self) {
        self.slots.retain(Option::is_some);
        for (pos, (uid, _)) in self.slots.iter().flatten().enumerate() {
            self.positions.insert(*uid, pos);
        }
    }

    fn entries(&self) -> impl Iterator<Item = &(Uid, Vec<u8>)> + '_ {
        self.slots.iter().flatten()
    }
}

/// Ordered index of committed entries
#[derive(Debug, Clone, Default)]
pub(crate) struct CatalogIndex {
    types: Vec<TypeBucket>,
    /// Type name to position in `types`
    type_positions: HashMap<String, usize>,
}

impl CatalogIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, type_name: &str) -> Option<&TypeBucket> {
        self.type_positions
            .get(type_name)
            .map(|&pos| &self.types[pos])
    }

    fn bucket_position(&mut self, type_name: &str) -> usize {
        if let Some(&pos) = self.type_positions.get(type_name) {
            return pos;
        }
        let pos = self.types.len();
        self.types.push(TypeBucket::new(type_name));
        self.type_positions.insert(type_name.to_string(), pos);
        pos
    }

    /// Register a type with no entries; no-op when it already exists.
    pub(crate) fn register_type(&mut self, type_name: &str) {
        self.bucket_position(type_name);
    }

    /// Insert or replace an entry. Returns the replaced state, if any.
    pub(crate) fn upsert(&mut self, type_name: &str, uid: Uid, state: Vec<u8>) -> Option<Vec<u8>> {
        let pos = self.bucket_position(type_name);
        self.types[pos].upsert(uid, state)
    }

    /// Remove an entry. Returns its state, or `None` when absent.
    ///
    /// With `drop_empty_type`, a type whose last entry goes away is removed
    /// from the directory as well.
    pub(crate) fn remove(
        &mut self,
        type_name: &str,
        uid: &Uid,
        drop_empty_type: bool,
    ) -> Option<Vec<u8>> {
        let type_pos = *self.type_positions.get(type_name)?;
        let state = self.types[type_pos].remove(uid)?;
        if drop_empty_type && self.types[type_pos].len() == 0 {
            self.types.remove(type_pos);
            self.type_positions.remove(type_name);
            for (pos, bucket) in self.types.iter().enumerate().skip(type_pos) {
                self.type_positions.insert(bucket.name.clone(), pos);
            }
        }
        Some(state)
    }

    pub(crate) fn get(&self, type_name: &str, uid: &Uid) -> Option<&[u8]> {
        self.bucket(type_name)?.get(uid)
    }

    pub(crate) fn contains(&self, type_name: &str, uid: &Uid) -> bool {
        self.get(type_name, uid).is_some()
    }

    /// Whether no type is registered.
    pub(crate) fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of entries across all types.
    pub(crate) fn len(&self) -> usize {
        self.types.iter().map(TypeBucket::len).sum()
    }

    /// Iterate `(type, uid, state)` in directory order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Uid, &[u8])> + '_ {
        self.types.iter().flat_map(|b| {
            b.entries()
                .map(move |(uid, state)| (b.name.as_str(), uid, state.as_slice()))
        })
    }

    /// Packed type directory, terminated by `""`.
    pub(crate) fn type_directory(&self) -> PackedBuffer {
        PackedWriter::type_directory(self.types.iter().map(|b| b.name.as_str()))
    }

    /// Packed uid list of one type, terminated by the null uid.
    pub(crate) fn uid_list(&self, type_name: &str) -> Option<PackedBuffer> {
        self.bucket(type_name)
            .map(|b| PackedWriter::uid_list(b.entries().map(|(uid, _)| uid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_insertion_order() {
        let (u1, u2, u3) = (Uid::new(), Uid::new(), Uid::new());
        let mut index = CatalogIndex::new();
        index.upsert("Beta", u1, vec![]);
        index.upsert("Alpha", u2, vec![]);
        index.upsert("Beta", u3, vec![]);

        let order: Vec<_> = index.iter().map(|(t, u, _)| (t.to_string(), *u)).collect();
        assert_eq!(
            order,
            vec![
                ("Beta".to_string(), u1),
                ("Beta".to_string(), u3),
                ("Alpha".to_string(), u2)
            ]
        );
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let (u1, u2) = (Uid::new(), Uid::new());
        let mut index = CatalogIndex::new();
        index.upsert("Alpha", u1, vec![1]);
        index.upsert("Alpha", u2, vec![2]);
        assert_eq!(index.upsert("Alpha", u1, vec![3]), Some(vec![1]));

        let uids: Vec<_> = index.iter().map(|(_, u, _)| *u).collect();
        assert_eq!(uids, vec![u1, u2]);
        assert_eq!(index.get("Alpha", &u1), Some(&[3u8][..]));
    }

    #[test]
    fn test_remove_drop_empty_type() {
        let uid = Uid::new();
        let mut index = CatalogIndex::new();
        index.upsert("Alpha", uid, vec![]);
        assert_eq!(index.remove("Alpha", &uid, false), Some(vec![]));
        assert!(!index.is_empty());
        assert!(index.uid_list("Alpha").is_some());

        index.upsert("Alpha", uid, vec![]);
        index.remove("Alpha", &uid, true);
        assert!(index.is_empty());
        assert!(index.uid_list("Alpha").is_none());
    }

    #[test]
    fn test_remove_missing() {
        let mut index = CatalogIndex::new();
        assert_eq!(index.remove("Alpha", &Uid::new(), true), None);
        index.register_type("Alpha");
        assert_eq!(index.remove("Alpha", &Uid::new(), true), None);
        assert!(!index.contains("Alpha", &Uid::new()));
    }

    #[test]
    fn test_packed_views() {
        let uid = Uid::new();
        let mut index = CatalogIndex::new();
        index.upsert("Alpha", uid, vec![]);
        index.register_type("Beta");

        let mut dir = index.type_directory();
        assert_eq!(dir.next_string().unwrap(), "Alpha");
        assert_eq!(dir.next_string().unwrap(), "Beta");
        assert_eq!(dir.next_string().unwrap(), "");

        let mut uids = index.uid_list("Beta").unwrap();
        assert!(uids.next_uid().unwrap().is_null());
        let mut uids = index.uid_list("Alpha").unwrap();
        assert_eq!(uids.next_uid().unwrap(), uid);
    }

    #[test]
    fn test_removals_keep_order_and_bound_tombstones() {
        let uids: Vec<Uid> = (0..1000).map(|_| Uid::new()).collect();
        let mut index = CatalogIndex::new();
        for uid in &uids {
            index.upsert("Alpha", *uid, vec![]);
        }
        for uid in uids.iter().step_by(3) {
            assert_eq!(index.remove("Alpha", uid, false), Some(vec![]));
        }
        for uid in &uids[..600] {
            index.remove("Alpha", uid, false);
        }

        let bucket = index.bucket("Alpha").unwrap();
        assert!(bucket.slots.len() <= 2 * bucket.len() + 1);
        let expected: Vec<Uid> = uids[600..]
            .iter()
            .enumerate()
            .filter(|(i, _)| (600 + i) % 3 != 0)
            .map(|(_, uid)| *uid)
            .collect();
        let remaining: Vec<Uid> = index.iter().map(|(_, u, _)| *u).collect();
        assert_eq!(remaining, expected);
        for uid in &expected {
            assert!(index.contains("Alpha", uid));
        }
        assert!(!index.contains("Alpha", &uids[0]));
    }

    #[test]
    fn test_dropping_type_keeps_other_lookups() {
        let (a, b, c) = (Uid::new(), Uid::new(), Uid::new());
        let mut index = CatalogIndex::new();
        index.upsert("Alpha", a, vec![1]);
        index.upsert("Beta", b, vec![2]);
        index.upsert("Gamma", c, vec![3]);

        index.remove("Alpha", &a, true);
        assert_eq!(index.get("Beta", &b), Some(&[2u8][..]));
        assert_eq!(index.get("Gamma", &c), Some(&[3u8][..]));
        index.upsert("Alpha", a, vec![4]);

        let order: Vec<_> = index.iter().map(|(t, _, _)| t.to_string()).collect();
        assert_eq!(order, vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_large_front_to_back_removal_is_linear() {
        const ENTRIES: usize = 200_000;
        let uids: Vec<Uid> = (0..ENTRIES).map(|_| Uid::new()).collect();
        let started = std::time::Instant::now();
        let mut index = CatalogIndex::new();
        for uid in &uids {
            index.upsert("Alpha", *uid, Vec::new());
        }
        for uid in &uids {
            assert!(index.remove("Alpha", uid, true).is_some());
        }
        assert!(index.is_empty());
        // A scan per lookup would take minutes at this size
        assert!(
            started.elapsed() < std::time::Duration::from_secs(20),
            "took {:?}",
            started.elapsed()
        );
    }
}
