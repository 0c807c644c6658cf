//! HashIndex: open-addressed map from key text to pool handles.
//!
//! Slots hold only `(Handle, hash)`; the key text lives once in the
//! `StringPool` and probing resolves candidates through it. Rehashing on
//! growth uses the stored hash, so it never has to consult the pool.

use crate::error::CatalogError;
use crate::string_pool::{Handle, StringPool};
use core::hash::BuildHasher;
use hashbrown::hash_table::{self, HashTable};
use std::collections::hash_map::RandomState;

#[derive(Copy, Clone, Debug)]
struct Slot {
    handle: Handle,
    hash: u64,
}

/// Result of a successful `HashIndex::insert`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Inserted {
    /// The table grew (and rehashed) to make room for this entry.
    pub resized: bool,
}

pub struct HashIndex<S = RandomState> {
    hasher: S,
    index: HashTable<Slot>,
    // Largest capacity seen so far. `HashTable::capacity` dips by one per
    // tombstone and recovers when the slot is reused, so only a capacity
    // above this mark means the table was reallocated.
    peak_capacity: usize,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(key, handle)` entries in table order.
pub struct Iter<'a> {
    it: hash_table::Iter<'a, Slot>,
    pool: &'a StringPool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Handle);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            match self.pool.get(slot.handle) {
                Some(key) => return Some((key, slot.handle)),
                None => debug_assert!(false, "indexed handle missing from pool"),
            }
        }
        None
    }
}

impl<S> HashIndex<S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let index = HashTable::with_capacity(capacity);
        Self {
            hasher,
            peak_capacity: index.capacity(),
            index,
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    pub fn find(&self, pool: &StringPool, key: &str) -> Option<Handle> {
        let hash = self.make_hash(key);
        self.index
            .find(hash, |s| s.hash == hash && pool.get(s.handle) == Some(key))
            .map(|s| s.handle)
    }

    pub fn contains_key(&self, pool: &StringPool, key: &str) -> bool {
        self.find(pool, key).is_some()
    }

    /// Index `handle` under the text it references in `pool`.
    pub fn insert(&mut self, pool: &StringPool, handle: Handle) -> Result<Inserted, CatalogError> {
        let key = pool.get(handle).ok_or(CatalogError::NotFound)?;
        let hash = self.make_hash(key);
        let vacant = match self.index.entry(
            hash,
            |s| s.hash == hash && pool.get(s.handle) == Some(key),
            |s| s.hash,
        ) {
            hash_table::Entry::Occupied(_) => return Err(CatalogError::DuplicateKey),
            hash_table::Entry::Vacant(v) => v,
        };
        vacant.insert(Slot { handle, hash });
        let capacity = self.index.capacity();
        let resized = capacity > self.peak_capacity;
        self.peak_capacity = self.peak_capacity.max(capacity);
        Ok(Inserted { resized })
    }

    /// Drop the entry for `key`, returning the handle it held. The pool entry
    /// must still be live so the key can be matched.
    pub fn remove(&mut self, pool: &StringPool, key: &str) -> Option<Handle> {
        let hash = self.make_hash(key);
        match self
            .index
            .find_entry(hash, |s| s.hash == hash && pool.get(s.handle) == Some(key))
        {
            Ok(occupied) => {
                let (slot, _) = occupied.remove();
                Some(slot.handle)
            }
            Err(_) => None,
        }
    }

    /// Every indexed handle, without resolving it.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.index.iter().map(|s| s.handle)
    }

    pub fn iter<'a>(&'a self, pool: &'a StringPool) -> Iter<'a> {
        Iter {
            it: self.index.iter(),
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn indexed(pool: &mut StringPool, idx: &mut HashIndex, key: &str) -> Handle {
        let h = pool.add(key);
        idx.insert(pool, h).unwrap();
        h
    }

    /// Invariant: Duplicate keys are rejected and the index remains unchanged,
    /// even when the duplicate text lives under a different pool handle.
    #[test]
    fn duplicate_key_rejected() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::new();
        let h = indexed(&mut pool, &mut idx, "dup");
        let h2 = pool.add("dup");
        assert_eq!(idx.insert(&pool, h2), Err(CatalogError::DuplicateKey));
        assert_eq!(idx.find(&pool, "dup"), Some(h));
        assert_eq!(idx.len(), 1);
    }

    /// Invariant: a handle that does not resolve cannot be indexed.
    #[test]
    fn dead_handle_is_not_indexed() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::new();
        let h = pool.add("gone");
        pool.remove(h);
        assert_eq!(idx.insert(&pool, h), Err(CatalogError::NotFound));
        assert!(idx.is_empty());
    }

    /// Invariant: `find` yields the handle for present keys and `None` otherwise.
    #[test]
    fn find_present_and_absent() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::new();
        let present: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|k| (k, indexed(&mut pool, &mut idx, k)))
            .collect();
        for (k, h) in present {
            assert_eq!(idx.find(&pool, k), Some(h));
            assert!(idx.contains_key(&pool, k));
        }
        for k in ["x", "y", ""] {
            assert!(idx.find(&pool, k).is_none());
        }
    }

    /// Invariant: growth is reported on exactly the inserts that enlarged the
    /// table, and every handle stays reachable afterwards.
    #[test]
    fn growth_is_reported_and_preserves_entries() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::with_capacity(2);
        let mut resizes = 0;
        let mut handles = Vec::new();
        for i in 0..64 {
            let h = pool.add(&format!("k{i}"));
            let before = idx.capacity();
            let r = idx.insert(&pool, h).unwrap();
            assert_eq!(r.resized, idx.capacity() > before);
            if r.resized {
                resizes += 1;
            }
            handles.push(h);
        }
        assert!(resizes > 0);
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(idx.find(&pool, &format!("k{i}")), Some(h));
        }
    }

    /// Invariant: `remove` returns the stored handle once; the key is then absent
    /// and can be indexed again under a fresh handle.
    #[test]
    fn remove_then_reinsert() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::new();
        let h1 = indexed(&mut pool, &mut idx, "k");
        assert_eq!(idx.remove(&pool, "k"), Some(h1));
        assert_eq!(idx.remove(&pool, "k"), None);
        pool.remove(h1);
        assert!(!idx.contains_key(&pool, "k"));

        let h2 = indexed(&mut pool, &mut idx, "k");
        assert_ne!(h1, h2);
        assert_eq!(idx.find(&pool, "k"), Some(h2));
    }

    /// Invariant: iteration yields each live entry exactly once.
    #[test]
    fn iteration_covers_live_entries() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::new();
        for k in ["k1", "k2", "k3"] {
            indexed(&mut pool, &mut idx, k);
        }
        idx.remove(&pool, "k2");
        let seen: BTreeSet<&str> = idx.iter(&pool).map(|(k, _)| k).collect();
        assert_eq!(seen, BTreeSet::from(["k1", "k3"]));
        assert_eq!(idx.iter(&pool).count(), idx.len());
    }

    // Forces every key into the same probe sequence.
    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl core::hash::Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    /// Invariant: refilling a slot freed by `remove` is not reported as
    /// growth, even though the table's capacity dipped while it sat empty.
    #[test]
    fn reusing_freed_slot_is_not_growth() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::with_capacity_and_hasher(64, ConstBuildHasher);
        for i in 0..20 {
            let h = pool.add(&format!("k{i}"));
            assert!(!idx.insert(&pool, h).unwrap().resized);
        }
        let full = idx.capacity();
        let gone = idx.remove(&pool, "k3").unwrap();
        pool.remove(gone);
        assert!(idx.capacity() <= full);

        let h = pool.add("new");
        assert!(!idx.insert(&pool, h).unwrap().resized);
        assert_eq!(idx.capacity(), full);
        assert_eq!(idx.find(&pool, "new"), Some(h));
    }

    /// Invariant: lookups work under heavy hash collisions; equality through
    /// the pool resolves to the correct entry.
    #[test]
    fn collision_handling_with_const_hasher() {
        let mut pool = StringPool::new();
        let mut idx = HashIndex::with_hasher(ConstBuildHasher);
        let ha = pool.add("a");
        let hb = pool.add("b");
        idx.insert(&pool, ha).unwrap();
        idx.insert(&pool, hb).unwrap();

        assert_eq!(idx.find(&pool, "a"), Some(ha));
        assert_eq!(idx.find(&pool, "b"), Some(hb));
        assert_eq!(idx.remove(&pool, "a"), Some(ha));
        assert_eq!(idx.find(&pool, "b"), Some(hb));
        assert!(idx.find(&pool, "a").is_none());
    }
}
