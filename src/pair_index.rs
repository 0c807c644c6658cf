//! PairIndex: ordered set of `(primary, secondary)` handle pairs.
//!
//! Entries sharing a primary are stored as one group, so "any pair with this
//! primary" is a direct lookup rather than a probe with a wildcard
//! secondary. Traversal order is primary ascending, then secondary
//! ascending.

use crate::string_pool::Handle;
use std::collections::{btree_map, btree_set, BTreeMap, BTreeSet};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Pair {
    pub primary: Handle,
    pub secondary: Handle,
}

impl Pair {
    pub fn new(primary: Handle, secondary: Handle) -> Self {
        Self { primary, secondary }
    }

    /// The same association seen from the other side.
    pub fn reversed(self) -> Self {
        Self::new(self.secondary, self.primary)
    }
}

#[derive(Debug, Default)]
pub struct PairIndex {
    groups: BTreeMap<Handle, BTreeSet<Handle>>,
    len: usize,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns false, leaving the index untouched, if `pair` is already present.
    pub fn insert(&mut self, pair: Pair) -> bool {
        let inserted = self
            .groups
            .entry(pair.primary)
            .or_default()
            .insert(pair.secondary);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    pub fn contains(&self, pair: Pair) -> bool {
        self.groups
            .get(&pair.primary)
            .is_some_and(|g| g.contains(&pair.secondary))
    }

    pub fn find(&self, pair: Pair) -> Option<Pair> {
        self.contains(pair).then_some(pair)
    }

    pub fn remove(&mut self, pair: Pair) -> Option<Pair> {
        let btree_map::Entry::Occupied(mut group) = self.groups.entry(pair.primary) else {
            return None;
        };
        if !group.get_mut().remove(&pair.secondary) {
            return None;
        }
        // Empty groups are dropped so `has_primary` stays exact.
        if group.get().is_empty() {
            group.remove();
        }
        self.len -= 1;
        Some(pair)
    }

    pub fn has_primary(&self, primary: Handle) -> bool {
        self.groups.contains_key(&primary)
    }

    /// Smallest pair whose primary is `primary`, if any.
    pub fn first_with_primary(&self, primary: Handle) -> Option<Pair> {
        self.groups
            .get(&primary)
            .and_then(|g| g.first())
            .map(|&s| Pair::new(primary, s))
    }

    /// All pairs with the given primary, in secondary order.
    pub fn with_primary(&self, primary: Handle) -> WithPrimary<'_> {
        WithPrimary {
            primary,
            it: self.groups.get(&primary).map(|g| g.iter()),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            groups: self.groups.iter(),
            current: None,
            remaining: self.len,
        }
    }
}

impl<'a> IntoIterator for &'a PairIndex {
    type Item = Pair;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order traversal over every pair.
pub struct Iter<'a> {
    groups: btree_map::Iter<'a, Handle, BTreeSet<Handle>>,
    current: Option<(Handle, btree_set::Iter<'a, Handle>)>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Pair;

    fn next(&mut self) -> Option<Pair> {
        loop {
            if let Some((primary, it)) = &mut self.current {
                if let Some(&secondary) = it.next() {
                    self.remaining -= 1;
                    return Some(Pair::new(*primary, secondary));
                }
            }
            let (&primary, group) = self.groups.next()?;
            self.current = Some((primary, group.iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Traversal over one primary's group.
pub struct WithPrimary<'a> {
    primary: Handle,
    it: Option<btree_set::Iter<'a, Handle>>,
}

impl<'a> Iterator for WithPrimary<'a> {
    type Item = Pair;

    #[inline]
    fn next(&mut self) -> Option<Pair> {
        let secondary = *self.it.as_mut()?.next()?;
        Some(Pair::new(self.primary, secondary))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.as_ref().map_or((0, Some(0)), |it| it.size_hint())
    }
}
