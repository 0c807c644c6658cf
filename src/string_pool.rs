//! StringPool: arena of strings addressed by stable generational handles.

use core::fmt;
use slotmap::{DefaultKey, Key, SlotMap};

/// Opaque reference to a pooled string.
///
/// Ordering follows the underlying slot key and only exists so handles can
/// be grouped inside ordered indices; it carries no meaning of its own.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    /// Slot index inside the pool. Reused slots share an index but never a
    /// handle, since the generation differs.
    pub fn index(&self) -> u32 {
        (self.0.data().as_ffi() & 0xffff_ffff) as u32
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Compact string storage. Each `add` stores its text exactly once; removed
/// slots go onto the free list and are reused by later adds.
#[derive(Debug, Default)]
pub struct StringPool {
    slots: SlotMap<DefaultKey, Box<str>>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Store `value` and return a fresh handle for it.
    pub fn add(&mut self, value: &str) -> Handle {
        Handle::new(self.slots.insert(value.into()))
    }

    pub fn get(&self, handle: Handle) -> Option<&str> {
        self.slots.get(handle.raw_handle()).map(|s| &**s)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.slots.contains_key(handle.raw_handle())
    }

    /// Invalidate `handle`, handing back the text it referenced.
    pub fn remove(&mut self, handle: Handle) -> Option<Box<str>> {
        self.slots.remove(handle.raw_handle())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &str)> {
        self.slots.iter().map(|(k, s)| (Handle::new(k), &**s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: each add yields a distinct handle, even for equal text.
    #[test]
    fn add_same_text_twice_gives_distinct_handles() {
        let mut p = StringPool::new();
        let a = p.add("Queen");
        let b = p.add("Queen");
        assert_ne!(a, b);
        assert_eq!(p.get(a), Some("Queen"));
        assert_eq!(p.get(b), Some("Queen"));
        assert_eq!(p.len(), 2);
    }

    /// Invariant: a removed handle never resolves again, including after its
    /// slot has been reused by a later add.
    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let mut p = StringPool::new();
        let h1 = p.add("old");
        assert_eq!(p.remove(h1).as_deref(), Some("old"));
        let h2 = p.add("new");
        assert_eq!(h1.index(), h2.index(), "freed slot is reused");
        assert_ne!(h1, h2);
        assert!(p.get(h1).is_none());
        assert!(!p.contains(h1));
        assert_eq!(p.get(h2), Some("new"));
    }

    /// Invariant: removing twice is a no-op the second time.
    #[test]
    fn double_remove_returns_none() {
        let mut p = StringPool::new();
        let h = p.add("x");
        assert!(p.remove(h).is_some());
        assert!(p.remove(h).is_none());
        assert!(p.is_empty());
    }

    /// Invariant: growth past the initial capacity keeps every live handle valid.
    #[test]
    fn handles_survive_growth() {
        let mut p = StringPool::with_capacity(2);
        let hs: Vec<_> = (0..100).map(|i| (i, p.add(&format!("s{i}")))).collect();
        assert!(p.capacity() >= 100);
        for (i, h) in hs {
            assert_eq!(p.get(h), Some(format!("s{i}").as_str()));
        }
    }

    #[test]
    fn display_prints_slot_index() {
        let mut p = StringPool::new();
        let h = p.add("a");
        assert_eq!(h.to_string(), h.index().to_string());
    }
}
