//! Relation: one many-to-many association kept in two mirrored PairIndex
//! views, artist→song (`Forward`) and song→artist (`Reverse`).
//!
//! `link` and `unlink` are the only mutators and always update both views,
//! so `(a, s)` is in the forward view iff `(s, a)` is in the reverse view.

use crate::pair_index::{Iter, Pair, PairIndex, WithPrimary};
use crate::string_pool::Handle;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Pairs are `(artist, song)`.
    Forward,
    /// Pairs are `(song, artist)`.
    Reverse,
}

#[derive(Debug, Default)]
pub struct Relation {
    forward: PairIndex,
    reverse: PairIndex,
}

impl Relation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.forward.len(), self.reverse.len());
        self.forward.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self, dir: Direction) -> &PairIndex {
        match dir {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }

    /// Raw access to one view, bypassing the mirroring. Lets tests build a
    /// diverged relation.
    #[cfg(test)]
    pub(crate) fn view_mut(&mut self, dir: Direction) -> &mut PairIndex {
        match dir {
            Direction::Forward => &mut self.forward,
            Direction::Reverse => &mut self.reverse,
        }
    }

    /// Record the association. Returns false, mutating nothing, if it exists.
    pub fn link(&mut self, artist: Handle, song: Handle) -> bool {
        let pair = Pair::new(artist, song);
        if self.forward.contains(pair) {
            return false;
        }
        self.forward.insert(pair);
        let mirrored = self.reverse.insert(pair.reversed());
        debug_assert!(mirrored, "reverse view already held an unmirrored pair");
        true
    }

    /// Remove the association, given from the `dir` side. Returns false,
    /// mutating nothing, unless both views hold it.
    pub fn unlink(&mut self, dir: Direction, pair: Pair) -> bool {
        let (this, other) = match dir {
            Direction::Forward => (&mut self.forward, &mut self.reverse),
            Direction::Reverse => (&mut self.reverse, &mut self.forward),
        };
        if !this.contains(pair) || !other.contains(pair.reversed()) {
            return false;
        }
        this.remove(pair);
        other.remove(pair.reversed());
        true
    }

    pub fn contains(&self, dir: Direction, pair: Pair) -> bool {
        self.view(dir).contains(pair)
    }

    /// Whether `key` still takes part in any association on the `dir` side.
    pub fn is_linked(&self, dir: Direction, key: Handle) -> bool {
        self.view(dir).has_primary(key)
    }

    pub fn first_link(&self, dir: Direction, key: Handle) -> Option<Pair> {
        self.view(dir).first_with_primary(key)
    }

    pub fn links(&self, dir: Direction, key: Handle) -> WithPrimary<'_> {
        self.view(dir).with_primary(key)
    }

    pub fn iter(&self, dir: Direction) -> Iter<'_> {
        self.view(dir).iter()
    }

    /// Full cross-check of the mirror invariant. Linear; meant for tests and
    /// debug assertions.
    pub fn is_mirrored(&self) -> bool {
        self.forward.len() == self.reverse.len()
            && self.forward.iter().all(|p| self.reverse.contains(p.reversed()))
    }
}
