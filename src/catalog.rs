//! Catalog: the artist/song association store.
//!
//! Owns one `StringPool`, a `HashIndex` per domain and the mirrored
//! `Relation`. Every public operation resolves keys through the hash
//! indices, updates the relation, and on removal reclaims keys that no
//! longer take part in any association. Each call leaves all four
//! structures mutually consistent, on success and on failure.

use crate::error::CatalogError;
use crate::hash_index::HashIndex;
use crate::pair_index::Pair;
use crate::relation::{Direction, Relation};
use crate::string_pool::{Handle, StringPool};
use core::fmt;
use core::hash::BuildHasher;
use core::str::FromStr;
use std::collections::hash_map::RandomState;
use tracing::{debug, info, trace};

/// Which side of the association a key belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Domain {
    Artist,
    Song,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Artist => "artist",
            Domain::Song => "song",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Domain::Artist => Domain::Song,
            Domain::Song => Domain::Artist,
        }
    }

    /// Relation view whose primaries are keys of this domain.
    pub fn direction(self) -> Direction {
        match self {
            Domain::Artist => Direction::Forward,
            Domain::Song => Direction::Reverse,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(Domain::Artist),
            "song" => Ok(Domain::Song),
            other => Err(CatalogError::UnknownDomain(other.to_string())),
        }
    }
}

/// Initial sizing. Everything grows on demand; these only avoid early
/// reallocation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CatalogConfig {
    /// Slots reserved in the string pool.
    pub pool_capacity: usize,
    /// Entries reserved in each hash index.
    pub index_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 16,
            index_capacity: 16,
        }
    }
}

impl CatalogConfig {
    pub fn pool_capacity(mut self, n: usize) -> Self {
        self.pool_capacity = n;
        self
    }

    pub fn index_capacity(mut self, n: usize) -> Self {
        self.index_capacity = n;
        self
    }
}

/// Outcome of a successful `Catalog::insert`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Insertion {
    /// The artist index grew while indexing a new artist.
    pub artist_resized: bool,
    /// The song index grew while indexing a new song.
    pub song_resized: bool,
}

/// Outcome of a successful `Catalog::delete`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Deletion {
    pub artist_reclaimed: bool,
    pub song_reclaimed: bool,
}

/// Outcome of a successful cascading removal.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cascade {
    pub pairs_removed: usize,
    /// Opposite-side keys whose last association went with the removed key.
    pub orphans_reclaimed: usize,
}

/// Every live key of one domain with its handle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Listing<'a> {
    pub count: usize,
    pub entries: Vec<(&'a str, Handle)>,
}

struct Interned {
    handle: Handle,
    created: bool,
    resized: bool,
}

pub struct Catalog<S = RandomState> {
    pool: StringPool,
    artists: HashIndex<S>,
    songs: HashIndex<S>,
    pub(crate) relation: Relation,
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Catalog<S>
where
    S: BuildHasher + Clone,
{
    pub fn with_config_and_hasher(config: CatalogConfig, hasher: S) -> Self {
        Self {
            pool: StringPool::with_capacity(config.pool_capacity),
            artists: HashIndex::with_capacity_and_hasher(config.index_capacity, hasher.clone()),
            songs: HashIndex::with_capacity_and_hasher(config.index_capacity, hasher),
            relation: Relation::new(),
        }
    }

    /// Number of recorded (artist, song) pairs.
    pub fn len(&self) -> usize {
        self.relation.len()
    }
    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    /// Number of strings currently held by the pool, across both domains.
    pub fn pooled_strings(&self) -> usize {
        self.pool.len()
    }

    fn index(&self, domain: Domain) -> &HashIndex<S> {
        match domain {
            Domain::Artist => &self.artists,
            Domain::Song => &self.songs,
        }
    }

    fn index_and_pool(&mut self, domain: Domain) -> (&mut HashIndex<S>, &mut StringPool) {
        match domain {
            Domain::Artist => (&mut self.artists, &mut self.pool),
            Domain::Song => (&mut self.songs, &mut self.pool),
        }
    }

    pub fn contains(&self, domain: Domain, key: &str) -> bool {
        self.index(domain).contains_key(&self.pool, key)
    }
    pub fn contains_artist(&self, artist: &str) -> bool {
        self.contains(Domain::Artist, artist)
    }
    pub fn contains_song(&self, song: &str) -> bool {
        self.contains(Domain::Song, song)
    }

    pub fn handle(&self, domain: Domain, key: &str) -> Option<Handle> {
        self.index(domain).find(&self.pool, key)
    }

    /// Resolve `key`, pooling and indexing it first if it is new.
    fn intern(&mut self, domain: Domain, key: &str) -> Result<Interned, CatalogError> {
        let (index, pool) = self.index_and_pool(domain);
        if let Some(handle) = index.find(pool, key) {
            return Ok(Interned {
                handle,
                created: false,
                resized: false,
            });
        }
        let handle = pool.add(key);
        match index.insert(pool, handle) {
            Ok(inserted) => {
                if inserted.resized {
                    info!(
                        %domain,
                        capacity = index.capacity(),
                        "{domain} hash table expanded in size"
                    );
                }
                Ok(Interned {
                    handle,
                    created: true,
                    resized: inserted.resized,
                })
            }
            Err(e) => {
                pool.remove(handle);
                Err(e)
            }
        }
    }

    /// Record `(artist, song)`. Fails with `DuplicatePair`, changing nothing,
    /// if the pair is already present.
    pub fn insert(&mut self, artist: &str, song: &str) -> Result<Insertion, CatalogError> {
        let a = self.intern(Domain::Artist, artist)?;
        let s = match self.intern(Domain::Song, song) {
            Ok(s) => s,
            Err(e) => {
                if a.created {
                    self.reclaim_if_orphan(Domain::Artist, a.handle)?;
                }
                return Err(e);
            }
        };
        if !self.relation.link(a.handle, s.handle) {
            debug_assert!(!a.created && !s.created, "fresh key already linked");
            return Err(CatalogError::DuplicatePair);
        }
        debug!(artist, song, "inserted pair");
        Ok(Insertion {
            artist_resized: a.resized,
            song_resized: s.resized,
        })
    }

    /// Remove the single pair `(artist, song)`, reclaiming either key once
    /// it has no association left.
    pub fn delete(&mut self, artist: &str, song: &str) -> Result<Deletion, CatalogError> {
        let a = self
            .handle(Domain::Artist, artist)
            .ok_or(CatalogError::NotFound)?;
        let s = self
            .handle(Domain::Song, song)
            .ok_or(CatalogError::NotFound)?;
        if !self.relation.unlink(Direction::Forward, Pair::new(a, s)) {
            return Err(CatalogError::NotFound);
        }
        let deletion = Deletion {
            artist_reclaimed: self.reclaim_if_orphan(Domain::Artist, a)?,
            song_reclaimed: self.reclaim_if_orphan(Domain::Song, s)?,
        };
        debug!(artist, song, ?deletion, "deleted pair");
        Ok(deletion)
    }

    pub fn remove_artist(&mut self, artist: &str) -> Result<Cascade, CatalogError> {
        self.remove_key(Domain::Artist, artist)
    }

    pub fn remove_song(&mut self, song: &str) -> Result<Cascade, CatalogError> {
        self.remove_key(Domain::Song, song)
    }

    /// Remove `key` with every pair it takes part in. Opposite-side keys left
    /// without any association are reclaimed along the way.
    ///
    /// Each step re-queries the relation after the previous removal has
    /// completed in both views; no traversal is held across a mutation.
    pub fn remove_key(&mut self, domain: Domain, key: &str) -> Result<Cascade, CatalogError> {
        let handle = self.handle(domain, key).ok_or(CatalogError::NotFound)?;
        let dir = domain.direction();
        let mut cascade = Cascade::default();
        while let Some(pair) = self.relation.first_link(dir, handle) {
            if !self.relation.unlink(dir, pair) {
                debug_assert!(false, "pair present in one view only");
                return Err(CatalogError::Inconsistent("pair present in one view only"));
            }
            cascade.pairs_removed += 1;
            if self.reclaim_if_orphan(domain.other(), pair.secondary)? {
                cascade.orphans_reclaimed += 1;
            }
        }
        self.reclaim(domain, handle)?;
        debug!(%domain, key, ?cascade, "removed key");
        Ok(cascade)
    }

    /// Reclaim `handle` if nothing in the relation references it any more.
    fn reclaim_if_orphan(&mut self, domain: Domain, handle: Handle) -> Result<bool, CatalogError> {
        if self.relation.is_linked(domain.direction(), handle) {
            return Ok(false);
        }
        self.reclaim(domain, handle)?;
        Ok(true)
    }

    fn reclaim(&mut self, domain: Domain, handle: Handle) -> Result<(), CatalogError> {
        let (index, pool) = self.index_and_pool(domain);
        let Some(key) = pool.get(handle) else {
            debug_assert!(false, "indexed handle missing from pool");
            return Err(CatalogError::Inconsistent("indexed handle missing from pool"));
        };
        if index.remove(pool, key) != Some(handle) {
            debug_assert!(false, "hash index disagrees with pool");
            return Err(CatalogError::Inconsistent("hash index disagrees with pool"));
        }
        let text = pool.remove(handle);
        trace!(%domain, key = ?text, "reclaimed key");
        Ok(())
    }

    /// Text of a handle the relation refers to. Such a handle is always
    /// pooled; a miss is skipped in release builds.
    fn linked_text(&self, handle: Handle) -> Option<&str> {
        let text = self.pool.get(handle);
        debug_assert!(text.is_some(), "linked handle missing from pool");
        text
    }

    /// Keys associated with `key`, taken from the opposite domain, in
    /// handle order. Empty when `key` is unknown.
    pub fn list(&self, domain: Domain, key: &str) -> Vec<&str> {
        let Some(handle) = self.handle(domain, key) else {
            return Vec::new();
        };
        self.relation
            .links(domain.direction(), handle)
            .filter_map(|p| self.linked_text(p.secondary))
            .collect()
    }

    pub fn list_artist(&self, artist: &str) -> Vec<&str> {
        self.list(Domain::Artist, artist)
    }

    pub fn list_song(&self, song: &str) -> Vec<&str> {
        self.list(Domain::Song, song)
    }

    /// Every live key of `domain` with its handle, in index order.
    pub fn enumerate(&self, domain: Domain) -> Listing<'_> {
        let index = self.index(domain);
        Listing {
            count: index.len(),
            entries: index.iter(&self.pool).collect(),
        }
    }

    /// The whole relation as text pairs, ordered by the `dir` view.
    pub fn pairs(&self, dir: Direction) -> Vec<(&str, &str)> {
        self.relation
            .iter(dir)
            .filter_map(|p| Some((self.linked_text(p.primary)?, self.linked_text(p.secondary)?)))
            .collect()
    }

    /// Cross-check every structure against the others.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.relation.is_mirrored() {
            return Err(CatalogError::Inconsistent("relation views diverge"));
        }
        if self.pool.len() != self.artists.len() + self.songs.len() {
            return Err(CatalogError::Inconsistent("pool holds unindexed strings"));
        }
        for domain in [Domain::Artist, Domain::Song] {
            let index = self.index(domain);
            for handle in index.handles() {
                if !self.pool.contains(handle) {
                    return Err(CatalogError::Inconsistent("indexed handle missing from pool"));
                }
                if !self.relation.is_linked(domain.direction(), handle) {
                    return Err(CatalogError::Inconsistent("indexed key without associations"));
                }
            }
        }
        for pair in self.relation.iter(Direction::Forward) {
            let indexed = |domain: Domain, h: Handle| {
                self.pool
                    .get(h)
                    .and_then(|k| self.index(domain).find(&self.pool, k))
                    == Some(h)
            };
            if !indexed(Domain::Artist, pair.primary) || !indexed(Domain::Song, pair.secondary) {
                return Err(CatalogError::Inconsistent("pair references unindexed key"));
            }
        }
        Ok(())
    }
}

/// Artist-ordered dump of the relation, one `|artist| |song|` line per pair.
impl<S> fmt::Display for Catalog<S>
where
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (artist, song) in self.pairs(Direction::Forward) {
            writeln!(f, "|{artist}| |{song}|")?;
        }
        Ok(())
    }
}
