//! songbook: an in-memory, many-to-many association between two string
//! domains, artists and songs, navigable from either side.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep four independent structures mutually consistent under
//!   insert and cascading delete, while storing each string once and
//!   freeing it when its last association disappears.
//! - Layers:
//!   - StringPool: arena of strings behind generational `Handle`s. A freed
//!     slot is reused, but a stale handle never resolves again.
//!   - HashIndex<S>: open-addressed key → handle map. Slots hold only the
//!     handle and its precomputed hash; key text is compared through the
//!     pool, so it is never stored twice.
//!   - PairIndex: ordered `(primary, secondary)` handle pairs grouped by
//!     primary, with explicit prefix queries ("does this primary have any
//!     pair left").
//!   - Relation: two PairIndex views (artist→song, song→artist). Its only
//!     mutators write both, so the views are mirror images by construction.
//!   - Catalog<S>: public API. Resolves keys, updates the relation and
//!     reclaims keys that lost their last association.
//!
//! Constraints
//! - Single-threaded and synchronous; `&mut self` on every mutator.
//! - Absence is `Option::None`/`CatalogError::NotFound`, never a sentinel
//!   handle.
//! - Cascading removal re-queries the relation after every completed
//!   removal and never keeps a traversal alive across a mutation (the
//!   borrow checker rejects it anyway).
//!
//! Failure semantics
//! - `NotFound`, `DuplicatePair` and `UnknownDomain` are ordinary outcomes
//!   and leave the catalog untouched.
//! - `Inconsistent` means two structures disagree. Debug builds assert;
//!   release builds abort the running cascade and return the error, keeping
//!   every mirrored update already made.
//! - Allocation failure aborts the process, as everywhere in `std`.
//!
//! Logging
//! - `tracing` events: `info` when a hash index grows, `debug` per
//!   successful mutation, `trace` per reclaimed key. No subscriber is
//!   installed here.

mod catalog;
mod catalog_proptest;
pub mod error;
pub mod hash_index;
pub mod pair_index;
pub mod relation;
pub mod string_pool;

// Public surface
pub use catalog::{Cascade, Catalog, CatalogConfig, Deletion, Domain, Insertion, Listing};
pub use error::CatalogError;
pub use relation::Direction;
pub use string_pool::Handle;
