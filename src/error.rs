//! Error taxonomy shared by every layer.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A key, or the pair built from two keys, is not present.
    #[error("not found")]
    NotFound,

    /// The (artist, song) pair is already recorded.
    #[error("pair already present")]
    DuplicatePair,

    /// A hash index already holds an entry for this key.
    #[error("key already indexed")]
    DuplicateKey,

    #[error("unknown domain `{0}`, expected `artist` or `song`")]
    UnknownDomain(String),

    /// An internal structure disagreed with another one. Only reachable if
    /// the cross-structure invariants were broken; debug builds assert first.
    #[error("internal consistency violation: {0}")]
    Inconsistent(&'static str),
}
