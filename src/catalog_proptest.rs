#![cfg(test)]

// Property tests for Catalog kept inside the crate so they can reach the
// relation views directly.

use crate::catalog::{Catalog, Domain};
use crate::error::CatalogError;
use crate::pair_index::Pair;
use crate::relation::Direction;
use proptest::prelude::*;
use std::collections::BTreeSet;

// Pool-indexed operations: indices shrink to earlier names and op lists
// shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, usize),
    Delete(usize, usize),
    RemoveArtist(usize),
    RemoveSong(usize),
    ListArtist(usize),
    ListSong(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<Op>)> {
    (
        proptest::collection::vec("[a-c]{1,2}", 1..=5),
        proptest::collection::vec("[a-c]{1,2}", 1..=5),
    )
        .prop_flat_map(|(artists, songs)| {
            let a = 0..artists.len();
            let s = 0..songs.len();
            let op = prop_oneof![
                4 => (a.clone(), s.clone()).prop_map(|(a, s)| Op::Insert(a, s)),
                2 => (a.clone(), s.clone()).prop_map(|(a, s)| Op::Delete(a, s)),
                1 => a.clone().prop_map(Op::RemoveArtist),
                1 => s.clone().prop_map(Op::RemoveSong),
                1 => a.prop_map(Op::ListArtist),
                1 => s.prop_map(Op::ListSong),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (artists.clone(), songs.clone(), ops))
        })
}

fn model_keys(model: &BTreeSet<(String, String)>, domain: Domain) -> BTreeSet<String> {
    model
        .iter()
        .map(|(a, s)| match domain {
            Domain::Artist => a.clone(),
            Domain::Song => s.clone(),
        })
        .collect()
}

// Property: state-machine equivalence against a set of text pairs.
// Invariants exercised across random operation sequences:
// - insert succeeds iff the pair is new; delete iff it exists; cascading
//   removal iff the key has any pair, and it removes all of them.
// - listings equal the model's neighbours of the key.
// - after every op: validate() holds (mirror invariant, index/pool
//   agreement), the live key sets equal the model's, and the pool holds
//   exactly one string per live key, so nothing leaks.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((artists, songs, ops) in arb_scenario()) {
        let mut sut = Catalog::new();
        let mut model: BTreeSet<(String, String)> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(a, s) => {
                    let pair = (artists[a].clone(), songs[s].clone());
                    let fresh = !model.contains(&pair);
                    match sut.insert(&pair.0, &pair.1) {
                        Ok(_) => prop_assert!(fresh, "insert must fail on duplicate"),
                        Err(e) => {
                            prop_assert_eq!(e, CatalogError::DuplicatePair);
                            prop_assert!(!fresh);
                        }
                    }
                    model.insert(pair);
                }
                Op::Delete(a, s) => {
                    let pair = (artists[a].clone(), songs[s].clone());
                    let present = model.remove(&pair);
                    let res = sut.delete(&pair.0, &pair.1);
                    prop_assert_eq!(res.is_ok(), present);
                    if let Ok(d) = res {
                        prop_assert_eq!(d.artist_reclaimed, !model.iter().any(|p| p.0 == pair.0));
                        prop_assert_eq!(d.song_reclaimed, !model.iter().any(|p| p.1 == pair.1));
                    }
                }
                Op::RemoveArtist(a) => {
                    let name = &artists[a];
                    let before = model.len();
                    model.retain(|p| &p.0 != name);
                    let removed = before - model.len();
                    match sut.remove_artist(name) {
                        Ok(c) => prop_assert_eq!(c.pairs_removed, removed),
                        Err(e) => {
                            prop_assert_eq!(e, CatalogError::NotFound);
                            prop_assert_eq!(removed, 0);
                        }
                    }
                    let h = sut.handle(Domain::Artist, name);
                    prop_assert!(h.is_none());
                }
                Op::RemoveSong(s) => {
                    let name = &songs[s];
                    let before = model.len();
                    model.retain(|p| &p.1 != name);
                    let removed = before - model.len();
                    match sut.remove_song(name) {
                        Ok(c) => prop_assert_eq!(c.pairs_removed, removed),
                        Err(e) => {
                            prop_assert_eq!(e, CatalogError::NotFound);
                            prop_assert_eq!(removed, 0);
                        }
                    }
                }
                Op::ListArtist(a) => {
                    let name = &artists[a];
                    let got: BTreeSet<&str> = sut.list_artist(name).into_iter().collect();
                    let want: BTreeSet<&str> =
                        model.iter().filter(|p| &p.0 == name).map(|p| p.1.as_str()).collect();
                    prop_assert_eq!(got, want);
                }
                Op::ListSong(s) => {
                    let name = &songs[s];
                    let got: BTreeSet<&str> = sut.list_song(name).into_iter().collect();
                    let want: BTreeSet<&str> =
                        model.iter().filter(|p| &p.1 == name).map(|p| p.0.as_str()).collect();
                    prop_assert_eq!(got, want);
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.validate(), Ok(()));
            prop_assert_eq!(sut.len(), model.len());
            for domain in [Domain::Artist, Domain::Song] {
                let listing = sut.enumerate(domain);
                let live: BTreeSet<String> =
                    listing.entries.iter().map(|(k, _)| k.to_string()).collect();
                prop_assert_eq!(listing.count, listing.entries.len());
                prop_assert_eq!(live, model_keys(&model, domain));
            }
            let keys = model_keys(&model, Domain::Artist).len() + model_keys(&model, Domain::Song).len();
            prop_assert_eq!(sut.pooled_strings(), keys);
        }

        // Mirror invariant, checked pair by pair on the final state.
        for p in sut.relation.iter(Direction::Forward) {
            prop_assert!(sut.relation.contains(Direction::Reverse, p.reversed()));
        }
        for p in sut.relation.iter(Direction::Reverse) {
            prop_assert!(sut.relation.contains(Direction::Forward, Pair::new(p.secondary, p.primary)));
        }
    }
}
