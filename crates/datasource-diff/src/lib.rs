//! datasource-diff - ordered sequence diffing with move detection.
//!
//! Produces the index-level edit script between two sequences:
//! - `detect_moves = true`: Heckel's unique-element matching, widened to
//!   neighbouring equal elements, with a longest increasing subsequence
//!   deciding which matches stay in place and which become moves;
//! - `detect_moves = false`: an exact longest common subsequence (Myers'
//!   bisection), so every displaced element is a delete plus an insert.
//!
//! Changes are always ordered: deletes by ascending old index, then inserts
//! by ascending new index, then moves by ascending new index.

mod apply;
mod heckel;
mod lis;
mod myers;

use std::collections::HashMap;
use std::hash::Hash;

pub use apply::{apply, unchanged, InvalidChange};

// ── Types ─────────────────────────────────────────────────────────────────

/// A single index-level edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementChange {
    /// Remove the element at this old index.
    Delete(usize),
    /// Insert the element found at this new index.
    Insert(usize),
    /// The element at old index `from` ends up at new index `to`.
    Move { from: usize, to: usize },
}

impl ElementChange {
    pub fn is_move(&self) -> bool {
        matches!(self, ElementChange::Move { .. })
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Diff two sequences using `PartialEq`.
pub fn diff<T: PartialEq>(old: &[T], new: &[T], detect_moves: bool) -> Vec<ElementChange> {
    diff_by(old, new, |a, b| a == b, detect_moves)
}

/// Diff two sequences under a caller-supplied equivalence.
///
/// `equals` must be reflexive, symmetric and transitive. Elements are grouped
/// into classes by a linear scan over class representatives, so this is
/// quadratic in the number of distinct classes; prefer [`diff_by_key`] when a
/// hashable identity is available.
pub fn diff_by<'a, T, F>(
    old: &'a [T],
    new: &'a [T],
    equals: F,
    detect_moves: bool,
) -> Vec<ElementChange>
where
    F: Fn(&T, &T) -> bool,
{
    let mut representatives: Vec<&'a T> = Vec::new();
    let mut class_of = |value: &'a T| {
        debug_assert!(equals(value, value), "equivalence must be reflexive");
        match representatives.iter().position(|rep| equals(*rep, value)) {
            Some(class) => class,
            None => {
                representatives.push(value);
                representatives.len() - 1
            }
        }
    };
    let old_classes: Vec<usize> = old.iter().map(&mut class_of).collect();
    let new_classes: Vec<usize> = new.iter().map(&mut class_of).collect();
    diff_classes(&old_classes, &new_classes, detect_moves)
}

/// Diff two sequences by a hashable identity projection.
pub fn diff_by_key<T, K, F>(old: &[T], new: &[T], key: F, detect_moves: bool) -> Vec<ElementChange>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut classes: HashMap<K, usize> = HashMap::new();
    let mut class_of = |value: &T| {
        let next = classes.len();
        *classes.entry(key(value)).or_insert(next)
    };
    let old_classes: Vec<usize> = old.iter().map(&mut class_of).collect();
    let new_classes: Vec<usize> = new.iter().map(&mut class_of).collect();
    diff_classes(&old_classes, &new_classes, detect_moves)
}

// ── Internals ─────────────────────────────────────────────────────────────

fn diff_classes(old: &[usize], new: &[usize], detect_moves: bool) -> Vec<ElementChange> {
    if old == new {
        return Vec::new();
    }
    let matches = if detect_moves {
        heckel::matches(old, new)
    } else {
        myers::common_subsequence(old, new)
    };
    changes_from_matches(old.len(), new.len(), &matches)
}

/// `matches` holds `(old, new)` pairs ordered by new index. Pairs on the
/// longest increasing run of old indices stay put; the rest are moves.
fn changes_from_matches(
    old_len: usize,
    new_len: usize,
    matches: &[(usize, usize)],
) -> Vec<ElementChange> {
    let old_indices: Vec<usize> = matches.iter().map(|&(o, _)| o).collect();
    let stable = lis::longest_increasing(&old_indices);

    let mut old_matched = vec![false; old_len];
    let mut new_matched = vec![false; new_len];
    for &(o, n) in matches {
        old_matched[o] = true;
        new_matched[n] = true;
    }

    let deletes = (0..old_len)
        .filter(|&i| !old_matched[i])
        .map(ElementChange::Delete);
    let inserts = (0..new_len)
        .filter(|&j| !new_matched[j])
        .map(ElementChange::Insert);
    let moves = matches
        .iter()
        .zip(&stable)
        .filter(|(_, keep)| !**keep)
        .map(|(&(from, to), _)| ElementChange::Move { from, to });

    deletes.chain(inserts).chain(moves).collect()
}
