use std::fmt;

use crate::ElementChange;

/// A change list that does not fit the sequences it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidChange {
    OldIndex { index: usize, len: usize },
    NewIndex { index: usize, len: usize },
    Position { index: usize, len: usize },
}

impl fmt::Display for InvalidChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidChange::OldIndex { index, len } => {
                write!(f, "old index {index} out of range (len {len})")
            }
            InvalidChange::NewIndex { index, len } => {
                write!(f, "new index {index} out of range (len {len})")
            }
            InvalidChange::Position { index, len } => {
                write!(f, "cannot place element at {index} in sequence of len {len}")
            }
        }
    }
}

impl std::error::Error for InvalidChange {}

/// Replays `changes` against `old`.
///
/// Every `Delete` and every `Move` source is removed first; then, ascending by
/// new index, `Insert(j)` places `new[j]` and `Move { from, to }` places
/// `old[from]` at position `to`.
pub fn apply<T: Clone>(
    old: &[T],
    new: &[T],
    changes: &[ElementChange],
) -> Result<Vec<T>, InvalidChange> {
    let mut removed = vec![false; old.len()];
    let mut placed: Vec<(usize, &T)> = Vec::new();
    for change in changes {
        match *change {
            ElementChange::Delete(index) => {
                *removed.get_mut(index).ok_or(InvalidChange::OldIndex {
                    index,
                    len: old.len(),
                })? = true;
            }
            ElementChange::Insert(index) => {
                let value = new.get(index).ok_or(InvalidChange::NewIndex {
                    index,
                    len: new.len(),
                })?;
                placed.push((index, value));
            }
            ElementChange::Move { from, to } => {
                *removed.get_mut(from).ok_or(InvalidChange::OldIndex {
                    index: from,
                    len: old.len(),
                })? = true;
                placed.push((to, &old[from]));
            }
        }
    }

    let mut out: Vec<T> = old
        .iter()
        .zip(&removed)
        .filter(|(_, removed)| !**removed)
        .map(|(value, _)| value.clone())
        .collect();
    placed.sort_by_key(|&(index, _)| index);
    for (index, value) in placed {
        if index > out.len() {
            return Err(InvalidChange::Position {
                index,
                len: out.len(),
            });
        }
        out.insert(index, value.clone());
    }
    Ok(out)
}

/// The `(old, new)` index pairs that `changes` leaves in place.
pub fn unchanged(old_len: usize, new_len: usize, changes: &[ElementChange]) -> Vec<(usize, usize)> {
    let mut old_touched = vec![false; old_len];
    let mut new_touched = vec![false; new_len];
    for change in changes {
        let (old, new) = match *change {
            ElementChange::Delete(i) => (Some(i), None),
            ElementChange::Insert(j) => (None, Some(j)),
            ElementChange::Move { from, to } => (Some(from), Some(to)),
        };
        if let Some(flag) = old.and_then(|i| old_touched.get_mut(i)) {
            *flag = true;
        }
        if let Some(flag) = new.and_then(|j| new_touched.get_mut(j)) {
            *flag = true;
        }
    }
    let olds = (0..old_len).filter(|&i| !old_touched[i]);
    let news = (0..new_len).filter(|&j| !new_touched[j]);
    olds.zip(news).collect()
}
