//! Lifting index-level diffs to [`DataChange`] events.
//!
//! The produced events are ordered so that replaying them in sequence on the
//! old state yields the new state: deletions first, then insertions and moves
//! from the last new position to the first, each anchored before the item
//! that follows it in the new order.

use datasource_diff::{diff_by, unchanged, ElementChange};

use crate::change::{DataChange, ItemAnchor, SectionAnchor};
use crate::section::{has_repeats, Item, Section};

/// Item-level events turning `old` into `new` within section `section`.
///
/// Items paired by `same_item` whose values still differ are delivered as a
/// delete plus an insert, so that a consumer holding the old values ends up
/// with exactly the new ones.
pub fn item_changes<I, F>(
    old: &[I],
    new: &[I],
    same_item: F,
    find_moves: bool,
    section: usize,
) -> Vec<DataChange<I>>
where
    I: Item,
    F: Fn(&I, &I) -> bool,
{
    let edits = item_edits(old, new, same_item, find_moves, section);
    let mut out = Vec::new();
    if !edits.removed.is_empty() {
        out.push(DataChange::DeleteItems(edits.removed));
    }
    out.extend(edits.placements);
    out
}

/// Removed items, and the insertions and moves to replay once every removal
/// across the affected sections has been applied.
struct ItemEdits<I> {
    removed: Vec<I>,
    placements: Vec<DataChange<I>>,
}

fn item_edits<I, F>(
    old: &[I],
    new: &[I],
    same_item: F,
    find_moves: bool,
    section: usize,
) -> ItemEdits<I>
where
    I: Item,
    F: Fn(&I, &I) -> bool,
{
    let changes = diff_by(old, new, same_item, find_moves);

    let mut deleted = vec![false; old.len()];
    let mut inserted = vec![false; new.len()];
    let mut moved = vec![false; new.len()];
    for change in &changes {
        match *change {
            ElementChange::Delete(i) => deleted[i] = true,
            ElementChange::Insert(j) => inserted[j] = true,
            ElementChange::Move { from, to } if old[from] == new[to] => moved[to] = true,
            ElementChange::Move { from, to } => {
                deleted[from] = true;
                inserted[to] = true;
            }
        }
    }
    for (i, j) in unchanged(old.len(), new.len(), &changes) {
        if old[i] != new[j] {
            deleted[i] = true;
            inserted[j] = true;
        }
    }

    let removed: Vec<I> = old
        .iter()
        .zip(&deleted)
        .filter(|(_, deleted)| **deleted)
        .map(|(item, _)| item.clone())
        .collect();

    let mut placements = Vec::new();
    let mut j = new.len();
    while j > 0 {
        j -= 1;
        if moved[j] {
            placements.push(DataChange::MoveItem {
                item: new[j].clone(),
                at: ItemAnchor::at(new, j + 1, section),
            });
        } else if inserted[j] {
            let end = j;
            while j > 0 && inserted[j - 1] {
                j -= 1;
            }
            placements.push(DataChange::InsertItems {
                items: new[j..=end].to_vec(),
                at: ItemAnchor::at(new, end + 1, section),
            });
        }
    }
    ItemEdits {
        removed,
        placements,
    }
}

/// Section- and item-level events turning `old` into `new`.
///
/// Sections are paired by `same_section` without move detection (a moved
/// section is deleted and re-inserted). Unpaired old sections are deleted
/// first, then items removed from paired sections, then items placed into
/// paired sections, which by then sit at their rank among the paired ones.
/// Unpaired new sections are inserted next, and paired sections whose
/// supplementary payload changed are reloaded last. An item may change
/// section: its removal is always replayed before its insertion.
///
/// When either side holds two equal sections, a single `Apply` of `new` is
/// returned instead.
pub fn section_changes<I, S, F>(
    old: &[Section<I>],
    new: &[Section<I>],
    same_section: S,
    same_item: F,
) -> Vec<DataChange<I>>
where
    I: Item,
    S: Fn(&Section<I>, &Section<I>) -> bool,
    F: Fn(&I, &I) -> bool,
{
    if has_repeats(old) || has_repeats(new) {
        return if identical(old, new) {
            Vec::new()
        } else {
            vec![DataChange::Apply(new.to_vec())]
        };
    }

    let changes = diff_by(old, new, same_section, false);
    let kept = unchanged(old.len(), new.len(), &changes);

    let mut old_kept = vec![false; old.len()];
    let mut new_kept = vec![false; new.len()];
    for &(o, n) in &kept {
        old_kept[o] = true;
        new_kept[n] = true;
    }

    let mut out = Vec::new();
    let removed: Vec<Section<I>> = old
        .iter()
        .zip(&old_kept)
        .filter(|(_, kept)| !**kept)
        .map(|(section, _)| section.clone())
        .collect();
    if !removed.is_empty() {
        out.push(DataChange::DeleteSections(removed));
    }

    let mut removed_items = Vec::new();
    let mut placements = Vec::new();
    for (rank, &(o, n)) in kept.iter().enumerate() {
        let edits = item_edits(&old[o].items, &new[n].items, &same_item, true, rank);
        removed_items.extend(edits.removed);
        placements.extend(edits.placements);
    }
    if !removed_items.is_empty() {
        out.push(DataChange::DeleteItems(removed_items));
    }
    out.extend(placements);

    let mut j = new.len();
    while j > 0 {
        j -= 1;
        if new_kept[j] {
            continue;
        }
        let end = j;
        while j > 0 && !new_kept[j - 1] {
            j -= 1;
        }
        let at = match new.get(end + 1) {
            Some(next) => SectionAnchor::Before(next.clone()),
            None => SectionAnchor::At(kept.len()),
        };
        out.push(DataChange::InsertSections {
            sections: new[j..=end].to_vec(),
            at,
        });
    }

    let reloaded: Vec<Section<I>> = kept
        .iter()
        .filter(|&&(o, n)| old[o].supplementary != new[n].supplementary)
        .map(|&(_, n)| new[n].clone())
        .collect();
    if !reloaded.is_empty() {
        out.push(DataChange::ReloadSections(reloaded));
    }
    out
}

/// Equal items and equal supplementary payload, section by section.
pub(crate) fn identical<I: Item>(old: &[Section<I>], new: &[Section<I>]) -> bool {
    old.len() == new.len()
        && old
            .iter()
            .zip(new)
            .all(|(a, b)| a == b && a.supplementary == b.supplementary)
}
