//! Change events emitted by data sources.
//!
//! Payloads identify items and sections by value. The only positional fields
//! are [`ItemAnchor::EndOfSection`], [`SectionAnchor::At`] and
//! [`DataChange::MoveSection`]'s `to`; composition nodes rewrite exactly
//! these when they forward a child's events.

use serde::{Deserialize, Serialize};

use crate::error::ApplyError;
use crate::section::{Item, Section};
use crate::target::DataChangeTarget;

/// Where inserted or moved items land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAnchor<I> {
    /// Immediately before this (present) item.
    Before(I),
    /// At the end of the section with this index.
    EndOfSection(usize),
}

impl<I: Clone> ItemAnchor<I> {
    /// Anchor for a position in `items`: the item currently there, or the end
    /// of `section` when `index` is past the last item.
    pub fn at(items: &[I], index: usize, section: usize) -> Self {
        match items.get(index) {
            Some(item) => ItemAnchor::Before(item.clone()),
            None => ItemAnchor::EndOfSection(section),
        }
    }

    fn remap(&self, f: &dyn Fn(usize) -> usize) -> Self {
        match self {
            ItemAnchor::Before(item) => ItemAnchor::Before(item.clone()),
            ItemAnchor::EndOfSection(section) => ItemAnchor::EndOfSection(f(*section)),
        }
    }
}

/// Where inserted sections land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionAnchor<I> {
    /// Immediately before this (present) section.
    Before(Section<I>),
    /// At this section position; used when no section follows.
    At(usize),
}

impl<I: Clone> SectionAnchor<I> {
    pub fn at(sections: &[Section<I>], index: usize) -> Self {
        match sections.get(index) {
            Some(section) => SectionAnchor::Before(section.clone()),
            None => SectionAnchor::At(index),
        }
    }

    fn remap(&self, f: &dyn Fn(usize) -> usize) -> Self {
        match self {
            SectionAnchor::Before(section) => SectionAnchor::Before(section.clone()),
            SectionAnchor::At(index) => SectionAnchor::At(f(*index)),
        }
    }
}

/// One atomic transition between two snapshots of a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataChange<I> {
    /// Replace everything with these sections.
    Apply(Vec<Section<I>>),
    InsertItems { items: Vec<I>, at: ItemAnchor<I> },
    DeleteItems(Vec<I>),
    /// Same identity, new presentation.
    ReloadItems(Vec<I>),
    InsertSections {
        sections: Vec<Section<I>>,
        at: SectionAnchor<I>,
    },
    DeleteSections(Vec<Section<I>>),
    /// Same items, new supplementary payload.
    ReloadSections(Vec<Section<I>>),
    /// Move `section` so that it ends up at index `to`.
    MoveSection { section: Section<I>, to: usize },
    MoveItem { item: I, at: ItemAnchor<I> },
    /// Applied in listed order.
    Batch(Vec<DataChange<I>>),
}

impl<I: Item> DataChange<I> {
    /// Replays this change on `target`. A batch stops at its first failing
    /// member.
    pub fn apply_to<T>(&self, target: &mut T) -> Result<(), ApplyError>
    where
        T: DataChangeTarget<I> + ?Sized,
    {
        match self {
            DataChange::Apply(sections) => target.apply_sections(sections),
            DataChange::InsertItems { items, at } => target.insert_items(items, at),
            DataChange::DeleteItems(items) => target.delete_items(items),
            DataChange::ReloadItems(items) => target.reload_items(items),
            DataChange::InsertSections { sections, at } => target.insert_sections(sections, at),
            DataChange::DeleteSections(sections) => target.delete_sections(sections),
            DataChange::ReloadSections(sections) => target.reload_sections(sections),
            DataChange::MoveSection { section, to } => target.move_section(section, *to),
            DataChange::MoveItem { item, at } => target.move_item(item, at),
            DataChange::Batch(changes) => {
                for change in changes {
                    change.apply_to(target)?;
                }
                Ok(())
            }
        }
    }

    /// Rewrites every section position through `f`.
    pub fn remap_sections(&self, f: &dyn Fn(usize) -> usize) -> Self {
        match self {
            DataChange::InsertItems { items, at } => DataChange::InsertItems {
                items: items.clone(),
                at: at.remap(f),
            },
            DataChange::InsertSections { sections, at } => DataChange::InsertSections {
                sections: sections.clone(),
                at: at.remap(f),
            },
            DataChange::MoveSection { section, to } => DataChange::MoveSection {
                section: section.clone(),
                to: f(*to),
            },
            DataChange::MoveItem { item, at } => DataChange::MoveItem {
                item: item.clone(),
                at: at.remap(f),
            },
            DataChange::Batch(changes) => {
                DataChange::Batch(changes.iter().map(|c| c.remap_sections(f)).collect())
            }
            DataChange::Apply(_)
            | DataChange::DeleteItems(_)
            | DataChange::ReloadItems(_)
            | DataChange::DeleteSections(_)
            | DataChange::ReloadSections(_) => self.clone(),
        }
    }

    /// Whether this change (or any batch member) is a full `Apply`.
    pub fn contains_apply(&self) -> bool {
        match self {
            DataChange::Apply(_) => true,
            DataChange::Batch(changes) => changes.iter().any(DataChange::contains_apply),
            _ => false,
        }
    }

    /// Nothing for no changes, the change itself for one, a batch otherwise.
    pub fn coalesce(mut changes: Vec<Self>) -> Option<Self> {
        match changes.len() {
            0 => None,
            1 => changes.pop(),
            _ => Some(DataChange::Batch(changes)),
        }
    }

    /// Swap the section at `index` for `new`.
    pub fn replace_section(old: Section<I>, new: Section<I>, index: usize) -> Self {
        DataChange::Batch(vec![
            DataChange::DeleteSections(vec![old]),
            DataChange::InsertSections {
                sections: vec![new],
                at: SectionAnchor::At(index),
            },
        ])
    }
}
