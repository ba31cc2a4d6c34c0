use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Range;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::composite::read;
use crate::change::{DataChange, SectionAnchor};
use crate::error::{DataSourceError, Result};
use crate::index_map::{map_outside, section_offset};
use crate::section::{is_ambiguous, IndexPath, Item, Section};
use crate::source::{DataSource, Leaf, Lifecycle, SharedDataSource};
use crate::stream::{ChangeStream, Subscription};

struct Slot<I: Item> {
    id: u64,
    source: SharedDataSource<I>,
    _subscription: Subscription,
}

/// Editable list of children whose sections are concatenated.
///
/// Child events are forwarded with their section positions shifted by the
/// child's offset at the time of forwarding. Edits to the child list itself
/// emit section insertions, deletions and moves, or an `Apply` of the new
/// sections when a section they would name is equal to another one.
pub struct MutableCompositeDataSource<I: Item> {
    this: Weak<Self>,
    slots: RefCell<Vec<Slot<I>>>,
    next_slot_id: Cell<u64>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> MutableCompositeDataSource<I> {
    pub fn new(children: Vec<SharedDataSource<I>>) -> Rc<Self> {
        let composite = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            this: weak.clone(),
            slots: RefCell::new(Vec::new()),
            next_slot_id: Cell::new(1),
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        });
        let slots: Vec<Slot<I>> = children.into_iter().map(|c| composite.attach(c)).collect();
        *composite.slots.borrow_mut() = slots;
        composite
    }

    pub fn children(&self) -> Vec<SharedDataSource<I>> {
        self.slots
            .borrow()
            .iter()
            .map(|slot| Rc::clone(&slot.source))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    pub fn insert(&self, child: SharedDataSource<I>, at: usize) -> Result<()> {
        self.insert_all(vec![child], at)
    }

    pub fn push(&self, child: SharedDataSource<I>) -> Result<()> {
        self.insert(child, self.len())
    }

    /// Inserts `children` so the first lands at child position `at`.
    pub fn insert_all(&self, children: Vec<SharedDataSource<I>>, at: usize) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let current = self.children();
        if at > current.len() {
            return Err(DataSourceError::ChildOutOfRange {
                index: at,
                count: current.len(),
            });
        }
        let before = read::sections(&current)?;
        let offset = section_offset(&read::counts(&current)?, at)?;
        let inserted = read::sections(&children)?;

        let count = children.len();
        let slots: Vec<Slot<I>> = children.into_iter().map(|c| self.attach(c)).collect();
        self.slots.borrow_mut().splice(at..at, slots);
        tracing::debug!(at, count, sections = inserted.len(), "inserted children");

        if inserted.is_empty() {
            return Ok(());
        }
        let change = match before.get(offset) {
            Some(next) if is_ambiguous(&before, next) => self.snapshot()?,
            _ => DataChange::InsertSections {
                sections: inserted,
                at: SectionAnchor::at(&before, offset),
            },
        };
        self.changes.emit(&change);
        Ok(())
    }

    pub fn delete(&self, at: usize) -> Result<SharedDataSource<I>> {
        let mut removed = self.delete_range(at..at + 1)?;
        removed.pop().ok_or(DataSourceError::ChildOutOfRange {
            index: at,
            count: self.len(),
        })
    }

    pub fn delete_range(&self, range: Range<usize>) -> Result<Vec<SharedDataSource<I>>> {
        self.lifecycle.ensure_live()?;
        let current = self.children();
        if range.start > range.end || range.end > current.len() {
            return Err(DataSourceError::RangeOutOfRange {
                start: range.start,
                end: range.end,
                len: current.len(),
            });
        }
        let before = read::sections(&current)?;
        let removed_sections = read::sections(&current[range.clone()])?;

        let removed: Vec<Slot<I>> = self.slots.borrow_mut().drain(range.clone()).collect();
        let sources = removed.iter().map(|slot| Rc::clone(&slot.source)).collect();
        drop(removed);
        tracing::debug!(start = range.start, end = range.end, "deleted children");

        if removed_sections.is_empty() {
            return Ok(sources);
        }
        let change = if removed_sections.iter().any(|s| is_ambiguous(&before, s)) {
            self.snapshot()?
        } else {
            DataChange::DeleteSections(removed_sections)
        };
        self.changes.emit(&change);
        Ok(sources)
    }

    /// Swaps the child at `at`, returning the previous one.
    pub fn replace(&self, at: usize, child: SharedDataSource<I>) -> Result<SharedDataSource<I>> {
        self.lifecycle.ensure_live()?;
        let current = self.children();
        let count = current.len();
        if at >= count {
            return Err(DataSourceError::ChildOutOfRange { index: at, count });
        }
        let before = read::sections(&current)?;
        let counts = read::counts(&current)?;
        let offset = section_offset(&counts, at)?;
        let old_sections = current[at].sections()?;
        let new_sections = child.sections()?;

        let slot = self.attach(child);
        let old = std::mem::replace(&mut self.slots.borrow_mut()[at], slot);
        let previous = Rc::clone(&old.source);
        drop(old);
        tracing::debug!(at, "replaced child");

        let following = before.get(offset + old_sections.len());
        let ambiguous = old_sections.iter().any(|s| is_ambiguous(&before, s))
            || (!new_sections.is_empty() && following.is_some_and(|s| is_ambiguous(&before, s)));
        let change = if ambiguous {
            Some(self.snapshot()?)
        } else {
            let mut changes = Vec::new();
            if !old_sections.is_empty() {
                changes.push(DataChange::DeleteSections(old_sections));
            }
            if !new_sections.is_empty() {
                let at = match following {
                    Some(next) => SectionAnchor::Before(next.clone()),
                    None => SectionAnchor::At(offset),
                };
                changes.push(DataChange::InsertSections {
                    sections: new_sections,
                    at,
                });
            }
            DataChange::coalesce(changes)
        };
        if let Some(change) = change {
            self.changes.emit(&change);
        }
        Ok(previous)
    }

    /// Moves the child at `from` so that it ends up at child position `to`.
    pub fn move_child(&self, from: usize, to: usize) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let current = self.children();
        let count = current.len();
        for index in [from, to] {
            if index >= count {
                return Err(DataSourceError::ChildOutOfRange { index, count });
            }
        }
        if from == to {
            return Ok(());
        }
        let before = read::sections(&current)?;
        let mut counts = read::counts(&current)?;
        let old_offset = section_offset(&counts, from)?;
        let moved = current[from].sections()?;
        let ambiguous = moved.iter().any(|s| is_ambiguous(&before, s));

        {
            let mut slots = self.slots.borrow_mut();
            let slot = slots.remove(from);
            slots.insert(to, slot);
        }
        let moved_count = counts.remove(from);
        counts.insert(to, moved_count);
        let new_offset = section_offset(&counts, to)?;
        tracing::debug!(from, to, "moved child");

        if ambiguous {
            self.changes.emit(&self.snapshot()?);
            return Ok(());
        }
        // Section by section, ordered so every intermediate index is valid.
        let changes: Vec<DataChange<I>> = if new_offset > old_offset {
            moved
                .into_iter()
                .enumerate()
                .rev()
                .map(|(k, section)| DataChange::MoveSection {
                    section,
                    to: new_offset + k,
                })
                .collect()
        } else if new_offset < old_offset {
            moved
                .into_iter()
                .enumerate()
                .map(|(k, section)| DataChange::MoveSection {
                    section,
                    to: new_offset + k,
                })
                .collect()
        } else {
            Vec::new()
        };
        if let Some(change) = DataChange::coalesce(changes) {
            self.changes.emit(&change);
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<DataChange<I>> {
        read::sections(&self.children()).map(DataChange::Apply)
    }

    fn attach(&self, source: SharedDataSource<I>) -> Slot<I> {
        let id = self.next_slot_id.get();
        self.next_slot_id.set(id + 1);
        let weak = self.this.clone();
        let subscription = source.changes().subscribe(move |change| {
            if let Some(this) = weak.upgrade() {
                this.forward(id, change);
            }
        });
        Slot {
            id,
            source,
            _subscription: subscription,
        }
    }

    fn forward(&self, id: u64, change: &DataChange<I>) {
        if self.lifecycle.is_disposed() {
            return;
        }
        let (position, children) = {
            let slots = self.slots.borrow();
            let Some(position) = slots.iter().position(|slot| slot.id == id) else {
                return;
            };
            let children: Vec<SharedDataSource<I>> =
                slots.iter().map(|slot| Rc::clone(&slot.source)).collect();
            (position, children)
        };
        let forwarded = if change.contains_apply() {
            read::sections(&children).map(DataChange::Apply)
        } else {
            read::counts(&children)
                .and_then(|counts| map_outside(&counts, position))
                .map(|outside| change.remap_sections(&outside))
        };
        match forwarded {
            Ok(change) => self.changes.emit(&change),
            Err(err) => tracing::warn!(%err, "dropping child change that could not be remapped"),
        }
    }
}

impl<I: Item> fmt::Debug for MutableCompositeDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableCompositeDataSource")
            .field("children", &self.len())
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl<I: Item> DataSource<I> for MutableCompositeDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        read::sections(&self.children())
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(read::counts(&self.children())?.iter().sum())
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        read::number_of_items(&self.children(), section)
    }

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        read::supplementary_item(&self.children(), kind, section)
    }

    fn item(&self, path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        read::item(&self.children(), path)
    }

    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
        self.lifecycle.ensure_live()?;
        read::resolve_leaf(&self.children(), path)
    }

    fn dispose(&self) {
        if self.lifecycle.dispose(&self.changes, "mutable_composite") {
            let slots = std::mem::take(&mut *self.slots.borrow_mut());
            drop(slots);
        }
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}
