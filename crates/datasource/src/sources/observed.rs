//! A single section mirroring an externally owned, observable list.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::change::{DataChange, ItemAnchor};
use crate::error::{DataSourceError, Result};
use crate::section::{IndexPath, Item, Section};
use crate::source::{item_at, section_at, supplementary_at, DataSource, Leaf, Lifecycle};
use crate::stream::{ChangeStream, Subscription};

// ── Relation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListChangeKind {
    /// `indices` are positions in the new list.
    Insertion,
    /// `indices` are positions in the old list.
    Removal,
    /// `indices` are positions present in both lists.
    Replacement,
    /// The whole list was replaced.
    Setting,
    #[serde(other)]
    Unrecognized,
}

/// What an observed list reports after it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNotification {
    pub kind: ListChangeKind,
    #[serde(default)]
    pub indices: Vec<usize>,
}

impl ListNotification {
    pub fn new(kind: ListChangeKind, indices: Vec<usize>) -> Self {
        Self { kind, indices }
    }
}

/// An ordered list owned elsewhere that announces its changes after they
/// happen.
pub trait ObservedList<I: Item> {
    fn snapshot(&self) -> Vec<I>;
    fn notifications(&self) -> &ChangeStream<ListNotification>;
}

/// A `Vec` that notifies on every edit.
pub struct ObservableVec<I: Item> {
    items: RefCell<Vec<I>>,
    notifications: ChangeStream<ListNotification>,
}

impl<I: Item> ObservableVec<I> {
    pub fn new(items: Vec<I>) -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(items),
            notifications: ChangeStream::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn push(&self, item: I) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(item);
            items.len() - 1
        };
        self.notify(ListNotification::new(ListChangeKind::Insertion, vec![index]));
    }

    pub fn insert(&self, index: usize, item: I) -> Result<()> {
        self.insert_many(index, vec![item])
    }

    pub fn insert_many(&self, index: usize, new_items: Vec<I>) -> Result<()> {
        let count = new_items.len();
        {
            let mut items = self.items.borrow_mut();
            let len = items.len();
            if index > len {
                return Err(DataSourceError::InsertionOutOfRange { index, len });
            }
            items.splice(index..index, new_items);
        }
        if count > 0 {
            let indices = (index..index + count).collect();
            self.notify(ListNotification::new(ListChangeKind::Insertion, indices));
        }
        Ok(())
    }

    pub fn remove(&self, index: usize) -> Result<I> {
        let removed = {
            let mut items = self.items.borrow_mut();
            let count = items.len();
            if index >= count {
                return Err(DataSourceError::ItemOutOfRange {
                    section: 0,
                    index,
                    count,
                });
            }
            items.remove(index)
        };
        self.notify(ListNotification::new(ListChangeKind::Removal, vec![index]));
        Ok(removed)
    }

    pub fn replace(&self, index: usize, item: I) -> Result<I> {
        let old = {
            let mut items = self.items.borrow_mut();
            let count = items.len();
            match items.get_mut(index) {
                Some(slot) => std::mem::replace(slot, item),
                None => {
                    return Err(DataSourceError::ItemOutOfRange {
                        section: 0,
                        index,
                        count,
                    })
                }
            }
        };
        self.notify(ListNotification::new(ListChangeKind::Replacement, vec![index]));
        Ok(old)
    }

    pub fn set(&self, items: Vec<I>) {
        *self.items.borrow_mut() = items;
        self.notify(ListNotification::new(ListChangeKind::Setting, Vec::new()));
    }

    /// Publishes an arbitrary notification, for relations edited behind this
    /// type's back.
    pub fn notify(&self, notification: ListNotification) {
        self.notifications.emit(&notification);
    }

    /// Edits the items without notifying.
    pub fn edit_silently(&self, edit: impl FnOnce(&mut Vec<I>)) {
        edit(&mut self.items.borrow_mut());
    }
}

impl<I: Item> ObservedList<I> for ObservableVec<I> {
    fn snapshot(&self) -> Vec<I> {
        self.items.borrow().clone()
    }

    fn notifications(&self) -> &ChangeStream<ListNotification> {
        &self.notifications
    }
}

impl<I: Item> fmt::Debug for ObservableVec<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

// ── Node ──────────────────────────────────────────────────────────────────

/// Section backed by an [`ObservedList`]. Reads come from the node's own
/// copy, which only moves forward when a notification is translated, so
/// reads always agree with the events emitted so far.
pub struct ObservedDataSource<I: Item> {
    relation: Rc<dyn ObservedList<I>>,
    section: RefCell<Section<I>>,
    subscription: RefCell<Option<Subscription>>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> ObservedDataSource<I> {
    pub fn new<R>(relation: Rc<R>) -> Rc<Self>
    where
        R: ObservedList<I> + 'static,
    {
        let relation: Rc<dyn ObservedList<I>> = relation;
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let subscription = relation.notifications().subscribe(move |notification| {
                if let Some(this) = weak.upgrade() {
                    this.observe(notification);
                }
            });
            Self {
                section: RefCell::new(Section::new(relation.snapshot())),
                relation,
                subscription: RefCell::new(Some(subscription)),
                changes: ChangeStream::new(),
                lifecycle: Lifecycle::default(),
            }
        })
    }

    fn observe(&self, notification: &ListNotification) {
        if self.lifecycle.is_disposed() {
            return;
        }
        if notification.kind == ListChangeKind::Unrecognized {
            tracing::warn!(indices = ?notification.indices, "ignoring unrecognized list notification");
            return;
        }
        let current = self.relation.snapshot();
        let change = {
            let mut section = self.section.borrow_mut();
            let change = translate(&section.items, &current, notification).unwrap_or_else(|| {
                tracing::warn!(
                    kind = ?notification.kind,
                    indices = ?notification.indices,
                    "list notification does not match the observed list; resynchronising"
                );
                replacement(&section.items, &current)
            });
            section.items = current;
            change
        };
        if let Some(change) = change {
            self.changes.emit(&change);
        }
    }
}

/// `None` when the notification is inconsistent with the two states.
fn translate<I: Item>(
    previous: &[I],
    current: &[I],
    notification: &ListNotification,
) -> Option<Option<DataChange<I>>> {
    let mut indices = notification.indices.clone();
    indices.sort_unstable();
    indices.dedup();

    match notification.kind {
        ListChangeKind::Insertion => {
            let mut expected = previous.to_vec();
            for &index in &indices {
                if index > expected.len() || index >= current.len() {
                    return None;
                }
                expected.insert(index, current[index].clone());
            }
            if expected != current {
                return None;
            }
            let mut runs = Vec::new();
            let mut k = indices.len();
            while k > 0 {
                k -= 1;
                let end = indices[k];
                let mut start = end;
                while k > 0 && indices[k - 1] + 1 == start {
                    k -= 1;
                    start = indices[k];
                }
                runs.push(DataChange::InsertItems {
                    items: current[start..=end].to_vec(),
                    at: ItemAnchor::at(current, end + 1, 0),
                });
            }
            Some(DataChange::coalesce(runs))
        }
        ListChangeKind::Removal => {
            if indices.iter().any(|&index| index >= previous.len()) {
                return None;
            }
            let removed: Vec<I> = indices.iter().map(|&index| previous[index].clone()).collect();
            let expected: Vec<I> = previous
                .iter()
                .enumerate()
                .filter(|(index, _)| indices.binary_search(index).is_err())
                .map(|(_, item)| item.clone())
                .collect();
            if expected != current {
                return None;
            }
            Some((!removed.is_empty()).then(|| DataChange::DeleteItems(removed)))
        }
        ListChangeKind::Replacement => {
            if previous.len() != current.len() || indices.iter().any(|&i| i >= current.len()) {
                return None;
            }
            let untouched_match = previous
                .iter()
                .zip(current)
                .enumerate()
                .all(|(index, (a, b))| a == b || indices.binary_search(&index).is_ok());
            if !untouched_match {
                return None;
            }
            let (reloaded, replaced): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&index| previous[index] == current[index]);
            let mut changes = Vec::new();
            if !replaced.is_empty() {
                changes.push(DataChange::DeleteItems(
                    replaced.iter().map(|&index| previous[index].clone()).collect(),
                ));
            }
            for &index in replaced.iter().rev() {
                changes.push(DataChange::InsertItems {
                    items: vec![current[index].clone()],
                    at: ItemAnchor::at(current, index + 1, 0),
                });
            }
            if !reloaded.is_empty() {
                changes.push(DataChange::ReloadItems(
                    reloaded.iter().map(|&index| current[index].clone()).collect(),
                ));
            }
            Some(DataChange::coalesce(changes))
        }
        ListChangeKind::Setting => Some(replacement(previous, current)),
        ListChangeKind::Unrecognized => None,
    }
}

fn replacement<I: Item>(previous: &[I], current: &[I]) -> Option<DataChange<I>> {
    (previous != current).then(|| {
        DataChange::replace_section(
            Section::new(previous.to_vec()),
            Section::new(current.to_vec()),
            0,
        )
    })
}

impl<I: Item> fmt::Debug for ObservedDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedDataSource")
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

impl<I: Item> DataSource<I> for ObservedDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        Ok(vec![self.section.borrow().clone()])
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(1)
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        let current = self.section.borrow();
        Ok(section_at(std::slice::from_ref(&*current), section)?.len())
    }

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        let current = self.section.borrow();
        supplementary_at(std::slice::from_ref(&*current), kind, section)
    }

    fn item(&self, path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        let current = self.section.borrow();
        item_at(std::slice::from_ref(&*current), path)
    }

    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
        Leaf::at(self, path)
    }

    fn dispose(&self) {
        if self.lifecycle.dispose(&self.changes, "observed") {
            let subscription = self.subscription.borrow_mut().take();
            drop(subscription);
        }
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}
