use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use serde_json::Value;

use crate::change::{DataChange, ItemAnchor};
use crate::error::{DataSourceError, Result};
use crate::section::{IndexPath, Item, Section};
use crate::source::{item_at, section_at, supplementary_at, DataSource, Leaf, Lifecycle};
use crate::stream::ChangeStream;

/// A single section edited in place. Every edit emits exactly one event,
/// derived from the state before the edit.
#[derive(Debug)]
pub struct MutableDataSource<I: Item> {
    section: RefCell<Section<I>>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> MutableDataSource<I> {
    pub fn new(items: Vec<I>) -> Rc<Self> {
        Self::with_section(Section::new(items))
    }

    pub fn with_section(section: Section<I>) -> Rc<Self> {
        Rc::new(Self {
            section: RefCell::new(section),
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        })
    }

    pub fn items(&self) -> Result<Vec<I>> {
        self.lifecycle.ensure_live()?;
        Ok(self.section.borrow().items.clone())
    }

    pub fn len(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(self.section.borrow().len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.lifecycle.ensure_live()?;
        Ok(self.section.borrow().is_empty())
    }

    pub fn insert_item(&self, item: I, at: usize) -> Result<()> {
        self.insert_items(vec![item], at)
    }

    /// Inserts `items` so the first lands at `at`. The anchor is the item
    /// that was at `at` before the insert.
    pub fn insert_items(&self, items: Vec<I>, at: usize) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let change = {
            let mut section = self.section.borrow_mut();
            let len = section.items.len();
            if at > len {
                return Err(DataSourceError::InsertionOutOfRange { index: at, len });
            }
            if items.is_empty() {
                return Ok(());
            }
            let anchor = ItemAnchor::at(&section.items, at, 0);
            section.items.splice(at..at, items.iter().cloned());
            DataChange::InsertItems { items, at: anchor }
        };
        self.changes.emit(&change);
        Ok(())
    }

    pub fn delete_item(&self, at: usize) -> Result<I> {
        self.lifecycle.ensure_live()?;
        let removed = {
            let mut section = self.section.borrow_mut();
            let count = section.items.len();
            if at >= count {
                return Err(DataSourceError::ItemOutOfRange {
                    section: 0,
                    index: at,
                    count,
                });
            }
            section.items.remove(at)
        };
        self.changes
            .emit(&DataChange::DeleteItems(vec![removed.clone()]));
        Ok(removed)
    }

    pub fn delete_items(&self, range: Range<usize>) -> Result<Vec<I>> {
        self.lifecycle.ensure_live()?;
        let removed: Vec<I> = {
            let mut section = self.section.borrow_mut();
            let len = section.items.len();
            if range.start > range.end || range.end > len {
                return Err(DataSourceError::RangeOutOfRange {
                    start: range.start,
                    end: range.end,
                    len,
                });
            }
            section.items.drain(range).collect()
        };
        if !removed.is_empty() {
            self.changes.emit(&DataChange::DeleteItems(removed.clone()));
        }
        Ok(removed)
    }

    /// Swaps the item at `at`. An equal value is reported as a reload,
    /// anything else as delete plus insert.
    pub fn replace_item(&self, at: usize, item: I) -> Result<I> {
        self.lifecycle.ensure_live()?;
        let (old, change) = {
            let mut section = self.section.borrow_mut();
            let count = section.items.len();
            let Some(slot) = section.items.get_mut(at) else {
                return Err(DataSourceError::ItemOutOfRange {
                    section: 0,
                    index: at,
                    count,
                });
            };
            let old = std::mem::replace(slot, item.clone());
            let change = if old == item {
                DataChange::ReloadItems(vec![item])
            } else {
                DataChange::Batch(vec![
                    DataChange::DeleteItems(vec![old.clone()]),
                    DataChange::InsertItems {
                        items: vec![item],
                        at: ItemAnchor::at(&section.items, at + 1, 0),
                    },
                ])
            };
            (old, change)
        };
        self.changes.emit(&change);
        Ok(old)
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let change = {
            let mut section = self.section.borrow_mut();
            let count = section.items.len();
            for index in [from, to] {
                if index >= count {
                    return Err(DataSourceError::ItemOutOfRange {
                        section: 0,
                        index,
                        count,
                    });
                }
            }
            if from == to {
                return Ok(());
            }
            let item = section.items.remove(from);
            let anchor = ItemAnchor::at(&section.items, to, 0);
            section.items.insert(to, item.clone());
            DataChange::MoveItem { item, at: anchor }
        };
        self.changes.emit(&change);
        Ok(())
    }

    /// Replaces all items, reported as a section replacement.
    pub fn replace_items(&self, items: Vec<I>) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let change = {
            let mut section = self.section.borrow_mut();
            if section.items == items {
                return Ok(());
            }
            let old = section.clone();
            section.items = items;
            DataChange::replace_section(old, section.clone(), 0)
        };
        self.changes.emit(&change);
        Ok(())
    }

    /// Sets a supplementary item, reported as a section reload.
    pub fn set_supplementary(&self, kind: impl Into<String>, value: Value) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let change = {
            let mut section = self.section.borrow_mut();
            let kind = kind.into();
            if section.supplementary.get(&kind) == Some(&value) {
                return Ok(());
            }
            section.supplementary.insert(kind, value);
            DataChange::ReloadSections(vec![section.clone()])
        };
        self.changes.emit(&change);
        Ok(())
    }
}

impl<I: Item> DataSource<I> for MutableDataSource<I> {
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
        self.lifecycle.dispose(&self.changes, "mutable");
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}
