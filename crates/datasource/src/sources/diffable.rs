use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::autodiff::item_changes;
use crate::change::DataChange;
use crate::error::Result;
use crate::options::AutoDiffOptions;
use crate::section::{IndexPath, Item, Section};
use crate::source::{item_at, section_at, supplementary_at, DataSource, Leaf, Lifecycle};
use crate::stream::ChangeStream;

type Equivalence<I> = Box<dyn Fn(&I, &I) -> bool>;

/// A single section replaced wholesale; the difference to the previous
/// items is computed and emitted as one batch.
struct DiffedSection<I: Item> {
    section: RefCell<Section<I>>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> DiffedSection<I> {
    fn new(items: Vec<I>) -> Self {
        Self {
            section: RefCell::new(Section::new(items)),
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    fn set_items(
        &self,
        items: Vec<I>,
        same_item: &dyn Fn(&I, &I) -> bool,
        find_moves: bool,
    ) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let current = self.section.borrow().items.clone();
        let change = DataChange::coalesce(item_changes(&current, &items, same_item, find_moves, 0));
        self.section.borrow_mut().items = items;
        if let Some(change) = change {
            self.changes.emit(&change);
        }
        Ok(())
    }

    fn modify_items(
        &self,
        edit: impl FnOnce(&mut Vec<I>),
        same_item: &dyn Fn(&I, &I) -> bool,
        find_moves: bool,
    ) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let mut items = self.section.borrow().items.clone();
        edit(&mut items);
        self.set_items(items, same_item, find_moves)
    }

    fn items(&self) -> Result<Vec<I>> {
        self.lifecycle.ensure_live()?;
        Ok(self.section.borrow().items.clone())
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        Ok(vec![self.section.borrow().clone()])
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
}

// ── DiffableDataSource ────────────────────────────────────────────────────

/// Single section diffed by `PartialEq`, with move detection.
pub struct DiffableDataSource<I: Item> {
    inner: DiffedSection<I>,
}

impl<I: Item> DiffableDataSource<I> {
    pub fn new(items: Vec<I>) -> Rc<Self> {
        Rc::new(Self {
            inner: DiffedSection::new(items),
        })
    }

    pub fn items(&self) -> Result<Vec<I>> {
        self.inner.items()
    }

    pub fn set_items(&self, items: Vec<I>) -> Result<()> {
        self.inner.set_items(items, &|a, b| a == b, true)
    }

    pub fn modify_items(&self, edit: impl FnOnce(&mut Vec<I>)) -> Result<()> {
        self.inner.modify_items(edit, &|a, b| a == b, true)
    }
}

impl<I: Item> fmt::Debug for DiffableDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffableDataSource")
            .field("section", &self.inner.section)
            .finish_non_exhaustive()
    }
}

// ── AutoDiffDataSource ────────────────────────────────────────────────────

/// Single section diffed by a caller-supplied equivalence.
pub struct AutoDiffDataSource<I: Item> {
    inner: DiffedSection<I>,
    same_item: Equivalence<I>,
    options: AutoDiffOptions,
}

impl<I: Item> AutoDiffDataSource<I> {
    pub fn new<F>(items: Vec<I>, same_item: F, options: AutoDiffOptions) -> Rc<Self>
    where
        F: Fn(&I, &I) -> bool + 'static,
    {
        Rc::new(Self {
            inner: DiffedSection::new(items),
            same_item: Box::new(same_item),
            options,
        })
    }

    pub fn options(&self) -> AutoDiffOptions {
        self.options
    }

    pub fn items(&self) -> Result<Vec<I>> {
        self.inner.items()
    }

    pub fn set_items(&self, items: Vec<I>) -> Result<()> {
        self.inner
            .set_items(items, &*self.same_item, self.options.find_moves)
    }

    pub fn modify_items(&self, edit: impl FnOnce(&mut Vec<I>)) -> Result<()> {
        self.inner
            .modify_items(edit, &*self.same_item, self.options.find_moves)
    }
}

impl<I: Item> fmt::Debug for AutoDiffDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoDiffDataSource")
            .field("section", &self.inner.section)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

macro_rules! delegate_data_source {
    ($ty:ident, $node:literal) => {
        impl<I: Item> DataSource<I> for $ty<I> {
            fn changes(&self) -> &ChangeStream<DataChange<I>> {
                &self.inner.changes
            }

            fn sections(&self) -> Result<Vec<Section<I>>> {
                self.inner.sections()
            }

            fn number_of_sections(&self) -> Result<usize> {
                self.inner.lifecycle.ensure_live()?;
                Ok(1)
            }

            fn number_of_items(&self, section: usize) -> Result<usize> {
                self.inner.number_of_items(section)
            }

            fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
                self.inner.supplementary_item(kind, section)
            }

            fn item(&self, path: IndexPath) -> Result<I> {
                self.inner.item(path)
            }

            fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
                Leaf::at(self, path)
            }

            fn dispose(&self) {
                self.inner.lifecycle.dispose(&self.inner.changes, $node);
            }

            fn is_disposed(&self) -> bool {
                self.inner.lifecycle.is_disposed()
            }
        }
    };
}

delegate_data_source!(DiffableDataSource, "diffable");
delegate_data_source!(AutoDiffDataSource, "auto_diff");
