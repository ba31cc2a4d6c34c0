use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::autodiff::{identical, section_changes};
use crate::change::DataChange;
use crate::error::Result;
use crate::options::DiffableSectionsOptions;
use crate::section::{IndexPath, Item, Section};
use crate::source::{item_at, section_at, supplementary_at, DataSource, Leaf, Lifecycle};
use crate::stream::ChangeStream;

type SectionEquivalence<I> = Box<dyn Fn(&Section<I>, &Section<I>) -> bool>;
type ItemEquivalence<I> = Box<dyn Fn(&I, &I) -> bool>;

/// Many sections replaced wholesale. Sections are paired by one comparator,
/// items inside paired sections by another; both default to `PartialEq`.
pub struct DiffableSectionsDataSource<I: Item> {
    sections: RefCell<Vec<Section<I>>>,
    same_section: SectionEquivalence<I>,
    same_item: ItemEquivalence<I>,
    options: DiffableSectionsOptions,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> DiffableSectionsDataSource<I> {
    pub fn new(sections: Vec<Section<I>>) -> Rc<Self> {
        Self::with_options(sections, DiffableSectionsOptions::default())
    }

    pub fn with_options(sections: Vec<Section<I>>, options: DiffableSectionsOptions) -> Rc<Self> {
        Self::with_comparators(sections, |a, b| a == b, |a, b| a == b, options)
    }

    pub fn with_comparators<S, F>(
        sections: Vec<Section<I>>,
        same_section: S,
        same_item: F,
        options: DiffableSectionsOptions,
    ) -> Rc<Self>
    where
        S: Fn(&Section<I>, &Section<I>) -> bool + 'static,
        F: Fn(&I, &I) -> bool + 'static,
    {
        Rc::new(Self {
            sections: RefCell::new(sections),
            same_section: Box::new(same_section),
            same_item: Box::new(same_item),
            options,
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        })
    }

    pub fn options(&self) -> DiffableSectionsOptions {
        self.options
    }

    /// Replaces every section. The comparators run with no borrow of this
    /// node held, so they may read it.
    pub fn set_sections(&self, sections: Vec<Section<I>>) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let current = self.sections.borrow().clone();
        let change = if self.options.animate_changes {
            DataChange::coalesce(section_changes(
                &current,
                &sections,
                &*self.same_section,
                &*self.same_item,
            ))
        } else if identical(&current, &sections) {
            None
        } else {
            Some(DataChange::Apply(sections.clone()))
        };
        *self.sections.borrow_mut() = sections;
        if let Some(change) = change {
            self.changes.emit(&change);
        }
        Ok(())
    }

    pub fn modify_sections(&self, edit: impl FnOnce(&mut Vec<Section<I>>)) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let mut sections = self.sections.borrow().clone();
        edit(&mut sections);
        self.set_sections(sections)
    }
}

impl<I: Item> fmt::Debug for DiffableSectionsDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffableSectionsDataSource")
            .field("sections", &self.sections)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<I: Item> DataSource<I> for DiffableSectionsDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        Ok(self.sections.borrow().clone())
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(self.sections.borrow().len())
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(section_at(&self.sections.borrow(), section)?.len())
    }

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        supplementary_at(&self.sections.borrow(), kind, section)
    }

    fn item(&self, path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        item_at(&self.sections.borrow(), path)
    }

    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
        Leaf::at(self, path)
    }

    fn dispose(&self) {
        self.lifecycle.dispose(&self.changes, "diffable_sections");
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}
