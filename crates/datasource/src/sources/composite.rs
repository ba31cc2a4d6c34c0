use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::change::DataChange;
use crate::error::Result;
use crate::index_map::map_inside;
use crate::section::{IndexPath, Item, Section};
use crate::source::{DataSource, Leaf, Lifecycle, SharedDataSource};
use crate::stream::{ChangeStream, Subscription};

/// Fixed list of children whose sections are concatenated.
///
/// Any child change is republished as `Apply` of the full concatenation.
pub struct CompositeDataSource<I: Item> {
    children: Vec<SharedDataSource<I>>,
    subscriptions: RefCell<Vec<Subscription>>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> CompositeDataSource<I> {
    pub fn new(children: Vec<SharedDataSource<I>>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let subscriptions = children
                .iter()
                .map(|child| {
                    let weak = weak.clone();
                    child.changes().subscribe(move |_| {
                        if let Some(this) = weak.upgrade() {
                            this.republish();
                        }
                    })
                })
                .collect();
            Self {
                children,
                subscriptions: RefCell::new(subscriptions),
                changes: ChangeStream::new(),
                lifecycle: Lifecycle::default(),
            }
        })
    }

    pub fn children(&self) -> &[SharedDataSource<I>] {
        &self.children
    }

    fn republish(&self) {
        if self.lifecycle.is_disposed() {
            return;
        }
        match read::sections(&self.children) {
            Ok(sections) => self.changes.emit(&DataChange::Apply(sections)),
            Err(err) => tracing::warn!(%err, "composite could not read its children"),
        }
    }
}

impl<I: Item> fmt::Debug for CompositeDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDataSource")
            .field("children", &self.children.len())
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl<I: Item> DataSource<I> for CompositeDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        read::sections(&self.children)
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(read::counts(&self.children)?.iter().sum())
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        read::number_of_items(&self.children, section)
    }

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        read::supplementary_item(&self.children, kind, section)
    }

    fn item(&self, path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        read::item(&self.children, path)
    }

    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
        self.lifecycle.ensure_live()?;
        read::resolve_leaf(&self.children, path)
    }

    fn dispose(&self) {
        if self.lifecycle.dispose(&self.changes, "composite") {
            let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
            drop(subscriptions);
        }
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

/// Reads over an ordered list of children, shared by the composite nodes.
pub(crate) mod read {
    use super::*;

    pub(crate) fn counts<I: Item>(children: &[SharedDataSource<I>]) -> Result<Vec<usize>> {
        children.iter().map(|child| child.number_of_sections()).collect()
    }

    pub(crate) fn sections<I: Item>(children: &[SharedDataSource<I>]) -> Result<Vec<Section<I>>> {
        let mut out = Vec::new();
        for child in children {
            out.extend(child.sections()?);
        }
        Ok(out)
    }

    pub(crate) fn number_of_items<I: Item>(
        children: &[SharedDataSource<I>],
        section: usize,
    ) -> Result<usize> {
        let (child, inner) = map_inside(&counts(children)?, section)?;
        children[child].number_of_items(inner)
    }

    pub(crate) fn supplementary_item<I: Item>(
        children: &[SharedDataSource<I>],
        kind: &str,
        section: usize,
    ) -> Result<Option<Value>> {
        let (child, inner) = map_inside(&counts(children)?, section)?;
        children[child].supplementary_item(kind, inner)
    }

    pub(crate) fn item<I: Item>(children: &[SharedDataSource<I>], path: IndexPath) -> Result<I> {
        let (child, inner) = map_inside(&counts(children)?, path.section)?;
        children[child].item(IndexPath::new(inner, path.item))
    }

    pub(crate) fn resolve_leaf<I: Item>(
        children: &[SharedDataSource<I>],
        path: IndexPath,
    ) -> Result<Leaf<I>> {
        let (child, inner) = map_inside(&counts(children)?, path.section)?;
        Rc::clone(&children[child]).resolve_leaf(IndexPath::new(inner, path.item))
    }
}
