use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::empty::EmptyDataSource;
use crate::change::{DataChange, SectionAnchor};
use crate::error::Result;
use crate::options::ProxyOptions;
use crate::section::{IndexPath, Item, Section};
use crate::source::{DataSource, Leaf, Lifecycle, SharedDataSource};
use crate::stream::{ChangeStream, Subscription};

/// Stands in for one replaceable child and forwards its events untouched.
pub struct ProxyDataSource<I: Item> {
    this: Weak<Self>,
    inner: RefCell<SharedDataSource<I>>,
    subscription: RefCell<Option<Subscription>>,
    animates_changes: Cell<bool>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> ProxyDataSource<I> {
    /// A proxy over an [`EmptyDataSource`].
    pub fn new() -> Rc<Self> {
        Self::with_options(EmptyDataSource::new(), ProxyOptions::default())
    }

    pub fn with_inner(inner: SharedDataSource<I>) -> Rc<Self> {
        Self::with_options(inner, ProxyOptions::default())
    }

    pub fn with_options(inner: SharedDataSource<I>, options: ProxyOptions) -> Rc<Self> {
        let proxy = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            this: weak.clone(),
            inner: RefCell::new(Rc::clone(&inner)),
            subscription: RefCell::new(None),
            animates_changes: Cell::new(options.animate_changes),
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        });
        let subscription = proxy.forward_from(&inner);
        *proxy.subscription.borrow_mut() = Some(subscription);
        proxy
    }

    pub fn inner(&self) -> SharedDataSource<I> {
        Rc::clone(&self.inner.borrow())
    }

    pub fn animates_changes(&self) -> bool {
        self.animates_changes.get()
    }

    pub fn set_animates_changes(&self, animate: bool) {
        self.animates_changes.set(animate);
    }

    /// Switches to `inner`. Animated switches emit deletion of the old
    /// sections followed by insertion of the new ones; otherwise `Apply`.
    pub fn set_inner(&self, inner: SharedDataSource<I>) -> Result<()> {
        self.lifecycle.ensure_live()?;
        let old_sections = self.inner().sections()?;
        let new_sections = inner.sections()?;

        let subscription = self.forward_from(&inner);
        let previous = self.subscription.replace(Some(subscription));
        drop(previous);
        let previous_inner = self.inner.replace(inner);
        drop(previous_inner);

        let animated = self.animates_changes.get();
        tracing::debug!(
            animated,
            old_sections = old_sections.len(),
            new_sections = new_sections.len(),
            "proxy switched inner source"
        );

        let change = if animated {
            let mut changes = Vec::new();
            if !old_sections.is_empty() {
                changes.push(DataChange::DeleteSections(old_sections));
            }
            if !new_sections.is_empty() {
                changes.push(DataChange::InsertSections {
                    sections: new_sections,
                    at: SectionAnchor::At(0),
                });
            }
            DataChange::coalesce(changes)
        } else {
            Some(DataChange::Apply(new_sections))
        };
        if let Some(change) = change {
            self.changes.emit(&change);
        }
        Ok(())
    }

    fn forward_from(&self, inner: &SharedDataSource<I>) -> Subscription {
        let weak = self.this.clone();
        inner.changes().subscribe(move |change| {
            if let Some(this) = weak.upgrade() {
                this.changes.emit(change);
            }
        })
    }
}

impl<I: Item> fmt::Debug for ProxyDataSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDataSource")
            .field("animates_changes", &self.animates_changes.get())
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl<I: Item> DataSource<I> for ProxyDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        self.inner().sections()
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        self.inner().number_of_sections()
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        self.inner().number_of_items(section)
    }

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        self.inner().supplementary_item(kind, section)
    }

    fn item(&self, path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        self.inner().item(path)
    }

    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
        self.lifecycle.ensure_live()?;
        self.inner().resolve_leaf(path)
    }

    fn dispose(&self) {
        if self.lifecycle.dispose(&self.changes, "proxy") {
            let subscription = self.subscription.borrow_mut().take();
            drop(subscription);
        }
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}
