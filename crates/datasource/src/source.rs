//! The contract every collection node implements.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

use crate::change::DataChange;
use crate::error::{DataSourceError, Result};
use crate::section::{IndexPath, Item, Section};
use crate::stream::ChangeStream;

pub type SharedDataSource<I> = Rc<dyn DataSource<I>>;

/// A node in a data-source tree.
///
/// Reads are snapshots: they return owned values and never observe a
/// half-applied mutation. Indices outside the current shape return an error.
/// Once disposed, every read and write returns [`DataSourceError::Disposed`]
/// and the change stream stays silent.
pub trait DataSource<I: Item> {
    fn changes(&self) -> &ChangeStream<DataChange<I>>;

    fn sections(&self) -> Result<Vec<Section<I>>>;

    fn number_of_sections(&self) -> Result<usize>;

    fn number_of_items(&self, section: usize) -> Result<usize>;

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>>;

    fn item(&self, path: IndexPath) -> Result<I>;

    /// The node owning the item at `path`, with coordinates local to it.
    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>>;

    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// Result of [`DataSource::resolve_leaf`].
#[derive(Clone)]
pub struct Leaf<I: Item> {
    pub source: SharedDataSource<I>,
    pub path: IndexPath,
}

impl<I: Item> Leaf<I> {
    /// Checks that `path` exists in `source` and pairs them.
    pub fn at<S>(source: Rc<S>, path: IndexPath) -> Result<Self>
    where
        S: DataSource<I> + 'static,
    {
        source.item(path)?;
        Ok(Self { source, path })
    }
}

// ── Shared pieces for node implementations ────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    disposed: Cell<bool>,
}

impl Lifecycle {
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.disposed.get() {
            Err(DataSourceError::Disposed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Marks the node disposed and silences its stream. Returns `false` when
    /// it already was.
    pub(crate) fn dispose<I: Item>(
        &self,
        changes: &ChangeStream<DataChange<I>>,
        node: &'static str,
    ) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        changes.close();
        tracing::debug!(node, "disposed data source");
        true
    }
}

pub(crate) fn section_at<I>(sections: &[Section<I>], index: usize) -> Result<&Section<I>> {
    sections
        .get(index)
        .ok_or(DataSourceError::SectionOutOfRange {
            index,
            count: sections.len(),
        })
}

pub(crate) fn item_at<I: Clone>(sections: &[Section<I>], path: IndexPath) -> Result<I> {
    let section = section_at(sections, path.section)?;
    section
        .items
        .get(path.item)
        .cloned()
        .ok_or(DataSourceError::ItemOutOfRange {
            section: path.section,
            index: path.item,
            count: section.items.len(),
        })
}

pub(crate) fn supplementary_at<I>(
    sections: &[Section<I>],
    kind: &str,
    index: usize,
) -> Result<Option<Value>> {
    Ok(section_at(sections, index)?.supplementary_item(kind).cloned())
}
