use std::rc::Rc;

use serde_json::Value;

use crate::change::DataChange;
use crate::error::{DataSourceError, Result};
use crate::section::{IndexPath, Item, Section};
use crate::source::{DataSource, Leaf, Lifecycle};
use crate::stream::ChangeStream;

/// Zero sections. Any per-section or per-item access is an error.
#[derive(Debug)]
pub struct EmptyDataSource<I: Item> {
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> EmptyDataSource<I> {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        })
    }
}

impl<I: Item> DataSource<I> for EmptyDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        Ok(Vec::new())
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(0)
    }

    fn number_of_items(&self, _section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Err(DataSourceError::EmptyAccess("sections"))
    }

    fn supplementary_item(&self, _kind: &str, _section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        Err(DataSourceError::EmptyAccess("supplementary items"))
    }

    fn item(&self, _path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        Err(DataSourceError::EmptyAccess("items"))
    }

    fn resolve_leaf(self: Rc<Self>, _path: IndexPath) -> Result<Leaf<I>> {
        self.lifecycle.ensure_live()?;
        Err(DataSourceError::EmptyAccess("items"))
    }

    fn dispose(&self) {
        self.lifecycle.dispose(&self.changes, "empty");
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}
