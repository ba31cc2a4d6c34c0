use std::rc::Rc;

use serde_json::Value;

use crate::change::DataChange;
use crate::error::Result;
use crate::section::{IndexPath, Item, Section};
use crate::source::{item_at, section_at, supplementary_at, DataSource, Leaf, Lifecycle};
use crate::stream::ChangeStream;

/// Fixed sections. Never emits.
#[derive(Debug)]
pub struct StaticDataSource<I: Item> {
    sections: Vec<Section<I>>,
    changes: ChangeStream<DataChange<I>>,
    lifecycle: Lifecycle,
}

impl<I: Item> StaticDataSource<I> {
    pub fn new(sections: Vec<Section<I>>) -> Rc<Self> {
        Rc::new(Self {
            sections,
            changes: ChangeStream::new(),
            lifecycle: Lifecycle::default(),
        })
    }

    /// A single section holding `items`.
    pub fn from_items(items: Vec<I>) -> Rc<Self> {
        Self::new(vec![Section::new(items)])
    }
}

impl<I: Item> DataSource<I> for StaticDataSource<I> {
    fn changes(&self) -> &ChangeStream<DataChange<I>> {
        &self.changes
    }

    fn sections(&self) -> Result<Vec<Section<I>>> {
        self.lifecycle.ensure_live()?;
        Ok(self.sections.clone())
    }

    fn number_of_sections(&self) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(self.sections.len())
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.lifecycle.ensure_live()?;
        Ok(section_at(&self.sections, section)?.len())
    }

    fn supplementary_item(&self, kind: &str, section: usize) -> Result<Option<Value>> {
        self.lifecycle.ensure_live()?;
        supplementary_at(&self.sections, kind, section)
    }

    fn item(&self, path: IndexPath) -> Result<I> {
        self.lifecycle.ensure_live()?;
        item_at(&self.sections, path)
    }

    fn resolve_leaf(self: Rc<Self>, path: IndexPath) -> Result<Leaf<I>> {
        Leaf::at(self, path)
    }

    fn dispose(&self) {
        self.lifecycle.dispose(&self.changes, "static");
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataSourceError;

    #[test]
    fn reads_and_bounds() {
        let source = StaticDataSource::new(vec![Section::new(vec![1, 2]), Section::new(vec![])]);
        assert_eq!(source.number_of_sections().unwrap(), 2);
        assert_eq!(source.number_of_items(1).unwrap(), 0);
        assert_eq!(source.item(IndexPath::new(0, 1)).unwrap(), 2);
        assert_eq!(
            source.item(IndexPath::new(0, 2)),
            Err(DataSourceError::ItemOutOfRange {
                section: 0,
                index: 2,
                count: 2
            })
        );
        assert_eq!(
            source.number_of_items(2),
            Err(DataSourceError::SectionOutOfRange { index: 2, count: 2 })
        );
        assert_eq!(source.supplementary_item("header", 0).unwrap(), None);
    }
}
