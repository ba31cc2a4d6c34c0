//! The consuming side of a change stream.

use crate::change::{ItemAnchor, SectionAnchor};
use crate::error::ApplyError;
use crate::section::{IndexPath, Item, Section};

/// Receiver of replayed [`crate::DataChange`]s (a view adapter, a cache, a
/// test mirror). Each method handles one event kind.
pub trait DataChangeTarget<I: Item> {
    fn apply_sections(&mut self, sections: &[Section<I>]) -> Result<(), ApplyError>;
    fn delete_items(&mut self, items: &[I]) -> Result<(), ApplyError>;
    fn delete_sections(&mut self, sections: &[Section<I>]) -> Result<(), ApplyError>;
    fn insert_items(&mut self, items: &[I], at: &ItemAnchor<I>) -> Result<(), ApplyError>;
    fn insert_sections(
        &mut self,
        sections: &[Section<I>],
        at: &SectionAnchor<I>,
    ) -> Result<(), ApplyError>;
    fn move_item(&mut self, item: &I, at: &ItemAnchor<I>) -> Result<(), ApplyError>;
    fn move_section(&mut self, section: &Section<I>, to: usize) -> Result<(), ApplyError>;
    fn reload_items(&mut self, items: &[I]) -> Result<(), ApplyError>;
    fn reload_sections(&mut self, sections: &[Section<I>]) -> Result<(), ApplyError>;
}

/// In-memory sections kept up to date by replaying events.
///
/// Items and sections are looked up by value; with duplicates the first
/// occurrence in section order wins.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionsMirror<I> {
    sections: Vec<Section<I>>,
}

impl<I: Item> SectionsMirror<I> {
    pub fn new(sections: Vec<Section<I>>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section<I>] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section<I>> {
        self.sections
    }

    pub fn find_item(&self, item: &I) -> Option<IndexPath> {
        self.sections.iter().enumerate().find_map(|(s, section)| {
            section
                .items
                .iter()
                .position(|candidate| candidate == item)
                .map(|i| IndexPath::new(s, i))
        })
    }

    pub fn find_section(&self, section: &Section<I>) -> Option<usize> {
        self.sections.iter().position(|candidate| candidate == section)
    }

    fn require_item(&self, item: &I) -> Result<IndexPath, ApplyError> {
        self.find_item(item)
            .ok_or_else(|| ApplyError::ItemNotFound(format!("{item:?}")))
    }

    fn require_section(&self, section: &Section<I>) -> Result<usize, ApplyError> {
        self.find_section(section)
            .ok_or_else(|| ApplyError::SectionNotFound(format!("{:?}", section.items)))
    }

    fn resolve_item_anchor(&self, at: &ItemAnchor<I>) -> Result<IndexPath, ApplyError> {
        match at {
            ItemAnchor::Before(item) => self.require_item(item),
            ItemAnchor::EndOfSection(index) => match self.sections.get(*index) {
                Some(section) => Ok(IndexPath::new(*index, section.len())),
                None => Err(ApplyError::SectionOutOfRange {
                    index: *index,
                    len: self.sections.len(),
                }),
            },
        }
    }

    fn resolve_section_anchor(&self, at: &SectionAnchor<I>) -> Result<usize, ApplyError> {
        match at {
            SectionAnchor::Before(section) => self.require_section(section),
            SectionAnchor::At(index) if *index <= self.sections.len() => Ok(*index),
            SectionAnchor::At(index) => Err(ApplyError::SectionOutOfRange {
                index: *index,
                len: self.sections.len(),
            }),
        }
    }
}

impl<I: Item> DataChangeTarget<I> for SectionsMirror<I> {
    fn apply_sections(&mut self, sections: &[Section<I>]) -> Result<(), ApplyError> {
        self.sections = sections.to_vec();
        Ok(())
    }

    fn delete_items(&mut self, items: &[I]) -> Result<(), ApplyError> {
        for item in items {
            let path = self.require_item(item)?;
            self.sections[path.section].items.remove(path.item);
        }
        Ok(())
    }

    fn delete_sections(&mut self, sections: &[Section<I>]) -> Result<(), ApplyError> {
        for section in sections {
            let index = self.require_section(section)?;
            self.sections.remove(index);
        }
        Ok(())
    }

    fn insert_items(&mut self, items: &[I], at: &ItemAnchor<I>) -> Result<(), ApplyError> {
        let path = self.resolve_item_anchor(at)?;
        let section = &mut self.sections[path.section].items;
        section.splice(path.item..path.item, items.iter().cloned());
        Ok(())
    }

    fn insert_sections(
        &mut self,
        sections: &[Section<I>],
        at: &SectionAnchor<I>,
    ) -> Result<(), ApplyError> {
        let index = self.resolve_section_anchor(at)?;
        self.sections.splice(index..index, sections.iter().cloned());
        Ok(())
    }

    fn move_item(&mut self, item: &I, at: &ItemAnchor<I>) -> Result<(), ApplyError> {
        let from = self.require_item(item)?;
        let moved = self.sections[from.section].items.remove(from.item);
        match self.resolve_item_anchor(at) {
            Ok(to) => {
                self.sections[to.section].items.insert(to.item, moved);
                Ok(())
            }
            Err(err) => {
                self.sections[from.section].items.insert(from.item, moved);
                Err(err)
            }
        }
    }

    fn move_section(&mut self, section: &Section<I>, to: usize) -> Result<(), ApplyError> {
        let from = self.require_section(section)?;
        if to >= self.sections.len() {
            return Err(ApplyError::SectionOutOfRange {
                index: to,
                len: self.sections.len(),
            });
        }
        let moved = self.sections.remove(from);
        self.sections.insert(to, moved);
        Ok(())
    }

    fn reload_items(&mut self, items: &[I]) -> Result<(), ApplyError> {
        for item in items {
            self.require_item(item)?;
        }
        Ok(())
    }

    fn reload_sections(&mut self, sections: &[Section<I>]) -> Result<(), ApplyError> {
        for section in sections {
            let index = self.require_section(section)?;
            self.sections[index].supplementary = section.supplementary.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataChange;
    use serde_json::json;

    fn mirror(sections: &[&[&'static str]]) -> SectionsMirror<&'static str> {
        SectionsMirror::new(sections.iter().map(|s| Section::new(s.to_vec())).collect())
    }

    fn items(mirror: &SectionsMirror<&'static str>) -> Vec<Vec<&'static str>> {
        mirror.sections().iter().map(|s| s.items.clone()).collect()
    }

    #[test]
    fn insert_before_and_at_end() {
        let mut m = mirror(&[&["a", "c"], &[]]);
        m.insert_items(&["b"], &ItemAnchor::Before("c")).unwrap();
        m.insert_items(&["z"], &ItemAnchor::EndOfSection(1)).unwrap();
        assert_eq!(items(&m), vec![vec!["a", "b", "c"], vec!["z"]]);
    }

    #[test]
    fn move_item_across_sections() {
        let mut m = mirror(&[&["a", "b"], &["c"]]);
        m.move_item(&"a", &ItemAnchor::Before("c")).unwrap();
        assert_eq!(items(&m), vec![vec!["b"], vec!["a", "c"]]);
    }

    #[test]
    fn move_section_lands_at_index() {
        let mut m = mirror(&[&["a"], &["b"], &["c"]]);
        m.move_section(&Section::new(vec!["a"]), 2).unwrap();
        assert_eq!(items(&m), vec![vec!["b"], vec!["c"], vec!["a"]]);
    }

    #[test]
    fn reload_sections_updates_payload() {
        let mut m = mirror(&[&["a"]]);
        let reloaded = Section::new(vec!["a"]).with_supplementary("header", json!("A"));
        m.reload_sections(&[reloaded]).unwrap();
        assert_eq!(m.sections()[0].supplementary_item("header"), Some(&json!("A")));
    }

    #[test]
    fn missing_targets_are_reported() {
        let mut m = mirror(&[&["a"]]);
        assert_eq!(
            m.delete_items(&["q"]),
            Err(ApplyError::ItemNotFound("\"q\"".to_string()))
        );
        assert_eq!(
            m.insert_sections(&[Section::new(vec!["b"])], &SectionAnchor::At(3)),
            Err(ApplyError::SectionOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(
            m.move_item(&"a", &ItemAnchor::EndOfSection(4)),
            Err(ApplyError::SectionOutOfRange { index: 4, len: 1 })
        );
        assert_eq!(items(&m), vec![vec!["a"]]);
    }

    #[test]
    fn batch_order_matters() {
        let s = |name: &'static str| Section::new(vec![name]);
        let forward = DataChange::Batch(vec![
            DataChange::DeleteSections(vec![s("s1")]),
            DataChange::InsertSections {
                sections: vec![s("s2")],
                at: SectionAnchor::At(1),
            },
        ]);
        let reversed = DataChange::Batch(vec![
            DataChange::InsertSections {
                sections: vec![s("s2")],
                at: SectionAnchor::At(1),
            },
            DataChange::DeleteSections(vec![s("s1")]),
        ]);

        let mut a = mirror(&[&["s1"], &["s3"], &["s4"]]);
        forward.apply_to(&mut a).unwrap();
        assert_eq!(items(&a), vec![vec!["s3"], vec!["s2"], vec!["s4"]]);

        let mut b = mirror(&[&["s1"], &["s3"], &["s4"]]);
        reversed.apply_to(&mut b).unwrap();
        assert_eq!(items(&b), vec![vec!["s2"], vec!["s3"], vec!["s4"]]);
        assert_ne!(a, b);
    }
}
