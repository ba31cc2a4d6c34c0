use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anything a data source can hold. Items are identified by value.
pub trait Item: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Item for T {}

/// An ordered group of items plus keyed supplementary payload (headers,
/// footers, ...).
///
/// Equality and hashing only look at `items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section<I> {
    pub items: Vec<I>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub supplementary: BTreeMap<String, Value>,
}

impl<I> Section<I> {
    pub fn new(items: Vec<I>) -> Self {
        Self {
            items,
            supplementary: BTreeMap::new(),
        }
    }

    pub fn with_supplementary(mut self, kind: impl Into<String>, value: Value) -> Self {
        self.supplementary.insert(kind.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn supplementary_item(&self, kind: &str) -> Option<&Value> {
        self.supplementary.get(kind)
    }
}

impl<I> Default for Section<I> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<I> From<Vec<I>> for Section<I> {
    fn from(items: Vec<I>) -> Self {
        Self::new(items)
    }
}

impl<I: PartialEq> PartialEq for Section<I> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<I: Eq> Eq for Section<I> {}

impl<I: Hash> Hash for Section<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

// Events name sections by value, so a section equal to another one cannot
// be addressed unambiguously.

/// Whether more than one entry of `sections` equals `section`.
pub(crate) fn is_ambiguous<I: PartialEq>(sections: &[Section<I>], section: &Section<I>) -> bool {
    sections.iter().filter(|s| *s == section).nth(1).is_some()
}

/// Whether any two entries of `sections` are equal.
pub(crate) fn has_repeats<I: PartialEq>(sections: &[Section<I>]) -> bool {
    sections.iter().any(|section| is_ambiguous(sections, section))
}

/// Coordinate of an item: section index plus position inside the section.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_supplementary() {
        let plain = Section::new(vec![1, 2]);
        let headed = Section::new(vec![1, 2]).with_supplementary("header", json!("Title"));
        assert_eq!(plain, headed);

        let set: HashSet<Section<i32>> = [plain, headed].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serializes_without_empty_supplementary() {
        let section = Section::new(vec!["a"]);
        assert_eq!(serde_json::to_value(&section).unwrap(), json!({ "items": ["a"] }));

        let decoded: Section<String> =
            serde_json::from_value(json!({ "items": ["a"], "supplementary": { "footer": 1 } }))
                .unwrap();
        assert_eq!(decoded.supplementary_item("footer"), Some(&json!(1)));
    }

    #[test]
    fn repeated_sections() {
        let sections = vec![Section::new(vec![1]), Section::<i32>::default(), Section::default()];
        assert!(!is_ambiguous(&sections, &sections[0]));
        assert!(is_ambiguous(&sections, &sections[2]));
        assert!(has_repeats(&sections));
        assert!(!has_repeats(&sections[..2]));
    }

    #[test]
    fn index_path_display() {
        assert_eq!(IndexPath::new(2, 5).to_string(), "[2, 5]");
    }
}
