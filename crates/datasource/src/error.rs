use thiserror::Error;

pub type Result<T, E = DataSourceError> = std::result::Result<T, E>;

/// Read and write failures of a data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    #[error("section {index} out of range ({count} sections)")]
    SectionOutOfRange { index: usize, count: usize },
    #[error("item {index} out of range in section {section} ({count} items)")]
    ItemOutOfRange {
        section: usize,
        index: usize,
        count: usize,
    },
    #[error("insertion index {index} out of range (len {len})")]
    InsertionOutOfRange { index: usize, len: usize },
    #[error("range {start}..{end} out of bounds (len {len})")]
    RangeOutOfRange { start: usize, end: usize, len: usize },
    #[error("child {index} out of range ({count} children)")]
    ChildOutOfRange { index: usize, count: usize },
    #[error("empty data source has no {0}")]
    EmptyAccess(&'static str),
    #[error("data source is disposed")]
    Disposed,
}

/// Failures while replaying change events on a [`crate::DataChangeTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("section not found: {0}")]
    SectionNotFound(String),
    #[error("section position {index} out of range (len {len})")]
    SectionOutOfRange { index: usize, len: usize },
}
