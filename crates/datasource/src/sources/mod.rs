//! Concrete data-source nodes.

mod composite;
mod diffable;
mod diffable_sections;
mod empty;
mod mutable;
mod mutable_composite;
mod observed;
mod proxy;
mod static_source;

pub use composite::CompositeDataSource;
pub use diffable::{AutoDiffDataSource, DiffableDataSource};
pub use diffable_sections::DiffableSectionsDataSource;
pub use empty::EmptyDataSource;
pub use mutable::MutableDataSource;
pub use mutable_composite::MutableCompositeDataSource;
pub use observed::{ListChangeKind, ListNotification, ObservableVec, ObservedDataSource, ObservedList};
pub use proxy::ProxyDataSource;
pub use static_source::StaticDataSource;
