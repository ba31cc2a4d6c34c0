//! datasource - composable sectioned collections that publish minimal
//! change events.
//!
//! A [`DataSource`] exposes an ordered list of [`Section`]s and a
//! [`ChangeStream`] of [`DataChange`] events. Leaf sources own their items;
//! composition nodes ([`CompositeDataSource`], [`MutableCompositeDataSource`],
//! [`ProxyDataSource`]) concatenate or switch children and rewrite child
//! section coordinates into their own space. Feeding the events to a
//! [`DataChangeTarget`] such as [`SectionsMirror`] reproduces the source's
//! sections after every mutation.
//!
//! Everything is single-threaded: nodes are shared through `Rc` and emit
//! synchronously after their state is updated.

pub mod autodiff;
pub mod change;
pub mod error;
pub mod index_map;
pub mod options;
pub mod section;
pub mod source;
pub mod sources;
pub mod stream;
pub mod target;

pub use change::{DataChange, ItemAnchor, SectionAnchor};
pub use error::{ApplyError, DataSourceError, Result};
pub use options::{AutoDiffOptions, DiffableSectionsOptions, ProxyOptions};
pub use section::{IndexPath, Item, Section};
pub use source::{DataSource, Leaf, SharedDataSource};
pub use sources::{
    AutoDiffDataSource, CompositeDataSource, DiffableDataSource, DiffableSectionsDataSource,
    EmptyDataSource, ListChangeKind, ListNotification, MutableCompositeDataSource,
    MutableDataSource, ObservableVec, ObservedDataSource, ObservedList, ProxyDataSource,
    StaticDataSource,
};
pub use stream::{ChangeStream, Subscription};
pub use target::{DataChangeTarget, SectionsMirror};
