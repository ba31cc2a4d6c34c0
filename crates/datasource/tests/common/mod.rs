#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use datasource::{
    ApplyError, DataChange, DataSource, Item, Section, SectionsMirror, SharedDataSource,
    Subscription,
};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn section<I: Item>(items: &[I]) -> Section<I> {
    Section::new(items.to_vec())
}

/// Upcasts a concrete node for child lists.
pub fn shared<I: Item, S: DataSource<I> + 'static>(source: &Rc<S>) -> SharedDataSource<I> {
    source.clone()
}

pub fn items_of<I: Item>(sections: &[Section<I>]) -> Vec<Vec<I>> {
    sections.iter().map(|s| s.items.clone()).collect()
}

/// Collects every event a source emits.
pub struct Recorder<I: Item> {
    events: Rc<RefCell<Vec<DataChange<I>>>>,
    _subscription: Subscription,
}

impl<I: Item> Recorder<I> {
    pub fn take(&self) -> Vec<DataChange<I>> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

pub fn record<I: Item>(source: &dyn DataSource<I>) -> Recorder<I> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let subscription = source
        .changes()
        .subscribe(move |change: &DataChange<I>| sink.borrow_mut().push(change.clone()));
    Recorder {
        events,
        _subscription: subscription,
    }
}

/// Replays a source's events onto a mirror seeded with its current sections.
pub struct Follower<I: Item> {
    mirror: Rc<RefCell<SectionsMirror<I>>>,
    errors: Rc<RefCell<Vec<ApplyError>>>,
    _subscription: Subscription,
}

impl<I: Item> Follower<I> {
    pub fn sections(&self) -> Vec<Section<I>> {
        self.mirror.borrow().sections().to_vec()
    }

    /// Asserts the mirror reproduces `source`, supplementary payload included.
    pub fn assert_in_sync(&self, source: &dyn DataSource<I>) {
        assert!(self.errors.borrow().is_empty(), "apply errors: {:?}", self.errors.borrow());
        let expected = source.sections().unwrap();
        let actual = self.sections();
        assert_eq!(actual, expected);
        for (a, e) in actual.iter().zip(&expected) {
            assert_eq!(a.supplementary, e.supplementary);
        }
    }
}

pub fn follow<I: Item>(source: &dyn DataSource<I>) -> Follower<I> {
    let mirror = Rc::new(RefCell::new(SectionsMirror::new(source.sections().unwrap())));
    let errors = Rc::new(RefCell::new(Vec::new()));
    let subscription = {
        let mirror = mirror.clone();
        let errors = errors.clone();
        source.changes().subscribe(move |change: &DataChange<I>| {
            if let Err(err) = change.apply_to(&mut *mirror.borrow_mut()) {
                errors.borrow_mut().push(err);
            }
        })
    };
    Follower {
        mirror,
        errors,
        _subscription: subscription,
    }
}
