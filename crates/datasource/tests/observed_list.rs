mod common;

use common::{follow, init_tracing, record, section};
use datasource::{
    DataChange, DataSource, DataSourceError, IndexPath, ItemAnchor, ListChangeKind,
    ListNotification, ObservableVec, ObservedDataSource, SectionAnchor,
};

#[test]
fn list_edits_become_item_events() {
    init_tracing();
    let list = ObservableVec::new(vec!['a', 'b', 'c']);
    let source = ObservedDataSource::new(list.clone());
    let recorder = record(&*source);
    let follower = follow(&*source);

    list.push('d');
    assert_eq!(
        recorder.take(),
        vec![DataChange::InsertItems {
            items: vec!['d'],
            at: ItemAnchor::EndOfSection(0),
        }]
    );

    list.insert(0, 'z').unwrap();
    list.insert_many(2, vec!['m', 'n']).unwrap();
    assert_eq!(
        recorder.take(),
        vec![
            DataChange::InsertItems {
                items: vec!['z'],
                at: ItemAnchor::Before('a'),
            },
            DataChange::InsertItems {
                items: vec!['m', 'n'],
                at: ItemAnchor::Before('b'),
            },
        ]
    );
    follower.assert_in_sync(&*source);

    assert_eq!(list.remove(1).unwrap(), 'a');
    assert_eq!(recorder.take(), vec![DataChange::DeleteItems(vec!['a'])]);

    assert_eq!(list.replace(0, 'q').unwrap(), 'z');
    assert_eq!(
        recorder.take(),
        vec![DataChange::Batch(vec![
            DataChange::DeleteItems(vec!['z']),
            DataChange::InsertItems {
                items: vec!['q'],
                at: ItemAnchor::Before('m'),
            },
        ])]
    );
    list.replace(0, 'q').unwrap();
    assert_eq!(recorder.take(), vec![DataChange::ReloadItems(vec!['q'])]);
    follower.assert_in_sync(&*source);

    list.set(vec!['x']);
    assert_eq!(source.sections().unwrap(), vec![section(&['x'])]);
    follower.assert_in_sync(&*source);
}

#[test]
fn unrecognized_notifications_are_dropped() {
    let list = ObservableVec::new(vec![1, 2]);
    let source = ObservedDataSource::new(list.clone());
    let recorder = record(&*source);

    let notification: ListNotification =
        serde_json::from_str(r#"{"kind":"reordered","indices":[0,1]}"#).unwrap();
    assert_eq!(notification.kind, ListChangeKind::Unrecognized);
    list.notify(notification);
    assert!(recorder.is_empty());
    assert_eq!(source.item(IndexPath::new(0, 1)).unwrap(), 2);
}

#[test]
fn drift_is_repaired_with_a_section_replacement() {
    let list = ObservableVec::new(vec!["a", "b"]);
    let source = ObservedDataSource::new(list.clone());
    let recorder = record(&*source);
    let follower = follow(&*source);

    // The list gains an item nobody announced, then reports a removal that
    // does not explain the new contents.
    list.edit_silently(|items| items.push("c"));
    assert_eq!(source.number_of_items(0).unwrap(), 2);
    list.notify(ListNotification::new(ListChangeKind::Removal, vec![0]));

    assert_eq!(
        recorder.take(),
        vec![DataChange::Batch(vec![
            DataChange::DeleteSections(vec![section(&["a", "b"])]),
            DataChange::InsertSections {
                sections: vec![section(&["a", "b", "c"])],
                at: SectionAnchor::At(0),
            },
        ])]
    );
    follower.assert_in_sync(&*source);
}

#[test]
fn reads_index_into_the_cached_section() {
    let list = ObservableVec::new(vec![10, 20]);
    let source = ObservedDataSource::new(list.clone());

    list.edit_silently(|items| items.insert(0, 5));
    assert_eq!(source.number_of_items(0).unwrap(), 2);
    assert_eq!(source.item(IndexPath::new(0, 1)).unwrap(), 20);
    assert_eq!(source.supplementary_item("header", 0).unwrap(), None);
    assert_eq!(
        source.item(IndexPath::new(0, 2)),
        Err(DataSourceError::ItemOutOfRange {
            section: 0,
            index: 2,
            count: 2,
        })
    );
    assert_eq!(
        source.number_of_items(1),
        Err(DataSourceError::SectionOutOfRange { index: 1, count: 1 })
    );

    source.dispose();
    assert_eq!(source.number_of_items(0), Err(DataSourceError::Disposed));
    assert_eq!(source.item(IndexPath::new(0, 0)), Err(DataSourceError::Disposed));
    assert_eq!(
        source.supplementary_item("header", 0),
        Err(DataSourceError::Disposed)
    );
}

#[test]
fn out_of_range_list_edits_are_rejected() {
    let list = ObservableVec::new(vec![1]);
    let source = ObservedDataSource::new(list.clone());
    let recorder = record(&*source);

    assert_eq!(
        list.insert(3, 9),
        Err(DataSourceError::InsertionOutOfRange { index: 3, len: 1 })
    );
    assert!(list.remove(1).is_err());
    assert!(recorder.is_empty());
    assert_eq!(list.len(), 1);
}

#[test]
fn disposed_node_stops_observing() {
    let list = ObservableVec::new(vec![1]);
    let source = ObservedDataSource::new(list.clone());
    let recorder = record(&*source);

    source.dispose();
    list.push(2);
    assert!(recorder.is_empty());
    assert_eq!(source.sections(), Err(DataSourceError::Disposed));
}
