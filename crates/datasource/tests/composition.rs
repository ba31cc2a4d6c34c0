mod common;

use std::rc::Rc;

use common::{follow, init_tracing, items_of, record, section, shared};
use datasource::{
    CompositeDataSource, DataChange, DataSource, DataSourceError, EmptyDataSource, IndexPath,
    ItemAnchor, MutableCompositeDataSource, MutableDataSource, SectionAnchor, SharedDataSource,
    StaticDataSource,
};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn composite_concatenates_children() {
    let first: SharedDataSource<char> = StaticDataSource::from_items(vec!['a', 'b']);
    let second: SharedDataSource<char> = StaticDataSource::from_items(vec!['c']);
    let empty: SharedDataSource<char> = EmptyDataSource::new();
    let composite = CompositeDataSource::new(vec![first, empty, second.clone()]);

    assert_eq!(composite.number_of_sections().unwrap(), 2);
    assert_eq!(composite.item(IndexPath::new(1, 0)).unwrap(), 'c');
    assert_eq!(composite.number_of_items(0).unwrap(), 2);
    assert_eq!(
        composite.number_of_sections().and_then(|n| composite.number_of_items(n)),
        Err(DataSourceError::SectionOutOfRange { index: 2, count: 2 })
    );

    let leaf = Rc::clone(&composite).resolve_leaf(IndexPath::new(1, 0)).unwrap();
    assert!(Rc::ptr_eq(&leaf.source, &second));
    assert_eq!(leaf.path, IndexPath::new(0, 0));
}

#[test]
fn composite_republishes_child_changes_as_apply() {
    init_tracing();
    let head = MutableDataSource::new(vec![1]);
    let tail = MutableDataSource::new(vec![5]);
    let composite = CompositeDataSource::new(vec![shared(&head), shared(&tail)]);
    let recorder = record(&*composite);

    tail.insert_item(6, 1).unwrap();
    assert_eq!(
        recorder.take(),
        vec![DataChange::Apply(vec![section(&[1]), section(&[5, 6])])]
    );
}

#[test]
fn mutable_composite_shifts_child_events() {
    let head = MutableDataSource::new(vec!["a"]);
    let tail = MutableDataSource::new(vec!["x"]);
    let composite = MutableCompositeDataSource::new(vec![shared(&head), shared(&tail)]);
    let recorder = record(&*composite);
    let follower = follow(&*composite);

    tail.insert_item("y", 1).unwrap();
    assert_eq!(
        recorder.take(),
        vec![DataChange::InsertItems {
            items: vec!["y"],
            at: ItemAnchor::EndOfSection(1),
        }]
    );
    follower.assert_in_sync(&*composite);

    // Offsets are taken when the event is forwarded, not when the child
    // joined.
    composite
        .insert(
            shared(&StaticDataSource::new(vec![section(&["s1"]), section(&["s2"])])),
            0,
        )
        .unwrap();
    tail.insert_item("z", 2).unwrap();
    assert_eq!(
        recorder.take(),
        vec![
            DataChange::InsertSections {
                sections: vec![section(&["s1"]), section(&["s2"])],
                at: SectionAnchor::Before(section(&["a"])),
            },
            DataChange::InsertItems {
                items: vec!["z"],
                at: ItemAnchor::EndOfSection(3),
            },
        ]
    );
    follower.assert_in_sync(&*composite);
}

#[test]
fn mutable_composite_child_list_edits() {
    let a: SharedDataSource<u32> = StaticDataSource::new(vec![section(&[1]), section(&[2])]);
    let b: SharedDataSource<u32> = StaticDataSource::from_items(vec![3]);
    let c: SharedDataSource<u32> = StaticDataSource::from_items(vec![4]);
    let composite = MutableCompositeDataSource::new(vec![a.clone(), b.clone()]);
    let follower = follow(&*composite);
    let recorder = record(&*composite);

    composite.push(c.clone()).unwrap();
    assert_eq!(
        recorder.take(),
        vec![DataChange::InsertSections {
            sections: vec![section(&[4])],
            at: SectionAnchor::At(3),
        }]
    );
    follower.assert_in_sync(&*composite);

    composite.move_child(0, 2).unwrap();
    assert_eq!(
        items_of(&composite.sections().unwrap()),
        vec![vec![3], vec![4], vec![1], vec![2]]
    );
    assert_eq!(
        recorder.take(),
        vec![DataChange::Batch(vec![
            DataChange::MoveSection {
                section: section(&[2]),
                to: 3,
            },
            DataChange::MoveSection {
                section: section(&[1]),
                to: 2,
            },
        ])]
    );
    follower.assert_in_sync(&*composite);

    composite.move_child(2, 0).unwrap();
    follower.assert_in_sync(&*composite);
    composite.move_child(1, 2).unwrap();
    follower.assert_in_sync(&*composite);

    let replacement: SharedDataSource<u32> =
        StaticDataSource::new(vec![section(&[7]).with_supplementary("header", json!(7))]);
    let previous = composite.replace(1, replacement).unwrap();
    assert!(Rc::ptr_eq(&previous, &c));
    follower.assert_in_sync(&*composite);

    let removed = composite.delete(0).unwrap();
    assert!(Rc::ptr_eq(&removed, &a));
    follower.assert_in_sync(&*composite);

    composite.delete_range(0..composite.len()).unwrap();
    assert_eq!(composite.number_of_sections().unwrap(), 0);
    follower.assert_in_sync(&*composite);

    assert_eq!(
        composite.move_child(0, 1),
        Err(DataSourceError::ChildOutOfRange { index: 0, count: 0 })
    );
}

#[test]
fn removed_children_are_no_longer_forwarded() {
    let child = MutableDataSource::new(vec![1]);
    let composite = MutableCompositeDataSource::new(vec![shared(&child)]);
    let recorder = record(&*composite);

    composite.delete(0).unwrap();
    recorder.take();
    child.insert_item(2, 0).unwrap();
    assert!(recorder.is_empty());
    assert!(!child.is_disposed());
}

#[test]
fn same_child_twice_is_forwarded_for_each_position() {
    let child = MutableDataSource::new(vec![1]);
    let composite = MutableCompositeDataSource::new(vec![shared(&child), shared(&child)]);
    let recorder = record(&*composite);

    child.insert_item(2, 1).unwrap();
    assert_eq!(
        recorder.take(),
        vec![
            DataChange::InsertItems {
                items: vec![2],
                at: ItemAnchor::EndOfSection(0),
            },
            DataChange::InsertItems {
                items: vec![2],
                at: ItemAnchor::EndOfSection(1),
            },
        ]
    );
}

#[test]
fn nested_composites_follow_leaf_edits() {
    let leaf = MutableDataSource::new(vec!['p', 'q']);
    let inner = MutableCompositeDataSource::new(vec![
        shared(&StaticDataSource::from_items(vec!['a'])),
        shared(&leaf),
    ]);
    let outer = MutableCompositeDataSource::new(vec![
        shared(&StaticDataSource::from_items(vec!['z'])),
        shared(&inner),
    ]);
    let follower = follow(&*outer);

    leaf.move_item(0, 1).unwrap();
    leaf.insert_item('r', 0).unwrap();
    leaf.delete_item(1).unwrap();
    follower.assert_in_sync(&*outer);
    assert_eq!(outer.item(IndexPath::new(2, 0)).unwrap(), 'r');

    let resolved = Rc::clone(&outer).resolve_leaf(IndexPath::new(2, 1)).unwrap();
    let expected: SharedDataSource<char> = leaf;
    assert!(Rc::ptr_eq(&resolved.source, &expected));
    assert_eq!(resolved.path, IndexPath::new(0, 1));
}

#[test]
fn child_edits_naming_repeated_sections_emit_apply() {
    let a = MutableDataSource::<u32>::new(vec![]);
    let b = MutableDataSource::new(vec![5]);
    let c = MutableDataSource::<u32>::new(vec![]);
    let composite = MutableCompositeDataSource::new(vec![shared(&a), shared(&b), shared(&c)]);
    let recorder = record(&*composite);
    let follower = follow(&*composite);

    // `b` is the only section with its contents, so it moves precisely.
    composite.move_child(1, 2).unwrap();
    assert_eq!(
        recorder.take(),
        vec![DataChange::MoveSection {
            section: section(&[5]),
            to: 2,
        }]
    );

    // Both empty sections look alike.
    composite.move_child(0, 2).unwrap();
    assert_eq!(
        recorder.take(),
        vec![DataChange::Apply(vec![section::<u32>(&[]), section(&[5]), section(&[])])]
    );
    follower.assert_in_sync(&*composite);

    composite
        .insert(shared(&StaticDataSource::from_items(vec![9])), 2)
        .unwrap();
    assert!(matches!(recorder.take().as_slice(), [DataChange::Apply(_)]));
    follower.assert_in_sync(&*composite);

    let empty = MutableDataSource::<u32>::new(vec![]);
    composite.replace(0, shared(&empty)).unwrap();
    assert!(matches!(recorder.take().as_slice(), [DataChange::Apply(_)]));
    follower.assert_in_sync(&*composite);

    composite.delete(3).unwrap();
    assert!(matches!(recorder.take().as_slice(), [DataChange::Apply(_)]));
    follower.assert_in_sync(&*composite);
    assert_eq!(
        items_of(&composite.sections().unwrap()),
        vec![Vec::<u32>::new(), vec![5], vec![9]]
    );

    // Nothing is repeated any more.
    composite.delete(0).unwrap();
    assert_eq!(
        recorder.take(),
        vec![DataChange::DeleteSections(vec![section::<u32>(&[])])]
    );
    follower.assert_in_sync(&*composite);
}

#[derive(Debug, Clone)]
enum Edit {
    Insert { child: usize, at: usize },
    Delete { child: usize, at: usize },
    Move { child: usize, from: usize, to: usize },
    MoveChild { from: usize, to: usize },
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..3, 0usize..8).prop_map(|(child, at)| Edit::Insert { child, at }),
        (0usize..3, 0usize..8).prop_map(|(child, at)| Edit::Delete { child, at }),
        (0usize..3, 0usize..8, 0usize..8).prop_map(|(child, from, to)| Edit::Move {
            child,
            from,
            to
        }),
        (0usize..3, 0usize..3).prop_map(|(from, to)| Edit::MoveChild { from, to }),
    ]
}

proptest! {
    #[test]
    fn mirror_tracks_random_composite_edits(edits in prop::collection::vec(edit(), 0..40)) {
        let children: Vec<Rc<MutableDataSource<u32>>> =
            (0..3).map(|k| MutableDataSource::new(vec![k * 100])).collect();
        let composite =
            MutableCompositeDataSource::new(children.iter().map(|c| shared(c)).collect());
        let follower = follow(&*composite);
        let mut next = 1000;

        for edit in edits {
            match edit {
                Edit::Insert { child, at } => {
                    let target = &children[child];
                    target.insert_item(next, at % (target.len().unwrap() + 1)).unwrap();
                    next += 1;
                }
                Edit::Delete { child, at } => {
                    let target = &children[child];
                    if !target.is_empty().unwrap() {
                        target.delete_item(at % target.len().unwrap()).unwrap();
                    }
                }
                Edit::Move { child, from, to } => {
                    let target = &children[child];
                    if !target.is_empty().unwrap() {
                        let len = target.len().unwrap();
                        target.move_item(from % len, to % len).unwrap();
                    }
                }
                Edit::MoveChild { from, to } => composite.move_child(from, to).unwrap(),
            }
            follower.assert_in_sync(&*composite);
        }
    }
}
