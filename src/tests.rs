extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, assert_avl, TestNode};

use super::*;

fn tree_of(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key, key)).is_none());
        assert_avl(&tree);
    }

    tree
}

fn key_of(link: Link<TestNode>) -> Option<u32> {
    link.map(|node| unsafe { node.as_ref() }.key)
}

fn root_key(tree: &AvlTree<TestNode>) -> Option<u32> {
    key_of(tree.root)
}

// Returns the left child, right child and balance factor of the node holding `key`.
fn children(tree: &AvlTree<TestNode>, key: u32) -> (Option<u32>, Option<u32>, i8) {
    let node = tree.get_raw(&key).expect("key not in tree");
    let links = unsafe { tree.links(node) };

    (key_of(links.left()), key_of(links.right()), links.balance())
}

// Every node's key, parent, children and balance, in key order.
fn shape(tree: &AvlTree<TestNode>) -> Vec<(u32, Option<u32>, Option<u32>, Option<u32>, i8)> {
    tree.iter()
        .map(|node| {
            let links = &node.links;
            (
                node.key,
                key_of(links.parent()),
                key_of(links.left()),
                key_of(links.right()),
                links.balance(),
            )
        })
        .collect()
}

fn permutations(n: u32) -> Vec<Vec<u32>> {
    if n == 0 {
        return vec![vec![]];
    }

    let mut out = Vec::new();
    for shorter in permutations(n - 1) {
        for pos in 0..=shorter.len() {
            let mut perm = shorter.clone();
            perm.insert(pos, n - 1);
            out.push(perm);
        }
    }

    out
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }

    assert_eq!(tree.len(), keys.len());
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        let node = tree.remove(key).expect("item not found");
        assert_eq!(node.key, *key);
        assert_avl(&tree);
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(TestNode::new(key, key));
        assert_avl(&tree);
    }

    for key in keys.iter().rev() {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        assert_avl(&tree);
    }

    assert!(tree.is_empty());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn small_permutations_find() {
    for n in 1..=5 {
        for perm in permutations(n) {
            insert_find_all(&perm);
        }
    }
}

#[test]
fn small_permutations_remove() {
    for n in 1..=6 {
        for perm in permutations(n) {
            insert_remove_all(&perm);
        }
    }
}

#[test]
fn ascending_inserts_rebalance_into_perfect_tree() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(root_key(&tree), Some(4));
    assert_eq!(tree.height(), 3);
    assert_eq!(children(&tree, 4), (Some(2), Some(6), 0));
    assert_eq!(children(&tree, 2), (Some(1), Some(3), 0));
    assert_eq!(children(&tree, 6), (Some(5), Some(7), 0));

    for key in [1, 2, 3] {
        assert!(tree.remove(&key).is_some());
        assert_avl(&tree);
    }

    // Removing 3 leaves 4 right-heavy by two, fixed by a left rotation.
    assert_eq!(root_key(&tree), Some(6));
    assert_eq!(tree.height(), 3);
    assert_eq!(children(&tree, 6), (Some(4), Some(7), 1));
    assert_eq!(children(&tree, 4), (None, Some(5), -1));
    assert_eq!(
        tree.iter().map(|node| node.key).collect::<Vec<_>>(),
        [4, 5, 6, 7]
    );
}

#[test]
fn right_right_rotates_left() {
    let tree = tree_of(&[10, 20, 30]);

    assert_eq!(root_key(&tree), Some(20));
    assert_eq!(children(&tree, 20), (Some(10), Some(30), 0));
    assert_eq!(children(&tree, 10), (None, None, 0));
    assert_eq!(children(&tree, 30), (None, None, 0));
}

#[test]
fn every_three_node_shape_settles_on_the_median() {
    // LL, LR, RL respectively.
    for keys in [[30, 20, 10], [30, 10, 20], [10, 30, 20]] {
        let tree = tree_of(&keys);

        assert_eq!(root_key(&tree), Some(20), "inserting {keys:?}");
        assert_eq!(children(&tree, 20), (Some(10), Some(30), 0));
    }
}

#[test]
fn duplicate_insert_replaces_node_without_restructuring() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2]);
    let before = shape(&tree);

    let old = tree.insert(TestNode::new(4, 40)).expect("key 4 was present");
    assert_eq!((old.key, old.value), (4, 4));
    assert_eq!(old.links.parent(), None);
    assert_eq!(old.links.left(), None);
    assert_eq!(old.links.right(), None);

    assert_avl(&tree);
    assert_eq!(shape(&tree), before);
    assert_eq!(tree.len(), 8);
    assert_eq!(tree.get(&4).map(|node| node.value), Some(40));
}

#[test]
fn ascending_inserts_stay_within_log_height() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for n in 1..=1024u32 {
        tree.insert(TestNode::new(n, 0));

        let bound = (n + 1).next_power_of_two().trailing_zeros() as usize + 1;
        assert!(tree.height() <= bound, "{n} keys reached height {}", tree.height());
    }

    assert_avl(&tree);
    assert_eq!(tree.height(), 11);
}

#[test]
fn two_child_removal_promotes_predecessor() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    let removed = tree.remove(&4).expect("key 4 was present");
    assert_eq!(removed.key, 4);
    assert_avl(&tree);

    assert_eq!(root_key(&tree), Some(3));
    assert_eq!(children(&tree, 3), (Some(2), Some(6), 0));
    assert_eq!(children(&tree, 2), (Some(1), None, 1));
}

#[test]
fn two_child_removal_with_adjacent_predecessor() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    // The predecessor of 2 is its own left child.
    tree.remove(&2).expect("key 2 was present");
    assert_avl(&tree);

    assert_eq!(children(&tree, 4), (Some(1), Some(6), 0));
    assert_eq!(children(&tree, 1), (None, Some(3), -1));

    tree.remove(&6).expect("key 6 was present");
    assert_avl(&tree);

    assert_eq!(children(&tree, 4), (Some(1), Some(5), 0));
    assert_eq!(children(&tree, 5), (None, Some(7), -1));
}

#[test]
fn removal_rotates_at_more_than_one_level() {
    // A Fibonacci tree of height 5: every inner node leans left.
    let mut tree = tree_of(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
    assert_eq!(tree.height(), 5);
    assert_eq!(root_key(&tree), Some(8));

    // Removing 12 unbalances 11; rotating there shortens the right subtree of 8, which then
    // needs its own rotation.
    tree.remove(&12).expect("key 12 was present");
    assert_avl(&tree);

    assert_eq!(tree.height(), 4);
    assert_eq!(root_key(&tree), Some(5));
    assert_eq!(children(&tree, 5), (Some(3), Some(8), 0));
    assert_eq!(children(&tree, 8), (Some(7), Some(10), 0));
    assert_eq!(children(&tree, 10), (Some(9), Some(11), 0));
}

#[test]
fn removing_absent_key_is_a_no_op() {
    let mut tree = tree_of(&[2, 4, 6]);
    let before = shape(&tree);

    assert!(tree.remove(&5).is_none());
    assert_eq!(shape(&tree), before);
    assert_eq!(tree.len(), 3);

    let mut empty: AvlTree<TestNode> = AvlTree::new();
    assert!(empty.remove(&5).is_none());
    assert!(empty.pop_first().is_none());
    assert!(empty.pop_last().is_none());
}

#[test]
fn first_last_and_pops() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    assert_eq!(tree.first().map(|node| node.key), Some(1));
    assert_eq!(tree.last().map(|node| node.key), Some(7));

    assert_eq!(tree.pop_first().map(|node| node.key), Some(1));
    assert_eq!(tree.pop_last().map(|node| node.key), Some(7));
    assert_avl(&tree);

    assert_eq!(tree.first().map(|node| node.key), Some(2));
    assert_eq!(tree.last().map(|node| node.key), Some(6));
    assert_eq!(tree.len(), 5);
}

#[test]
fn entry_inserts_and_removes() {
    let mut tree = tree_of(&[10, 20]);

    match tree.entry(&15) {
        Entry::Vacant(entry) => {
            let node = unsafe { entry.insert(TestNode::new(15, 150)) };
            assert_eq!(node.value, 150);
        }
        Entry::Occupied(_) => panic!("15 should be vacant"),
    }
    assert_avl(&tree);
    assert_eq!(root_key(&tree), Some(15));

    match tree.entry(&20) {
        Entry::Occupied(mut entry) => {
            assert_eq!(entry.get().value, 20);
            let old = unsafe { entry.insert(TestNode::new(20, 200)) };
            assert_eq!(old.value, 20);
            assert_eq!(entry.get().value, 200);
        }
        Entry::Vacant(_) => panic!("20 should be occupied"),
    }
    assert_avl(&tree);
    assert_eq!(tree.len(), 3);

    let Entry::Occupied(entry) = tree.entry(&10) else {
        panic!("10 should be occupied");
    };
    assert_eq!(entry.remove().key, 10);
    assert_avl(&tree);
    assert!(!tree.entry(&10).is_occupied());
}

#[test]
fn cursor_removal_walks_in_order() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    {
        let cursor = tree.cursor_last();
        assert_eq!(cursor.get().map(|node| node.key), Some(7));
        assert_eq!(cursor.peek_prev().map(|node| node.key), Some(6));
        assert_eq!(cursor.peek_next().map(|node| node.key), None);
    }

    let mut cursor = tree.cursor_first_mut();
    cursor.move_next();
    cursor.move_next();
    cursor.move_next();

    // 4 is the root and has two children.
    assert_eq!(cursor.remove_current().map(|node| node.key), Some(4));
    assert_eq!(cursor.get().map(|node| node.key), Some(5));
    assert_eq!(cursor.as_cursor().peek_prev().map(|node| node.key), Some(3));

    drop(cursor);
    assert_avl(&tree);
    assert_eq!(
        tree.iter().map(|node| node.key).collect::<Vec<_>>(),
        [1, 2, 3, 5, 6, 7]
    );
}

#[test]
fn clear_unlinks_everything() {
    let mut tree = tree_of(&(0..100u32).collect::<Vec<_>>());

    tree.clear();

    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.iter().next().map(|node| node.key), None);
    assert_avl(&tree);
}

#[test]
fn stale_balance_is_reported() {
    let mut tree = tree_of(&[2, 1, 3]);
    let root = tree.root.expect("tree is not empty");

    unsafe { tree.links_mut(root).set_balance(1) };

    assert_eq!(
        tree.check_invariants(),
        Err(InvariantViolation::StaleBalance {
            key: "2".into(),
            stored: 1,
            actual: 0,
        })
    );

    unsafe { tree.links_mut(root).set_balance(0) };
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn dotgraph_labels_balance() {
    let tree = tree_of(&[2, 1]);
    let mut out = String::new();

    tree.dotgraph("small", &mut out).expect("writing to a String cannot fail");

    assert!(out.starts_with("digraph \"small\" {"));
    assert!(out.contains("[label=\"2:1\"]"));
    assert!(out.contains("[label=\"1:0\"]"));
    assert_eq!(out.matches("[shape=point]").count(), 3);
}

#[test]
fn min_len_matches_fibonacci_trees() {
    let lens: Vec<_> = (0..7).map(model::min_len_for_height).collect();
    assert_eq!(lens, [0, 1, 2, 4, 7, 12, 20]);
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn map_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_map_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(0u32..500, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }

    #[test]
    fn removing_every_key_empties_the_tree(
        (keys, order) in (1u32..200).prop_flat_map(|n| {
            let keys: Vec<u32> = (1..=n).collect();
            (Just(keys.clone()).prop_shuffle(), Just(keys).prop_shuffle())
        })
    ) {
        let mut tree = tree_of(&keys);

        for key in &order {
            let node = tree.remove(key).expect("every key was inserted");
            prop_assert_eq!(node.key, *key);
            prop_assert_eq!(node.links.parent(), None);
            prop_assert_eq!(node.links.left(), None);
            prop_assert_eq!(node.links.right(), None);
            assert_avl(&tree);
            prop_assert!(!tree.contains_key(key));
        }

        prop_assert!(tree.root.is_none());
        prop_assert_eq!(tree.len(), 0);
    }
}
