//! Equivalence harness comparing [`AvlTree`] and [`AvlMap`] against `std`'s `BTreeMap`.
//!
//! Used by the property tests and by the fuzz targets.
extern crate std;

use std::{collections::BTreeMap, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{AvlMap, AvlTree, Links, TreeNode};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
    pub value: u32,
}

impl TestNode {
    pub fn new(key: u32, value: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
            value,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// Returns the fewest nodes an AVL tree of height `height` can hold.
///
/// These are the sizes of Fibonacci trees: `N(h) = N(h - 1) + N(h - 2) + 1`.
pub fn min_len_for_height(height: usize) -> usize {
    let (mut shorter, mut taller) = (0usize, 1usize);

    match height {
        0 => 0,
        _ => {
            for _ in 1..height {
                (shorter, taller) = (taller, taller + shorter + 1);
            }

            taller
        }
    }
}

/// Panics unless `tree` satisfies every invariant and is no taller than the AVL bound allows.
pub fn assert_avl<T: TreeNode<Links<T>> + ?Sized>(tree: &AvlTree<T>) {
    tree.assert_invariants();

    let height = tree.height();
    assert!(
        tree.len() >= min_len_for_height(height),
        "{} elements cannot form an AVL tree of height {height}",
        tree.len()
    );
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn item_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue, u32),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    // `Index` items pick an existing key so that hits are as likely as misses.
    fn finalize(self, map: &BTreeMap<u32, u32>) -> FinalOp {
        let key = |item: ItemValue| match item {
            ItemValue::Index(idx) if !map.is_empty() => {
                *map.keys().nth(idx % map.len()).expect("index is in bounds")
            }
            ItemValue::Index(idx) => idx as u32,
            ItemValue::Random(key) => key,
        };

        match self {
            Op::Insert(item, value) => FinalOp::Insert(key(item), value),
            Op::Get(item) => FinalOp::Get(key(item)),
            Op::Remove(item) => FinalOp::Remove(key(item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32, u32),
    Get(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        (item_strategy(), 0u32..100).prop_map(|(item, value)| Op::Insert(item, value)),
        item_strategy().prop_map(Op::Get),
        item_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

/// Runs `ops` against an intrusive [`AvlTree`] and a `BTreeMap`, checking that both agree after
/// every operation.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeMap::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    #[inline]
    #[allow(clippy::boxed_local)]
    fn node_entry(node: Box<TestNode>) -> (u32, u32) {
        (node.key, node.value)
    }

    #[inline]
    fn ref_entry(node: &TestNode) -> (u32, u32) {
        (node.key, node.value)
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&btree);

        match final_op {
            FinalOp::Insert(key, value) => {
                let from_btree = btree.insert(key, value).map(|old| (key, old));
                let from_avl = avl.insert(TestNode::new(key, value)).map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get_key_value(&key).map(|(&k, &v)| (k, v));
                let from_avl = avl.get(&key).map(|node| ref_entry(node.get_ref()));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                let from_btree = btree.remove_entry(&key);
                let from_avl = avl.remove(&key).map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(|(&k, &v)| (k, v));
                let from_avl = avl.first().map(|node| ref_entry(node.get_ref()));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first().map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(|(&k, &v)| (k, v));
                let from_avl = avl.last().map(|node| ref_entry(node.get_ref()));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last().map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        assert_avl(&avl);
        assert_eq!(btree.len(), avl.len());
        assert!(btree
            .iter()
            .map(|(&k, &v)| (k, v))
            .eq(avl.iter().map(ref_entry)));
    }
}

/// Runs `ops` against an [`AvlMap`] and a `BTreeMap`, checking that both agree after every
/// operation.
pub fn run_map_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeMap::new();
    let mut avl = AvlMap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&btree);

        match final_op {
            FinalOp::Insert(key, value) => {
                assert_eq!(
                    btree.insert(key, value),
                    avl.insert(key, value),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Get(key) => {
                assert_eq!(btree.get(&key), avl.get(&key), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                assert_eq!(
                    btree.remove(&key),
                    avl.remove(&key),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::First => {
                assert_eq!(
                    btree.first_key_value(),
                    avl.first_key_value(),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::PopFirst => {
                assert_eq!(btree.pop_first(), avl.pop_first(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                assert_eq!(
                    btree.last_key_value(),
                    avl.last_key_value(),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::PopLast => {
                assert_eq!(btree.pop_last(), avl.pop_last(), "FinalOp #{op_id}: {final_op:?}");
            }
        }

        if let Err(violation) = avl.check_invariants() {
            panic!("FinalOp #{op_id}: {final_op:?}: {violation}");
        }
        assert!(avl.len() >= min_len_for_height(avl.height()));
        assert!(btree.iter().eq(avl.iter()));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    RemoveCurrent,
    RemoveCurrentMovePrev,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        Just(CursorOp::RemoveCurrent),
        Just(CursorOp::RemoveCurrentMovePrev),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub values: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u32::arbitrary(u).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let values = core::iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput { values, ops })
    }
}

/// Drives a [`CursorMut`](crate::CursorMut) and an index into a sorted `Vec` in lockstep.
///
/// Removals through the cursor exercise every removal shape, including two-child removals that
/// swap the removed node with its predecessor.
pub fn run_cursor_equivalence(mut values: Vec<u32>, ops: Vec<CursorOp>) {
    values.sort_unstable();
    values.dedup();

    let mut vec = Vec::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    for val in values {
        vec.push(val);
        avl.insert(TestNode::new(val, 0));
    }

    fn vec_curs_prev(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => v.len().checked_sub(1),
        }
    }

    fn vec_curs_next(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(&vec, None);
    let mut avl_curs = avl.cursor_first_mut();

    // Check that the initial states are equivalent.
    {
        let v = vec_curs.map(|i| &vec[i]);
        let w = avl_curs.get().map(TestNode::key);

        assert_eq!(v, w);
    }

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(&vec, vec_curs);
                avl_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(&vec, vec_curs);
                avl_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs).map(|i| &vec[i]);
                let w = avl_curs.peek_next().map(TestNode::key);

                assert_eq!(v, w);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs).map(|i| &vec[i]);
                let w = avl_curs.peek_prev().map(TestNode::key);

                assert_eq!(v, w);
            }

            CursorOp::RemoveCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                let w = avl_curs.remove_current().map(|node| node.key);

                assert_eq!(v, w);
            }

            CursorOp::RemoveCurrentMovePrev => {
                let new_v_curs = vec_curs.map(|_| vec_curs_prev(&vec, vec_curs));
                let v = vec_curs.map(|i| vec.remove(i));

                if let Some(vc) = new_v_curs {
                    vec_curs = vc;
                }

                let w = avl_curs
                    .remove_current_and_move_prev()
                    .map(|node| node.key);

                assert_eq!(v, w);
            }
        }

        let v = vec_curs.map(|i| &vec[i]);
        let w = avl_curs.get().map(TestNode::key);

        assert_eq!(v, w);
    }

    drop(avl_curs);
    assert_avl(&avl);
    assert!(vec.iter().eq(avl.iter().map(TestNode::key)));
}
