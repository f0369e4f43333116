//! An intrusive AVL tree.
//!
//! Every node stores a balance factor, the height of its left subtree minus the height of its
//! right subtree. Once a rebalance walk has finished, every balance factor is -1, 0 or 1, which
//! keeps the height of a tree with `n` nodes below `1.45 * log2(n + 2)`.
//!
//! After an insertion at most one single or double rotation is needed: rotating at the lowest
//! ancestor that is off by two restores that subtree to its height from before the insertion.
//! A removal may shrink every subtree on the path to the root, so the removal walk can rotate at
//! each level on the way up.
//#![no_std]

use core::{
    cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not, pin::Pin,
    ptr::NonNull,
};
use std::borrow::Borrow;

use cordyceps::Linked;

mod cursor;
mod debug;
mod entry;
mod error;
mod iter;
pub mod map;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use cursor::{Cursor, CursorMut};
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use error::InvariantViolation;
pub use iter::Iter;
pub use map::AvlMap;

use entry::InsertAs;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// The tree owns every item linked into it through `T::Handle`. Each item embeds a [`Links`]
/// block holding its parent and child pointers and its balance factor.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    balance: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

enum Search<T: ?Sized> {
    Found(NonNull<T>),
    Vacant(InsertAs<T>),
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree. An empty tree has height 0 and a single node height 1.
    pub fn height(&self) -> usize {
        unsafe { self.subtree_height(self.root) }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// This walks the whole tree and computes subtree heights from scratch, without trusting the
    /// stored balance factors.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return match self.len {
                0 => Ok(()),
                expected => Err(InvariantViolation::LengthMismatch { expected, found: 0 }),
            };
        };

        unsafe {
            if self.links(root).parent().is_some() {
                return Err(InvariantViolation::RootHasParent {
                    key: Self::describe(root),
                });
            }

            let mut found = 0;
            self.check_subtree(root, &mut found)?;

            if found != self.len {
                return Err(InvariantViolation::LengthMismatch {
                    expected: self.len,
                    found,
                });
            }
        }

        let mut prev: Option<&T::Key> = None;
        for node in self.iter() {
            let key = node.key();

            if let Some(prev) = prev.filter(|&prev| prev >= key) {
                return Err(InvariantViolation::OutOfOrder {
                    prev: format!("{prev:?}"),
                    next: format!("{key:?}"),
                });
            }

            prev = Some(key);
        }

        Ok(())
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn assert_invariants(&self) {
        if let Err(violation) = self.check_invariants() {
            panic!("{violation}");
        }
    }

    // Checks links and balance below `node`, returning the true height of its subtree.
    unsafe fn check_subtree(
        &self,
        node: NonNull<T>,
        count: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        *count += 1;

        // More nodes than `len` means the links are cyclic or `len` is stale; stop descending.
        if *count > self.len {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.len,
                found: *count,
            });
        }

        let mut heights = [0; 2];

        unsafe {
            for dir in [Dir::Left, Dir::Right] {
                let Some(child) = self.links(node).child(dir) else {
                    continue;
                };

                if self.links(child).parent() != Some(node) {
                    return Err(InvariantViolation::BrokenParentLink {
                        parent: Self::describe(node),
                        child: Self::describe(child),
                    });
                }

                heights[dir as usize] = self.check_subtree(child, count)?;
            }

            let [left, right] = heights;
            let actual = left as isize - right as isize;

            if actual.abs() > 1 {
                return Err(InvariantViolation::Unbalanced {
                    key: Self::describe(node),
                    left,
                    right,
                });
            }

            let stored = self.links(node).balance();
            if isize::from(stored) != actual {
                return Err(InvariantViolation::StaleBalance {
                    key: Self::describe(node),
                    stored,
                    actual: actual as i8,
                });
            }

            Ok(1 + left.max(right))
        }
    }

    unsafe fn describe(node: NonNull<T>) -> String {
        format!("{:?}", unsafe { node.as_ref() }.key())
    }

    /// Returns `true` if the tree contains an element with the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a reference to the element corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the element corresponding to `key`.
    ///
    /// Modifying the key of the returned element in a way that changes its ordering relative to
    /// the other elements leaves the tree in an unspecified (but memory-safe) state.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(node) => Some(node),
            Search::Vacant(_) => None,
        }
    }

    // Descends from the root looking for `key`, returning either the matching node or the
    // position a node with that key would be attached at.
    fn search<Q>(&self, key: &Q) -> Search<T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Search::Vacant(InsertAs::Root);
        };

        loop {
            unsafe {
                let dir = match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => Dir::Left,
                    Ordering::Equal => return Search::Found(cur),
                    Ordering::Greater => Dir::Right,
                };

                match self.links(cur).child(dir) {
                    Some(child) => cur = child,
                    None => return Search::Vacant(InsertAs::Child { parent: cur, dir }),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.first_raw()
            .map(|first| unsafe { Pin::new_unchecked(first.as_ref()) })
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.last_raw()
            .map(|last| unsafe { Pin::new_unchecked(last.as_ref()) })
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.first_raw()?;
        unsafe { Some(self.remove_at(first)) }
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.last_raw()?;
        unsafe { Some(self.remove_at(last)) }
    }

    /// Returns an iterator over the elements of the tree, in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing at the minimum element of the tree.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::first(self)
    }

    /// Returns a cursor pointing at the maximum element of the tree.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::last(self)
    }

    /// Returns an editing cursor pointing at the minimum element of the tree.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::first(self)
    }

    /// Returns an editing cursor pointing at the maximum element of the tree.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::last(self)
    }

    /// Returns the entry for `key`, which is occupied if an element with that key is linked.
    pub fn entry<Q>(&mut self, key: &Q) -> Entry<'_, T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(node) => Entry::Occupied(OccupiedEntry { tree: self, node }),
            Search::Vacant(insert_as) => Entry::Vacant(VacantEntry {
                tree: self,
                insert_as,
            }),
        }
    }

    /// Inserts an item into the tree.
    ///
    /// If an element with an equal key is already present, `item` takes over its position and
    /// the previous element is returned. No rebalancing is needed in that case.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        unsafe {
            match self.search(ptr.as_ref().key()) {
                Search::Found(existing) => Some(self.replace_node(existing, ptr)),
                Search::Vacant(insert_as) => {
                    self.insert_at(insert_as, ptr);
                    None
                }
            }
        }
    }

    // Links `ptr` at the vacant position `insert_as` and rebalances.
    //
    // # Safety
    //
    // `insert_as` must have been produced by a search for `ptr`'s key, with no modification of
    // the tree since.
    unsafe fn insert_at(&mut self, insert_as: InsertAs<T>, ptr: NonNull<T>) {
        unsafe {
            self.links_mut(ptr).clear();

            match insert_as {
                InsertAs::Root => {
                    debug_assert!(self.root.is_none());
                    self.root = Some(ptr);
                }

                InsertAs::Child { parent, dir } => {
                    debug_assert!(self.links(parent).child(dir).is_none());
                    self.links_mut(parent).set_child(dir, Some(ptr));
                    self.links_mut(ptr).set_parent(Some(parent));
                    self.rebalance_inserted(parent);
                }
            }
        }

        self.len += 1;
    }

    // Moves `new` into the position of `old`, which is unlinked and returned.
    //
    // # Safety
    //
    // `old` must be linked into `self` and `new` must be unlinked, with a key equal to `old`'s.
    unsafe fn replace_node(&mut self, old: NonNull<T>, new: NonNull<T>) -> T::Handle {
        unsafe {
            let old_links = self.links(old);
            let parent = old_links.parent();
            let left = old_links.left();
            let right = old_links.right();
            let balance = old_links.balance();

            self.replace_child_or_set_root(parent, old, Some(new));
            self.maybe_set_parent(left, Some(new));
            self.maybe_set_parent(right, Some(new));

            let new_links = self.links_mut(new);
            new_links.set_parent(parent);
            new_links.set_left(left);
            new_links.set_right(right);
            new_links.set_balance(balance);

            self.links_mut(old).clear();

            T::from_ptr(old)
        }
    }

    // Walks up from `parent`, the parent of a freshly linked leaf, recomputing balance factors.
    //
    // The walk ends at the first node whose height did not change, or after the single
    // rebalancing step at the first node that is off by two.
    fn rebalance_inserted(&mut self, parent: NonNull<T>) {
        let mut opt_cur = Some(parent);

        while let Some(cur) = opt_cur {
            unsafe {
                match self.update_balance(cur) {
                    0 => {
                        log::trace!("insert walk settled at {:?}", cur.as_ref().key());
                        return;
                    }
                    -1 | 1 => opt_cur = self.links(cur).parent(),
                    _ => {
                        self.rebalance_at(cur);
                        return;
                    }
                }
            }
        }
    }

    /// Removes the element corresponding to `key` from the tree and returns it.
    ///
    /// Returns `None`, leaving the tree untouched, if no element has that key.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        unsafe { Some(self.remove_at(node)) }
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            let links = self.links(node);
            if let (Some(left), Some(_)) = (links.left(), links.right()) {
                // Trade places with the in-order predecessor. In its old position `node` has no
                // right child.
                let predecessor = self.extreme_in_subtree(left, Dir::Right);
                self.swap_nodes(node, predecessor);
            }

            let links = self.links(node);
            let parent = links.parent();
            let child = links.left().or(links.right());

            self.replace_child_or_set_root(parent, node, child);
            self.maybe_set_parent(child, parent);

            if let Some(parent) = parent {
                self.rebalance_removed(parent);
            }

            self.links_mut(node).clear();
            self.len -= 1;

            T::from_ptr(node)
        }
    }

    // Walks up from `parent`, one of whose subtrees just lost a node, recomputing balance factors
    // and rotating wherever a node is off by two.
    //
    // Unlike insertion, a rotation here can leave the subtree shorter than before, so the walk
    // only ends once a subtree root is found that kept its height: one that still leans to a
    // side after being settled.
    fn rebalance_removed(&mut self, parent: NonNull<T>) {
        let mut opt_cur = Some(parent);

        while let Some(cur) = opt_cur {
            unsafe {
                self.update_balance(cur);
                let subtree = self.rebalance_at(cur);

                if self.links(subtree).balance() != 0 {
                    log::trace!("removal walk settled at {:?}", subtree.as_ref().key());
                    return;
                }

                opt_cur = self.links(subtree).parent();
            }
        }
    }

    // Restores balance at `node` if its balance factor is off by two, returning the node that now
    // roots the subtree `node` used to root.
    fn rebalance_at(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe {
            match self.links(node).balance() {
                2 => {
                    let left = self
                        .links(node)
                        .left()
                        .expect("left-heavy node must have a left child");

                    // LR: straighten the left child out first.
                    if self.links(left).balance() < 0 {
                        self.rotate_left(left);
                    }

                    self.rotate_right(node)
                }

                -2 => {
                    let right = self
                        .links(node)
                        .right()
                        .expect("right-heavy node must have a right child");

                    // RL: straighten the right child out first.
                    if self.links(right).balance() > 0 {
                        self.rotate_right(right);
                    }

                    self.rotate_left(node)
                }

                balance => {
                    debug_assert!((-1..=1).contains(&balance), "balance out of range: {balance}");
                    node
                }
            }
        }
    }

    // Rotates the `from` child of `down` up into `down`'s position and returns it.
    //
    // The balance factors of `down` and the raised child are recomputed. No other node changes
    // height.
    fn rotate(&mut self, down: NonNull<T>, from: Dir) -> NonNull<T> {
        unsafe {
            let up = self
                .links(down)
                .child(from)
                .expect("rotation requires a child on the rotating side");

            log::trace!("rotating {:?} at {:?}", !from, down.as_ref().key());

            let across = self.links_mut(up).set_child(!from, Some(down));
            self.links_mut(down).set_child(from, across);
            self.maybe_set_parent(across, Some(down));

            let parent = self.links_mut(down).set_parent(Some(up));
            self.links_mut(up).set_parent(parent);
            self.replace_child_or_set_root(parent, down, Some(up));

            self.update_balance(down);
            self.update_balance(up);

            up
        }
    }

    #[inline]
    fn rotate_right(&mut self, node: NonNull<T>) -> NonNull<T> {
        self.rotate(node, Dir::Left)
    }

    #[inline]
    fn rotate_left(&mut self, node: NonNull<T>) -> NonNull<T> {
        self.rotate(node, Dir::Right)
    }

    // Exchanges the positions of `a` and `b` in the tree, along with their balance factors, so
    // each stored balance keeps describing the position it sits in.
    //
    // The nodes may be adjacent.
    unsafe fn swap_nodes(&mut self, a: NonNull<T>, b: NonNull<T>) {
        if a == b {
            return;
        }

        let swap = move |link: Link<T>| match link {
            Some(n) if n == a => Some(b),
            Some(n) if n == b => Some(a),
            other => other,
        };

        unsafe {
            log::trace!(
                "swapping {:?} with {:?}",
                a.as_ref().key(),
                b.as_ref().key()
            );

            let a_links = self.links(a);
            let (a_parent, a_left, a_right, a_balance) = (
                a_links.parent(),
                a_links.left(),
                a_links.right(),
                a_links.balance(),
            );

            let b_links = self.links(b);
            let (b_parent, b_left, b_right, b_balance) = (
                b_links.parent(),
                b_links.left(),
                b_links.right(),
                b_links.balance(),
            );

            // Redirect the outer parents. Siblings share one, which must only be redirected once.
            let b_outer_parent = b_parent.filter(|_| b_parent != a_parent);
            for parent in [a_parent, b_outer_parent].into_iter().flatten() {
                if parent == a || parent == b {
                    continue;
                }

                for dir in [Dir::Left, Dir::Right] {
                    let child = self.links(parent).child(dir);
                    self.links_mut(parent).set_child(dir, swap(child));
                }
            }

            if a_parent.is_none() {
                self.root = Some(b);
            } else if b_parent.is_none() {
                self.root = Some(a);
            }

            let a_links = self.links_mut(a);
            a_links.set_parent(swap(b_parent));
            a_links.set_left(swap(b_left));
            a_links.set_right(swap(b_right));
            a_links.set_balance(b_balance);

            let b_links = self.links_mut(b);
            b_links.set_parent(swap(a_parent));
            b_links.set_left(swap(a_left));
            b_links.set_right(swap(a_right));
            b_links.set_balance(a_balance);

            for node in [a, b] {
                let children = [self.links(node).left(), self.links(node).right()];
                for child in children.into_iter().flatten() {
                    self.links_mut(child).set_parent(Some(node));
                }
            }
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.extreme_in_subtree(cur, Dir::Left);
                let parent = self.links(cur).parent();
                let right = self.links(cur).right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                // Drop the node.
                self.links_mut(cur).clear();
                drop(T::from_ptr(cur));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Support methods ========================================================

    #[inline]
    unsafe fn links<'a>(&self, node: NonNull<T>) -> &'a Links<T> {
        unsafe { T::links(node).as_ref() }
    }

    #[inline]
    unsafe fn links_mut<'a>(&mut self, node: NonNull<T>) -> &'a mut Links<T> {
        unsafe { T::links(node).as_mut() }
    }

    // Returns the height of the subtree rooted at `node`.
    //
    // This follows the taller side of each node as reported by its balance factor, so every
    // balance factor in the subtree must be settled.
    unsafe fn subtree_height(&self, node: Link<T>) -> usize {
        let mut height = 0;
        let mut opt_cur = node;

        while let Some(cur) = opt_cur {
            height += 1;

            let links = unsafe { self.links(cur) };
            opt_cur = if links.balance() >= 0 {
                links.left()
            } else {
                links.right()
            };
        }

        height
    }

    // Recomputes the balance factor of `node` from the heights of its subtrees.
    unsafe fn update_balance(&mut self, node: NonNull<T>) -> i8 {
        unsafe {
            let left = self.subtree_height(self.links(node).left());
            let right = self.subtree_height(self.links(node).right());

            let balance = i8::try_from(left as isize - right as isize)
                .expect("subtree heights must differ by at most two");

            self.links_mut(node).set_balance(balance);
            balance
        }
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { self.links_mut(node).set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            let dir = self.which_child(parent, old_child);

            debug_assert_eq!(
                self.links(parent).child(dir),
                Some(old_child),
                "`old_child` must be a child of `parent`"
            );

            self.links_mut(parent).set_child(dir, new_child);
        }
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { self.links(parent).left() } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    // Returns the node reached by following `dir` links from `root` until there are none left.
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(child) = unsafe { self.links(cur).child(dir) } {
            cur = child;
        }

        cur
    }

    fn first_raw(&self) -> Link<T> {
        self.root
            .map(|root| unsafe { self.extreme_in_subtree(root, Dir::Left) })
    }

    fn last_raw(&self) -> Link<T> {
        self.root
            .map(|root| unsafe { self.extreme_in_subtree(root, Dir::Right) })
    }

    // Returns the in-order neighbor of `node` in direction `dir`: the successor for `Right` and
    // the predecessor for `Left`.
    unsafe fn neighbor_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = self.links(node).child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            // Climb until arriving from the opposite side.
            let mut cur = node;
            while let Some(parent) = self.links(cur).parent() {
                if self.which_child(parent, cur) == !dir {
                    return Some(parent);
                }

                cur = parent;
            }

            None
        }
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'tree, T> IntoIterator for &'tree AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                balance: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn balance(&self) -> i8 {
        unsafe { (*self.inner.get()).balance }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_balance(&mut self, balance: i8) {
        self.inner.get_mut().balance = balance;
    }

    // Resets the links to the unlinked state.
    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.balance = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("balance", &self.balance())
            .finish()
    }
}
