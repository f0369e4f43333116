use core::{marker::PhantomData, pin::Pin, ptr::NonNull};

use crate::{AvlTree, Dir, Link, Links, TreeNode};

/// A read-only cursor over an [`AvlTree`].
///
/// Besides the elements of the tree, a cursor can rest on a "ghost" position that sits after the
/// maximum and before the minimum, so stepping forward off the end and then forward again wraps
/// around to the minimum.
pub struct Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    curs: CursorRaw<T>,
    phantom: PhantomData<&'tree AvlTree<T>>,
}

impl<'tree, T> Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree AvlTree<T>) -> Cursor<'tree, T> {
        Cursor {
            curs: CursorRaw::at_end(tree.into(), Dir::Left),
            phantom: PhantomData,
        }
    }

    pub(crate) fn last(tree: &'tree AvlTree<T>) -> Cursor<'tree, T> {
        Cursor {
            curs: CursorRaw::at_end(tree.into(), Dir::Right),
            phantom: PhantomData,
        }
    }

    /// Steps to the in-order successor, or from the ghost position to the minimum.
    pub fn move_next(&mut self) {
        self.curs.step(Dir::Right);
    }

    /// Steps to the in-order predecessor, or from the ghost position to the maximum.
    pub fn move_prev(&mut self) {
        self.curs.step(Dir::Left);
    }

    /// Returns the current element, or `None` at the ghost position.
    pub fn get(&self) -> Option<&'tree T> {
        self.curs.current().map(|p| unsafe { p.as_ref() })
    }

    /// Returns the element [`move_next`](Self::move_next) would land on.
    pub fn peek_next(&self) -> Option<&'tree T> {
        self.curs.peek(Dir::Right).map(|p| unsafe { p.as_ref() })
    }

    /// Returns the element [`move_prev`](Self::move_prev) would land on.
    pub fn peek_prev(&self) -> Option<&'tree T> {
        self.curs.peek(Dir::Left).map(|p| unsafe { p.as_ref() })
    }
}

/// A cursor over an [`AvlTree`] that can also remove elements.
///
/// Positions and movement behave as for [`Cursor`].
pub struct CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    curs: CursorRaw<T>,
    phantom: PhantomData<&'tree mut AvlTree<T>>,
}

impl<'tree, T> CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree mut AvlTree<T>) -> CursorMut<'tree, T> {
        CursorMut {
            curs: CursorRaw::at_end(tree.into(), Dir::Left),
            phantom: PhantomData,
        }
    }

    pub(crate) fn last(tree: &'tree mut AvlTree<T>) -> CursorMut<'tree, T> {
        CursorMut {
            curs: CursorRaw::at_end(tree.into(), Dir::Right),
            phantom: PhantomData,
        }
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            curs: CursorRaw {
                tree: self.curs.tree,
                ptr: self.curs.ptr,
            },
            phantom: PhantomData,
        }
    }

    /// Steps to the in-order successor, or from the ghost position to the minimum.
    pub fn move_next(&mut self) {
        self.curs.step(Dir::Right);
    }

    /// Steps to the in-order predecessor, or from the ghost position to the maximum.
    pub fn move_prev(&mut self) {
        self.curs.step(Dir::Left);
    }

    /// Returns the current element, or `None` at the ghost position.
    pub fn get(&self) -> Option<&T> {
        self.curs.current().map(|p| unsafe { p.as_ref() })
    }

    /// Returns the current element pinned and mutable, or `None` at the ghost position.
    ///
    /// # Safety
    ///
    /// The caller must not change the element's key in a way that alters how it compares to the
    /// keys of the other elements.
    pub unsafe fn get_mut(&mut self) -> Option<Pin<&mut T>> {
        self.curs
            .current()
            .map(|mut p| unsafe { Pin::new_unchecked(p.as_mut()) })
    }

    /// Returns the element [`move_next`](Self::move_next) would land on.
    pub fn peek_next(&self) -> Option<&T> {
        self.curs.peek(Dir::Right).map(|p| unsafe { p.as_ref() })
    }

    /// Returns the element [`move_prev`](Self::move_prev) would land on.
    pub fn peek_prev(&self) -> Option<&T> {
        self.curs.peek(Dir::Left).map(|p| unsafe { p.as_ref() })
    }

    /// Removes the current element and steps to its successor.
    ///
    /// At the ghost position nothing is removed and `None` is returned.
    pub fn remove_current(&mut self) -> Option<T::Handle> {
        unsafe { self.curs.remove_and_step(Dir::Right) }
    }

    /// Removes the current element and steps to its predecessor.
    ///
    /// At the ghost position nothing is removed and `None` is returned.
    pub fn remove_current_and_move_prev(&mut self) -> Option<T::Handle> {
        unsafe { self.curs.remove_and_step(Dir::Left) }
    }
}

struct CursorRaw<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: NonNull<AvlTree<T>>,
    ptr: Link<T>,
}

impl<T> CursorRaw<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn at_end(tree: NonNull<AvlTree<T>>, end: Dir) -> CursorRaw<T> {
        let mut curs = CursorRaw { tree, ptr: None };
        curs.ptr = curs.peek(!end);
        curs
    }

    fn current(&self) -> Link<T> {
        self.ptr
    }

    // Returns the neighbor of the current position in direction `dir`. From the ghost position
    // this is the extreme element on the opposite side.
    fn peek(&self, dir: Dir) -> Link<T> {
        let tree = unsafe { self.tree.as_ref() };

        match (self.ptr, dir) {
            (Some(p), _) => unsafe { tree.neighbor_raw(p, dir) },
            (None, Dir::Right) => tree.first_raw(),
            (None, Dir::Left) => tree.last_raw(),
        }
    }

    fn step(&mut self, dir: Dir) {
        self.ptr = self.peek(dir);
    }

    // The neighbor is located before removing, since removal may swap the current node's
    // position with its predecessor's.
    unsafe fn remove_and_step(&mut self, dir: Dir) -> Option<T::Handle> {
        let remove = self.ptr?;

        self.step(dir);

        let tree = unsafe { self.tree.as_mut() };
        Some(unsafe { tree.remove_at(remove) })
    }
}
