//! Shared instruction tree behind every patch type.
//!
//! An [`Edits`] value is an immutable binary tree whose leaves are elementary
//! edits and whose inner nodes record sequential composition. Combining two
//! trees allocates a single node and never walks either argument.
//!
//! # Invariants
//!
//! - Trees are never mutated after construction; sub-trees are shared via `Arc`.
//! - Composition order is preserved: [`Edits::iter`] yields the leaves of
//!   `first` before the leaves of `second`.
//! - Traversal, `Debug`, `PartialEq` and `Drop` run on an explicit worklist,
//!   so native stack usage is constant no matter how deep the tree is.
//! - Edit counts saturate at `usize::MAX`, which reads as "at least this
//!   many". Sharing lets a tree of a few nodes describe more edits than fit
//!   in a `usize`.

use std::fmt;
use std::sync::Arc;

/// A composable, immutable sequence of edits of type `E`.
pub struct Edits<E> {
    root: Option<Arc<Node<E>>>,
}

enum Node<E> {
    AndThen {
        first: Edits<E>,
        second: Edits<E>,
        len: usize,
    },
    Edit(E),
}

/// One level of an [`Edits`] tree.
#[derive(Debug)]
pub enum Step<'a, E> {
    /// The identity: applying it changes nothing.
    Empty,
    /// Apply the first tree, then the second to its result.
    AndThen(&'a Edits<E>, &'a Edits<E>),
    /// A single elementary edit.
    Edit(&'a E),
}

impl<E> Edits<E> {
    /// The identity tree.
    pub const fn empty() -> Self {
        Self { root: None }
    }

    /// A tree holding exactly one edit.
    pub fn edit(edit: E) -> Self {
        Self {
            root: Some(Arc::new(Node::Edit(edit))),
        }
    }

    /// Sequential composition: `self` first, then `next`.
    ///
    /// Runs in constant time. Empty operands are absorbed rather than wrapped.
    pub fn and_then(self, next: Self) -> Self {
        if next.is_empty() {
            return self;
        }
        if self.is_empty() {
            return next;
        }
        let len = self.len().saturating_add(next.len());
        Self {
            root: Some(Arc::new(Node::AndThen {
                first: self,
                second: next,
                len,
            })),
        }
    }

    /// Number of elementary edits in the tree, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        match self.root.as_deref() {
            None => 0,
            Some(Node::Edit(_)) => 1,
            Some(Node::AndThen { len, .. }) => *len,
        }
    }

    /// Returns `true` if the tree holds no edits.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inspect the top level of the tree.
    pub fn step(&self) -> Step<'_, E> {
        match self.root.as_deref() {
            None => Step::Empty,
            Some(Node::Edit(edit)) => Step::Edit(edit),
            Some(Node::AndThen { first, second, .. }) => Step::AndThen(first, second),
        }
    }

    /// Iterate over the elementary edits in application order.
    pub fn iter(&self) -> Iter<'_, E> {
        self.iter_with_capacity(0)
    }

    /// Like [`Edits::iter`], pre-allocating room for `capacity` pending sub-trees.
    pub fn iter_with_capacity(&self, capacity: usize) -> Iter<'_, E> {
        let mut pending = Vec::with_capacity(capacity.max(1));
        pending.push(self);
        Iter {
            pending,
            remaining: self.len(),
        }
    }
}

impl<E> Drop for Edits<E> {
    fn drop(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            // Shared sub-trees are released by whichever owner drops last.
            if let Some(Node::AndThen {
                mut first,
                mut second,
                ..
            }) = Arc::into_inner(node)
            {
                pending.extend(first.root.take());
                pending.extend(second.root.take());
            }
        }
    }
}

impl<E> Clone for Edits<E> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<E> Default for Edits<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: fmt::Debug> fmt::Debug for Edits<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Two trees are equal when they flatten to the same edit sequence.
impl<E: PartialEq> PartialEq for Edits<E> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<E: Eq> Eq for Edits<E> {}

impl<E> FromIterator<E> for Edits<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |acc, edit| acc.and_then(Self::edit(edit)))
    }
}

impl<'a, E> IntoIterator for &'a Edits<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Worklist iterator over the leaves of an [`Edits`] tree.
pub struct Iter<'a, E> {
    pending: Vec<&'a Edits<E>>,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(edits) = self.pending.pop() {
            match edits.step() {
                Step::Empty => {}
                Step::AndThen(first, second) => {
                    // LIFO: push `second` first so `first` is visited first.
                    self.pending.push(second);
                    self.pending.push(first);
                }
                Step::Edit(edit) => {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some(edit);
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.remaining == usize::MAX {
            (usize::MAX, None)
        } else {
            (self.remaining, Some(self.remaining))
        }
    }
}
