//! Replace-on-change differ for opaque values.

use std::fmt;
use std::marker::PhantomData;

use crate::differ::Differ;

/// Patch produced by [`UpdateDiffer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Update<V> {
    /// Leave the value untouched.
    Keep,
    /// Replace the value wholesale.
    Replace(V),
}

impl<V> Default for Update<V> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<V> Update<V> {
    /// Returns `true` if applying this patch changes nothing.
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Differ that treats values as atomic: any change replaces the whole value.
///
/// Suitable for scalars, strings and any value whose internal structure is
/// not worth diffing. Combination keeps the most recent replacement.
pub struct UpdateDiffer<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> UpdateDiffer<V> {
    pub const fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<V> Default for UpdateDiffer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for UpdateDiffer<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for UpdateDiffer<V> {}

impl<V> fmt::Debug for UpdateDiffer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpdateDiffer")
    }
}

impl<V: Clone + PartialEq> Differ for UpdateDiffer<V> {
    type Value = V;
    type Patch = Update<V>;

    fn empty(&self) -> Update<V> {
        Update::Keep
    }

    fn diff(&self, old: &V, new: &V) -> Update<V> {
        if old == new {
            Update::Keep
        } else {
            Update::Replace(new.clone())
        }
    }

    fn combine(&self, first: Update<V>, second: Update<V>) -> Update<V> {
        match second {
            Update::Keep => first,
            replace => replace,
        }
    }

    fn patch(&self, old: &V, patch: &Update<V>) -> V {
        match patch {
            Update::Keep => old.clone(),
            Update::Replace(value) => value.clone(),
        }
    }
}
