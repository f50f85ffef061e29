//! Patches over unordered sets.
//!
//! Element equality alone decides membership, so a set patch is a sequence
//! of additions and removals. [`SetPatch::diff`] walks the new snapshot once
//! and the unmatched remainder of the old snapshot once; [`SetPatch::apply`]
//! replays the edits on a working copy of the base.

use std::fmt;
use std::marker::PhantomData;

use mutandis_core::{ApplyConfig, Differ, Edits, Iter, PatchError, PatchResult};
use tracing::{debug, trace};

use crate::snapshot::SetSnapshot;

/// Elementary edit of a [`SetPatch`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SetEdit<V> {
    /// The element is present in the new snapshot and absent from the old.
    Add(V),
    /// The element is present in the old snapshot and absent from the new.
    Remove(V),
}

/// An immutable, composable description of changes to a set.
#[derive(Debug, PartialEq, Eq)]
pub struct SetPatch<V> {
    edits: Edits<SetEdit<V>>,
}

impl<V> SetPatch<V> {
    /// The patch that changes nothing.
    pub const fn empty() -> Self {
        Self {
            edits: Edits::empty(),
        }
    }

    /// A patch adding a single element.
    pub fn add(value: V) -> Self {
        Self {
            edits: Edits::edit(SetEdit::Add(value)),
        }
    }

    /// A patch removing a single element.
    pub fn remove(value: V) -> Self {
        Self {
            edits: Edits::edit(SetEdit::Remove(value)),
        }
    }

    /// Apply `self`, then `next`. Constant time.
    pub fn and_then(self, next: Self) -> Self {
        Self {
            edits: self.edits.and_then(next.edits),
        }
    }

    /// Number of elementary edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The edits in application order.
    pub fn edits(&self) -> Iter<'_, SetEdit<V>> {
        self.edits.iter()
    }

    /// The underlying instruction tree.
    pub fn as_edits(&self) -> &Edits<SetEdit<V>> {
        &self.edits
    }
}

impl<V: Clone> SetPatch<V> {
    /// Compute the patch that turns `old` into `new`.
    ///
    /// The result adds exactly `new - old` and removes exactly `old - new`.
    /// Edit order follows the collections' fold order.
    pub fn diff<S>(old: &S, new: &S) -> Self
    where
        S: SetSnapshot<Elem = V>,
    {
        let (remainder, patch) = new.fold(
            (old.clone(), Self::empty()),
            |(mut remainder, patch), value| {
                if remainder.remove(value) {
                    (remainder, patch)
                } else {
                    (remainder, patch.and_then(Self::add(value.clone())))
                }
            },
        );
        let patch = remainder.fold(patch, |patch, value| {
            patch.and_then(Self::remove(value.clone()))
        });
        debug!(edits = patch.len(), "computed set diff");
        patch
    }

    /// Replay this patch on `old`.
    ///
    /// Adding a present element or removing an absent one is a no-op.
    pub fn apply<S>(&self, old: &S) -> S
    where
        S: SetSnapshot<Elem = V>,
    {
        let mut set = old.clone();
        for edit in self.edits.iter() {
            match edit {
                SetEdit::Add(value) => {
                    set.add(value.clone());
                }
                SetEdit::Remove(value) => {
                    if !set.remove(value) {
                        trace!("set removal of absent element skipped");
                    }
                }
            }
        }
        debug!(edits = self.len(), size = set.size(), "applied set patch");
        set
    }
}

impl<V: Clone + fmt::Debug> SetPatch<V> {
    /// Replay this patch on `old` under `config`.
    ///
    /// In strict mode, adding a present element or removing an absent one
    /// aborts with an error.
    pub fn try_apply<S>(&self, old: &S, config: &ApplyConfig) -> PatchResult<S>
    where
        S: SetSnapshot<Elem = V>,
    {
        config.check_len(self.len())?;
        let strict = config.is_strict();
        let mut set = old.clone();
        for edit in self.edits.iter_with_capacity(config.worklist_capacity) {
            match edit {
                SetEdit::Add(value) => {
                    if !set.add(value.clone()) && strict {
                        return Err(PatchError::add_present(value));
                    }
                }
                SetEdit::Remove(value) => {
                    if !set.remove(value) && strict {
                        return Err(PatchError::remove_absent(value));
                    }
                }
            }
        }
        debug!(edits = self.len(), size = set.size(), strict, "applied set patch");
        Ok(set)
    }
}

impl<V> Clone for SetPatch<V> {
    fn clone(&self) -> Self {
        Self {
            edits: self.edits.clone(),
        }
    }
}

impl<V> Default for SetPatch<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> FromIterator<SetEdit<V>> for SetPatch<V> {
    fn from_iter<I: IntoIterator<Item = SetEdit<V>>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// [`Differ`] over any [`SetSnapshot`].
pub struct SetDiffer<S> {
    _set: PhantomData<fn() -> S>,
}

impl<S> SetDiffer<S> {
    pub const fn new() -> Self {
        Self { _set: PhantomData }
    }
}

impl<S> Default for SetDiffer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for SetDiffer<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SetDiffer<S> {}

impl<S> fmt::Debug for SetDiffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetDiffer")
    }
}

impl<S> Differ for SetDiffer<S>
where
    S: SetSnapshot,
    S::Elem: Clone + fmt::Debug,
{
    type Value = S;
    type Patch = SetPatch<S::Elem>;

    fn empty(&self) -> Self::Patch {
        SetPatch::empty()
    }

    fn diff(&self, old: &S, new: &S) -> Self::Patch {
        SetPatch::diff(old, new)
    }

    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch {
        first.and_then(second)
    }

    fn patch(&self, old: &S, patch: &Self::Patch) -> S {
        patch.apply(old)
    }

    fn try_patch(&self, old: &S, patch: &Self::Patch, config: &ApplyConfig) -> PatchResult<S> {
        patch.try_apply(old, config)
    }
}

/// Differ over [`im::HashSet`].
pub fn hash_set<V>() -> SetDiffer<im::HashSet<V>> {
    SetDiffer::new()
}

/// Differ over [`im::OrdSet`].
pub fn ord_set<V>() -> SetDiffer<im::OrdSet<V>> {
    SetDiffer::new()
}
