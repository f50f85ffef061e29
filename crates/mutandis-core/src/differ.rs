//! The [`Differ`] capability.
//!
//! A differ bundles the four operations of a patch algebra for one value
//! type. Differs for compound values are assembled from differs for their
//! parts: the map differ owns a differ for its values, [`Zip`] pairs two
//! differs, [`OrElseEither`] switches between two, and [`Transform`] moves a
//! differ across a conversion.

use std::marker::PhantomData;

use crate::config::ApplyConfig;
use crate::either::OrElseEither;
use crate::error::PatchResult;

/// Computes, composes and replays patches for values of type [`Differ::Value`].
///
/// Implementations must satisfy:
/// - `patch(old, diff(old, new)) == new`.
/// - `patch(v, empty()) == v`.
/// - `patch(v, combine(p1, p2)) == patch(patch(v, p1), p2)`.
/// - `combine` runs in constant time and does not inspect its arguments.
pub trait Differ {
    /// The type of values being diffed.
    type Value;
    /// The type of patches describing changes to [`Differ::Value`].
    type Patch;

    /// The patch that changes nothing.
    fn empty(&self) -> Self::Patch;

    /// A patch that turns `old` into `new`.
    fn diff(&self, old: &Self::Value, new: &Self::Value) -> Self::Patch;

    /// A patch applying `first` and then `second`.
    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch;

    /// Apply `patch` to `old`, producing a new value.
    fn patch(&self, old: &Self::Value, patch: &Self::Patch) -> Self::Value;

    /// Apply `patch` to `old` under `config`.
    ///
    /// Differs whose patches can disagree with the value they land on
    /// override this to report the disagreement in strict mode and to
    /// enforce `max_edits`. The limit applies to every nested patch on its
    /// own. The default never fails.
    fn try_patch(
        &self,
        old: &Self::Value,
        patch: &Self::Patch,
        config: &ApplyConfig,
    ) -> PatchResult<Self::Value> {
        let _ = config;
        Ok(self.patch(old, patch))
    }

    /// Pair this differ with `that`, diffing tuples component-wise.
    fn zip<D: Differ>(self, that: D) -> Zip<Self, D>
    where
        Self: Sized,
    {
        Zip::new(self, that)
    }

    /// Diff `Either<Self::Value, D::Value>`, using this differ for the left
    /// side and `that` for the right side.
    fn or_else_either<D: Differ>(self, that: D) -> OrElseEither<Self, D>
    where
        Self: Sized,
    {
        OrElseEither::new(self, that)
    }

    /// Lift this differ to values of type `T` through a pair of conversions.
    fn transform<T, F, G>(self, to: F, from: G) -> Transform<Self, T, F, G>
    where
        Self: Sized,
        F: Fn(&Self::Value) -> T,
        G: Fn(&T) -> Self::Value,
    {
        Transform::new(self, to, from)
    }
}

impl<D: Differ + ?Sized> Differ for &D {
    type Value = D::Value;
    type Patch = D::Patch;

    fn empty(&self) -> Self::Patch {
        (**self).empty()
    }

    fn diff(&self, old: &Self::Value, new: &Self::Value) -> Self::Patch {
        (**self).diff(old, new)
    }

    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch {
        (**self).combine(first, second)
    }

    fn patch(&self, old: &Self::Value, patch: &Self::Patch) -> Self::Value {
        (**self).patch(old, patch)
    }

    fn try_patch(
        &self,
        old: &Self::Value,
        patch: &Self::Patch,
        config: &ApplyConfig,
    ) -> PatchResult<Self::Value> {
        (**self).try_patch(old, patch, config)
    }
}

/// Differ over pairs, built by [`Differ::zip`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Zip<A, B> {
    left: A,
    right: B,
}

impl<A, B> Zip<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A: Differ, B: Differ> Differ for Zip<A, B> {
    type Value = (A::Value, B::Value);
    type Patch = (A::Patch, B::Patch);

    fn empty(&self) -> Self::Patch {
        (self.left.empty(), self.right.empty())
    }

    fn diff(&self, old: &Self::Value, new: &Self::Value) -> Self::Patch {
        (
            self.left.diff(&old.0, &new.0),
            self.right.diff(&old.1, &new.1),
        )
    }

    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch {
        (
            self.left.combine(first.0, second.0),
            self.right.combine(first.1, second.1),
        )
    }

    fn patch(&self, old: &Self::Value, patch: &Self::Patch) -> Self::Value {
        (
            self.left.patch(&old.0, &patch.0),
            self.right.patch(&old.1, &patch.1),
        )
    }

    fn try_patch(
        &self,
        old: &Self::Value,
        patch: &Self::Patch,
        config: &ApplyConfig,
    ) -> PatchResult<Self::Value> {
        Ok((
            self.left.try_patch(&old.0, &patch.0, config)?,
            self.right.try_patch(&old.1, &patch.1, config)?,
        ))
    }
}

/// Differ over `T`, built by [`Differ::transform`] from a differ over another
/// type and conversions in both directions.
pub struct Transform<D, T, F, G> {
    inner: D,
    to: F,
    from: G,
    _value: PhantomData<fn() -> T>,
}

impl<D, T, F, G> Transform<D, T, F, G>
where
    D: Differ,
    F: Fn(&D::Value) -> T,
    G: Fn(&T) -> D::Value,
{
    pub fn new(inner: D, to: F, from: G) -> Self {
        Self {
            inner,
            to,
            from,
            _value: PhantomData,
        }
    }
}

impl<D, T, F, G> Differ for Transform<D, T, F, G>
where
    D: Differ,
    F: Fn(&D::Value) -> T,
    G: Fn(&T) -> D::Value,
{
    type Value = T;
    type Patch = D::Patch;

    fn empty(&self) -> Self::Patch {
        self.inner.empty()
    }

    fn diff(&self, old: &T, new: &T) -> Self::Patch {
        self.inner.diff(&(self.from)(old), &(self.from)(new))
    }

    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch {
        self.inner.combine(first, second)
    }

    fn patch(&self, old: &T, patch: &Self::Patch) -> T {
        (self.to)(&self.inner.patch(&(self.from)(old), patch))
    }

    fn try_patch(&self, old: &T, patch: &Self::Patch, config: &ApplyConfig) -> PatchResult<T> {
        let inner = self.inner.try_patch(&(self.from)(old), patch, config)?;
        Ok((self.to)(&inner))
    }
}
