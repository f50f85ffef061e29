//! Two-sided sum type and the differ that switches between sides.

use tracing::trace;

use crate::config::ApplyConfig;
use crate::differ::Differ;
use crate::edits::Edits;
use crate::error::{PatchError, PatchResult};

/// A value that is one of two alternatives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R> Either<L, R> {
    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// The left value, if present.
    pub fn left(self) -> Option<L> {
        match self {
            Self::Left(l) => Some(l),
            Self::Right(_) => None,
        }
    }

    /// The right value, if present.
    pub fn right(self) -> Option<R> {
        match self {
            Self::Left(_) => None,
            Self::Right(r) => Some(r),
        }
    }

    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Self::Left(l) => Either::Left(l),
            Self::Right(r) => Either::Right(r),
        }
    }
}

/// Elementary edit of an [`EitherPatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EitherEdit<L, R, LP, RP> {
    /// Switch to (or overwrite with) a left value.
    SetLeft(L),
    /// Switch to (or overwrite with) a right value.
    SetRight(R),
    /// Patch the left value in place.
    UpdateLeft(LP),
    /// Patch the right value in place.
    UpdateRight(RP),
}

/// Patch over `Either<L, R>` whose sides are patched by `LP` and `RP`.
pub type EitherPatch<L, R, LP, RP> = Edits<EitherEdit<L, R, LP, RP>>;

/// Differ over [`Either`], built by [`Differ::or_else_either`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OrElseEither<LD, RD> {
    left: LD,
    right: RD,
}

type EditOf<LD, RD> = EitherEdit<
    <LD as Differ>::Value,
    <RD as Differ>::Value,
    <LD as Differ>::Patch,
    <RD as Differ>::Patch,
>;

impl<LD, RD> OrElseEither<LD, RD> {
    pub fn new(left: LD, right: RD) -> Self {
        Self { left, right }
    }
}

impl<LD, RD> OrElseEither<LD, RD>
where
    LD: Differ,
    RD: Differ,
    LD::Value: Clone,
    RD::Value: Clone,
{
    fn step(
        &self,
        value: Either<LD::Value, RD::Value>,
        edit: &EditOf<LD, RD>,
    ) -> Either<LD::Value, RD::Value> {
        match (edit, value) {
            (EitherEdit::SetLeft(l), _) => Either::Left(l.clone()),
            (EitherEdit::SetRight(r), _) => Either::Right(r.clone()),
            (EitherEdit::UpdateLeft(p), Either::Left(l)) => Either::Left(self.left.patch(&l, p)),
            (EitherEdit::UpdateRight(p), Either::Right(r)) => {
                Either::Right(self.right.patch(&r, p))
            }
            (_, other) => {
                trace!("either update addresses the other side; skipped");
                other
            }
        }
    }
}

impl<LD, RD> Differ for OrElseEither<LD, RD>
where
    LD: Differ,
    RD: Differ,
    LD::Value: Clone,
    RD::Value: Clone,
{
    type Value = Either<LD::Value, RD::Value>;
    type Patch = EitherPatch<LD::Value, RD::Value, LD::Patch, RD::Patch>;

    fn empty(&self) -> Self::Patch {
        Edits::empty()
    }

    fn diff(&self, old: &Self::Value, new: &Self::Value) -> Self::Patch {
        let edit = match (old, new) {
            (Either::Left(o), Either::Left(n)) => EitherEdit::UpdateLeft(self.left.diff(o, n)),
            (Either::Right(o), Either::Right(n)) => EitherEdit::UpdateRight(self.right.diff(o, n)),
            (Either::Right(_), Either::Left(n)) => EitherEdit::SetLeft(n.clone()),
            (Either::Left(_), Either::Right(n)) => EitherEdit::SetRight(n.clone()),
        };
        Edits::edit(edit)
    }

    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch {
        first.and_then(second)
    }

    fn patch(&self, old: &Self::Value, patch: &Self::Patch) -> Self::Value {
        patch
            .iter()
            .fold(old.clone(), |value, edit| self.step(value, edit))
    }

    /// In strict mode an update addressed to the side not currently held,
    /// or a set of the side already held, is reported instead of applied.
    /// Side updates are applied with the side differ's own `try_patch`.
    fn try_patch(
        &self,
        old: &Self::Value,
        patch: &Self::Patch,
        config: &ApplyConfig,
    ) -> PatchResult<Self::Value> {
        config.check_len(patch.len())?;
        let strict = config.is_strict();
        let mut value = old.clone();
        for edit in patch.iter_with_capacity(config.worklist_capacity) {
            value = match (edit, value) {
                (EitherEdit::SetLeft(_), Either::Left(_)) if strict => {
                    return Err(PatchError::SetPresentSide { side: "left" })
                }
                (EitherEdit::SetRight(_), Either::Right(_)) if strict => {
                    return Err(PatchError::SetPresentSide { side: "right" })
                }
                (EitherEdit::UpdateLeft(_), Either::Right(_)) if strict => {
                    return Err(PatchError::UpdateOtherSide { side: "left" })
                }
                (EitherEdit::UpdateRight(_), Either::Left(_)) if strict => {
                    return Err(PatchError::UpdateOtherSide { side: "right" })
                }
                (EitherEdit::UpdateLeft(p), Either::Left(l)) => {
                    Either::Left(self.left.try_patch(&l, p, config)?)
                }
                (EitherEdit::UpdateRight(p), Either::Right(r)) => {
                    Either::Right(self.right.try_patch(&r, p, config)?)
                }
                (edit, value) => self.step(value, edit),
            };
        }
        Ok(value)
    }
}
