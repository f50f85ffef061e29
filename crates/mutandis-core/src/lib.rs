//! Patch algebra core for Mutandis.
//!
//! A patch is an immutable description of the difference between two
//! snapshots of a value. Patches compose in constant time and are replayed
//! onto a base value without recursion, so arbitrarily long histories of
//! small edits never threaten the call stack.
//!
//! # Key Types
//!
//! - [`Differ`] -- The capability trait: `empty`, `diff`, `combine`, `patch`
//! - [`Edits`] -- Shared instruction tree behind every collection patch
//! - [`UpdateDiffer`] / [`Update`] -- Replace-on-change differ for opaque values
//! - [`Zip`], [`OrElseEither`], [`Transform`] -- Differ combinators
//! - [`ApplyConfig`] -- Checked application settings (strict mode, edit limits)
//! - [`PatchError`] -- Errors reported by checked application

pub mod config;
pub mod differ;
pub mod edits;
pub mod either;
pub mod error;
pub mod update;

pub use config::{ApplyConfig, ApplyMode};
pub use differ::{Differ, Transform, Zip};
pub use edits::{Edits, Iter, Step};
pub use either::{Either, EitherEdit, EitherPatch, OrElseEither};
pub use error::{PatchError, PatchResult};
pub use update::{Update, UpdateDiffer};
