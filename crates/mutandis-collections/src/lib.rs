//! Set and map patches for Mutandis.
//!
//! This crate implements the patch algebra for unordered sets and for maps
//! whose values carry their own patch type. Snapshots are never mutated:
//! diffing reads two snapshots, combining builds a new patch in constant
//! time, and applying replays edits on a private working copy.
//!
//! # Key Types
//!
//! - [`SetSnapshot`] / [`MapSnapshot`] -- Collection seams (implemented for `im` and `std`)
//! - [`SetPatch`] / [`SetEdit`] / [`SetDiffer`] -- Set algebra
//! - [`MapPatch`] / [`MapEdit`] / [`MapDiffer`] -- Map algebra with nested value differs
//!
//! # Design Rules
//!
//! 1. `diff`, `combine` and `patch` are total; absent keys are skipped, not errors.
//! 2. `combine` never walks its arguments.
//! 3. Application and drop run on an explicit worklist, never native recursion.
//! 4. Checked application (`try_apply`) is opt-in via [`ApplyConfig`].

pub mod map_patch;
pub mod set_patch;
pub mod snapshot;

pub use map_patch::{hash_map, ord_map, MapDiffer, MapEdit, MapPatch};
pub use set_patch::{hash_set, ord_set, SetDiffer, SetEdit, SetPatch};
pub use snapshot::{MapSnapshot, SetSnapshot};

pub use mutandis_core::{
    ApplyConfig, ApplyMode, Differ, Edits, PatchError, PatchResult, Update, UpdateDiffer,
};
