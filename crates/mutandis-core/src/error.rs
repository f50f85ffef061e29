//! Error types for checked patch application and configuration loading.

/// Errors that can occur when a patch is applied in checked mode.
///
/// The plain `patch` operations are total and never produce these; they only
/// surface through `try_apply`-style entry points driven by an
/// [`ApplyConfig`](crate::ApplyConfig).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatchError {
    /// The patch holds more elementary edits than the configured limit.
    #[error("patch has {len} edits, exceeding the limit of {limit}")]
    EditLimit { len: usize, limit: usize },

    /// A removal targeted an element or key absent from the working collection.
    #[error("cannot remove {target}: not present")]
    RemoveAbsent { target: String },

    /// A set addition targeted an element that is already present.
    #[error("cannot add {target}: already present")]
    AddPresent { target: String },

    /// A map insertion targeted a key that is already present.
    #[error("cannot insert {target}: key already present")]
    InsertPresent { target: String },

    /// A nested value update targeted a key absent from the working map.
    #[error("cannot update {target}: key not present")]
    UpdateAbsent { target: String },

    /// An either update addressed the side that is not currently held.
    #[error("cannot update {side} side: value holds the other side")]
    UpdateOtherSide { side: &'static str },

    /// An either set addressed the side that is already held.
    #[error("cannot set {side} side: value already holds it")]
    SetPresentSide { side: &'static str },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PatchError {
    /// Build a [`PatchError::RemoveAbsent`] from any debuggable target.
    pub fn remove_absent(target: &impl std::fmt::Debug) -> Self {
        Self::RemoveAbsent {
            target: format!("{target:?}"),
        }
    }

    /// Build a [`PatchError::AddPresent`] from any debuggable target.
    pub fn add_present(target: &impl std::fmt::Debug) -> Self {
        Self::AddPresent {
            target: format!("{target:?}"),
        }
    }

    /// Build a [`PatchError::InsertPresent`] from any debuggable key.
    pub fn insert_present(target: &impl std::fmt::Debug) -> Self {
        Self::InsertPresent {
            target: format!("{target:?}"),
        }
    }

    /// Build a [`PatchError::UpdateAbsent`] from any debuggable key.
    pub fn update_absent(target: &impl std::fmt::Debug) -> Self {
        Self::UpdateAbsent {
            target: format!("{target:?}"),
        }
    }
}

/// Convenience alias for checked patch results.
pub type PatchResult<T> = Result<T, PatchError>;
