use serde::{Deserialize, Serialize};

use crate::error::{PatchError, PatchResult};

/// How strictly a patch is checked against the collection it is applied to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Edits that do not apply cleanly are silently skipped or overwrite.
    #[default]
    Lenient,
    /// Edits that do not apply cleanly abort the application with an error.
    Strict,
}

/// Configuration for checked patch application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Whether divergent edits are tolerated or rejected.
    pub mode: ApplyMode,
    /// Upper bound on the number of elementary edits a patch may carry.
    pub max_edits: Option<usize>,
    /// Initial capacity of the explicit worklist used to flatten patches.
    pub worklist_capacity: usize,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            mode: ApplyMode::Lenient,
            max_edits: None,
            worklist_capacity: 32,
        }
    }
}

impl ApplyConfig {
    /// A configuration that rejects every edit which does not apply cleanly.
    ///
    /// Patches produced by `diff(a, b)`, and any sequential combination of
    /// successive diffs, always pass strict application against `a`.
    pub fn strict() -> Self {
        Self {
            mode: ApplyMode::Strict,
            ..Default::default()
        }
    }

    /// Set the maximum number of edits accepted.
    pub fn with_max_edits(mut self, limit: usize) -> Self {
        self.max_edits = Some(limit);
        self
    }

    /// Returns `true` if divergent edits must be reported.
    pub fn is_strict(&self) -> bool {
        self.mode == ApplyMode::Strict
    }

    /// Reject a patch of `len` edits if it exceeds the configured limit.
    ///
    /// Edit counts saturate, so `usize::MAX` exceeds every limit.
    pub fn check_len(&self, len: usize) -> PatchResult<()> {
        match self.max_edits {
            Some(limit) if len > limit || len == usize::MAX => {
                Err(PatchError::EditLimit { len, limit })
            }
            _ => Ok(()),
        }
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(input: &str) -> PatchResult<Self> {
        toml::from_str(input).map_err(|e| PatchError::Config(e.to_string()))
    }

    /// Render this configuration as TOML.
    pub fn to_toml_string(&self) -> PatchResult<String> {
        toml::to_string(self).map_err(|e| PatchError::Config(e.to_string()))
    }
}
