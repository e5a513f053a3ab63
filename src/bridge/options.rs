use semver::Version;
use std::time::Duration;

/// Per-call translation options
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    /// Time budget measured from the start of the call
    pub deadline: Option<Duration>,
    /// Fail when the score falls below the threshold instead of warning
    pub strict: bool,
    /// Commit the canonical form to the temporal store
    pub persist: bool,
    /// Target adapter version; the highest registered schema when unset
    pub target_version: Option<Version>,
    /// Overrides the configured minimum score
    pub min_fidelity: Option<f64>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            deadline: None,
            strict: false,
            persist: true,
            target_version: None,
            min_fidelity: None,
        }
    }
}

impl TranslateOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn with_target_version(mut self, version: Version) -> Self {
        self.target_version = Some(version);
        self
    }

    pub fn with_min_fidelity(mut self, min: f64) -> Self {
        self.min_fidelity = Some(min);
        self
    }
}
