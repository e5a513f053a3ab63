use crate::error::AdapterError;
use crate::framework::AgentFramework;

/// Validation result for a native agent document.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub framework: AgentFramework,
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<AdapterError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(framework: AgentFramework) -> Self {
        Self {
            framework,
            checks: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, field_path: impl Into<String>, message: impl Into<String>) {
        self.errors
            .push(AdapterError::validation(self.framework, field_path, message));
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn passed_checks(&self) -> usize {
        self.checks.iter().filter(|(_, passed)| *passed).count()
    }

    /// First error, for fail-fast callers
    pub fn into_result(mut self) -> Result<Vec<String>, AdapterError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(self.errors.swap_remove(0))
        }
    }
}
