//! Construction-pass errors
//!
//! Every error here is fatal to the pass: nothing is retried and no partial
//! graph is kept. Validation returns these as values so a caller can collect
//! several of them in [`Violations`] before aborting.

use std::fmt;
use thiserror::Error;

/// Errors raised while building the resource graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Logical name contains capital letters
    #[error("{kind} name '{name}' must not contain capital letters")]
    NamingViolation { kind: &'static str, name: String },

    /// A required input field was omitted or empty
    #[error("{owner}: required field '{field}' is missing")]
    ContractViolation { owner: String, field: &'static str },

    /// A numeric setting falls outside its allowed range
    #[error("{owner}: '{field}' is {value}, expected {min}-{max}")]
    OutOfRange {
        owner: String,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Account or region is malformed
    #[error("Invalid {field}: '{value}'")]
    InvalidIdentity { field: &'static str, value: String },

    /// Two resources in one stack share a logical id
    #[error("Stack {stack} already declares '{logical_id}'")]
    DuplicateLogicalId { stack: String, logical_id: String },

    /// Two stacks share a name
    #[error("Stack {0} is already part of the app")]
    DuplicateStack(String),

    /// Export name already carries another resource's value
    #[error("Stack {stack} already exports '{name}' for another resource")]
    DuplicateExport { stack: String, name: String },

    /// Referenced stack does not exist
    #[error("Unknown stack: {0}")]
    UnknownStack(String),

    /// Referenced resource does not exist in its stack
    #[error("Stack {stack} has no resource '{logical_id}'")]
    UnknownResource { stack: String, logical_id: String },

    /// A resource from another stack was used without being exported
    #[error("'{logical_id}' from stack {stack} is used by {consumer} but is not exported")]
    UnexportedReference {
        stack: String,
        logical_id: String,
        consumer: String,
    },

    /// Stacks depend on each other
    #[error("Stack dependency cycle involving {0}")]
    DependencyCycle(String),
}

impl PolicyError {
    /// Check if this is a naming or identity validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PolicyError::NamingViolation { .. }
                | PolicyError::OutOfRange { .. }
                | PolicyError::InvalidIdentity { .. }
        )
    }

    /// Check if this is a missing required input
    pub fn is_contract(&self) -> bool {
        matches!(self, PolicyError::ContractViolation { .. })
    }
}

/// Collects violations so a multi-resource pass can report all of them at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<PolicyError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the error of a failed check, passing successful values through
    pub fn check<T>(&mut self, result: Result<T, PolicyError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.0.push(e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was recorded, otherwise every recorded violation
    pub fn into_result(self) -> Result<(), Violations> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} policy violation(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<PolicyError> for Violations {
    fn from(error: PolicyError) -> Self {
        Violations(vec![error])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming(name: &str) -> PolicyError {
        PolicyError::NamingViolation {
            kind: "bucket",
            name: name.to_string(),
        }
    }

    #[test]
    fn test_classification() {
        assert!(naming("Bad").is_validation());
        assert!(!naming("Bad").is_contract());

        let contract = PolicyError::ContractViolation {
            owner: "stack General".to_string(),
            field: "description",
        };
        assert!(contract.is_contract());
        let range = PolicyError::OutOfRange {
            owner: "key scratch".to_string(),
            field: "pending_window_days",
            value: 0,
            min: 7,
            max: 30,
        };
        assert!(range.is_validation());
        assert_eq!(
            range.to_string(),
            "key scratch: 'pending_window_days' is 0, expected 7-30"
        );
        assert!(!contract.is_validation());
    }

    #[test]
    fn test_violations_collect_every_failure() {
        let mut violations = Violations::new();
        assert_eq!(violations.check(Ok::<_, PolicyError>(1)), Some(1));
        assert_eq!(violations.check::<()>(Err(naming("A"))), None);
        assert_eq!(violations.check::<()>(Err(naming("B"))), None);

        let err = violations.into_result().unwrap_err();
        assert_eq!(err.len(), 2);
        let rendered = err.to_string();
        assert!(rendered.starts_with("2 policy violation(s)"));
        assert!(rendered.contains("'A'"));
        assert!(rendered.contains("'B'"));
    }

    #[test]
    fn test_empty_violations_pass() {
        assert!(Violations::new().into_result().is_ok());
    }
}
