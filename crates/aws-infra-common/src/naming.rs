//! Naming normalizer
//!
//! Turns short logical names into the physical names resources are created
//! with. Logical names are validated eagerly: a name with capital letters is
//! rejected before any resource is declared.

use crate::error::PolicyError;
use crate::identity::DeploymentIdentity;
use std::fmt;

/// A validated logical name (no ASCII capital letters)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalName(String);

impl LogicalName {
    /// Validate `name` for a resource of the given kind.
    ///
    /// `kind` only feeds the error message (e.g. "bucket", "key alias").
    pub fn parse(kind: &'static str, name: impl Into<String>) -> Result<Self, PolicyError> {
        let name = name.into();
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(PolicyError::NamingViolation { kind, name });
        }
        Ok(LogicalName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `{name}-{account}-{region}`, unique across all accounts and regions
pub fn globally_unique_name(name: &LogicalName, identity: &DeploymentIdentity) -> String {
    format!("{}-{}-{}", name, identity.account, identity.region)
}

/// `{app_prefix}/{alias}`
pub fn prefixed_alias(app_prefix: &str, alias: &LogicalName) -> String {
    format!("{app_prefix}/{alias}")
}

/// Alias for a key created on behalf of a single resource
pub fn implicit_key_alias(owner: &LogicalName) -> LogicalName {
    // Appending a lowercase suffix keeps the name valid.
    LogicalName(format!("{owner}-key"))
}

/// `{app_prefix}-{name}`
pub fn display_name(app_prefix: &str, name: &LogicalName) -> String {
    format!("{app_prefix}-{name}")
}

/// `/{namespace}/{suffix}`
pub fn log_group_name(namespace: &str, suffix: &LogicalName) -> String {
    format!("/{namespace}/{suffix}")
}

/// Stack unit name: `{app_prefix}-{id}`
pub fn stack_unit_name(app_prefix: &str, id: &str) -> String {
    format!("{app_prefix}-{id}")
}

/// Deployable stack name: the unit name with `Stack` appended
pub fn deployable_stack_name(unit_name: &str) -> String {
    format!("{unit_name}Stack")
}
