//! Policy configuration
//!
//! One value of [`PolicyConfig`] is threaded through a construction pass and
//! never changes during it. Missing fields take the values in
//! [`defaults`](crate::defaults), so `PolicyConfig::default()` is the
//! production policy. Validation is done via `garde::Validate`.

use crate::defaults::{
    default_admin_user, default_app_prefix, default_log_group_namespace, default_log_retention,
    default_notification_email, default_owner, default_storage_class_sequence,
    default_transition_days, DEFAULT_NOTIFICATION_EMAIL,
};
use crate::retention::LogRetention;
use crate::storage_class::StorageClass;
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Organization-wide policy constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, garde::Validate)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Prefix for stacks, key aliases, topic display names and secrets
    #[serde(default = "default_app_prefix")]
    #[garde(length(min = 1), custom(no_whitespace))]
    pub app_prefix: String,

    /// Owner of the account (used for tagging)
    #[serde(default = "default_owner")]
    #[garde(length(min = 1))]
    pub owner: String,

    /// Address that receives alarm notifications
    #[serde(default = "default_notification_email")]
    #[garde(email)]
    pub notification_email: String,

    /// IAM user granted administrative access to every key
    #[serde(default = "default_admin_user")]
    #[garde(length(min = 1), custom(no_whitespace))]
    pub admin_user: String,

    /// Namespace for log group names
    #[serde(default = "default_log_group_namespace")]
    #[garde(length(min = 1), custom(no_whitespace))]
    pub log_group_namespace: String,

    /// Retention applied to log groups that don't set one
    #[serde(default = "default_log_retention")]
    #[garde(skip)]
    pub log_retention: LogRetention,

    /// Tiered archival for the backup bucket
    #[serde(default)]
    #[garde(dive)]
    pub backup: BackupPolicy,
}

/// Archival tiers for the backup bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, garde::Validate)]
#[serde(deny_unknown_fields)]
pub struct BackupPolicy {
    /// Storage classes to move objects through, cheapest last
    #[serde(default = "default_storage_class_sequence")]
    #[garde(skip)]
    pub storage_class_sequence: Vec<StorageClass>,

    /// Days between consecutive transitions
    #[serde(default = "default_transition_days")]
    #[garde(skip)]
    pub transition_days: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            app_prefix: default_app_prefix(),
            owner: default_owner(),
            notification_email: default_notification_email(),
            admin_user: default_admin_user(),
            log_group_namespace: default_log_group_namespace(),
            log_retention: default_log_retention(),
            backup: BackupPolicy::default(),
        }
    }
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            storage_class_sequence: default_storage_class_sequence(),
            transition_days: default_transition_days(),
        }
    }
}

fn no_whitespace(value: &str, _ctx: &()) -> garde::Result {
    if value.chars().any(char::is_whitespace) {
        return Err(garde::Error::new("must not contain whitespace"));
    }
    Ok(())
}

/// Errors loading a policy configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid policy configuration: {0}")]
    Invalid(#[from] garde::Report),
}

impl PolicyConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: PolicyConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validated()
    }

    /// Whether alarms would go to the built-in address, which nobody reads
    pub fn has_placeholder_email(&self) -> bool {
        self.notification_email == DEFAULT_NOTIFICATION_EMAIL
    }

    /// Run field validation, returning the config unchanged when it passes
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_production_policy() {
        let config = PolicyConfig::default();
        assert_eq!(config.app_prefix, "Infra");
        assert_eq!(config.owner, "Michael");
        assert_eq!(config.admin_user, "michael");
        assert_eq!(config.log_group_namespace, "aws-infrastructure");
        assert_eq!(config.log_retention, LogRetention::SixMonths);
        assert_eq!(
            config.backup.storage_class_sequence,
            vec![StorageClass::Glacier, StorageClass::DeepArchive]
        );
        assert_eq!(config.backup.transition_days, 90);
        assert!(config.has_placeholder_email());
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "app_prefix": "Lab",
                "notification_email": "ops@example.org",
                "backup": {{ "storage_class_sequence": ["GLACIER_IR"], "transition_days": 30 }}
            }}"#
        )
        .unwrap();

        let config = PolicyConfig::load(file.path()).unwrap();
        assert_eq!(config.app_prefix, "Lab");
        assert_eq!(config.owner, "Michael");
        assert_eq!(config.notification_email, "ops@example.org");
        assert!(!config.has_placeholder_email());
        assert_eq!(
            config.backup.storage_class_sequence,
            vec![StorageClass::GlacierIr]
        );
        assert_eq!(config.backup.transition_days, 30);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "app_prefx": "Typo" }}"#).unwrap();

        let err = PolicyConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = PolicyConfig {
            app_prefix: "My App".to_string(),
            notification_email: "not-an-email".to_string(),
            ..PolicyConfig::default()
        };
        let err = config.validated().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("app_prefix"), "{message}");
        assert!(message.contains("notification_email"), "{message}");
    }

    #[test]
    fn test_missing_file() {
        let err = PolicyConfig::load(Path::new("/nonexistent/policy.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
