//! aws-infra-common - Shared policy types
//!
//! This crate holds the organization-wide policy layer used by the
//! synthesizer, without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`config`]: Policy configuration (prefix, owner, archival tiers)
//! - [`defaults`]: Default policy values
//! - [`error`]: Construction-pass errors and violation aggregation
//! - [`identity`]: Deployment identity (account and region)
//! - [`naming`]: Naming normalizer for physical resource names
//! - [`resource_kind`]: Declared resource kinds and their template types
//! - [`retention`]: Removal policies and log retention periods
//! - [`schedule`]: Storage-class transition schedule generator
//! - [`storage_class`]: S3 storage classes
//! - [`tags`]: Stack tag keys

pub mod config;
pub mod defaults;
pub mod error;
pub mod identity;
pub mod naming;
pub mod resource_kind;
pub mod retention;
pub mod schedule;
pub mod storage_class;
pub mod tags;

// Re-export commonly used types
pub use config::{BackupPolicy, ConfigError, PolicyConfig};
pub use error::{PolicyError, Violations};
pub use identity::{AccountId, DeploymentIdentity, Region};
pub use naming::LogicalName;
pub use resource_kind::ResourceKind;
pub use retention::{LogRetention, RemovalPolicy};
pub use schedule::{transition_schedule, TierTransition};
pub use storage_class::StorageClass;
