//! Default policy values
//!
//! These constants back the serde defaults of [`PolicyConfig`](crate::PolicyConfig)
//! so that an empty configuration file yields the production policy.

use crate::retention::LogRetention;
use crate::storage_class::StorageClass;
use std::ops::RangeInclusive;

/// Prefix applied to every stack, key alias, topic display name and secret
pub const DEFAULT_APP_PREFIX: &str = "Infra";

/// Owner of the account, used for tagging
pub const DEFAULT_OWNER: &str = "Michael";

/// Address subscribed to alarm topics
pub const DEFAULT_NOTIFICATION_EMAIL: &str = "notifications@example.com";

/// IAM user (created manually in the console) that administers every key
pub const DEFAULT_ADMIN_USER: &str = "michael";

/// Namespace for log group names (`/{namespace}/{suffix}`)
pub const DEFAULT_LOG_GROUP_NAMESPACE: &str = "aws-infrastructure";

/// Default log group retention
pub const DEFAULT_LOG_RETENTION: LogRetention = LogRetention::SixMonths;

/// Storage classes the backup bucket moves objects through, cheapest last.
///
/// - GLACIER: ~$3.60/TB, retrieval takes minutes to hours
/// - DEEP_ARCHIVE: ~$0.99/TB, retrieval takes 12+ hours
pub const DEFAULT_STORAGE_CLASS_SEQUENCE: &[StorageClass] =
    &[StorageClass::Glacier, StorageClass::DeepArchive];

/// Days between consecutive storage-class transitions.
///
/// 90 is the minimum number of days before objects may leave GLACIER.
pub const DEFAULT_TRANSITION_DAYS: u32 = 90;

/// Allowed waiting period, in days, before a scheduled key deletion
pub const KEY_PENDING_WINDOW_DAYS: RangeInclusive<u32> = 7..=30;

/// Invocation count that trips the webhook alarm
pub const ALARM_INVOCATION_THRESHOLD: u32 = 10;

/// Alarm evaluation window in seconds (5 minutes)
pub const ALARM_PERIOD_SECS: u32 = 300;

// Serde default functions for struct field defaults

/// Returns the default app prefix
pub fn default_app_prefix() -> String {
    DEFAULT_APP_PREFIX.to_string()
}

/// Returns the default owner
pub fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

/// Returns the default notification email
pub fn default_notification_email() -> String {
    DEFAULT_NOTIFICATION_EMAIL.to_string()
}

/// Returns the default key administrator
pub fn default_admin_user() -> String {
    DEFAULT_ADMIN_USER.to_string()
}

/// Returns the default log group namespace
pub fn default_log_group_namespace() -> String {
    DEFAULT_LOG_GROUP_NAMESPACE.to_string()
}

/// Returns the default log retention
pub fn default_log_retention() -> LogRetention {
    DEFAULT_LOG_RETENTION
}

/// Returns the default storage class sequence
pub fn default_storage_class_sequence() -> Vec<StorageClass> {
    DEFAULT_STORAGE_CLASS_SEQUENCE.to_vec()
}

/// Returns the default transition cadence
pub fn default_transition_days() -> u32 {
    DEFAULT_TRANSITION_DAYS
}
