//! Backup stack: the tiered archival bucket for 3-2-1 backups

use super::General;
use crate::app::App;
use crate::constructs::{
    apply_policy, BucketProps, KeySource, LifecycleRule, PolicySet, Stack, StackProps,
};
use aws_infra_common::{transition_schedule, PolicyError};
use tracing::debug;

pub const STACK_ID: &str = "Backup";

pub fn build(app: &mut App, policy: &PolicySet<'_>, general: &General) -> Result<(), PolicyError> {
    let mut stack = Stack::new(
        StackProps::new(STACK_ID, "Resources for backups of resources into the account"),
        policy,
    )?;

    let mut bucket = apply_policy(
        BucketProps::new(
            "backup-bucket",
            KeySource::Existing(general.project_key().clone()),
        ),
        policy,
    )?;

    // New data moves to colder storage one tier per interval
    let archival = &policy.config.backup;
    let schedule = transition_schedule(&archival.storage_class_sequence, archival.transition_days);
    debug!(transitions = schedule.len(), "Backup bucket transition schedule");
    if let Some(rule) = LifecycleRule::from_schedule(schedule) {
        bucket.add_lifecycle_rule(rule);
    }
    stack.add("BackupBucket", bucket)?;

    app.add_stack(stack)
}
