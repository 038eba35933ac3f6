//! Encrypted log group wrapper
//!
//! Log groups live under `/{namespace}/{suffix}`, are always encrypted and
//! keep their events for the configured retention (six months by default).

use super::key::{EncryptionBinding, KeySource};
use super::role::Role;
use super::{Declare, Enforce, PolicySet, Ref, Stack};
use crate::iam::PolicyStatement;
use crate::template::Resource;
use aws_infra_common::naming::log_group_name;
use aws_infra_common::{LogRetention, LogicalName, PolicyError, RemovalPolicy, ResourceKind};

pub type LogGroupRef = Ref<LogGroup>;

/// Caller-supplied log group settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogGroupProps {
    /// Path below the namespace, e.g. `function/my-handler`
    pub log_group_suffix: String,
    pub encryption_key: KeySource,
    /// Retention, the configured default when unset
    pub retention: Option<LogRetention>,
    /// Removal policy, retained when unset
    pub removal_policy: Option<RemovalPolicy>,
}

impl LogGroupProps {
    pub fn new(log_group_suffix: &str, encryption_key: KeySource) -> Self {
        Self {
            log_group_suffix: log_group_suffix.to_string(),
            encryption_key,
            retention: None,
            removal_policy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogGroup {
    log_group_name: String,
    encryption: EncryptionBinding,
    retention: LogRetention,
    removal_policy: RemovalPolicy,
}

impl Enforce for LogGroupProps {
    type Enforced = LogGroup;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<LogGroup, PolicyError> {
        let suffix = LogicalName::parse("log group", self.log_group_suffix)?;
        Ok(LogGroup {
            log_group_name: log_group_name(&policy.config.log_group_namespace, &suffix),
            encryption: self.encryption_key.enforce(policy)?,
            retention: self.retention.unwrap_or(policy.config.log_retention),
            removal_policy: self.removal_policy.unwrap_or_default(),
        })
    }
}

impl LogGroup {
    pub fn log_group_name(&self) -> &str {
        &self.log_group_name
    }

    pub fn retention(&self) -> LogRetention {
        self.retention
    }

    pub fn encryption(&self) -> &EncryptionBinding {
        &self.encryption
    }
}

impl Declare for LogGroup {
    type Handle = LogGroupRef;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<LogGroupRef, PolicyError> {
        let key = self.encryption.bind(stack, id)?;
        let key_arn = stack.arn_of(&key)?;

        let log_group = Resource::new(ResourceKind::LogGroup)
            .property("LogGroupName", self.log_group_name.as_str())
            .property("KmsKeyId", key_arn)
            .optional_property("RetentionInDays", self.retention.days())
            .removal_policy(self.removal_policy);
        stack.add_resource(id, log_group)?;

        Ok(stack.local_ref(id, ResourceKind::LogGroup))
    }
}

impl Ref<LogGroup> {
    /// Allow `role` to create streams and put events in this log group
    pub fn grant_write(&self, stack: &mut Stack, role: &mut Role) -> Result<(), PolicyError> {
        let arn = stack.arn_of(self)?;
        role.add_to_policy(
            PolicyStatement::allow()
                .actions(["logs:CreateLogStream", "logs:PutLogEvents"])
                .resource(arn),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructs::key::KeyProps;
    use crate::constructs::role::RoleProps;
    use crate::constructs::{apply_policy, StackProps};
    use aws_infra_common::{DeploymentIdentity, PolicyConfig};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn identity() -> DeploymentIdentity {
        DeploymentIdentity::parse("123456789012", "us-east-2").unwrap()
    }

    #[test]
    fn test_name_and_default_retention() {
        let config = PolicyConfig::default();
        let identity = identity();
        let policy = PolicySet::new(&config, &identity);

        let log_group = apply_policy(
            LogGroupProps::new("function/handler", KeySource::Create(KeyProps::new("l", "l"))),
            &policy,
        )
        .unwrap();
        assert_eq!(log_group.log_group_name(), "/aws-infrastructure/function/handler");
        assert_eq!(log_group.retention(), LogRetention::SixMonths);
    }

    #[test]
    fn test_suffix_with_capitals_rejected() {
        let config = PolicyConfig::default();
        let identity = identity();
        let policy = PolicySet::new(&config, &identity);

        let err = apply_policy(
            LogGroupProps::new("Function/Handler", KeySource::Create(KeyProps::new("l", "l"))),
            &policy,
        )
        .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            PolicyError::NamingViolation {
                kind: "log group",
                ..
            }
        ));
    }

    #[test]
    fn test_retention_override_and_grant() {
        let config = PolicyConfig::default();
        let identity = identity();
        let policy = PolicySet::new(&config, &identity);
        let mut stack = Stack::new(StackProps::new("Logs", "Logs"), &policy).unwrap();

        let props = LogGroupProps {
            retention: Some(LogRetention::Infinite),
            ..LogGroupProps::new("app", KeySource::Create(KeyProps::new("app-logs", "Logs")))
        };
        let log_group = apply_policy(props, &policy).unwrap();
        let log_ref = stack.add("AppLogs", log_group).unwrap();

        let mut role = Role::new(RoleProps {
            role_name: "Writer".to_string(),
            description: "Writes logs".to_string(),
            assumed_by: "lambda.amazonaws.com".to_string(),
            managed_policies: Vec::new(),
            inline_policies: BTreeMap::new(),
        });
        log_ref.grant_write(&mut stack, &mut role).unwrap();
        assert_eq!(role.default_policy().statements().len(), 1);

        let template = serde_json::to_value(stack.to_template()).unwrap();
        let props = &template["Resources"]["AppLogs"]["Properties"];
        assert!(props.get("RetentionInDays").is_none());
        assert_eq!(props["KmsKeyId"], json!({ "Fn::GetAtt": ["AppLogsKey", "Arn"] }));
    }
}
