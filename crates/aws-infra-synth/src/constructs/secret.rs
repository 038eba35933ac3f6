//! Secrets Manager secret wrapper

use super::key::{EncryptionBinding, KeySource};
use super::role::Role;
use super::{Declare, Enforce, PolicySet, Ref, Stack};
use crate::iam::PolicyStatement;
use crate::template::Resource;
use aws_infra_common::naming::prefixed_alias;
use aws_infra_common::{LogicalName, PolicyError, RemovalPolicy, ResourceKind};
use serde_json::json;

pub type SecretRef = Ref<Secret>;

/// Caller-supplied secret settings
#[derive(Debug, Clone, PartialEq)]
pub struct SecretProps {
    /// Name below the app prefix
    pub secret_name: String,
    pub description: String,
    pub encryption_key: KeySource,
    /// Removal policy, retained when unset
    pub removal_policy: Option<RemovalPolicy>,
}

impl SecretProps {
    pub fn new(secret_name: &str, description: &str, encryption_key: KeySource) -> Self {
        Self {
            secret_name: secret_name.to_string(),
            description: description.to_string(),
            encryption_key,
            removal_policy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Secret {
    secret_name: String,
    description: String,
    encryption: EncryptionBinding,
    removal_policy: RemovalPolicy,
}

impl Enforce for SecretProps {
    type Enforced = Secret;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<Secret, PolicyError> {
        let name = LogicalName::parse("secret", self.secret_name)?;
        if self.description.trim().is_empty() {
            return Err(PolicyError::ContractViolation {
                owner: format!("secret {name}"),
                field: "description",
            });
        }

        Ok(Secret {
            secret_name: prefixed_alias(&policy.config.app_prefix, &name),
            description: self.description,
            encryption: self.encryption_key.enforce(policy)?,
            removal_policy: self.removal_policy.unwrap_or_default(),
        })
    }
}

impl Secret {
    /// `{app-prefix}/{name}`
    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    pub fn encryption(&self) -> &EncryptionBinding {
        &self.encryption
    }
}

impl Declare for Secret {
    type Handle = SecretRef;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<SecretRef, PolicyError> {
        let key = self.encryption.bind(stack, id)?;
        let key_arn = stack.arn_of(&key)?;

        // Value is generated by the service and filled in out of band.
        let secret = Resource::new(ResourceKind::Secret)
            .property("Name", self.secret_name.as_str())
            .property("Description", self.description.as_str())
            .property("KmsKeyId", key_arn)
            .property("GenerateSecretString", json!({}))
            .removal_policy(self.removal_policy);
        stack.add_resource(id, secret)?;

        Ok(stack.local_ref(id, ResourceKind::Secret))
    }
}

impl Ref<Secret> {
    /// Allow `role` to read the secret value
    pub fn grant_read(&self, stack: &mut Stack, role: &mut Role) -> Result<(), PolicyError> {
        let arn = stack.arn_of(self)?;
        role.add_to_policy(
            PolicyStatement::allow()
                .actions([
                    "secretsmanager:GetSecretValue",
                    "secretsmanager:DescribeSecret",
                ])
                .resource(arn),
        );
        Ok(())
    }
}
