//! Managed key wrapper and encryption bindings
//!
//! Every key:
//! - has its alias prefixed with the app prefix
//! - rotates unless rotation is explicitly disabled
//! - grants the configured administrator access
//! - is retained when removed from the stack unless told otherwise
//!
//! Resources that need a key get it through a [`KeySource`]: either an
//! existing key the caller already holds, or a new key the caller asked for.
//! A key is never created as a hidden fallback, so sharing one project key
//! across stacks keeps the graph at exactly one key.

use super::role::Role;
use super::{Declare, Enforce, PolicySet, Ref, Stack};
use crate::iam::{PolicyDocument, PolicyStatement, Principal};
use crate::template::{intrinsic, Resource};
use aws_infra_common::defaults::KEY_PENDING_WINDOW_DAYS;
use aws_infra_common::naming::{implicit_key_alias, prefixed_alias};
use aws_infra_common::{LogicalName, PolicyError, RemovalPolicy, ResourceKind};
use serde_json::{json, Value};
use tracing::debug;

/// Actions granted to the key administrator
const KEY_ADMIN_ACTIONS: &[&str] = &[
    "kms:Create*",
    "kms:Describe*",
    "kms:Enable*",
    "kms:List*",
    "kms:Put*",
    "kms:Update*",
    "kms:Revoke*",
    "kms:Disable*",
    "kms:Get*",
    "kms:Delete*",
    "kms:TagResource",
    "kms:UntagResource",
    "kms:ScheduleKeyDeletion",
    "kms:CancelKeyDeletion",
];

/// Actions granted by [`Ref::grant_encrypt_decrypt`]
const ENCRYPT_DECRYPT_ACTIONS: &[&str] = &[
    "kms:Decrypt",
    "kms:Encrypt",
    "kms:ReEncrypt*",
    "kms:GenerateDataKey*",
];

pub type KeyRef = Ref<Key>;

/// Caller-supplied key settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyProps {
    /// Alias, prefixed with the app prefix (lowercase only)
    pub alias: String,
    /// Description of the key
    pub description: String,
    /// Rotation, enabled when unset
    pub enable_key_rotation: Option<bool>,
    /// Key state, enabled when unset
    pub enabled: Option<bool>,
    /// Removal policy, retained when unset
    pub removal_policy: Option<RemovalPolicy>,
    /// Waiting period before deletion (7-30 days)
    pub pending_window_days: Option<u32>,
}

impl KeyProps {
    pub fn new(alias: &str, description: &str) -> Self {
        Self {
            alias: alias.to_string(),
            description: description.to_string(),
            enable_key_rotation: None,
            enabled: None,
            removal_policy: None,
            pending_window_days: None,
        }
    }

    /// Props for a key dedicated to one resource, aliased `{owner}-key`
    pub fn for_resource(owner: &LogicalName) -> Self {
        Self::new(
            implicit_key_alias(owner).as_str(),
            &format!("Key automatically created for {owner}"),
        )
    }
}

/// A key with the encryption invariants applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    alias: String,
    description: String,
    rotation_enabled: bool,
    enabled: bool,
    root_arn: String,
    admin_arn: String,
    removal_policy: RemovalPolicy,
    pending_window_days: Option<u32>,
}

impl Enforce for KeyProps {
    type Enforced = Key;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<Key, PolicyError> {
        let alias = LogicalName::parse("key alias", self.alias)?;
        if self.description.trim().is_empty() {
            return Err(PolicyError::ContractViolation {
                owner: format!("key {alias}"),
                field: "description",
            });
        }
        if let Some(days) = self.pending_window_days {
            if !KEY_PENDING_WINDOW_DAYS.contains(&days) {
                return Err(PolicyError::OutOfRange {
                    owner: format!("key {alias}"),
                    field: "pending_window_days",
                    value: days,
                    min: *KEY_PENDING_WINDOW_DAYS.start(),
                    max: *KEY_PENDING_WINDOW_DAYS.end(),
                });
            }
        }

        Ok(Key {
            alias: prefixed_alias(&policy.config.app_prefix, &alias),
            description: self.description,
            rotation_enabled: self.enable_key_rotation.unwrap_or(true),
            enabled: self.enabled.unwrap_or(true),
            root_arn: policy.identity.root_arn(),
            admin_arn: policy.identity.user_arn(&policy.config.admin_user),
            removal_policy: self.removal_policy.unwrap_or_default(),
            pending_window_days: self.pending_window_days,
        })
    }
}

impl Key {
    /// Prefixed alias, e.g. `Infra/project-key`
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn admin_arn(&self) -> &str {
        &self.admin_arn
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    /// Key policy: the account root plus the administrator
    pub fn key_policy(&self) -> PolicyDocument {
        PolicyDocument::with_statements(vec![
            PolicyStatement::allow()
                .principal(Principal::arn(self.root_arn.as_str()))
                .actions(["kms:*"])
                .resource("*"),
            PolicyStatement::allow()
                .sid("KeyAdministration")
                .principal(Principal::arn(self.admin_arn.as_str()))
                .actions(KEY_ADMIN_ACTIONS.iter().copied())
                .resource("*"),
        ])
    }
}

impl Declare for Key {
    type Handle = KeyRef;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<KeyRef, PolicyError> {
        let key = Resource::new(ResourceKind::KmsKey)
            .property("Description", self.description.as_str())
            .property("Enabled", self.enabled)
            .property("EnableKeyRotation", self.rotation_enabled)
            .property("KeyPolicy", self.key_policy().to_value())
            .optional_property("PendingWindowInDays", self.pending_window_days)
            .removal_policy(self.removal_policy);
        stack.add_resource(id, key)?;

        let alias = Resource::new(ResourceKind::KmsAlias)
            .property("AliasName", format!("alias/{}", self.alias))
            .property("TargetKeyId", intrinsic::reference(id));
        stack.add_resource(&format!("{id}Alias"), alias)?;

        Ok(stack.local_ref(id, ResourceKind::KmsKey))
    }
}

/// Where an encryptable resource gets its key from
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Bind to a key that already exists (possibly in another stack)
    Existing(KeyRef),
    /// Create a new key next to the resource
    Create(KeyProps),
}

impl KeySource {
    pub(crate) fn enforce(self, policy: &PolicySet<'_>) -> Result<EncryptionBinding, PolicyError> {
        Ok(match self {
            KeySource::Existing(key) => EncryptionBinding::Existing(key),
            KeySource::Create(props) => EncryptionBinding::Create(props.enforce(policy)?),
        })
    }
}

/// An enforced key choice for one resource
#[derive(Debug, Clone, PartialEq)]
pub enum EncryptionBinding {
    Existing(KeyRef),
    Create(Key),
}

impl EncryptionBinding {
    /// Whether binding will declare a new key
    pub fn creates_key(&self) -> bool {
        matches!(self, EncryptionBinding::Create(_))
    }

    /// Resolve to a key reference, declaring the key as `{owner_id}Key` when
    /// a new one was requested
    pub fn bind(self, stack: &mut Stack, owner_id: &str) -> Result<KeyRef, PolicyError> {
        match self {
            EncryptionBinding::Existing(key) => Ok(key),
            EncryptionBinding::Create(key) => {
                debug!(owner = %owner_id, alias = %key.alias(), "Creating dedicated key");
                stack.add(&format!("{owner_id}Key"), key)
            }
        }
    }
}

impl Ref<Key> {
    /// Append a statement to the key policy.
    ///
    /// `owner` must be the stack that declared the key.
    pub fn add_to_resource_policy(
        &self,
        owner: &mut Stack,
        statement: PolicyStatement,
    ) -> Result<(), PolicyError> {
        if owner.stack_name() != self.stack() {
            return Err(PolicyError::UnknownResource {
                stack: owner.stack_name().to_string(),
                logical_id: self.logical_id().to_string(),
            });
        }

        let stack_name = owner.stack_name().to_string();
        let resource = owner.resource_mut(self.logical_id())?;
        let statements = resource
            .properties
            .get_mut("KeyPolicy")
            .and_then(|policy| policy.get_mut("Statement"))
            .and_then(Value::as_array_mut)
            .ok_or_else(|| PolicyError::UnknownResource {
                stack: stack_name,
                logical_id: format!("{}.KeyPolicy", self.logical_id()),
            })?;
        statements.push(json!(statement));
        Ok(())
    }

    /// Allow `role` to encrypt and decrypt with this key
    pub fn grant_encrypt_decrypt(
        &self,
        consumer: &mut Stack,
        role: &mut Role,
    ) -> Result<(), PolicyError> {
        let arn = consumer.arn_of(self)?;
        role.add_to_policy(
            PolicyStatement::allow()
                .actions(ENCRYPT_DECRYPT_ACTIONS.iter().copied())
                .resource(arn),
        );
        Ok(())
    }
}
