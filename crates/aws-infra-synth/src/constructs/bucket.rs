//! Secure S3 bucket wrapper
//!
//! Every bucket:
//! - is named `{prefix}-{account}-{region}` (prefix must be lowercase)
//! - is encrypted with a managed key, with bucket keys enabled
//! - blocks all public access
//! - denies requests that don't use TLS
//! - is retained on removal and never auto-deletes objects unless told otherwise

use super::key::{EncryptionBinding, KeySource};
use super::{Declare, Enforce, PolicySet, Ref, Stack};
use crate::iam::{secure_transport_deny, PolicyDocument};
use crate::template::{intrinsic, Resource};
use aws_infra_common::naming::globally_unique_name;
use aws_infra_common::{LogicalName, PolicyError, RemovalPolicy, ResourceKind, TierTransition};
use serde_json::{json, Value};

pub type BucketRef = Ref<Bucket>;

/// Caller-supplied bucket settings
#[derive(Debug, Clone, PartialEq)]
pub struct BucketProps {
    /// Name prefix; account id and region are appended
    pub bucket_name_prefix: String,
    /// Key the bucket is encrypted with
    pub encryption_key: KeySource,
    /// Removal policy, retained when unset
    pub removal_policy: Option<RemovalPolicy>,
    /// Empty the bucket on removal, off when unset
    pub auto_delete_objects: Option<bool>,
    pub versioned: Option<bool>,
    pub lifecycle_rules: Vec<LifecycleRule>,
}

impl BucketProps {
    pub fn new(bucket_name_prefix: &str, encryption_key: KeySource) -> Self {
        Self {
            bucket_name_prefix: bucket_name_prefix.to_string(),
            encryption_key,
            removal_policy: None,
            auto_delete_objects: None,
            versioned: None,
            lifecycle_rules: Vec::new(),
        }
    }
}

/// A lifecycle rule moving objects through storage classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    pub id: Option<String>,
    pub transitions: Vec<TierTransition>,
    pub expiration_days: Option<u32>,
}

impl LifecycleRule {
    /// Rule for a transition schedule, `None` when the schedule is empty
    pub fn from_schedule(transitions: Vec<TierTransition>) -> Option<Self> {
        if transitions.is_empty() {
            return None;
        }
        Some(Self {
            id: None,
            transitions,
            expiration_days: None,
        })
    }

    fn to_value(&self) -> Value {
        let mut rule = json!({ "Status": "Enabled" });
        if let Some(id) = &self.id {
            rule["Id"] = json!(id);
        }
        if !self.transitions.is_empty() {
            rule["Transitions"] = json!(self.transitions);
        }
        if let Some(days) = self.expiration_days {
            rule["ExpirationInDays"] = json!(days);
        }
        rule
    }
}

/// A bucket with the storage policy applied
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    bucket_name: String,
    encryption: EncryptionBinding,
    removal_policy: RemovalPolicy,
    auto_delete_objects: bool,
    versioned: bool,
    lifecycle_rules: Vec<LifecycleRule>,
}

impl Enforce for BucketProps {
    type Enforced = Bucket;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<Bucket, PolicyError> {
        // Fail fast before anything else is resolved
        let prefix = LogicalName::parse("bucket", self.bucket_name_prefix)?;

        Ok(Bucket {
            bucket_name: globally_unique_name(&prefix, policy.identity),
            encryption: self.encryption_key.enforce(policy)?,
            removal_policy: self.removal_policy.unwrap_or_default(),
            auto_delete_objects: self.auto_delete_objects.unwrap_or(false),
            versioned: self.versioned.unwrap_or(false),
            lifecycle_rules: self.lifecycle_rules,
        })
    }
}

impl Bucket {
    /// Physical bucket name
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn encryption(&self) -> &EncryptionBinding {
        &self.encryption
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    pub fn auto_delete_objects(&self) -> bool {
        self.auto_delete_objects
    }

    pub fn lifecycle_rules(&self) -> &[LifecycleRule] {
        &self.lifecycle_rules
    }

    pub fn add_lifecycle_rule(&mut self, rule: LifecycleRule) {
        self.lifecycle_rules.push(rule);
    }

    /// Always true
    pub fn enforce_ssl(&self) -> bool {
        true
    }

    /// Always true: all four public access blocks are set
    pub fn blocks_public_access(&self) -> bool {
        true
    }
}

impl Declare for Bucket {
    type Handle = BucketRef;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<BucketRef, PolicyError> {
        let key = self.encryption.bind(stack, id)?;
        let key_arn = stack.arn_of(&key)?;

        let mut bucket = Resource::new(ResourceKind::S3Bucket)
            .property("BucketName", self.bucket_name.as_str())
            .property(
                "BucketEncryption",
                json!({
                    "ServerSideEncryptionConfiguration": [{
                        "ServerSideEncryptionByDefault": {
                            "SSEAlgorithm": "aws:kms",
                            "KMSMasterKeyID": key_arn,
                        },
                        "BucketKeyEnabled": true,
                    }],
                }),
            )
            .property(
                "PublicAccessBlockConfiguration",
                json!({
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true,
                }),
            )
            .removal_policy(self.removal_policy);

        if self.versioned {
            bucket = bucket.property("VersioningConfiguration", json!({ "Status": "Enabled" }));
        }
        if !self.lifecycle_rules.is_empty() {
            let rules: Vec<Value> = self
                .lifecycle_rules
                .iter()
                .map(LifecycleRule::to_value)
                .collect();
            bucket = bucket.property("LifecycleConfiguration", json!({ "Rules": rules }));
        }
        if self.auto_delete_objects {
            bucket = bucket.metadata("aws-infra:auto-delete-objects", true);
        }
        stack.add_resource(id, bucket)?;

        let bucket_arn = intrinsic::get_att(id, "Arn");
        let document = PolicyDocument::with_statements(vec![secure_transport_deny(
            "EnforceSecureTransport",
            ["s3:*"],
            vec![
                bucket_arn.clone(),
                intrinsic::join(vec![bucket_arn, Value::from("/*")]),
            ],
        )]);
        let policy = Resource::new(ResourceKind::S3BucketPolicy)
            .property("Bucket", intrinsic::reference(id))
            .property("PolicyDocument", document.to_value());
        stack.add_resource(&format!("{id}Policy"), policy)?;

        Ok(stack.local_ref(id, ResourceKind::S3Bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructs::key::KeyProps;
    use crate::constructs::{apply_policy, StackProps};
    use aws_infra_common::{transition_schedule, DeploymentIdentity, PolicyConfig, StorageClass};

    fn identity() -> DeploymentIdentity {
        DeploymentIdentity::parse("123456789012", "us-east-2").unwrap()
    }

    #[test]
    fn test_name_embeds_identity() {
        let config = PolicyConfig::default();
        let identity = identity();
        let policy = PolicySet::new(&config, &identity);

        let bucket = apply_policy(
            BucketProps::new("backup-bucket", KeySource::Create(KeyProps::new("b", "b"))),
            &policy,
        )
        .unwrap();
        assert_eq!(bucket.bucket_name(), "backup-bucket-123456789012-us-east-2");
        assert_eq!(bucket.removal_policy(), RemovalPolicy::Retain);
        assert!(!bucket.auto_delete_objects());
        assert!(bucket.enforce_ssl());
        assert!(bucket.blocks_public_access());
    }

    #[test]
    fn test_capital_letters_fail_before_key_resolution() {
        let config = PolicyConfig::default();
        let identity = identity();
        let policy = PolicySet::new(&config, &identity);

        // The key alias is invalid too; the bucket name is reported first.
        let err = apply_policy(
            BucketProps::new(
                "Backup-Bucket",
                KeySource::Create(KeyProps::new("BadAlias", "k")),
            ),
            &policy,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PolicyError::NamingViolation {
                kind: "bucket",
                name: "Backup-Bucket".to_string(),
            }
        );
    }

    #[test]
    fn test_declare_with_dedicated_key_and_lifecycle() {
        let config = PolicyConfig::default();
        let identity = identity();
        let policy = PolicySet::new(&config, &identity);
        let mut stack = Stack::new(StackProps::new("Data", "Data"), &policy).unwrap();

        let name = LogicalName::parse("bucket", "data").unwrap();
        let mut bucket = apply_policy(
            BucketProps::new("data", KeySource::Create(KeyProps::for_resource(&name))),
            &policy,
        )
        .unwrap();
        assert!(bucket.encryption().creates_key());

        let schedule = transition_schedule(&[StorageClass::Glacier, StorageClass::DeepArchive], 90);
        bucket.add_lifecycle_rule(LifecycleRule::from_schedule(schedule).unwrap());
        stack.add("DataBucket", bucket).unwrap();

        assert_eq!(stack.count(ResourceKind::KmsKey), 1);
        let template = serde_json::to_value(stack.to_template()).unwrap();
        let resources = &template["Resources"];

        assert_eq!(
            resources["DataBucketKeyAlias"]["Properties"]["AliasName"],
            "alias/Infra/data-key"
        );
        let props = &resources["DataBucket"]["Properties"];
        assert_eq!(
            props["BucketEncryption"]["ServerSideEncryptionConfiguration"][0]
                ["ServerSideEncryptionByDefault"]["KMSMasterKeyID"],
            json!({ "Fn::GetAtt": ["DataBucketKey", "Arn"] })
        );
        assert_eq!(props["PublicAccessBlockConfiguration"]["BlockPublicPolicy"], true);
        assert_eq!(
            props["LifecycleConfiguration"]["Rules"][0]["Transitions"],
            json!([
                { "StorageClass": "GLACIER", "TransitionInDays": 0 },
                { "StorageClass": "DEEP_ARCHIVE", "TransitionInDays": 90 },
            ])
        );

        let statement = &resources["DataBucketPolicy"]["Properties"]["PolicyDocument"]
            ["Statement"][0];
        assert_eq!(statement["Effect"], "Deny");
        assert_eq!(
            statement["Condition"]["Bool"]["aws:SecureTransport"],
            "false"
        );
    }

    #[test]
    fn test_empty_schedule_adds_no_rule() {
        assert!(LifecycleRule::from_schedule(Vec::new()).is_none());
    }
}
