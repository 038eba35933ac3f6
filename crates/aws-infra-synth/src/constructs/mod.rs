//! Policy-enforcing resource wrappers
//!
//! Each wrapper is a props type (what the caller may choose) and an enforced
//! type (what the policy layer produced). [`apply_policy`] turns one into the
//! other; fields the policy owns, like public access blocking or transport
//! enforcement, simply have no props field, so callers cannot override them.
//!
//! ```ignore
//! let policy = PolicySet::new(&config, &identity);
//! let mut stack = Stack::new(StackProps::new("Backup", "Backups"), &policy)?;
//! let props = BucketProps::new("backup-bucket", KeySource::Existing(key));
//! let bucket = apply_policy(props, &policy)?;
//! let bucket_ref = stack.add("BackupBucket", bucket)?;
//! ```

pub mod bucket;
pub mod key;
pub mod log_group;
pub mod role;
pub mod secret;
pub mod stack;
pub mod topic;

pub use bucket::{Bucket, BucketProps, BucketRef, LifecycleRule};
pub use key::{EncryptionBinding, Key, KeyProps, KeyRef, KeySource};
pub use log_group::{LogGroup, LogGroupProps, LogGroupRef};
pub use role::{Role, RoleProps, RoleRef};
pub use secret::{Secret, SecretProps, SecretRef};
pub use stack::{Stack, StackProps};
pub use topic::{Topic, TopicProps, TopicRef};

use aws_infra_common::{DeploymentIdentity, PolicyConfig, PolicyError, ResourceKind};
use std::fmt;
use std::marker::PhantomData;

/// Policy inputs shared by every wrapper during one construction pass
#[derive(Debug, Clone, Copy)]
pub struct PolicySet<'a> {
    pub config: &'a PolicyConfig,
    pub identity: &'a DeploymentIdentity,
}

impl<'a> PolicySet<'a> {
    pub fn new(config: &'a PolicyConfig, identity: &'a DeploymentIdentity) -> Self {
        Self { config, identity }
    }
}

/// Raw props that the policy layer turns into an enforced declaration
pub trait Enforce {
    type Enforced;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<Self::Enforced, PolicyError>;
}

/// Apply naming, encryption and retention policy to raw props
pub fn apply_policy<P: Enforce>(
    props: P,
    policy: &PolicySet<'_>,
) -> Result<P::Enforced, PolicyError> {
    props.enforce(policy)
}

/// An enforced declaration that can be written into a stack
pub trait Declare {
    /// Reference returned to the caller once declared
    type Handle;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<Self::Handle, PolicyError>;
}

/// Non-owning reference to a declared resource.
///
/// The type parameter records what kind of wrapper produced it, so a
/// `Ref<Key>` cannot be passed where a topic is expected.
pub struct Ref<T> {
    stack: String,
    logical_id: String,
    kind: ResourceKind,
    export: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    pub(crate) fn new(stack: &str, logical_id: &str, kind: ResourceKind) -> Self {
        Self {
            stack: stack.to_string(),
            logical_id: logical_id.to_string(),
            kind,
            export: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn with_export(mut self, export_name: String) -> Self {
        self.export = Some(export_name);
        self
    }

    /// Deployable name of the owning stack
    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Export name other stacks import the ARN under, if exported
    pub fn export(&self) -> Option<&str> {
        self.export.as_deref()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            logical_id: self.logical_id.clone(),
            kind: self.kind,
            export: self.export.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.stack == other.stack
            && self.logical_id == other.logical_id
            && self.kind == other.kind
            && self.export == other.export
    }
}

impl<T> Eq for Ref<T> {}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("stack", &self.stack)
            .field("logical_id", &self.logical_id)
            .field("kind", &self.kind)
            .field("export", &self.export)
            .finish()
    }
}
