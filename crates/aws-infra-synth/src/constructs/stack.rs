//! Stack wrapper
//!
//! Every stack unit:
//! - is named `{app-prefix}-{id}` and deployed as `{app-prefix}-{id}Stack`
//! - requires a description
//! - carries the `App` and `Owner` tags
//! - has termination protection enabled unless told otherwise

use super::{Declare, Enforce, PolicySet, Ref};
use crate::template::{intrinsic, Export, Output, Resource, Template, FORMAT_VERSION};
use aws_infra_common::naming::{deployable_stack_name, stack_unit_name};
use aws_infra_common::tags::stack_tags;
use aws_infra_common::{DeploymentIdentity, PolicyError, RemovalPolicy, ResourceKind};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Caller-supplied stack settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackProps {
    /// Short id, e.g. "Backup"
    pub id: String,
    /// Description of the stack
    pub description: String,
    /// Termination protection, enabled when unset
    pub termination_protection: Option<bool>,
}

impl StackProps {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            termination_protection: None,
        }
    }
}

/// A named, tagged group of resources deployed together
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    id: String,
    name: String,
    stack_name: String,
    description: String,
    termination_protection: bool,
    tags: BTreeMap<String, String>,
    identity: DeploymentIdentity,
    resources: BTreeMap<String, Resource>,
    outputs: BTreeMap<String, Output>,
    dependencies: BTreeSet<String>,
}

impl Enforce for StackProps {
    type Enforced = Stack;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<Stack, PolicyError> {
        if self.id.trim().is_empty() {
            return Err(PolicyError::ContractViolation {
                owner: "stack".to_string(),
                field: "id",
            });
        }
        if self.description.trim().is_empty() {
            return Err(PolicyError::ContractViolation {
                owner: format!("stack {}", self.id),
                field: "description",
            });
        }

        let name = stack_unit_name(&policy.config.app_prefix, &self.id);
        let stack_name = deployable_stack_name(&name);

        info!(stack = %name, "Constructing stack");

        Ok(Stack {
            id: self.id,
            name,
            stack_name,
            description: self.description,
            termination_protection: self.termination_protection.unwrap_or(true),
            tags: stack_tags(policy.config),
            identity: policy.identity.clone(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
            dependencies: BTreeSet::new(),
        })
    }
}

impl Stack {
    /// Build a stack unit from props under the given policy
    pub fn new(props: StackProps, policy: &PolicySet<'_>) -> Result<Self, PolicyError> {
        super::apply_policy(props, policy)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Unit name, `{app-prefix}-{id}`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deployable name, `{app-prefix}-{id}Stack`
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn termination_protection(&self) -> bool {
        self.termination_protection
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn identity(&self) -> &DeploymentIdentity {
        &self.identity
    }

    pub fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    /// Deployable names of the stacks this one imports from
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Whether `name` is this stack's id, unit name or deployable name
    pub fn is_named(&self, name: &str) -> bool {
        self.id == name || self.name == name || self.stack_name == name
    }

    /// Number of resources of the given kind
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.resources.values().filter(|r| r.kind == kind).count()
    }

    /// Resources whose kind supports encryption at rest
    pub fn encryptable_resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.kind.is_encryptable())
            .map(|(id, r)| (id.as_str(), r))
    }

    /// Declare an enforced construct under the given logical id
    pub fn add<D: Declare>(&mut self, id: &str, construct: D) -> Result<D::Handle, PolicyError> {
        construct.declare(self, id)
    }

    /// Insert a raw resource, rejecting duplicate logical ids
    pub fn add_resource(
        &mut self,
        logical_id: &str,
        resource: Resource,
    ) -> Result<(), PolicyError> {
        if self.resources.contains_key(logical_id) {
            return Err(PolicyError::DuplicateLogicalId {
                stack: self.stack_name.clone(),
                logical_id: logical_id.to_string(),
            });
        }
        debug!(
            stack = %self.stack_name,
            logical_id = %logical_id,
            resource_type = resource.kind.cfn_type(),
            "Declared resource"
        );
        if resource.deletion_policy.is_some_and(RemovalPolicy::destroys_data) {
            warn!(
                stack = %self.stack_name,
                logical_id = %logical_id,
                "Resource data is deleted when removed from the stack"
            );
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resource_mut(&mut self, logical_id: &str) -> Result<&mut Resource, PolicyError> {
        let stack = &self.stack_name;
        self.resources
            .get_mut(logical_id)
            .ok_or_else(|| PolicyError::UnknownResource {
                stack: stack.clone(),
                logical_id: logical_id.to_string(),
            })
    }

    /// Record that this stack must deploy after `stack_name`
    pub fn add_dependency(&mut self, stack_name: &str) {
        if stack_name != self.stack_name {
            self.dependencies.insert(stack_name.to_string());
        }
    }

    /// Reference to a resource declared in this stack
    pub(crate) fn local_ref<T>(&self, logical_id: &str, kind: ResourceKind) -> Ref<T> {
        Ref::new(&self.stack_name, logical_id, kind)
    }

    fn is_local<T>(&self, r: &Ref<T>) -> bool {
        r.stack() == self.stack_name
    }

    /// `Ref` of a resource declared in this stack
    pub fn ref_of<T>(&self, r: &Ref<T>) -> Result<Value, PolicyError> {
        if !self.is_local(r) {
            return Err(self.unexported(r));
        }
        Ok(intrinsic::reference(r.logical_id()))
    }

    /// ARN expression for `r` as seen from this stack.
    ///
    /// Local resources resolve directly. Resources owned by another stack
    /// must have been exported; they resolve to an import and make this stack
    /// depend on the owner.
    pub fn arn_of<T>(&mut self, r: &Ref<T>) -> Result<Value, PolicyError> {
        if self.is_local(r) {
            return Ok(local_arn(r.logical_id(), r.kind()));
        }
        match r.export() {
            Some(export_name) => {
                self.add_dependency(r.stack());
                Ok(intrinsic::import_value(export_name))
            }
            None => Err(self.unexported(r)),
        }
    }

    fn unexported<T>(&self, r: &Ref<T>) -> PolicyError {
        PolicyError::UnexportedReference {
            stack: r.stack().to_string(),
            logical_id: r.logical_id().to_string(),
            consumer: self.stack_name.clone(),
        }
    }

    /// Export the ARN of a local resource as `{stack_name}:{name}`
    pub fn export<T>(&mut self, r: &Ref<T>, name: &str) -> Result<Ref<T>, PolicyError> {
        if !self.is_local(r) {
            return Err(self.unexported(r));
        }
        if !self.resources.contains_key(r.logical_id()) {
            return Err(PolicyError::UnknownResource {
                stack: self.stack_name.clone(),
                logical_id: r.logical_id().to_string(),
            });
        }

        let value = local_arn(r.logical_id(), r.kind());
        if self.outputs.get(name).is_some_and(|o| o.value != value) {
            return Err(PolicyError::DuplicateExport {
                stack: self.stack_name.clone(),
                name: name.to_string(),
            });
        }

        let export_name = format!("{}:{}", self.stack_name, name);
        self.outputs.insert(
            name.to_string(),
            Output {
                value,
                description: Some(format!("ARN of {}", r.logical_id())),
                export: Some(Export {
                    name: export_name.clone(),
                }),
            },
        );
        debug!(stack = %self.stack_name, export = %export_name, "Exported value");

        Ok(r.clone().with_export(export_name))
    }

    /// Render the stack as a template
    pub fn to_template(&self) -> Template {
        Template {
            format_version: FORMAT_VERSION,
            description: self.description.clone(),
            resources: self.resources.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

fn local_arn(logical_id: &str, kind: ResourceKind) -> Value {
    match kind.arn_attribute() {
        Some(attribute) => intrinsic::get_att(logical_id, attribute),
        None => intrinsic::reference(logical_id),
    }
}
