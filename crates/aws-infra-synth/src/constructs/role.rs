//! IAM role declarations
//!
//! Roles are not policy-wrapped; they collect grants from the resources they
//! are given access to and render them as a default policy next to the role.

use super::{Declare, Ref, Stack};
use crate::iam::{PolicyDocument, PolicyStatement};
use crate::template::{intrinsic, Resource};
use aws_infra_common::{PolicyError, ResourceKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type RoleRef = Ref<Role>;

/// Caller-supplied role settings
#[derive(Debug, Clone, PartialEq)]
pub struct RoleProps {
    pub role_name: String,
    pub description: String,
    /// Service principal allowed to assume the role
    pub assumed_by: String,
    /// AWS managed policy names, e.g. `service-role/AWSLambdaBasicExecutionRole`
    pub managed_policies: Vec<String>,
    pub inline_policies: BTreeMap<String, PolicyDocument>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    props: RoleProps,
    default_policy: PolicyDocument,
}

impl Role {
    pub fn new(props: RoleProps) -> Self {
        Self {
            props,
            default_policy: PolicyDocument::new(),
        }
    }

    pub fn role_name(&self) -> &str {
        &self.props.role_name
    }

    /// Add a statement to the role's default policy
    pub fn add_to_policy(&mut self, statement: PolicyStatement) {
        self.default_policy.add_statement(statement);
    }

    pub fn default_policy(&self) -> &PolicyDocument {
        &self.default_policy
    }
}

impl Declare for Role {
    type Handle = RoleRef;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<RoleRef, PolicyError> {
        let partition = stack.identity().partition();
        let managed: Vec<Value> = self
            .props
            .managed_policies
            .iter()
            .map(|name| Value::from(format!("arn:{partition}:iam::aws:policy/{name}")))
            .collect();
        let inline: Vec<Value> = self
            .props
            .inline_policies
            .iter()
            .map(|(name, document)| {
                let mut policy = Map::new();
                policy.insert("PolicyName".to_string(), Value::from(name.as_str()));
                policy.insert("PolicyDocument".to_string(), document.to_value());
                Value::Object(policy)
            })
            .collect();

        let role = Resource::new(ResourceKind::IamRole)
            .property("RoleName", self.props.role_name.as_str())
            .property("Description", self.props.description.as_str())
            .property(
                "AssumeRolePolicyDocument",
                PolicyDocument::assume_role(&self.props.assumed_by).to_value(),
            )
            .optional_property("ManagedPolicyArns", (!managed.is_empty()).then_some(managed))
            .optional_property("Policies", (!inline.is_empty()).then_some(inline));
        stack.add_resource(id, role)?;

        if !self.default_policy.is_empty() {
            let policy_id = format!("{id}DefaultPolicy");
            let policy = Resource::new(ResourceKind::IamPolicy)
                .property("PolicyName", policy_id.as_str())
                .property("PolicyDocument", self.default_policy.to_value())
                .property("Roles", vec![intrinsic::reference(id)]);
            stack.add_resource(&policy_id, policy)?;
        }

        Ok(stack.local_ref(id, ResourceKind::IamRole))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructs::{PolicySet, StackProps};
    use aws_infra_common::{DeploymentIdentity, PolicyConfig};
    use serde_json::json;

    fn props() -> RoleProps {
        RoleProps {
            role_name: "Exec-Role".to_string(),
            description: "Execution role".to_string(),
            assumed_by: "lambda.amazonaws.com".to_string(),
            managed_policies: vec!["service-role/AWSLambdaBasicExecutionRole".to_string()],
            inline_policies: BTreeMap::new(),
        }
    }

    #[test]
    fn test_role_with_grants_gets_default_policy() {
        let config = PolicyConfig::default();
        let identity = DeploymentIdentity::parse("123456789012", "us-east-2").unwrap();
        let policy = PolicySet::new(&config, &identity);
        let mut stack = Stack::new(StackProps::new("Test", "Test"), &policy).unwrap();

        let mut role = Role::new(props());
        role.add_to_policy(PolicyStatement::allow().actions(["s3:GetObject"]).resource("*"));
        let role_ref = stack.add("ExecRole", role).unwrap();
        assert_eq!(role_ref.kind(), ResourceKind::IamRole);

        let template = serde_json::to_value(stack.to_template()).unwrap();
        assert_eq!(
            template["Resources"]["ExecRole"]["Properties"]["ManagedPolicyArns"],
            json!(["arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"])
        );
        assert_eq!(
            template["Resources"]["ExecRoleDefaultPolicy"]["Properties"]["Roles"],
            json!([{ "Ref": "ExecRole" }])
        );
    }

    #[test]
    fn test_role_without_grants_has_no_default_policy() {
        let config = PolicyConfig::default();
        let identity = DeploymentIdentity::parse("123456789012", "us-east-2").unwrap();
        let policy = PolicySet::new(&config, &identity);
        let mut stack = Stack::new(StackProps::new("Test", "Test"), &policy).unwrap();

        stack.add("ExecRole", Role::new(props())).unwrap();
        assert!(stack.resource("ExecRoleDefaultPolicy").is_none());
        assert_eq!(stack.count(ResourceKind::IamPolicy), 0);
    }
}
