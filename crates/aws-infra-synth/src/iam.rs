//! IAM policy documents
//!
//! Statements are built in code and serialized to the JSON policy grammar
//! used by key policies, resource policies and role policies alike.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// IAM policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum Effect {
    Allow,
    Deny,
}

/// Who a resource-policy statement applies to
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// Every principal (`{"AWS": "*"}`)
    Any,
    /// An AWS service such as `lambda.amazonaws.com`
    Service(String),
    /// An account, user or role ARN
    Aws(Value),
}

impl Principal {
    pub fn service(name: &str) -> Self {
        Principal::Service(name.to_string())
    }

    pub fn arn(arn: impl Into<Value>) -> Self {
        Principal::Aws(arn.into())
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Principal::Any => map.serialize_entry("AWS", "*")?,
            Principal::Service(service) => map.serialize_entry("Service", service)?,
            Principal::Aws(arn) => map.serialize_entry("AWS", arn)?,
        }
        map.end()
    }
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub condition: Map<String, Value>,
}

impl PolicyStatement {
    fn new(effect: Effect) -> Self {
        Self {
            sid: None,
            effect,
            principal: None,
            action: Vec::new(),
            resource: Vec::new(),
            condition: Map::new(),
        }
    }

    pub fn allow() -> Self {
        Self::new(Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::new(Effect::Deny)
    }

    pub fn sid(mut self, sid: &str) -> Self {
        self.sid = Some(sid.to_string());
        self
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn resource(mut self, resource: impl Into<Value>) -> Self {
        self.resource.push(resource.into());
        self
    }

    /// Add a condition such as `Bool` / `aws:SecureTransport` / `"false"`
    pub fn condition(mut self, operator: &str, key: &str, value: impl Into<Value>) -> Self {
        let entry = self
            .condition
            .entry(operator.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(keys) = entry {
            keys.insert(key.to_string(), value.into());
        }
        self
    }
}

/// An ordered list of statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statements(statements: Vec<PolicyStatement>) -> Self {
        Self { statements }
    }

    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Trust policy letting a service assume a role
    pub fn assume_role(service: &str) -> Self {
        Self::with_statements(vec![PolicyStatement::allow()
            .principal(Principal::service(service))
            .actions(["sts:AssumeRole"])])
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "Version": POLICY_VERSION,
            "Statement": self.statements,
        })
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("Version", POLICY_VERSION)?;
        map.serialize_entry("Statement", &self.statements)?;
        map.end()
    }
}

/// Deny statement rejecting any request not made over TLS
pub fn secure_transport_deny<I, S>(sid: &str, actions: I, resources: Vec<Value>) -> PolicyStatement
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let statement = PolicyStatement::deny()
        .sid(sid)
        .principal(Principal::Any)
        .actions(actions)
        .condition("Bool", "aws:SecureTransport", "false");
    resources
        .into_iter()
        .fold(statement, |statement, resource| statement.resource(resource))
}
