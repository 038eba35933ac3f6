//! Secure SNS topic wrapper
//!
//! Topic names are lowercase logical names; the display name carries the app
//! prefix. Topics are always encrypted and refuse publishes over plain HTTP.

use super::key::{EncryptionBinding, KeySource};
use super::{Declare, Enforce, PolicySet, Ref, Stack};
use crate::iam::{secure_transport_deny, PolicyDocument};
use crate::template::{intrinsic, Resource};
use aws_infra_common::naming::display_name;
use aws_infra_common::{LogicalName, PolicyError, ResourceKind};

pub type TopicRef = Ref<Topic>;

/// Caller-supplied topic settings
#[derive(Debug, Clone, PartialEq)]
pub struct TopicProps {
    pub topic_name: String,
    pub encryption_key: KeySource,
}

impl TopicProps {
    pub fn new(topic_name: &str, encryption_key: KeySource) -> Self {
        Self {
            topic_name: topic_name.to_string(),
            encryption_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    topic_name: LogicalName,
    display_name: String,
    encryption: EncryptionBinding,
}

impl Enforce for TopicProps {
    type Enforced = Topic;

    fn enforce(self, policy: &PolicySet<'_>) -> Result<Topic, PolicyError> {
        let topic_name = LogicalName::parse("topic", self.topic_name)?;
        Ok(Topic {
            display_name: display_name(&policy.config.app_prefix, &topic_name),
            topic_name,
            encryption: self.encryption_key.enforce(policy)?,
        })
    }
}

impl Topic {
    pub fn topic_name(&self) -> &str {
        self.topic_name.as_str()
    }

    /// `{app-prefix}-{topic-name}`
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn encryption(&self) -> &EncryptionBinding {
        &self.encryption
    }
}

impl Declare for Topic {
    type Handle = TopicRef;

    fn declare(self, stack: &mut Stack, id: &str) -> Result<TopicRef, PolicyError> {
        let key = self.encryption.bind(stack, id)?;
        let key_arn = stack.arn_of(&key)?;

        let topic = Resource::new(ResourceKind::SnsTopic)
            .property("TopicName", self.topic_name.as_str())
            .property("DisplayName", self.display_name.as_str())
            .property("KmsMasterKeyId", key_arn);
        stack.add_resource(id, topic)?;

        let document = PolicyDocument::with_statements(vec![secure_transport_deny(
            "EnforceSecureTransport",
            ["SNS:Publish"],
            vec![intrinsic::reference(id)],
        )]);
        let policy = Resource::new(ResourceKind::SnsTopicPolicy)
            .property("PolicyDocument", document.to_value())
            .property("Topics", vec![intrinsic::reference(id)]);
        stack.add_resource(&format!("{id}Policy"), policy)?;

        Ok(stack.local_ref(id, ResourceKind::SnsTopic))
    }
}

impl Ref<Topic> {
    /// Subscribe an email address to this topic
    pub fn add_email_subscription(
        &self,
        stack: &mut Stack,
        id: &str,
        email: &str,
    ) -> Result<(), PolicyError> {
        let topic = stack.ref_of(self)?;
        let subscription = Resource::new(ResourceKind::SnsSubscription)
            .property("Protocol", "email")
            .property("Endpoint", email)
            .property("TopicArn", topic);
        stack.add_resource(id, subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructs::key::KeyProps;
    use crate::constructs::{apply_policy, StackProps};
    use aws_infra_common::{DeploymentIdentity, PolicyConfig};
    use serde_json::json;

    #[test]
    fn test_topic_gets_implicit_key_and_ssl_policy() {
        let config = PolicyConfig::default();
        let identity = DeploymentIdentity::parse("123456789012", "us-east-2").unwrap();
        let policy = PolicySet::new(&config, &identity);
        let mut stack = Stack::new(StackProps::new("Alerts", "Alerts"), &policy).unwrap();

        let name = LogicalName::parse("topic", "alarm-topic").unwrap();
        let topic = apply_policy(
            TopicProps::new("alarm-topic", KeySource::Create(KeyProps::for_resource(&name))),
            &policy,
        )
        .unwrap();
        assert_eq!(topic.display_name(), "Infra-alarm-topic");

        let topic_ref = stack.add("AlarmTopic", topic).unwrap();
        topic_ref
            .add_email_subscription(&mut stack, "AlarmTopicEmail", "ops@example.com")
            .unwrap();

        assert_eq!(stack.count(ResourceKind::KmsKey), 1);
        let template = serde_json::to_value(stack.to_template()).unwrap();
        let resources = &template["Resources"];
        assert_eq!(
            resources["AlarmTopic"]["Properties"]["KmsMasterKeyId"],
            json!({ "Fn::GetAtt": ["AlarmTopicKey", "Arn"] })
        );
        let statement = &resources["AlarmTopicPolicy"]["Properties"]["PolicyDocument"]
            ["Statement"][0];
        assert_eq!(statement["Action"], json!(["SNS:Publish"]));
        assert_eq!(statement["Effect"], "Deny");
        assert_eq!(
            resources["AlarmTopicEmail"]["Properties"]["TopicArn"],
            json!({ "Ref": "AlarmTopic" })
        );
    }

    #[test]
    fn test_uppercase_topic_name_rejected() {
        let config = PolicyConfig::default();
        let identity = DeploymentIdentity::parse("123456789012", "us-east-2").unwrap();
        let policy = PolicySet::new(&config, &identity);
        let props = TopicProps::new("AlarmTopic", KeySource::Create(KeyProps::new("k", "k")));
        assert!(apply_policy(props, &policy).unwrap_err().is_validation());
    }
}
