//! Resource kinds declared by aws-infra
//!
//! Maps each kind to its CloudFormation type name and records which kinds
//! hold data that must be encrypted at rest.

use serde::{Serialize, Serializer};

/// Types of AWS resources declared in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// KMS customer managed key
    KmsKey,
    /// KMS alias pointing at a key
    KmsAlias,
    /// S3 bucket
    S3Bucket,
    /// Resource policy of a bucket
    S3BucketPolicy,
    /// SNS topic
    SnsTopic,
    /// Resource policy of a topic
    SnsTopicPolicy,
    /// SNS subscription
    SnsSubscription,
    /// CloudWatch Logs log group
    LogGroup,
    /// Secrets Manager secret
    Secret,
    /// IAM role
    IamRole,
    /// IAM policy attached to roles
    IamPolicy,
    /// Lambda function
    LambdaFunction,
    /// Resource-based permission on a Lambda function
    LambdaPermission,
    /// CloudWatch metric alarm
    CloudWatchAlarm,
    /// API Gateway REST API
    RestApi,
    /// API Gateway path resource
    RestApiResource,
    /// API Gateway method
    RestApiMethod,
    /// API Gateway deployment
    RestApiDeployment,
    /// API Gateway stage
    RestApiStage,
}

impl ResourceKind {
    /// CloudFormation resource type name
    pub fn cfn_type(self) -> &'static str {
        match self {
            ResourceKind::KmsKey => "AWS::KMS::Key",
            ResourceKind::KmsAlias => "AWS::KMS::Alias",
            ResourceKind::S3Bucket => "AWS::S3::Bucket",
            ResourceKind::S3BucketPolicy => "AWS::S3::BucketPolicy",
            ResourceKind::SnsTopic => "AWS::SNS::Topic",
            ResourceKind::SnsTopicPolicy => "AWS::SNS::TopicPolicy",
            ResourceKind::SnsSubscription => "AWS::SNS::Subscription",
            ResourceKind::LogGroup => "AWS::Logs::LogGroup",
            ResourceKind::Secret => "AWS::SecretsManager::Secret",
            ResourceKind::IamRole => "AWS::IAM::Role",
            ResourceKind::IamPolicy => "AWS::IAM::Policy",
            ResourceKind::LambdaFunction => "AWS::Lambda::Function",
            ResourceKind::LambdaPermission => "AWS::Lambda::Permission",
            ResourceKind::CloudWatchAlarm => "AWS::CloudWatch::Alarm",
            ResourceKind::RestApi => "AWS::ApiGateway::RestApi",
            ResourceKind::RestApiResource => "AWS::ApiGateway::Resource",
            ResourceKind::RestApiMethod => "AWS::ApiGateway::Method",
            ResourceKind::RestApiDeployment => "AWS::ApiGateway::Deployment",
            ResourceKind::RestApiStage => "AWS::ApiGateway::Stage",
        }
    }

    /// Whether the kind stores data that must be bound to a managed key
    pub fn is_encryptable(self) -> bool {
        matches!(
            self,
            ResourceKind::S3Bucket
                | ResourceKind::SnsTopic
                | ResourceKind::LogGroup
                | ResourceKind::Secret
        )
    }

    /// Attribute holding the ARN, or `None` when `Ref` already yields it
    pub fn arn_attribute(self) -> Option<&'static str> {
        match self {
            ResourceKind::SnsTopic | ResourceKind::Secret => None,
            _ => Some("Arn"),
        }
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.cfn_type())
    }
}
