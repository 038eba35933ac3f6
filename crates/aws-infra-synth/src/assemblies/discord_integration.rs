//! DiscordIntegration stack: the Trello to Discord webhook
//!
//! A REST API proxies `/trello-webhook` to a Lambda function that reads the
//! shared Discord secret. The function logs into an encrypted log group and
//! an alarm mails the notification address when the webhook gets busy.

use super::General;
use crate::app::App;
use crate::constructs::{
    apply_policy, KeySource, LogGroupProps, LogGroupRef, PolicySet, Role, RoleProps, RoleRef,
    Stack, StackProps, TopicProps, TopicRef,
};
use crate::iam::{PolicyDocument, PolicyStatement, Principal};
use crate::template::{intrinsic, Resource};
use aws_infra_common::defaults::{ALARM_INVOCATION_THRESHOLD, ALARM_PERIOD_SECS};
use aws_infra_common::{PolicyError, ResourceKind};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;

pub const STACK_ID: &str = "DiscordIntegration";

/// Prefix of the function, role and alarm names
const TRELLO_PREFIX: &str = "Trello-Discord-Webhook";

/// Asset directory holding the function source
const FUNCTION_ASSET_PATH: &str = "lambda/trello_webhook";

const FUNCTION_ASSET_KEY: &str = "trello_webhook.zip";

const FUNCTION_TIMEOUT_SECS: u32 = 10;

const STAGE_NAME: &str = "prod";

const WEBHOOK_PATH: &str = "trello-webhook";

pub fn build(app: &mut App, policy: &PolicySet<'_>, general: &General) -> Result<(), PolicyError> {
    let identity = policy.identity;
    let project_key = general.project_key();
    let secret = general.discord_integration_secret();

    // CloudWatch Logs encrypts the function's log group with the shared key
    let key_owner = app.stack_mut(project_key.stack())?;
    project_key.add_to_resource_policy(
        key_owner,
        PolicyStatement::allow()
            .sid("AllowCloudWatchLogs")
            .principal(Principal::service("logs.amazonaws.com"))
            .actions([
                "kms:Encrypt*",
                "kms:Decrypt*",
                "kms:ReEncrypt*",
                "kms:GenerateDataKey*",
                "kms:Describe*",
            ])
            .resource("*")
            .condition(
                "ArnLike",
                "kms:EncryptionContext:aws:logs:arn",
                format!(
                    "arn:{}:logs:{}:{}:*",
                    identity.partition(),
                    identity.region,
                    identity.account
                ),
            ),
    )?;

    let mut stack = Stack::new(
        StackProps::new(
            STACK_ID,
            "Resources for integrations with Discord such as Trello webhooks",
        ),
        policy,
    )?;

    let log_group = apply_policy(
        LogGroupProps::new(
            "function/trello-discord-webhook-function",
            KeySource::Existing(project_key.clone()),
        ),
        policy,
    )?;
    let log_group = stack.add("DiscordIntegrationLogGroup", log_group)?;

    let secret_arn = stack.arn_of(secret)?;
    let permissions = PolicyDocument::with_statements(vec![
        PolicyStatement::allow()
            .sid("SecretsAccess")
            .actions(["secretsmanager:GetSecretValue"])
            .resource(secret_arn.clone()),
        PolicyStatement::allow()
            .sid("KMSAccess")
            .actions(["kms:*"])
            .resource("*"),
    ]);
    let mut role = Role::new(RoleProps {
        role_name: format!("{TRELLO_PREFIX}-Exec-Role"),
        description: "Role used for executing the Trello Webhook Lambda Function".to_string(),
        assumed_by: "lambda.amazonaws.com".to_string(),
        managed_policies: vec!["service-role/AWSLambdaBasicExecutionRole".to_string()],
        inline_policies: BTreeMap::from([(
            "DiscordIntegrationPermissions".to_string(),
            permissions,
        )]),
    });
    project_key.grant_encrypt_decrypt(&mut stack, &mut role)?;
    log_group.grant_write(&mut stack, &mut role)?;
    let role = stack.add("TrelloWebhookFunctionExecRole", role)?;

    let function_id = declare_function(&mut stack, policy, &role, &log_group, secret_arn)?;

    let topic = apply_policy(
        TopicProps::new(
            "trello-discord-webhook-alarm-topic",
            KeySource::Existing(project_key.clone()),
        ),
        policy,
    )?;
    let topic = stack.add("TrelloWebhookAlarmTopic", topic)?;
    if policy.config.has_placeholder_email() {
        warn!(
            email = %policy.config.notification_email,
            "Alarm notifications go to the placeholder address; set notification_email in the policy config"
        );
    }
    topic.add_email_subscription(
        &mut stack,
        "TrelloWebhookAlarmTopicEmailSubscription",
        &policy.config.notification_email,
    )?;

    declare_invocation_alarm(&mut stack, &function_id, &topic)?;
    declare_rest_api(&mut stack, policy, &function_id)?;

    app.add_stack(stack)
}

fn declare_function(
    stack: &mut Stack,
    policy: &PolicySet<'_>,
    role: &RoleRef,
    log_group: &LogGroupRef,
    secret_arn: Value,
) -> Result<String, PolicyError> {
    let id = "TrelloWebhookFunction";
    let identity = policy.identity;
    let asset_bucket = format!(
        "{}-assets-{}-{}",
        policy.config.app_prefix.to_lowercase(),
        identity.account,
        identity.region
    );

    let mut function = Resource::new(ResourceKind::LambdaFunction)
        .property("FunctionName", format!("{TRELLO_PREFIX}-Function"))
        .property(
            "Description",
            "Lambda Function that handles Trello Webhooks and posts to Discord",
        )
        .property("Role", stack.arn_of(role)?)
        .property("Runtime", "python3.11")
        .property("Handler", "index.lambda_handler")
        .property(
            "Code",
            json!({ "S3Bucket": asset_bucket, "S3Key": FUNCTION_ASSET_KEY }),
        )
        .property("Timeout", FUNCTION_TIMEOUT_SECS)
        .property(
            "Environment",
            json!({ "Variables": { "DISCORD_INTEGRATION_SECRET_ARN": secret_arn } }),
        )
        .property(
            "LoggingConfig",
            json!({ "LogGroup": stack.ref_of(log_group)? }),
        )
        .metadata("aws:asset:path", FUNCTION_ASSET_PATH)
        .depends_on(role.logical_id());

    // The role's grants must exist before the function first runs
    let default_policy = format!("{}DefaultPolicy", role.logical_id());
    if stack.resource(&default_policy).is_some() {
        function = function.depends_on(&default_policy);
    }
    stack.add_resource(id, function)?;
    Ok(id.to_string())
}

fn declare_invocation_alarm(
    stack: &mut Stack,
    function_id: &str,
    topic: &TopicRef,
) -> Result<(), PolicyError> {
    let alarm = Resource::new(ResourceKind::CloudWatchAlarm)
        .property("AlarmName", format!("{TRELLO_PREFIX}-Function-Invocation-Alarm"))
        .property(
            "AlarmDescription",
            format!(
                "Alarm for the Trello Webhook Lambda Function if it is invoked more than {} times in {} minutes",
                ALARM_INVOCATION_THRESHOLD,
                ALARM_PERIOD_SECS / 60
            ),
        )
        .property("Namespace", "AWS/Lambda")
        .property("MetricName", "Invocations")
        .property(
            "Dimensions",
            json!([{ "Name": "FunctionName", "Value": intrinsic::reference(function_id) }]),
        )
        .property("Statistic", "Sum")
        .property("Period", ALARM_PERIOD_SECS)
        .property("EvaluationPeriods", 1)
        .property("Threshold", ALARM_INVOCATION_THRESHOLD)
        .property("ComparisonOperator", "GreaterThanOrEqualToThreshold")
        .property("ActionsEnabled", true)
        .property("AlarmActions", vec![stack.ref_of(topic)?]);
    stack.add_resource("TrelloWebhookAlarm", alarm)
}

fn declare_rest_api(
    stack: &mut Stack,
    policy: &PolicySet<'_>,
    function_id: &str,
) -> Result<(), PolicyError> {
    let identity = policy.identity;
    let partition = identity.partition();
    let api_id = "DiscordRestApi";
    let resource_id = "DiscordRestApiTrelloWebhook";
    let method_id = "DiscordRestApiTrelloWebhookAny";
    let deployment_id = "DiscordRestApiDeployment";
    let stage_id = "DiscordRestApiDeploymentStageProd";
    let function_arn = intrinsic::get_att(function_id, "Arn");

    stack.add_resource(
        api_id,
        Resource::new(ResourceKind::RestApi)
            .property("Name", "DiscordIntegration")
            .property("Description", "Rest API used for handling Discord Webhooks"),
    )?;

    stack.add_resource(
        resource_id,
        Resource::new(ResourceKind::RestApiResource)
            .property("ParentId", intrinsic::get_att(api_id, "RootResourceId"))
            .property("PathPart", WEBHOOK_PATH)
            .property("RestApiId", intrinsic::reference(api_id)),
    )?;

    stack.add_resource(
        method_id,
        Resource::new(ResourceKind::RestApiMethod)
            .property("HttpMethod", "ANY")
            .property("AuthorizationType", "NONE")
            .property("ResourceId", intrinsic::reference(resource_id))
            .property("RestApiId", intrinsic::reference(api_id))
            .property(
                "Integration",
                json!({
                    "Type": "AWS_PROXY",
                    "IntegrationHttpMethod": "POST",
                    "Uri": intrinsic::join(vec![
                        Value::from(format!(
                            "arn:{partition}:apigateway:{}:lambda:path/2015-03-31/functions/",
                            identity.region
                        )),
                        function_arn.clone(),
                        Value::from("/invocations"),
                    ]),
                }),
            ),
    )?;

    stack.add_resource(
        deployment_id,
        Resource::new(ResourceKind::RestApiDeployment)
            .property("RestApiId", intrinsic::reference(api_id))
            .property("Description", "Rest API used for handling Discord Webhooks")
            .depends_on(method_id),
    )?;

    stack.add_resource(
        stage_id,
        Resource::new(ResourceKind::RestApiStage)
            .property("RestApiId", intrinsic::reference(api_id))
            .property("DeploymentId", intrinsic::reference(deployment_id))
            .property("StageName", STAGE_NAME)
            .property("Description", "The Prod/Live stage of the Rest API"),
    )?;

    stack.add_resource(
        &format!("{method_id}Permission"),
        Resource::new(ResourceKind::LambdaPermission)
            .property("Action", "lambda:InvokeFunction")
            .property("FunctionName", function_arn)
            .property("Principal", "apigateway.amazonaws.com")
            .property(
                "SourceArn",
                intrinsic::join(vec![
                    Value::from(format!(
                        "arn:{partition}:execute-api:{}:{}:",
                        identity.region, identity.account
                    )),
                    intrinsic::reference(api_id),
                    Value::from("/"),
                    intrinsic::reference(stage_id),
                    Value::from(format!("/*/{WEBHOOK_PATH}")),
                ]),
            ),
    )
}
