//! Integration tests for the assembled resource graph
//!
//! Builds the full app for the fixture identity and checks the policy holds
//! across every stack.

use anyhow::Result;
use aws_infra_common::{PolicyConfig, PolicyError, ResourceKind};
use aws_infra_synth::{build_app, App, PolicySet};
use aws_infra_test_utils::{count_of_type, resources_of_type, test_config, test_identity};
use serde_json::Value;

fn build(config: &PolicyConfig) -> Result<App> {
    let identity = test_identity();
    Ok(build_app(&PolicySet::new(config, &identity))?)
}

fn templates(app: &App) -> Result<Vec<(String, Value)>> {
    let mut templates = Vec::new();
    for stack in app.stacks() {
        templates.push((
            stack.stack_name().to_string(),
            serde_json::to_value(stack.to_template())?,
        ));
    }
    Ok(templates)
}

#[test]
fn test_shared_key_is_the_only_key() -> Result<()> {
    let app = build(&test_config())?;

    let keys: usize = app.stacks().iter().map(|s| s.count(ResourceKind::KmsKey)).sum();
    assert_eq!(keys, 1, "Backup and DiscordIntegration must reuse the project key");
    assert_eq!(app.stack("General")?.count(ResourceKind::KmsKey), 1);
    Ok(())
}

#[test]
fn test_stack_names_and_tags() -> Result<()> {
    let app = build(&test_config())?;

    let names: Vec<_> = app.stacks().iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec!["Infra-General", "Infra-Backup", "Infra-DiscordIntegration"]
    );
    for stack in app.stacks() {
        assert_eq!(stack.tags()["App"], "Infra");
        assert_eq!(stack.tags()["Owner"], "Michael");
        assert!(stack.termination_protection());
        assert!(!stack.description().is_empty());
    }
    Ok(())
}

#[test]
fn test_backup_bucket() -> Result<()> {
    let app = build(&test_config())?;
    let template = serde_json::to_value(app.stack("Backup")?.to_template())?;

    let buckets = resources_of_type(&template, "AWS::S3::Bucket");
    assert_eq!(buckets.len(), 1);
    let (_, bucket) = buckets[0];
    assert_eq!(
        bucket["Properties"]["BucketName"],
        "backup-bucket-123456789012-us-east-2"
    );
    assert_eq!(bucket["DeletionPolicy"], "Retain");
    assert_eq!(
        bucket["Properties"]["BucketEncryption"]["ServerSideEncryptionConfiguration"][0]
            ["ServerSideEncryptionByDefault"]["KMSMasterKeyID"],
        serde_json::json!({ "Fn::ImportValue": "Infra-GeneralStack:ProjectKeyArn" })
    );

    let transitions = &bucket["Properties"]["LifecycleConfiguration"]["Rules"][0]["Transitions"];
    assert_eq!(transitions[0]["StorageClass"], "GLACIER");
    assert_eq!(transitions[0]["TransitionInDays"], 0);
    assert_eq!(transitions[1]["StorageClass"], "DEEP_ARCHIVE");
    assert_eq!(transitions[1]["TransitionInDays"], 90);
    Ok(())
}

#[test]
fn test_every_bucket_and_topic_denies_plain_transport() -> Result<()> {
    let app = build(&test_config())?;

    for (stack_name, template) in templates(&app)? {
        let policies: Vec<_> = resources_of_type(&template, "AWS::S3::BucketPolicy")
            .into_iter()
            .chain(resources_of_type(&template, "AWS::SNS::TopicPolicy"))
            .collect();
        assert_eq!(
            policies.len(),
            count_of_type(&template, "AWS::S3::Bucket")
                + count_of_type(&template, "AWS::SNS::Topic"),
            "{stack_name}: every bucket and topic needs a transport policy"
        );

        for (id, policy) in policies {
            let statement = &policy["Properties"]["PolicyDocument"]["Statement"][0];
            assert_eq!(statement["Effect"], "Deny", "{stack_name}/{id}");
            assert_eq!(statement["Condition"]["Bool"]["aws:SecureTransport"], "false");
        }
    }
    Ok(())
}

#[test]
fn test_encryptable_resources_are_encrypted() -> Result<()> {
    let app = build(&test_config())?;

    let mut checked = 0;
    for stack in app.stacks() {
        for (id, resource) in stack.encryptable_resources() {
            let key = match resource.kind {
                ResourceKind::S3Bucket => resource.properties["BucketEncryption"]
                    ["ServerSideEncryptionConfiguration"][0]["ServerSideEncryptionByDefault"]
                    ["KMSMasterKeyID"]
                    .clone(),
                ResourceKind::SnsTopic => resource.properties["KmsMasterKeyId"].clone(),
                _ => resource.properties["KmsKeyId"].clone(),
            };
            assert!(key.is_object(), "{}/{id} is not encrypted", stack.stack_name());
            checked += 1;
        }
    }
    // backup bucket, secret, log group and alarm topic
    assert_eq!(checked, 4);
    Ok(())
}

#[test]
fn test_log_group_default_retention() -> Result<()> {
    let app = build(&test_config())?;
    let template = serde_json::to_value(app.stack("DiscordIntegration")?.to_template())?;

    let log_groups = resources_of_type(&template, "AWS::Logs::LogGroup");
    assert_eq!(log_groups.len(), 1);
    let (_, log_group) = log_groups[0];
    assert_eq!(log_group["Properties"]["RetentionInDays"], 180);
    assert_eq!(
        log_group["Properties"]["LogGroupName"],
        "/aws-infrastructure/function/trello-discord-webhook-function"
    );
    Ok(())
}

#[test]
fn test_deployment_order_puts_general_first() -> Result<()> {
    let app = build(&test_config())?;
    let order: Vec<_> = app
        .deployment_order()?
        .into_iter()
        .map(|s| s.id().to_string())
        .collect();
    assert_eq!(order, vec!["General", "Backup", "DiscordIntegration"]);

    for id in ["Backup", "DiscordIntegration"] {
        let deps = app.stack(id)?.dependencies();
        assert_eq!(deps.iter().collect::<Vec<_>>(), vec!["Infra-GeneralStack"]);
    }
    Ok(())
}

#[test]
fn test_config_overrides_flow_through() -> Result<()> {
    let mut config = test_config();
    config.app_prefix = "Acme".to_string();
    config.backup.transition_days = 30;
    let app = build(&config)?;

    assert!(app.stack("Acme-BackupStack").is_ok());
    let key_alias = &app.stack("General")?.resource("ProjectKeyAlias").unwrap().properties
        ["AliasName"];
    assert_eq!(key_alias, "alias/Acme/project-key");

    let template = serde_json::to_value(app.stack("Backup")?.to_template())?;
    let (_, bucket) = resources_of_type(&template, "AWS::S3::Bucket")[0];
    assert_eq!(
        bucket["Properties"]["LifecycleConfiguration"]["Rules"][0]["Transitions"][1]
            ["TransitionInDays"],
        30
    );
    Ok(())
}

#[test]
fn test_empty_archival_sequence_attaches_no_rule() -> Result<()> {
    let mut config = test_config();
    config.backup.storage_class_sequence.clear();
    let app = build(&config)?;

    let template = serde_json::to_value(app.stack("Backup")?.to_template())?;
    let (_, bucket) = resources_of_type(&template, "AWS::S3::Bucket")[0];
    assert!(bucket["Properties"].get("LifecycleConfiguration").is_none());
    Ok(())
}

#[test]
fn test_unknown_stack() -> Result<()> {
    let app = build(&test_config())?;
    assert_eq!(
        app.select(&["Nope".to_string()]).unwrap_err(),
        PolicyError::UnknownStack("Nope".to_string())
    );
    Ok(())
}
