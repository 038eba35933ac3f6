//! Deployment identity resolution
//!
//! Account and region come from the command line or environment when given.
//! A missing account is looked up through STS with whatever credentials the
//! SDK finds.

use super::context::AwsContext;
use anyhow::{Context, Result};
use aws_infra_common::{AccountId, DeploymentIdentity, Region, Violations};
use tracing::info;

/// Fetch the current AWS account ID from credentials via STS GetCallerIdentity
///
/// This operation requires no special permissions - it always succeeds if
/// credentials are valid.
pub async fn get_current_account_id(aws: &AwsContext) -> Result<AccountId> {
    let identity = aws
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(AccountId::parse(account)?)
}

/// Validate an explicitly supplied account and region, reporting both
/// problems at once when both are malformed
pub fn parse_identity(account: &str, region: &str) -> Result<DeploymentIdentity, Violations> {
    let mut violations = Violations::new();
    let account = violations.check(AccountId::parse(account));
    let region = violations.check(Region::parse(region));
    match (account, region) {
        (Some(account), Some(region)) => Ok(DeploymentIdentity::new(account, region)),
        _ => Err(violations),
    }
}

/// Resolve the identity to synthesize for, asking STS when no account is given
pub async fn resolve_identity(
    account: Option<&str>,
    region: &str,
    profile: Option<&str>,
) -> Result<DeploymentIdentity> {
    let identity = match account {
        Some(account) => parse_identity(account, region)?,
        None => {
            let region = Region::parse(region)?;
            info!(region = %region, profile = ?profile, "No account given, asking STS");
            let aws = AwsContext::with_profile(&region, profile).await;
            DeploymentIdentity::new(get_current_account_id(&aws).await?, region)
        }
    };
    info!(environment = %identity.environment(), "Resolved deployment identity");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_infra_test_utils::get_test_region;

    #[test]
    fn test_parse_identity_reports_every_violation() {
        let violations = parse_identity("12345", "US-EAST-2").unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.is_validation()));
    }

    #[test]
    fn test_parse_identity() {
        let identity = parse_identity("123456789012", "eu-west-1").unwrap();
        assert_eq!(identity.environment(), "aws://123456789012/eu-west-1");
    }

    #[tokio::test]
    async fn test_explicit_account_skips_sts() {
        let identity = resolve_identity(Some("123456789012"), "us-east-2", None)
            .await
            .unwrap();
        assert_eq!(identity.account.as_str(), "123456789012");
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_get_current_account_id() {
        let aws = AwsContext::new(&get_test_region()).await;
        let account = get_current_account_id(&aws).await.unwrap();
        assert_eq!(account.len(), 12);
    }
}
