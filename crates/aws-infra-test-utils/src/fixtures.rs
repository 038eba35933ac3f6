//! Identity and policy fixtures

use aws_infra_common::{DeploymentIdentity, PolicyConfig};

/// Account every fixture identity uses
pub const TEST_ACCOUNT: &str = "123456789012";

/// Region every fixture identity uses
pub const TEST_REGION: &str = "us-east-2";

/// Identity for `TEST_ACCOUNT` in `TEST_REGION`
pub fn test_identity() -> DeploymentIdentity {
    DeploymentIdentity::parse(TEST_ACCOUNT, TEST_REGION)
        .expect("fixture identity is valid")
}

/// The built-in policy
pub fn test_config() -> PolicyConfig {
    PolicyConfig::default()
}

/// Get the AWS region for tests that talk to AWS.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to `TEST_REGION`
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| TEST_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_identity() {
        let identity = test_identity();
        assert_eq!(identity.environment(), "aws://123456789012/us-east-2");
    }
}
