//! Deployment identity: the account and region a graph is built for

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};

/// Strongly-typed AWS account ID (12-digit string)
///
/// This newtype prevents accidentally mixing account IDs with other strings
/// and ensures validation happens once, at parse time.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Deref,
)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(s: &str) -> Result<Self, PolicyError> {
        if s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(AccountId(s.to_string()))
        } else {
            Err(PolicyError::InvalidIdentity {
                field: "account id",
                value: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for AccountId {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AccountId::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

/// AWS region code such as `us-east-2`
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Deref,
)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn parse(s: &str) -> Result<Self, PolicyError> {
        let valid = !s.is_empty()
            && !s.starts_with('-')
            && !s.ends_with('-')
            && s
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if valid {
            Ok(Region(s.to_string()))
        } else {
            Err(PolicyError::InvalidIdentity {
                field: "region",
                value: s.to_string(),
            })
        }
    }

    /// ARN partition the region belongs to
    pub fn partition(&self) -> &'static str {
        if self.0.starts_with("cn-") {
            "aws-cn"
        } else if self.0.starts_with("us-gov-") {
            "aws-us-gov"
        } else {
            "aws"
        }
    }
}

impl TryFrom<String> for Region {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Region::parse(&value)
    }
}

impl From<Region> for String {
    fn from(value: Region) -> Self {
        value.0
    }
}

/// Account and region every physical name and ARN is derived from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentIdentity {
    pub account: AccountId,
    pub region: Region,
}

impl DeploymentIdentity {
    pub fn new(account: AccountId, region: Region) -> Self {
        Self { account, region }
    }

    /// Parse both parts from raw strings
    pub fn parse(account: &str, region: &str) -> Result<Self, PolicyError> {
        Ok(Self::new(AccountId::parse(account)?, Region::parse(region)?))
    }

    pub fn partition(&self) -> &'static str {
        self.region.partition()
    }

    /// Environment string in the `aws://{account}/{region}` form
    pub fn environment(&self) -> String {
        format!("aws://{}/{}", self.account, self.region)
    }

    /// ARN of the account root principal
    pub fn root_arn(&self) -> String {
        format!("arn:{}:iam::{}:root", self.partition(), self.account)
    }

    /// ARN of a named IAM user in this account
    pub fn user_arn(&self, user_name: &str) -> String {
        format!(
            "arn:{}:iam::{}:user/{}",
            self.partition(),
            self.account,
            user_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_requires_twelve_digits() {
        assert!(AccountId::parse("123456789012").is_ok());
        assert!(AccountId::parse("12345678901").is_err());
        assert!(AccountId::parse("12345678901a").is_err());
        assert!(AccountId::parse("").is_err());
    }

    #[test]
    fn test_region_validation() {
        assert!(Region::parse("us-east-2").is_ok());
        assert!(Region::parse("US-EAST-2").is_err());
        assert!(Region::parse("").is_err());
        assert!(Region::parse("-us").is_err());
    }

    #[test]
    fn test_partition() {
        assert_eq!(Region::parse("us-east-2").unwrap().partition(), "aws");
        assert_eq!(Region::parse("cn-north-1").unwrap().partition(), "aws-cn");
        assert_eq!(
            Region::parse("us-gov-west-1").unwrap().partition(),
            "aws-us-gov"
        );
    }

    #[test]
    fn test_principal_arns() {
        let identity = DeploymentIdentity::parse("123456789012", "us-east-2").unwrap();
        assert_eq!(identity.root_arn(), "arn:aws:iam::123456789012:root");
        assert_eq!(
            identity.user_arn("michael"),
            "arn:aws:iam::123456789012:user/michael"
        );
        assert_eq!(identity.environment(), "aws://123456789012/us-east-2");
    }

    #[test]
    fn test_identity_deserialize_validates() {
        let ok: Result<DeploymentIdentity, _> =
            serde_json::from_str(r#"{"account":"123456789012","region":"eu-west-1"}"#);
        assert!(ok.is_ok());

        let bad: Result<DeploymentIdentity, _> =
            serde_json::from_str(r#"{"account":"nope","region":"eu-west-1"}"#);
        assert!(bad.is_err());
    }
}
