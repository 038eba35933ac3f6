//! S3 storage classes usable as lifecycle transition targets

use serde::{Deserialize, Serialize};

/// Storage class with a distinct cost/retrieval-latency tradeoff.
///
/// String forms match the values S3 lifecycle rules expect
/// (`GLACIER`, `DEEP_ARCHIVE`, ...) and parse case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum StorageClass {
    /// Infrequent access, millisecond retrieval
    StandardIa,
    /// Infrequent access in a single availability zone
    OnezoneIa,
    /// Automatic tiering between access tiers
    IntelligentTiering,
    /// Glacier Instant Retrieval
    GlacierIr,
    /// Glacier Flexible Retrieval (minutes to hours)
    Glacier,
    /// Glacier Deep Archive (12+ hours)
    DeepArchive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_matches_lifecycle_values() {
        assert_eq!(StorageClass::Glacier.to_string(), "GLACIER");
        assert_eq!(StorageClass::DeepArchive.to_string(), "DEEP_ARCHIVE");
        assert_eq!(StorageClass::GlacierIr.to_string(), "GLACIER_IR");
        assert_eq!(StorageClass::OnezoneIa.to_string(), "ONEZONE_IA");
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            "deep_archive".parse::<StorageClass>().unwrap(),
            StorageClass::DeepArchive
        );
        assert!("tape".parse::<StorageClass>().is_err());
    }

    #[test]
    fn test_serde_agrees_with_display() {
        for class in StorageClass::iter() {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class));
        }
    }
}
