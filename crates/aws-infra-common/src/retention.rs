//! Removal policies and log retention periods

use serde::{Deserialize, Serialize};

/// What happens to a resource when it leaves the stack.
///
/// Serializes to the template `DeletionPolicy` values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
pub enum RemovalPolicy {
    /// Keep the resource (and its data) in the account
    #[default]
    Retain,
    /// Take a final snapshot before deleting
    Snapshot,
    /// Delete the resource
    #[serde(rename = "Delete")]
    #[strum(serialize = "Delete")]
    Destroy,
}

impl RemovalPolicy {
    /// Whether removing the resource loses its data
    pub fn destroys_data(self) -> bool {
        matches!(self, RemovalPolicy::Destroy)
    }
}

/// CloudWatch Logs retention periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogRetention {
    OneDay,
    ThreeDays,
    FiveDays,
    OneWeek,
    TwoWeeks,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    FourMonths,
    FiveMonths,
    #[default]
    SixMonths,
    OneYear,
    ThirteenMonths,
    EighteenMonths,
    TwoYears,
    ThreeYears,
    FiveYears,
    SixYears,
    SevenYears,
    EightYears,
    NineYears,
    TenYears,
    Infinite,
}

impl LogRetention {
    /// Retention in days, `None` when logs never expire
    pub fn days(self) -> Option<u32> {
        let days = match self {
            LogRetention::OneDay => 1,
            LogRetention::ThreeDays => 3,
            LogRetention::FiveDays => 5,
            LogRetention::OneWeek => 7,
            LogRetention::TwoWeeks => 14,
            LogRetention::OneMonth => 30,
            LogRetention::TwoMonths => 60,
            LogRetention::ThreeMonths => 90,
            LogRetention::FourMonths => 120,
            LogRetention::FiveMonths => 150,
            LogRetention::SixMonths => 180,
            LogRetention::OneYear => 365,
            LogRetention::ThirteenMonths => 400,
            LogRetention::EighteenMonths => 545,
            LogRetention::TwoYears => 731,
            LogRetention::ThreeYears => 1096,
            LogRetention::FiveYears => 1827,
            LogRetention::SixYears => 2192,
            LogRetention::SevenYears => 2557,
            LogRetention::EightYears => 2922,
            LogRetention::NineYears => 3288,
            LogRetention::TenYears => 3653,
            LogRetention::Infinite => return None,
        };
        Some(days)
    }
}
