//! AWS SDK access
//!
//! The only call made against AWS is the STS identity lookup used when no
//! account is supplied.

pub mod account;
pub mod context;

pub use account::{get_current_account_id, parse_identity, resolve_identity};
pub use context::AwsContext;
