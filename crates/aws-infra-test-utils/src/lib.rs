//! Shared test utilities for aws-infra
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`fixtures`]: Deployment identity and policy fixtures
//! - [`template`]: Helpers for inspecting rendered templates

pub mod fixtures;
pub mod template;

// Re-export commonly used items
pub use fixtures::{get_test_region, test_config, test_identity, TEST_ACCOUNT, TEST_REGION};
pub use template::{count_of_type, read_json, resources_of_type};
