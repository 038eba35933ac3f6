//! aws-infra-synth - Policy-enforcing infrastructure synthesizer
//!
//! Declares the account's resource graph through wrappers that enforce the
//! organization's naming, encryption, access and retention policy, and
//! renders the graph as CloudFormation templates.

pub mod app;
pub mod assemblies;
pub mod aws;
pub mod constructs;
pub mod iam;
pub mod synth;
pub mod template;

pub use app::App;
pub use assemblies::build_app;
pub use constructs::{apply_policy, PolicySet};
