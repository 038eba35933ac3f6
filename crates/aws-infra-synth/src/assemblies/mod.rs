//! Stack assemblies
//!
//! Each assembly builds one stack unit and adds it to the app. General runs
//! first and hands its shared key and secret to the others, which only ever
//! reference them.

pub mod backup;
pub mod discord_integration;
pub mod general;

pub use general::General;

use crate::app::App;
use crate::constructs::PolicySet;
use aws_infra_common::PolicyError;
use tracing::info;

/// Build every stack of the account
pub fn build_app(policy: &PolicySet<'_>) -> Result<App, PolicyError> {
    info!(
        account = %policy.identity.account,
        region = %policy.identity.region,
        app_prefix = %policy.config.app_prefix,
        "Building app"
    );

    let mut app = App::new();
    let general = general::build(&mut app, policy)?;
    backup::build(&mut app, policy, &general)?;
    discord_integration::build(&mut app, policy, &general)?;

    info!(
        stacks = app.stacks().len(),
        resources = app.resource_count(),
        "App built"
    );
    Ok(app)
}
