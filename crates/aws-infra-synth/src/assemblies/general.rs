//! General stack: primitives shared by every other stack

use crate::app::App;
use crate::constructs::{
    apply_policy, KeyProps, KeyRef, KeySource, PolicySet, SecretProps, SecretRef, Stack,
    StackProps,
};
use aws_infra_common::PolicyError;

pub const STACK_ID: &str = "General";

/// Exported handles other assemblies build on
#[derive(Debug, Clone)]
pub struct General {
    project_key: KeyRef,
    discord_integration_secret: SecretRef,
}

impl General {
    /// The single key every project resource is encrypted with
    pub fn project_key(&self) -> &KeyRef {
        &self.project_key
    }

    pub fn discord_integration_secret(&self) -> &SecretRef {
        &self.discord_integration_secret
    }
}

pub fn build(app: &mut App, policy: &PolicySet<'_>) -> Result<General, PolicyError> {
    let mut stack = Stack::new(
        StackProps::new(STACK_ID, "General Resources for the account"),
        policy,
    )?;

    let key = apply_policy(
        KeyProps::new(
            "project-key",
            "Key used for encrypting resources across the project",
        ),
        policy,
    )?;
    let key = stack.add("ProjectKey", key)?;

    let secret = apply_policy(
        SecretProps::new(
            "discord-integration",
            "Secrets used by the Discord integrations",
            KeySource::Existing(key.clone()),
        ),
        policy,
    )?;
    let secret = stack.add("DiscordIntegrationSecret", secret)?;

    let general = General {
        project_key: stack.export(&key, "ProjectKeyArn")?,
        discord_integration_secret: stack.export(&secret, "DiscordIntegrationSecretArn")?,
    };
    app.add_stack(stack)?;
    Ok(general)
}
