//! Stack tag keys
//!
//! Every stack unit carries these tags, which CloudFormation propagates to
//! the taggable resources inside it.
//!
//! ## Tag Schema
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `App` | App prefix shared by all stacks |
//! | `Owner` | Owner of the account |

use crate::config::PolicyConfig;
use std::collections::BTreeMap;

/// Tag key for the app prefix
pub const TAG_APP: &str = "App";

/// Tag key for the account owner
pub const TAG_OWNER: &str = "Owner";

/// Build the mandatory tag set for a stack unit
pub fn stack_tags(config: &PolicyConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        (TAG_APP.to_string(), config.app_prefix.clone()),
        (TAG_OWNER.to_string(), config.owner.clone()),
    ])
}
