//! Synthesis output
//!
//! Writes one template per stack plus a `manifest.json` listing the stacks in
//! deployment order, in the layout the provisioning engine consumes.

use crate::app::App;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output directory
pub const DEFAULT_OUT_DIR: &str = "infra.out";

/// Manifest file name inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Manifest schema version
pub const MANIFEST_VERSION: u32 = 1;

/// Everything the provisioning engine needs to deploy the output directory
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    /// Stacks in deployment order
    pub stacks: Vec<ManifestStack>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStack {
    pub stack_name: String,
    /// `aws://{account}/{region}`
    pub environment: String,
    pub template_file: String,
    pub termination_protection: bool,
    pub tags: BTreeMap<String, String>,
    pub dependencies: Vec<String>,
}

/// What a synthesis run produced
#[derive(Debug, Clone, PartialEq)]
pub struct SynthReport {
    pub out_dir: PathBuf,
    pub manifest: Manifest,
    pub resources: usize,
}

/// Template file name for a deployable stack name
pub fn template_file_name(stack_name: &str) -> String {
    format!("{stack_name}.template.json")
}

/// Build the manifest for the given stacks (all stacks when `selection` is `None`)
pub fn manifest(app: &App, selection: Option<&BTreeSet<String>>) -> Result<Manifest> {
    let stacks = app
        .deployment_order()?
        .into_iter()
        .filter(|s| selection.map_or(true, |names| names.contains(s.stack_name())))
        .map(|s| ManifestStack {
            stack_name: s.stack_name().to_string(),
            environment: s.identity().environment(),
            template_file: template_file_name(s.stack_name()),
            termination_protection: s.termination_protection(),
            tags: s.tags().clone(),
            dependencies: s.dependencies().iter().cloned().collect(),
        })
        .collect();

    Ok(Manifest {
        version: MANIFEST_VERSION,
        stacks,
    })
}

/// Write templates and the manifest into `out_dir`
pub fn write_out(
    app: &App,
    out_dir: &Path,
    selection: Option<&BTreeSet<String>>,
) -> Result<SynthReport> {
    let manifest = manifest(app, selection)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut resources = 0;
    for entry in &manifest.stacks {
        let stack = app.stack(&entry.stack_name)?;
        let template = stack.to_template();
        resources += template.resources.len();

        let path = out_dir.join(&entry.template_file);
        fs::write(&path, serde_json::to_string_pretty(&template)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            stack = %entry.stack_name,
            resources = template.resources.len(),
            path = %path.display(),
            "Wrote template"
        );
    }

    let path = out_dir.join(MANIFEST_FILE);
    fs::write(&path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(SynthReport {
        out_dir: out_dir.to_path_buf(),
        manifest,
        resources,
    })
}
