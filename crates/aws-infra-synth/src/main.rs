//! aws-infra: synthesize the account's infrastructure templates

use anyhow::{Context, Result};
use aws_infra_common::{DeploymentIdentity, PolicyConfig};
use aws_infra_synth::aws::resolve_identity;
use aws_infra_synth::synth::{self, DEFAULT_OUT_DIR};
use aws_infra_synth::{build_app, App, PolicySet};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_REGION: &str = "us-east-2";

#[derive(Parser, Debug)]
#[command(name = "aws-infra")]
#[command(about = "Policy-enforcing infrastructure synthesizer for the AWS account")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Where and with which policy to build the app
#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// AWS account ID (looked up via STS when omitted)
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    account: Option<String>,

    /// AWS region (falls back to AWS_DEFAULT_REGION, then us-east-2)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// AWS profile to use for the account lookup (overrides AWS_PROFILE env var)
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Policy configuration file (JSON); built-in policy when omitted.
    ///
    /// The built-in policy sends alarm notifications to a placeholder
    /// address, so a real deployment should set `notification_email` here.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl TargetArgs {
    fn load_config(&self) -> Result<PolicyConfig> {
        match &self.config {
            Some(path) => {
                let config = PolicyConfig::load(path)?;
                info!(path = %path.display(), "Loaded policy configuration");
                Ok(config)
            }
            None => Ok(PolicyConfig::default()),
        }
    }

    async fn identity(&self) -> Result<DeploymentIdentity> {
        let account = self
            .account
            .clone()
            .or_else(|| std::env::var("AWS_ACCOUNT_ID").ok());
        let region = self
            .region
            .clone()
            .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        resolve_identity(account.as_deref(), &region, self.profile.as_deref()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write stack templates and the deployment manifest
    Synth {
        #[command(flatten)]
        target: TargetArgs,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        /// Only synthesize these stacks (and the stacks they depend on)
        #[arg(short, long)]
        stack: Vec<String>,
    },

    /// List stacks in deployment order
    List {
        #[command(flatten)]
        target: TargetArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so `list --format json` stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
                .add_directive("aws_config=warn".parse()?)
                .add_directive("aws_smithy_runtime=warn".parse()?),
        )
        .init();

    match args.command {
        Command::Synth {
            target,
            out_dir,
            stack,
        } => {
            let app = build(&target).await?;
            let selection = if stack.is_empty() {
                None
            } else {
                Some(app.select(&stack)?)
            };

            let report = synth::write_out(&app, &out_dir, selection.as_ref())
                .context("Synthesis failed")?;
            info!(
                stacks = report.manifest.stacks.len(),
                resources = report.resources,
                out_dir = %report.out_dir.display(),
                "Synthesis complete"
            );
        }

        Command::List { target, format } => {
            let app = build(&target).await?;
            list_stacks(&app, format)?;
        }
    }

    Ok(())
}

async fn build(target: &TargetArgs) -> Result<App> {
    let config = target.load_config()?;
    let identity = target.identity().await?;
    let app = build_app(&PolicySet::new(&config, &identity))
        .context("Failed to build the resource graph")?;
    Ok(app)
}

/// Handle the list command
fn list_stacks(app: &App, format: OutputFormat) -> Result<()> {
    let manifest = synth::manifest(app, None)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Stack"),
            Cell::new("Resources"),
            Cell::new("Depends on"),
            Cell::new("Protected"),
        ]);

    for entry in &manifest.stacks {
        let stack = app.stack(&entry.stack_name)?;
        table.add_row(vec![
            Cell::new(&entry.stack_name),
            Cell::new(stack.resources().len()),
            Cell::new(entry.dependencies.join(", ")),
            Cell::new(if entry.termination_protection { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    println!("\nTotal: {} stacks, {} resources", manifest.stacks.len(), app.resource_count());

    Ok(())
}
