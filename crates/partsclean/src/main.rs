use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use partsclean::{local, server};
use partsclean_core::config::AppConfig;
use partsclean_core::event::S3Event;
use partsclean_core::handler::{handle_event, HandlerContext};
use partsclean_core::profile::BUILTIN_PROFILES;
use partsclean_core::{Pipeline, RuleProfile};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inventory CSV validation and deduplication", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate local CSV files and write the accepted records as JSON
    Validate(ValidateArgs),
    /// Run the storage handler once for an event read from a JSON file
    HandleEvent(HandleEventArgs),
    /// Serve the storage handler over HTTP
    Serve,
    /// List built-in rule profiles, or print one as TOML
    Profiles(ProfilesArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Files or glob patterns to validate
    #[arg(required = true)]
    patterns: Vec<String>,
    /// Built-in profile name or path to a TOML profile (overrides PARTSCLEAN_PROFILE)
    #[arg(long)]
    profile: Option<String>,
    /// Directory for results instead of writing next to each input
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Also write per-row outcomes to `<name>.trace.json`
    #[arg(long)]
    trace: bool,
}

#[derive(Args, Debug)]
struct HandleEventArgs {
    /// Path to the notification JSON
    event: PathBuf,
}

#[derive(Args, Debug)]
struct ProfilesArgs {
    /// Profile to print
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("invalid configuration")?;

    match cli.command {
        Command::Validate(args) => handle_validate(args, &config),
        Command::HandleEvent(args) => handle_single_event(args, &config).await,
        Command::Serve => handle_serve(&config).await,
        Command::Profiles(args) => handle_profiles(args),
    }
}

fn handle_validate(args: ValidateArgs, config: &AppConfig) -> Result<()> {
    let source = args.profile.as_deref().unwrap_or(&config.profile);
    let profile = RuleProfile::load(source)
        .with_context(|| format!("failed to load rule profile `{source}`"))?;
    let pipeline = Pipeline::from_profile(&profile)?.with_trace(args.trace);

    let files = local::expand_patterns(&args.patterns)?;
    if files.is_empty() {
        bail!("no files matched {}", args.patterns.join(", "));
    }

    let mut reports = Vec::with_capacity(files.len());
    let mut failures = 0;
    for file in &files {
        match local::validate_file(file, &pipeline, &config.csv_options, args.out_dir.as_deref()) {
            Ok(report) => reports.push(report),
            Err(err) => {
                eprintln!("{}: {err:#}", file.display());
                failures += 1;
            }
        }
    }

    println!("{}", local::summary_table(&reports));
    if failures > 0 {
        bail!("{failures} of {} files could not be processed", files.len());
    }
    Ok(())
}

async fn handle_single_event(args: HandleEventArgs, config: &AppConfig) -> Result<()> {
    let raw = std::fs::read_to_string(&args.event)
        .with_context(|| format!("failed to read {}", args.event.display()))?;
    let event: S3Event = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a storage event", args.event.display()))?;

    let context = HandlerContext::from_config(config).await?;
    let response = handle_event(&event, &context).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.status_code != 200 {
        bail!("handler returned status {}", response.status_code);
    }
    Ok(())
}

async fn handle_serve(config: &AppConfig) -> Result<()> {
    let context = HandlerContext::from_config(config).await?;
    info!(profile = %context.pipeline.rules().name(), "starting event server");
    server::serve(Arc::new(context), config.bind).await
}

fn handle_profiles(args: ProfilesArgs) -> Result<()> {
    match args.name {
        None => {
            for name in BUILTIN_PROFILES {
                println!("{name}");
            }
        }
        Some(name) => {
            let profile = RuleProfile::load(&name)
                .with_context(|| format!("failed to load rule profile `{name}`"))?;
            print!("{}", toml::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
