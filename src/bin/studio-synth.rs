// Copyright (c) 2025 - Cowboy AI, Inc.
//! Studio Synthesizer
//!
//! Reads a studio configuration, composes the stacks and writes a cloud
//! assembly directory for the provisioning engine.
//!
//! Run with: cargo run --bin studio-synth -- --config studio.toml --out cdk.out

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use cim_studio_stack::config::DEFAULT_CONFIG_FILE;
use cim_studio_stack::{AppConfig, DomainComposer};

#[derive(Debug, Parser)]
#[command(name = "studio-synth", version, about = "Synthesize SageMaker Studio stacks")]
struct Args {
    /// Configuration file
    #[arg(long, env = "STUDIO_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output directory for templates and the manifest
    #[arg(long, default_value = "cdk.out")]
    out: PathBuf,

    /// Print templates to stdout instead of writing files
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let composition = DomainComposer::from_config(&config)
        .context("building composer")?
        .compose()
        .context("composing stacks")?;
    let assembly = composition.into_assembly().context("assembling stacks")?;

    if args.print {
        for id in assembly.deployment_order() {
            if let Some(stack) = assembly.stack(id) {
                println!("{}", serde_json::to_string_pretty(&stack.template())?);
            }
        }
        return Ok(());
    }

    let written = assembly
        .write_to(&args.out)
        .with_context(|| format!("writing assembly to {}", args.out.display()))?;
    info!(run_id = %assembly.run_id(), files = written.len(), "synthesis complete");
    Ok(())
}
