use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{PipelineConfig, UploadMode, DEFAULT_SUPPORT_CONTACT};
use crate::load_config::{load_config, load_storage_config};
use crate::report::{rule, write_matches, write_report};
use crate::synchronise::{scan_roots, synchronise};
use crate::upload::SupabaseUploader;

/// CLI for scenario-bucket: find tagged scenario files and publish them.
#[derive(Parser)]
#[clap(
    name = "scenario-bucket",
    version,
    about = "Find aim-trainer scenario files tagged with a keyword and upload them to a storage bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the configured folders and list matching files without uploading anything
    Scan {
        /// Path to the YAML config file (built-in defaults when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Scan the configured folders and upload every match to the bucket
    Upload {
        /// Path to the YAML config file (built-in defaults when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Upload a single zip archive instead of one object per file
        #[clap(long)]
        archive: bool,
    },
}

impl Commands {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Scan { config } | Commands::Upload { config, .. } => config.as_deref(),
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main().
///
/// Any failure is reported once here together with the support contact, and
/// the closing status line is printed whatever happened.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    println!("Please wait this can take a few seconds!");
    println!("{}", rule());

    let loaded = load_config(cli.command.config_path()).context("Failed to load configuration");
    let support_contact = loaded
        .as_ref()
        .map(|c| c.upload.support_contact.clone())
        .unwrap_or_else(|_| DEFAULT_SUPPORT_CONTACT.to_string());

    let result = match loaded {
        Ok(config) => execute(&cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Run failed");
        println!();
        println!(
            "ERROR: The program encountered an error and could not complete, please send the following to {}:",
            support_contact
        );
        println!("    {:#}", e);
    }

    println!();
    println!("{}", rule());
    println!("Program finished.");
    result
}

async fn execute(command: &Commands, mut config: PipelineConfig) -> Result<()> {
    match command {
        Commands::Scan { .. } => {
            println!("Scanning for files containing '{}'...", config.scan.keyword);
            let scan = scan_roots(&config.scan)?;
            let mut stdout = std::io::stdout().lock();
            write_matches(&mut stdout, &scan, &config.scan.keyword, &config.scan.extension)?;
            stdout.flush()?;
        }
        Commands::Upload { archive, .. } => {
            if *archive {
                config.upload.mode = UploadMode::Archive;
            }
            let storage = load_storage_config().context("Missing storage configuration")?;
            let uploader =
                SupabaseUploader::new(&storage).context("Failed to set up storage client")?;

            println!("Scanning for files containing '{}'...", config.scan.keyword);
            println!("Uploading starts after the scan, do NOT close the window!");

            let report = synchronise(&config, &uploader)
                .await
                .context("Synchronisation failed")?;
            // Not held across an await; `run` must stay Send.
            let mut stdout = std::io::stdout().lock();
            write_report(&mut stdout, &report, &config.scan.keyword, &config.scan.extension)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
