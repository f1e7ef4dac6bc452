//! Command handlers for the cmpdl CLI
//!
//! This module implements the command handlers that connect parsed
//! arguments to the install pipeline, credential store and config file.

use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::app::pipeline::signals::{run_until_interrupted, shutdown_signal};
use crate::app::{CatalogClient, ModpackArchive, Pipeline, PipelineReport, ProgressReporter};
use crate::auth::{clear_api_key, setup_credentials, show_auth_status, verify_credentials};
use crate::cli::progress::spinner;
use crate::cli::{
    AuthAction, AuthArgs, ConfigAction, ConfigArgs, InspectArgs, InstallArgs, ProgressDisplay,
    TerminalGuard, show_pack_summary, validate_startup,
};
use crate::config::AppConfig;
use crate::errors::{AppError, AuthError, Result};

/// Handle the install command
///
/// Validates preconditions, extracts the pack, then runs the pipeline with
/// the progress display attached. Ctrl+C drops whatever step is in flight
/// and skips the overlay merge. In quiet mode only failures are printed.
pub async fn handle_install(args: InstallArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let plan = validate_startup(&args.input, &args.output)?;

    let archive = if quiet {
        ModpackArchive::open(&plan.input).await?
    } else {
        print_header();
        let extracting = spinner("Extracting modpack...");
        let archive = ModpackArchive::open(&plan.input).await;
        extracting.finish_and_clear();
        let archive = archive?;
        show_pack_summary(archive.manifest());
        println!();
        archive
    };

    let (client_config, pipeline_config) = config.to_runtime_config();
    let client = CatalogClient::with_config(client_config, plan.api_key)?;

    let (guard, reporter, display) = if quiet {
        (None, ProgressReporter::disabled(), None)
    } else {
        let (reporter, events) = ProgressReporter::channel();
        let guard = TerminalGuard::new();
        (Some(guard), reporter, Some(ProgressDisplay::new().spawn(events)))
    };

    let pipeline = Pipeline::new(&client, pipeline_config, reporter);
    let overrides = archive.overrides_dir();
    let result = run_until_interrupted(
        pipeline.run(archive.manifest(), &overrides, &plan.output),
        shutdown_signal(),
    )
    .await;

    // Closing the channel lets the display drain and stop
    drop(pipeline);
    if let Some(display) = display {
        if let Err(e) = display.await {
            debug!("Progress display task ended abnormally: {}", e);
        }
    }
    drop(guard);

    match result {
        Ok(report) => {
            write_summary(&mut io::stdout().lock(), &report, quiet)?;
            Ok(())
        }
        Err(AppError::Interrupted) => {
            if !quiet {
                println!();
                println!("Ctrl+C detected. Closing program.");
            }
            Err(AppError::Interrupted)
        }
        Err(e) => Err(e),
    }
}

/// Handle the inspect command
pub async fn handle_inspect(args: InspectArgs) -> Result<()> {
    let archive = ModpackArchive::open(&args.pack).await?;
    let manifest = archive.manifest();

    show_pack_summary(manifest);

    if let Some(loader) = manifest.primary_loader() {
        println!("\tPrimary loader: {}", loader.id);
    }
    let overrides = archive.overrides_dir();
    println!(
        "\tOverrides: {} ({})",
        manifest.overrides,
        if overrides.is_dir() { "present" } else { "absent" }
    );

    println!();
    println!("FILES:");
    for (position, entry) in manifest.files.iter().enumerate() {
        println!(
            "\t[{}/{}] project {} file {}",
            position + 1,
            manifest.files.len(),
            entry.project_id,
            entry.file_id
        );
    }

    Ok(())
}

/// Handle authentication commands
pub async fn handle_auth(args: AuthArgs, config: &AppConfig) -> Result<()> {
    let (client_config, _) = config.to_runtime_config();

    match args.action {
        AuthAction::Setup => setup_credentials(&client_config).await?,
        AuthAction::Verify => {
            if !verify_credentials(&client_config).await? {
                return Err(AuthError::KeyRejected.into());
            }
        }
        AuthAction::Status => show_auth_status(&client_config).await?,
        AuthAction::Clear => {
            if clear_api_key()? {
                println!("API key removed from .env file");
            } else {
                println!("No stored API key found");
            }
        }
    }

    Ok(())
}

/// Handle configuration commands
pub async fn handle_config(
    args: ConfigArgs,
    config: &AppConfig,
    config_path: Option<PathBuf>,
) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => AppConfig::default_config_path()?,
            };
            AppConfig::write_default(&path, force).await?;
            println!("Created configuration file:");
            println!("   {}", path.display());
            println!("   You can customize settings by editing this file.");
        }
        ConfigAction::Show => {
            let source = config_path.or_else(AppConfig::find_config_file);
            match source {
                Some(path) => println!("# Loaded from {}", path.display()),
                None => println!("# No configuration file found, showing defaults"),
            }
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

fn print_header() {
    let title = format!("CMPDL - Curse ModPack Downloader v{}", env!("CARGO_PKG_VERSION"));
    let rule = "#".repeat(title.len() + 4);
    println!("{}", rule);
    println!("# {} #", title);
    println!("{}", rule);
}

/// Writes the end-of-run summary
///
/// Quiet mode keeps only the failure lists and the retry hint.
fn write_summary<W: Write>(out: &mut W, report: &PipelineReport, quiet: bool) -> io::Result<()> {
    let fulfillment = &report.fulfillment;

    if !quiet {
        writeln!(out)?;
        writeln!(out, "Install Summary:")?;
        writeln!(out, "   Manifest entries: {}", report.manifest_entries)?;
        writeln!(out, "   Resolved: {}", report.resolution.artifacts.len())?;
        writeln!(out, "   Downloaded: {}", fulfillment.downloaded)?;
        writeln!(out, "   Already valid: {}", fulfillment.skipped)?;
        writeln!(out, "   Replaced: {}", fulfillment.replaced)?;
        writeln!(out, "   Overrides copied: {}", report.merge.files_copied)?;
        writeln!(out, "   Duration: {:.1?}", report.duration)?;
    }

    if !report.resolution.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "Entries that could not be resolved:")?;
        for (entry, reason) in &report.resolution.failures {
            writeln!(
                out,
                "   project {} file {}: {}",
                entry.project_id, entry.file_id, reason
            )?;
        }
    }

    if !fulfillment.failed.is_empty() {
        writeln!(out)?;
        writeln!(out, "Downloads that failed:")?;
        for failure in &fulfillment.failed {
            writeln!(out, "   {}: {}", failure.file_name, failure.reason)?;
        }
    }

    if report.is_complete() {
        if !quiet {
            writeln!(out)?;
            writeln!(out, "Modpack completed.")?;
        }
    } else {
        info!("Install finished with failures; rerun to retry them");
        writeln!(out)?;
        writeln!(
            out,
            "Some files are missing. Run the same command again to retry them."
        )?;
    }

    Ok(())
}
