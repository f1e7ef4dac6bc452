//! Startup validation and pack banner for cmpdl
//!
//! Every install precondition is checked here, before any extraction or
//! network activity takes place.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::app::{ModpackManifest, validate_pack_path};
use crate::auth::load_api_key;
use crate::errors::{AppError, AuthError, Result};

/// Validated inputs for an install run
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub api_key: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Checks install preconditions using the API key from the environment
pub fn validate_startup(input: &Path, output: &Path) -> Result<InstallPlan> {
    validate_install(load_api_key().ok(), input, output)
}

/// Checks install preconditions in order: API key, input archive, output dir
///
/// # Errors
///
/// Returns the first precondition that does not hold
pub fn validate_install(api_key: Option<String>, input: &Path, output: &Path) -> Result<InstallPlan> {
    info!("Performing startup validation...");

    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(AuthError::MissingApiKey)?;

    validate_pack_path(input)?;

    if !output.is_dir() {
        return Err(AppError::precondition(format!(
            "Output directory does not exist: {}",
            output.display()
        )));
    }

    debug!(
        "Startup validation passed: {} -> {}",
        input.display(),
        output.display()
    );

    Ok(InstallPlan {
        api_key,
        input: input.to_path_buf(),
        output: output.to_path_buf(),
    })
}

/// Prints the pack summary shown before an install
pub fn show_pack_summary(manifest: &ModpackManifest) {
    println!("MINECRAFT:");
    println!("\tVersion: {}", manifest.minecraft.version);
    println!("\tLoaders:");
    for loader in &manifest.minecraft.mod_loaders {
        println!(
            "\t\t{} {}",
            loader.id,
            if loader.primary { "PRIMARY" } else { "AUX" }
        );
    }
    println!("MODPACK:");
    println!("\tAuthor: {}", manifest.author);
    println!("\tName: {}", manifest.name);
    println!("\tVersion: {}", manifest.version);
    println!("\tMods: {}", manifest.files.len());
}
