//! API key management for the CurseForge catalog
//!
//! The key is read from `CURSEFORGE_API_KEY`. `auth setup` stores it in a
//! `.env` file in the current directory with owner-only permissions, which
//! `main` loads through `dotenv` on the next start.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::app::{CatalogClient, ClientConfig};
use crate::constants::{auth, env as env_constants};
use crate::errors::{AuthError, AuthResult, CatalogError};

/// Name of the credential file in the working directory
const DOTENV_FILE: &str = ".env";

/// Authentication status information
#[derive(Debug, Clone)]
pub struct AuthStatus {
    /// Whether the API key environment variable is set
    pub api_key_set: bool,
    /// Whether .env file exists in current directory
    pub dotenv_file_exists: bool,
    /// Whether the key has been verified (None = not tested)
    pub key_valid: Option<bool>,
}

impl AuthStatus {
    /// Check if an API key is available
    pub fn has_credentials(&self) -> bool {
        self.api_key_set
    }

    /// Get descriptive status message for display
    pub fn status_message(&self) -> String {
        match (self.has_credentials(), self.key_valid) {
            (false, _) => "Missing API key - run 'cmpdl auth setup' to configure".to_string(),
            (true, None) => "API key configured but not verified".to_string(),
            (true, Some(true)) => "API key configured and verified".to_string(),
            (true, Some(false)) => "API key configured but invalid".to_string(),
        }
    }
}

/// Check current authentication status
pub fn get_auth_status() -> AuthStatus {
    AuthStatus {
        api_key_set: load_api_key().is_ok(),
        dotenv_file_exists: Path::new(DOTENV_FILE).exists(),
        key_valid: None,
    }
}

/// Check if an API key exists in the environment
pub fn check_credentials() -> bool {
    load_api_key().is_ok()
}

/// Reads the API key from the environment
///
/// # Errors
///
/// Returns `AuthError::MissingApiKey` if the variable is unset or blank
pub fn load_api_key() -> AuthResult<String> {
    match env::var(env_constants::API_KEY) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Ok(_) | Err(env::VarError::NotPresent) => Err(AuthError::MissingApiKey),
        Err(e) => Err(e.into()),
    }
}

/// Checks the shape of an API key before it is stored
pub fn validate_api_key(key: &str) -> AuthResult<()> {
    if key.is_empty() {
        return Err(AuthError::InvalidApiKey {
            reason: "API key cannot be empty".to_string(),
        });
    }
    if key.len() < auth::MIN_API_KEY_LENGTH {
        return Err(AuthError::InvalidApiKey {
            reason: format!(
                "API key is too short (at least {} characters)",
                auth::MIN_API_KEY_LENGTH
            ),
        });
    }
    if key.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidApiKey {
            reason: "API key cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

/// Prompt user for the API key without echoing it
pub fn prompt_api_key() -> AuthResult<String> {
    let key = rpassword::prompt_password("CurseForge API key: ")
        .map_err(|e| AuthError::CredentialStorage(io::Error::new(io::ErrorKind::Other, e)))?;
    let key = key.trim().to_string();
    validate_api_key(&key)?;
    Ok(key)
}

/// Save the API key to `.env` in the current directory
pub fn save_api_key(key: &str) -> AuthResult<()> {
    save_api_key_to(Path::new(DOTENV_FILE), key)?;
    env::set_var(env_constants::API_KEY, key);

    println!("API key saved to .env file");

    #[cfg(unix)]
    println!("File permissions set to owner-only (600)");

    #[cfg(not(unix))]
    println!(
        "Warning: File permissions not set (non-Unix system). Please ensure .env file is protected."
    );

    Ok(())
}

/// Writes the API key into a dotenv file, keeping its other lines
pub fn save_api_key_to(env_path: &Path, key: &str) -> AuthResult<()> {
    let mut lines = read_other_lines(env_path)?;
    lines.push(format!("{}={}", env_constants::API_KEY, key));
    write_env_file(env_path, &lines)
}

/// Removes the API key from `.env` and the current environment
pub fn clear_api_key() -> AuthResult<bool> {
    let removed = clear_api_key_from(Path::new(DOTENV_FILE))?;
    env::remove_var(env_constants::API_KEY);
    Ok(removed)
}

/// Removes the API key line from a dotenv file
///
/// Returns whether a key line was present.
pub fn clear_api_key_from(env_path: &Path) -> AuthResult<bool> {
    if !env_path.exists() {
        return Ok(false);
    }

    let original = BufReader::new(File::open(env_path)?).lines().count();
    let lines = read_other_lines(env_path)?;
    let removed = lines.len() != original;
    if removed {
        write_env_file(env_path, &lines)?;
        debug!("Removed API key from {}", env_path.display());
    }
    Ok(removed)
}

fn is_key_line(line: &str) -> bool {
    line.trim()
        .strip_prefix(env_constants::API_KEY)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

fn read_other_lines(env_path: &Path) -> AuthResult<Vec<String>> {
    if !env_path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(env_path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !is_key_line(&line) {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn write_env_file(env_path: &Path, lines: &[String]) -> AuthResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(env_path)?;

    for line in lines {
        writeln!(file, "{}", line)?;
    }

    // Set restrictive permissions (Unix-like systems only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(auth::ENV_FILE_PERMISSIONS);
        file.set_permissions(perms)?;
    }

    Ok(())
}

/// Asks the catalog whether `client`'s key is accepted
///
/// Returns `Ok(false)` when the catalog rejects the key.
pub async fn verify_api_key(client: &CatalogClient) -> AuthResult<bool> {
    match client.verify_api_key().await {
        Ok(()) => Ok(true),
        Err(CatalogError::Unauthorized { status }) => {
            debug!("Catalog rejected API key with HTTP {}", status);
            Ok(false)
        }
        Err(e) => Err(AuthError::Verification(e.to_string())),
    }
}

/// Verify the environment's API key against the catalog
pub async fn verify_credentials(config: &ClientConfig) -> AuthResult<bool> {
    let key = load_api_key()?;

    println!("Verifying API key with CurseForge...");

    let client = CatalogClient::with_config(config.clone(), key)
        .map_err(|e| AuthError::Verification(e.to_string()))?;
    let is_valid = verify_api_key(&client).await?;

    if is_valid {
        println!("API key verified successfully!");
    } else {
        println!("API key verification failed: key rejected");
    }
    Ok(is_valid)
}

/// Interactive API key setup workflow
pub async fn setup_credentials(config: &ClientConfig) -> AuthResult<()> {
    println!("CurseForge API Key Setup");
    println!("========================");
    println!();
    println!("cmpdl needs a CurseForge API key to look up mod files.");
    println!("Your key will be stored in a .env file in the current directory.");
    println!();

    // Check if a key already exists
    let status = get_auth_status();
    if status.has_credentials() {
        println!("Warning: An API key is already configured.");
        print!("Do you want to replace it? [y/N]: ");
        io::stdout().flush().map_err(AuthError::CredentialStorage)?;

        let mut response = String::new();
        io::stdin()
            .read_line(&mut response)
            .map_err(AuthError::CredentialStorage)?;

        if !response.trim().to_lowercase().starts_with('y') {
            println!("Setup cancelled.");
            return Ok(());
        }
        println!();
    }

    let key = prompt_api_key()?;

    println!();
    println!("Saving API key...");
    save_api_key(&key)?;

    println!();
    let is_valid = verify_credentials(config).await?;

    println!();
    if is_valid {
        println!("Setup complete! You can now install modpacks.");
    } else {
        println!("Setup failed. Please check your API key and try again.");
        println!("   You can run 'cmpdl auth setup' again to re-enter it.");
    }

    Ok(())
}

/// Show current authentication status
pub async fn show_auth_status(config: &ClientConfig) -> AuthResult<()> {
    let mut status = get_auth_status();

    println!("CurseForge Authentication Status");
    println!("================================");
    println!();

    match load_api_key() {
        Ok(key) => println!("API key: {} (set)", mask_key(&key)),
        Err(_) => println!("API key: Not set"),
    }

    println!(
        ".env file: {}",
        if status.dotenv_file_exists {
            "Exists"
        } else {
            "Not found"
        }
    );

    println!();

    if status.has_credentials() {
        status.key_valid = Some(verify_credentials(config).await?);
        println!();
    }

    println!("Status: {}", status.status_message());

    if !status.has_credentials() {
        println!();
        println!("To configure your API key, run: cmpdl auth setup");
    } else if status.key_valid == Some(false) {
        println!();
        println!("To update your API key, run: cmpdl auth setup");
    }

    Ok(())
}

/// Shows only the last four characters of a key
fn mask_key(key: &str) -> String {
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", visible)
}
