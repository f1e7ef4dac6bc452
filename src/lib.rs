//! cmpdl Library
//!
//! Installs Curse modpacks: resolves each manifest entry through the
//! CurseForge catalog, skips files whose MD5 already matches, downloads the
//! rest one at a time, and merges the pack's overrides into the destination.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(ENV_API_KEY, "CURSEFORGE_API_KEY");
        assert_eq!(MANIFEST_FILE_NAME, "manifest.json");
        assert_eq!(MODS_DIR, "mods");
        assert!(CATALOG_BASE_URL.starts_with("https://"));
    }

    #[test]
    fn test_error_types() {
        let app_error = AppError::Auth(errors::AuthError::MissingApiKey);

        assert_eq!(app_error.category(), "authentication");
        assert!(app_error.is_fatal());
        assert_eq!(app_error.exit_code(), 1);
        assert_eq!(AppError::Interrupted.exit_code(), 130);
    }
}
