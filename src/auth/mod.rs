//! Authentication management for the CurseForge API key
//!
//! This module provides functions for managing the catalog API key,
//! including interactive setup, verification, and storage in .env files.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cmpdl::app::ClientConfig;
//! use cmpdl::auth::{check_credentials, setup_credentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! if !check_credentials() {
//!     println!("Setting up API key...");
//!     setup_credentials(&ClientConfig::default()).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod credentials;

// Re-export main public API
pub use credentials::{
    AuthStatus, check_credentials, clear_api_key, get_auth_status, load_api_key, prompt_api_key,
    save_api_key, setup_credentials, show_auth_status, validate_api_key, verify_api_key,
    verify_credentials,
};
