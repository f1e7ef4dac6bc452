//! Error types for cmpdl
//!
//! This module defines the error types for every component of the application.
//! Per-item failures (catalog lookups, downloads) are reported inline and never
//! escape the pipeline; only precondition, merge and configuration failures
//! surface as `AppError` at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No API key available in the environment
    #[error(
        "Missing CurseForge API key. Set CURSEFORGE_API_KEY or run 'cmpdl auth setup'"
    )]
    MissingApiKey,

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// The catalog rejected the API key
    #[error("CurseForge rejected the API key. Please check it and try again")]
    KeyRejected,

    /// Key verification request failed
    #[error("API key verification failed: {0}")]
    Verification(String),

    /// Invalid API key format
    #[error("Invalid API key: {reason}")]
    InvalidApiKey { reason: String },

    /// File I/O error during credential storage
    #[error("Failed to save credentials to file")]
    CredentialStorage(#[from] std::io::Error),
}

/// Catalog metadata lookup errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog refused the credential
    #[error("Catalog rejected the request (HTTP {status}). Check the API key")]
    Unauthorized { status: u16 },

    /// The project/file pair does not exist
    #[error("File {file_id} of project {project_id} not found in catalog")]
    NotFound { project_id: u64, file_id: u64 },

    /// Server returned error status
    #[error("Catalog server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Response body did not match the expected shape
    #[error("Failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid URL built from configuration
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Download timeout
    #[error("Download timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// File name would escape the mods directory
    #[error("Refusing unsafe file name: {file_name}")]
    UnsafeFileName { file_name: String },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}: {source}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Integrity checking errors
#[derive(Error, Debug)]
pub enum IntegrityError {
    /// Invalid hash format
    #[error("Invalid hash format: {hash}. Expected MD5 hex string")]
    InvalidHash { hash: String },

    /// Existing file could not be read
    #[error("Failed to read {path} for hashing: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Modpack archive and manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Input file not found
    #[error("Input path nonexistent: {path}")]
    NotFound { path: PathBuf },

    /// Input has the wrong extension
    #[error("Incorrect input file provided: {path}. Expected a .zip modpack")]
    InvalidExtension { path: PathBuf },

    /// The archive has no manifest.json
    #[error("Modpack archive is missing {name}")]
    MissingEntry { name: String },

    /// The overrides entry would leave the extracted archive
    #[error("Refusing unsafe overrides directory: {value:?}")]
    UnsafeOverrides { value: String },

    /// JSON parsing error
    #[error("JSON parsing error in manifest: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Zip archive could not be read or extracted
    #[error("Failed to extract modpack archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error reading manifest
    #[error("I/O error reading manifest: {0}")]
    Io(#[from] std::io::Error),

    /// Extraction task failed to complete
    #[error("Extraction aborted: {reason}")]
    Extraction { reason: String },
}

/// Overlay merge errors
#[derive(Error, Debug)]
pub enum OverlayError {
    /// Failed to walk the overlay tree
    #[error("Failed to walk overlay directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Failed to copy a file or create a directory
    #[error("Failed to copy overlay entry to {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Merge task failed to complete
    #[error("Overlay merge aborted: {reason}")]
    Aborted { reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Configuration file could not be read or written
    #[error("Configuration I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No user configuration directory on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// Config file exists and force flag not set
    #[error("Configuration file already exists: {path}. Use --force to overwrite")]
    AlreadyExists { path: PathBuf },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Integrity error
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Overlay merge error
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid invocation or environment detected before any network activity
    #[error("{message}")]
    Precondition { message: String },

    /// Run cancelled by the user
    #[error("Interrupted")]
    Interrupted,
}

impl AppError {
    /// Create a precondition failure with a message
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Whether the error aborts a run, as opposed to a per-item failure
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AppError::Catalog(_) | AppError::Download(_) | AppError::Integrity(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "authentication",
            AppError::Catalog(_) => "lookup",
            AppError::Download(_) => "download",
            AppError::Integrity(_) => "integrity",
            AppError::Manifest(_) => "manifest",
            AppError::Overlay(_) => "merge",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Precondition { .. } => "precondition",
            AppError::Interrupted => "interrupted",
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Integrity result type alias
pub type IntegrityResult<T> = std::result::Result<T, IntegrityError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Overlay result type alias
pub type OverlayResult<T> = std::result::Result<T, OverlayError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
