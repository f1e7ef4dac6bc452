//! Application constants for cmpdl
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for authentication
pub mod env {
    /// Environment variable holding the CurseForge API key
    pub const API_KEY: &str = "CURSEFORGE_API_KEY";
}

/// Authentication and credential-related constants
pub mod auth {
    /// Minimum plausible API key length
    pub const MIN_API_KEY_LENGTH: usize = 16;

    /// File permissions for .env file (Unix only) - owner read/write only
    #[cfg(unix)]
    pub const ENV_FILE_PERMISSIONS: u32 = 0o600;

    /// Header carrying the API key on catalog requests
    pub const API_KEY_HEADER: &str = "x-api-key";
}

/// CurseForge catalog endpoints
pub mod catalog {
    /// Catalog REST API base URL
    pub const BASE_URL: &str = "https://api.curseforge.com";

    /// CDN host serving mod files at predictable paths
    pub const CDN_BASE_URL: &str = "https://edge.forgecdn.net";

    /// Minecraft's game id, used for key verification
    pub const MINECRAFT_GAME_ID: u32 = 432;

    /// Number of leading file-id digits forming the first CDN path segment
    pub const CDN_SPLIT_DIGITS: usize = 4;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Browser user agent; the CDN occasionally rejects requests without one
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/68.0.3440.106 Safari/537.36";

    /// Browser `Accept` header sent on CDN downloads
    pub const BROWSER_ACCEPT: &str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

    /// Browser `Accept-Language` header sent on CDN downloads
    pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

    /// Default catalog request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Retry configuration
pub mod limits {
    /// Default retry count per item; zero means one attempt per run
    pub const DEFAULT_MAX_RETRIES: u32 = 0;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    /// Cap on the backoff exponent
    pub const MAX_BACKOFF_EXPONENT: u32 = 6;
}

/// File and directory layout constants
pub mod files {
    /// Manifest file name inside a modpack archive
    pub const MANIFEST_FILE_NAME: &str = "manifest.json";

    /// Default overlay directory name inside a modpack archive
    pub const DEFAULT_OVERRIDES_DIR: &str = "overrides";

    /// Required modpack archive extension
    pub const PACK_EXTENSION: &str = "zip";

    /// Destination subdirectory receiving mod jars
    pub const MODS_DIR: &str = "mods";

    /// Directories scaffolded in the destination before installation
    pub const SCAFFOLD_DIRS: [&str; 4] = ["mods", "config", "scripts", "resources"];

    /// Suffix for in-flight downloads
    pub const PARTIAL_FILE_SUFFIX: &str = ".part";

    /// Read buffer size for hashing existing files (64KB)
    pub const HASH_CHUNK_SIZE: usize = 64 * 1024;
}

/// Progress display constants
pub mod progress {
    /// Bytes per megabyte for size display
    pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

    /// Fallback terminal width when none can be detected
    pub const FALLBACK_COLUMNS: u16 = 80;

    /// Spinner tick interval (milliseconds)
    pub const SPINNER_TICK_MS: u64 = 120;
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "cmpdl.toml";

    /// Directory name under the user's config directory
    pub const CONFIG_DIR_NAME: &str = "cmpdl";

    /// Configuration file name under the user's config directory
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use catalog::{BASE_URL as CATALOG_BASE_URL, CDN_BASE_URL};
pub use env::API_KEY as ENV_API_KEY;
pub use files::{MANIFEST_FILE_NAME, MODS_DIR};
pub use http::USER_AGENT;
