//! Configuration management for cmpdl
//!
//! Settings come from a single optional TOML file. When no file is found the
//! built-in defaults apply, which reproduce the single-attempt, no-retry
//! behavior of a plain install.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, PipelineConfig, RetryPolicy};
use crate::constants::{catalog, config as paths, http, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Catalog lookup retry settings
    pub resolver: RetryConfigToml,
    /// Download retry settings
    pub download: RetryConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Catalog REST API base URL
    pub base_url: String,
    /// CDN base URL for derived download URLs
    pub cdn_base_url: String,
    /// Catalog request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Per-file download timeout in seconds (None = unbounded)
    pub download_timeout_secs: Option<u64>,
    /// TCP keep-alive in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: catalog::BASE_URL.to_string(),
            cdn_base_url: catalog::CDN_BASE_URL.to_string(),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            download_timeout_secs: None,
            tcp_keepalive_secs: Some(30),
            tcp_nodelay: true,
        }
    }
}

/// TOML-friendly retry configuration, shared by `[resolver]` and `[download]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfigToml {
    /// Additional attempts after a failure (0 = single attempt)
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for RetryConfigToml {
    fn default() -> Self {
        Self {
            max_retries: limits::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: limits::RETRY_BASE_DELAY_MS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (ClientConfig, PipelineConfig) {
        (
            self.client.to_runtime_config(),
            PipelineConfig {
                resolver_retry: self.resolver.to_runtime_config(),
                download_retry: self.download.to_runtime_config(),
            },
        )
    }

    /// Load configuration with precedence:
    /// 1. Explicit `--config` path (must exist)
    /// 2. `./cmpdl.toml`
    /// 3. User config directory
    /// 4. Built-in defaults
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        match config_path {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(paths::LOCAL_CONFIG_FILE)];
        if let Ok(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        search_paths.into_iter().find(|path| {
            let found = path.is_file();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(paths::CONFIG_DIR_NAME)
            .join(paths::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Writes the commented default configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyExists` if the file exists and `force` is
    /// not set, or `ConfigError::Io` if it cannot be written
    pub async fn write_default(path: &Path, force: bool) -> ConfigResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(io_error)?;

        info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# cmpdl Configuration
# Every setting is optional; missing values fall back to these defaults.

[client]
# Catalog and CDN endpoints
base_url = "{}"
cdn_base_url = "{}"
request_timeout_secs = {}
connect_timeout_secs = {}
# download_timeout_secs = 600  # Uncomment to bound each file download
tcp_keepalive_secs = 30
tcp_nodelay = true

[resolver]
# Catalog lookup retries (0 = single attempt, failed entries are skipped)
max_retries = {}
retry_base_delay_ms = {}

[download]
# Download retries (0 = single attempt, failed files are skipped)
max_retries = {}
retry_base_delay_ms = {}

[logging]
level = "warn"  # error, warn, info, debug, trace
"#,
            catalog::BASE_URL,
            catalog::CDN_BASE_URL,
            http::DEFAULT_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            limits::DEFAULT_MAX_RETRIES,
            limits::RETRY_BASE_DELAY_MS,
            limits::DEFAULT_MAX_RETRIES,
            limits::RETRY_BASE_DELAY_MS,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            cdn_base_url: self.cdn_base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            download_timeout: self.download_timeout_secs.map(Duration::from_secs),
            tcp_keepalive: self.tcp_keepalive_secs.map(Duration::from_secs),
            tcp_nodelay: self.tcp_nodelay,
        }
    }
}

impl RetryConfigToml {
    /// Convert to runtime RetryPolicy
    pub fn to_runtime_config(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        let (client, pipeline) = config.to_runtime_config();

        assert_eq!(client.base_url, catalog::BASE_URL);
        assert!(client.download_timeout.is_none());
        assert_eq!(pipeline.resolver_retry.max_retries, 0);
        assert_eq!(pipeline.download_retry, RetryPolicy::default());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_config_file_generation() {
        let content = AppConfig::generate_default_config_content();

        // Should be valid TOML matching the defaults
        let parsed: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, AppConfig::default());
        assert!(content.contains("# cmpdl Configuration"));
        assert!(content.contains("[resolver]"));
        assert!(content.contains("[download]"));
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        // Should fail when explicitly specified
        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cmpdl.toml");
        let test_config = r#"
[download]
max_retries = 3

[client]
download_timeout_secs = 120
"#;
        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();
        let (client, pipeline) = config.to_runtime_config();

        assert_eq!(pipeline.download_retry.max_retries, 3);
        assert_eq!(
            pipeline.download_retry.base_delay,
            Duration::from_millis(limits::RETRY_BASE_DELAY_MS)
        );
        assert_eq!(pipeline.resolver_retry.max_retries, 0);
        assert_eq!(client.download_timeout, Some(Duration::from_secs(120)));
        assert_eq!(client.cdn_base_url, catalog::CDN_BASE_URL);
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        tokio::fs::write(&config_path, "[download]\nmax_retries = \"many\"")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_write_default_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested/config.toml");

        AppConfig::write_default(&config_path, false).await.unwrap();
        assert!(config_path.is_file());

        let again = AppConfig::write_default(&config_path, false).await;
        assert!(matches!(again, Err(ConfigError::AlreadyExists { .. })));

        AppConfig::write_default(&config_path, true).await.unwrap();
        let loaded = AppConfig::load_from_file(&config_path).await.unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_show_round_trips() {
        let config = AppConfig::default();
        let rendered = config.to_toml_string().unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
