//! Command-line argument parsing for cmpdl
//!
//! This module defines the CLI structure using clap derive macros: modpack
//! installation and inspection, API key management, and configuration files.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// cmpdl - Curse modpack downloader
#[derive(Parser, Debug)]
#[command(
    name = "cmpdl",
    version,
    about = "Download and install Curse modpacks",
    long_about = "Installs a Curse modpack archive into a directory: every mod listed in the
manifest is looked up in the CurseForge catalog, verified by MD5 and downloaded
when missing or stale, then the pack's overrides are copied on top."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - errors only; no banner, progress or summary beyond failures
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a modpack archive into a directory
    Install(InstallArgs),

    /// Show a modpack's manifest without downloading anything
    Inspect(InspectArgs),

    /// Manage the CurseForge API key
    Auth(AuthArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the install command
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Modpack archive (.zip)
    #[arg(short, long, value_name = "PACK")]
    pub input: PathBuf,

    /// Existing directory to install into
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Modpack archive (.zip)
    #[arg(value_name = "PACK")]
    pub pack: PathBuf,
}

/// Arguments for authentication management
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Authentication actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Store a CurseForge API key in .env
    Setup,

    /// Check the current key against the catalog
    Verify,

    /// Show authentication status
    Status,

    /// Remove the stored key
    Clear,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Filter directive for this crate's logs
    ///
    /// A verbosity flag always wins. Otherwise `default_level` applies only
    /// when no `RUST_LOG` filter is set, so the environment can choose the
    /// crate's level itself.
    pub fn log_directive(&self, default_level: tracing::Level, env_filter_set: bool) -> Option<String> {
        match self.explicit_log_level() {
            Some(level) => Some(format!("cmpdl={}", level)),
            None if env_filter_set => None,
            None => Some(format!("cmpdl={}", default_level)),
        }
    }

    /// Logging level requested by a verbosity flag, if any
    pub fn explicit_log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from(["cmpdl", "install", "-i", "pack.zip", "-o", "instance"])
            .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.input, PathBuf::from("pack.zip"));
                assert_eq!(args.output, PathBuf::from("instance"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_install_requires_both_paths() {
        assert!(Cli::try_parse_from(["cmpdl", "install", "-i", "pack.zip"]).is_err());
        assert!(Cli::try_parse_from(["cmpdl", "install", "-o", "instance"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cmpdl",
            "inspect",
            "pack.zip",
            "--very-verbose",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert!(cli.global.very_verbose);
        assert_eq!(cli.global.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["cmpdl", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_log_level() {
        let cli_quiet = Cli {
            global: GlobalArgs {
                quiet: true,
                verbose: true,
                ..GlobalArgs::default()
            },
            command: Commands::Auth(AuthArgs {
                action: AuthAction::Status,
            }),
        };

        let cli_verbose = Cli {
            global: GlobalArgs {
                verbose: true,
                ..GlobalArgs::default()
            },
            command: Commands::Auth(AuthArgs {
                action: AuthAction::Status,
            }),
        };

        let cli_default = Cli {
            global: GlobalArgs::default(),
            command: Commands::Auth(AuthArgs {
                action: AuthAction::Status,
            }),
        };

        assert_eq!(cli_quiet.explicit_log_level(), Some(tracing::Level::ERROR));
        assert_eq!(cli_verbose.explicit_log_level(), Some(tracing::Level::INFO));
        assert!(cli_default.explicit_log_level().is_none());

        let warn = tracing::Level::WARN;
        assert_eq!(cli_default.log_directive(warn, false).as_deref(), Some("cmpdl=WARN"));
        // RUST_LOG decides when no flag is given
        assert_eq!(cli_default.log_directive(warn, true), None);
        assert_eq!(cli_verbose.log_directive(warn, true).as_deref(), Some("cmpdl=INFO"));
        assert_eq!(cli_quiet.log_directive(warn, false).as_deref(), Some("cmpdl=ERROR"));
    }
}
