//! Command-line interface components
//!
//! This module contains CLI-specific code for cmpdl, including argument
//! parsing, progress display, and startup checks.

pub mod args;
pub mod commands;
pub mod progress;
pub mod startup;

pub use args::{
    AuthAction, AuthArgs, Cli, Commands, ConfigAction, ConfigArgs, GlobalArgs, InspectArgs,
    InstallArgs,
};
pub use commands::{handle_auth, handle_config, handle_inspect, handle_install};
pub use progress::{ProgressDisplay, StatusLine, TerminalGuard, format_status_line};
pub use startup::{InstallPlan, show_pack_summary, validate_install, validate_startup};
