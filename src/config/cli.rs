use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the Inkwell binary.
#[derive(Debug, Parser)]
#[command(name = "inkwell", version, about = "Inkwell post store server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "INKWELL_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Inkwell HTTP service.
    Serve(Box<ServeArgs>),
    /// Decode and validate a store snapshot without starting the server.
    #[command(name = "check-snapshot")]
    CheckSnapshot(CheckSnapshotArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreModeOverride {
    /// Override the featured mode (single|starred).
    #[arg(long = "store-featured-mode", value_name = "MODE")]
    pub featured_mode: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub store_mode: StoreModeOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the snapshot file loaded on start and written on shutdown.
    #[arg(long = "store-snapshot-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub store_snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CheckSnapshotArgs {
    #[command(flatten)]
    pub store_mode: StoreModeOverride,

    /// Snapshot file to validate.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}
