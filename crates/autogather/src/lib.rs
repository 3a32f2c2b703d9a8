//! # Autogather Host - Main Entry Point
//!
//! Runs a gathering session behind a line-delimited JSON transport. The proxy
//! writes inbound packets and operator commands to stdin and reads outbound
//! packets and operator messages from stdout.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! autogather
//!
//! # Specify custom configuration
//! autogather --config autogather.toml
//!
//! # Override specific settings
//! autogather --cache data/resources.json --names data/names.json --log-level debug
//!
//! # JSON logging (on stderr)
//! autogather --json-logs
//! ```
//!
//! ## Transport
//!
//! ```text
//! stdin   {"event": {"type": "zone-load", "zone": 7004}}
//! stdin   {"command": "setid 301"}
//! stdout  {"send": {"type": "gather-start", "target": 1234}}
//! stdout  {"message": "Set to gather Plain Stone (id 301)"}
//! stdout  {"forward": {"location": {..}, "destination": {..}, "timestamp": 123}}
//! ```
//!
//! ## Configuration
//!
//! The host loads configuration from a TOML file (default: `autogather.toml`).
//! If the file doesn't exist, a default configuration will be created. A file
//! that exists but cannot be parsed stops startup.
//!
//! ## Signal Handling
//!
//! SIGINT and SIGTERM (Ctrl+C on Windows) stop the event loop; the node
//! cache is saved before exit, as it is when stdin closes.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;
mod signals;

use app::Application;
use cli::CliArgs;

/// Main entry point for the autogather host.
///
/// Handles the complete application lifecycle including:
/// 1. Command-line argument parsing
/// 2. Configuration loading, CLI overrides and validation
/// 3. Logging system initialization
/// 4. Application creation and execution
///
/// # Exit Codes
///
/// * **0**: Input closed or shutdown signal received
/// * **1**: Error during startup (unreadable configuration, invalid settings)
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut config = match AppConfig::load_from_file(&args.config_path).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli(&args);

    // Setup logging before anything else
    if let Err(e) = logging::setup_logging(&config.logging) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(config) {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use app::{handle_line, run_loop, HostInput, HostOutput, JsonLineLink};
pub use config::{AppConfig, LoggingSettings, PathSettings};
