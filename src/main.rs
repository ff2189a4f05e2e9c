//! Makai Trie Server - Main entrypoint.
//!
//! This is the main entry point for the Makai Trie Server application. It
//! initializes the logging system, loads configuration, replays the
//! append-only file, and runs the service until a shutdown signal arrives.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use makai_trie_lib::aof::{self, AofWriter};
use makai_trie_lib::config::{ConfigLoader, MakaiConfig};
use makai_trie_lib::error::{
    report, set_error_reporter, ErrorContext, MakaiError, MakaiResult, TracingErrorReporter,
};
use makai_trie_lib::store::Registry;

/// Command line arguments for the Makai Trie Server.
#[derive(Parser, Debug)]
#[clap(name = "Makai Trie Server", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the server
    Start,

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system.
fn init_logging() -> MakaiResult<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_line_number(true)
        .with_file(true)
        .with_thread_names(true)
        .pretty()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| MakaiError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

/// Main entry point for the application.
fn main() -> MakaiResult<()> {
    // Initialize logging early to capture any startup errors
    init_logging()?;

    // Set up error reporter
    set_error_reporter(Arc::new(TracingErrorReporter));

    // Parse command-line arguments
    let args = <Args as clap::Parser>::parse();

    // Load configuration
    let env_prefix = "MAKAI";
    let config_loader = ConfigLoader::new(args.config.as_deref(), env_prefix);

    match args.command.unwrap_or(Command::Start) {
        Command::Start => {
            info!("Starting Makai Trie Server");

            // Load and validate configuration
            let config = match config_loader.load() {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Configuration error: {}", e);
                    process::exit(1);
                }
            };

            info!(
                addr = %config.addr,
                fsync = ?config.aof.fsync,
                debug = config.debug,
                "Server configured"
            );

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(num_cpus::get())
                .enable_all()
                .build()
                .map_err(MakaiError::Io)?;

            if let Err(e) = runtime.block_on(run(config)) {
                report(ErrorContext::new(e, "makai_trie::run"));
                process::exit(1);
            }

            Ok(())
        }
        Command::Validate => {
            info!("Validating configuration");
            match config_loader.load() {
                Ok(_) => {
                    info!("Configuration validated successfully");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Configuration validation error: {}", e);
                    process::exit(1);
                }
            }
        }
        Command::GenConfig { output } => {
            info!("Generating default configuration");
            let default_config = MakaiConfig::default();

            // Create parent directories if they don't exist
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent).map_err(MakaiError::Io)?;
            }

            // Serialize to TOML
            let toml = toml::to_string_pretty(&default_config)
                .map_err(|e| MakaiError::Custom(format!("Failed to serialize config: {e}")))?;

            // Write to file
            std::fs::write(&output, toml).map_err(MakaiError::Io)?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}

/// Brings the registry up (replaying the log when persistence is on), then
/// serves until a shutdown signal arrives.
async fn run(config: MakaiConfig) -> MakaiResult<()> {
    let (registry, writer) = if config.aof.fsync.enabled() {
        let writer = Arc::new(AofWriter::open(&config.aof.filename, config.aof.fsync)?);
        let registry = Registry::with_aof(Arc::clone(&writer));

        let frames = aof::load(&config.aof.filename, &registry)?;
        info!(frames, "Recovered state from append-only file");
        writer.spawn_ticker();

        (registry, Some(writer))
    } else {
        (Registry::new(), None)
    };

    for name in registry.namespace_names() {
        if let Ok(stats) = registry.stats(&name) {
            info!(
                namespace = %name,
                nodes = stats.number_node,
                keys = stats.number_key,
                "Namespace recovered"
            );
        }
    }

    // The HTTP front-end borrows the registry from here; request routing is
    // outside the core.
    info!(addr = %config.addr, "Makai Trie Server ready");

    tokio::signal::ctrl_c().await.map_err(MakaiError::Io)?;
    info!("Shutdown signal received");

    if let Some(writer) = &writer {
        writer.close().await;
    }
    drop(registry);

    Ok(())
}
