//! drift CLI: spool-directory loader for WebHDFS-compatible gateways.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use drift::{init_tracing, run_pipeline, Config, Spool};

/// Spool-directory loader for WebHDFS-compatible gateways.
#[derive(Parser, Debug)]
#[command(name = "drift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Validate configuration and print the resolved layout without
    /// processing.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let base = match config.local_base() {
        Ok(base) => base,
        Err(e) => {
            eprintln!("Failed to resolve working directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let spool = Spool::new(&base);
    if let Err(e) = spool.bootstrap().await {
        eprintln!("Failed to create working directories: {e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = init_tracing(&args.log_level, spool.log_dir()) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    info!(
        base = %base.display(),
        endpoint = %config.base.domain,
        remote_dir = %config.hdfs.dir,
        "drift starting"
    );

    if args.dry_run {
        info!("Dry run mode - validating configuration");
        info!("  Pending: {}", spool.pending_dir().display());
        info!("  Success: {}", spool.success_dir().display());
        info!("  Error: {}", spool.error_dir().display());
        info!("  Remote: {}{}", config.base.domain, config.hdfs.dir);
        info!(
            "  Poll interval: {}s",
            config.source.poll_interval_secs
        );
        info!("Configuration is valid");
        return ExitCode::SUCCESS;
    }

    if config.metrics.enabled {
        let addr = match config.metrics.address.parse() {
            Ok(addr) => addr,
            Err(e) => {
                error!(error = %e, address = %config.metrics.address, "Invalid metrics address");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = drift::metrics::init(addr) {
            error!(error = %e, "Failed to initialize metrics");
            return ExitCode::FAILURE;
        }
    }

    match run_pipeline(config, spool).await {
        Ok(()) => {
            info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            ExitCode::FAILURE
        }
    }
}
