//! Service Locator
//!
//! Loads the service registry from its CSV source and serves resolution
//! queries to local clients over a loopback-only REST endpoint.

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use service_locator::{registry, ApiServer, ApiServerConfig, Result, SharedRegistry};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Service Locator - name-to-address resolution for local clients
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the services CSV file (service_name,host,port)
    #[arg(long, env = "SERVICES_CSV_PATH", default_value = "services.csv")]
    services_csv: String,

    /// Bind address; must be loopback
    #[arg(long, env = "LOCATOR_ADDR", default_value = service_locator::DEFAULT_BIND_ADDR)]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting Service Locator");
    info!("  Version: {}", service_locator::VERSION);
    info!("  Services CSV: {}", args.services_csv);
    info!("  Bind address: {}", args.bind);

    let config = ApiServerConfig::from_addr(&args.bind)?;

    // A load failure here is fatal: exit non-zero before serving rather
    // than run with an empty or partial registry silently.
    let report = match registry::load(&args.services_csv) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    info!(
        "Registry loaded: {} services ({} rows skipped, {} overwritten)",
        report.registry.len(),
        report.skipped,
        report.overwritten
    );
    if report.registry.is_empty() {
        warn!("Registry is empty; every lookup will return not-found");
    }

    let shared = SharedRegistry::new(report.registry);
    let server = ApiServer::new(config, shared, args.services_csv.into());

    // ctrl-c triggers graceful shutdown
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown.send(());
        }
    });

    server.run().await?;

    info!("Locator shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap())
        .add_directive("axum=info".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
