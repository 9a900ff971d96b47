//! Parkspace booking service CLI
//!
//! Headless REST server, suitable for a systemd unit, a container or a
//! standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/parkspace/config.toml)
//! parkspace-service
//!
//! # Custom config path and port
//! parkspace-service --config /etc/parkspace/config.toml --api-port 9080
//!
//! # Validate config without starting
//! parkspace-service --check
//!
//! # Finish elapsed reservations and expire abandoned checkouts once, then exit
//! parkspace-service --sweep-once
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use parkspace::config::AppConfig;
use parkspace::server::{init_tracing, sweep_once, ServerHandle, ServerOptions};

/// Parkspace: parking space reservations over shared pools.
#[derive(Parser, Debug)]
#[command(
    name = "parkspace-service",
    version,
    about = "Parking space booking service",
    long_about = "Parkspace REST API server: availability, pricing, reservations, \
                  payment callbacks and admin back office.\n\n\
                  Default config: ~/.config/parkspace/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKSPACE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,

    /// Run one sweep (finish elapsed, expire abandoned checkouts) and exit.
    #[arg(long)]
    sweep_once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(parkspace::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            if cli.check {
                return Err(e.into());
            }
            error!("Using default configuration.");
        }
    }

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            error!("{}", e);
            return Err(e.into());
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.connection_url());
        println!("   Payments    : {}", config.payment.provider);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── One-off sweep ──────────────────────────────────────────
    if cli.sweep_once {
        let report = sweep_once(&config, !cli.no_migrate).await?;
        println!("Finished {} reservation(s)", report.finished);
        println!("Expired {} abandoned checkout(s)", report.expired);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
