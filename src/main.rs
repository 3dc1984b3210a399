//! Scan Station - barcode capture daemon
//!
//! Collects decoded barcodes from scanner devices, pairs each with a store
//! code and date, and exports the captured rows as CSV files that can be
//! handed to the OS share handler.
//!
//! Module structure:
//! - `domain/` - Core data types (ScanRow, capture events, session view)
//! - `io/` - External interfaces (scanner intake, CSV export, share, console)
//! - `services/` - Business logic (CaptureController, ScanLog)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use scan_station::domain::types::SessionView;
use scan_station::infra::{Config, Metrics};
use scan_station::io::{
    run_operator_console, start_scanner_listener, CommandShare, ScannerListenerConfig,
};
use scan_station::services::CaptureController;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Scan Station - barcode capture and CSV export daemon
#[derive(Parser, Debug)]
#[command(name = "scan-station", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for full event visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git = %env!("GIT_HASH"), "scan-station starting");

    // Parse command line arguments using clap
    let args = Args::parse();

    // Load configuration from TOML file
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        station_id = %config.station_id(),
        scanner_enabled = %config.scanner_listener_enabled(),
        scanner_port = %config.scanner_listener_port(),
        export_dir = %config.export_dir().display(),
        share_command = %config.share_command(),
        "config_loaded"
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Create shared components
    let metrics = Arc::new(Metrics::new());
    let (view_tx, view_rx) = watch::channel(SessionView::default());

    // Create event channel (bounded for backpressure)
    let (event_tx, event_rx) = mpsc::channel(256);

    // Start scanner intake listener
    let scanner_config = ScannerListenerConfig {
        port: config.scanner_listener_port(),
        enabled: config.scanner_listener_enabled(),
    };
    let scanner_tx = event_tx.clone();
    let scanner_metrics = metrics.clone();
    let scanner_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        if let Err(e) =
            start_scanner_listener(scanner_config, scanner_tx, scanner_metrics, scanner_shutdown)
                .await
        {
            tracing::error!(error = %e, "Scanner listener error");
        }
    });

    // Start operator console on stdin
    let console_tx = event_tx;
    let console_view = view_rx.clone();
    let console_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        run_operator_console(console_tx, console_view, console_shutdown).await;
    });

    // Start metrics reporter (lock-free reads with full summary)
    let metrics_clone = metrics.clone();
    let metrics_view = view_rx;
    let metrics_interval = config.metrics_interval_secs();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            let rows = metrics_view.borrow().count();
            metrics_clone.report(rows).log();
        }
    });

    // Handle shutdown on Ctrl+C
    let shutdown_signal = shutdown_tx;
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_signal.send(true);
    });

    // Start capture controller (main event processing loop)
    let share_target = Arc::new(CommandShare::new(config.share_command(), config.share_args()));
    let mut controller = CaptureController::new(&config, share_target, metrics, view_tx);
    info!("capture_controller_started");

    // Run controller - consumes events until all intake sources hang up
    controller.run(event_rx).await;

    info!("scan-station shutdown complete");
    Ok(())
}
