//! Scanner intake listener
//!
//! Stands in for the external barcode decoder: scanner devices (or the
//! `scan-sim` binary) connect over TCP and send one decoded text per line.
//! Decoding itself happens entirely upstream - the listener only forwards
//! the text to the capture controller.

use crate::domain::types::CaptureEvent;
use crate::infra::metrics::Metrics;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Scanner listener configuration
#[derive(Debug, Clone)]
pub struct ScannerListenerConfig {
    pub port: u16,
    pub enabled: bool,
}

impl Default for ScannerListenerConfig {
    fn default() -> Self {
        Self { port: 7711, enabled: true }
    }
}

/// Start the scanner TCP listener
///
/// Accepts connections from scanner devices and forwards each decoded line
/// to the controller. Events are sent via try_send to never block a device
/// connection - drops are counted in metrics.
pub async fn start_scanner_listener(
    config: ScannerListenerConfig,
    event_tx: mpsc::Sender<CaptureEvent>,
    metrics: Arc<Metrics>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !config.enabled {
        info!("scanner_listener_disabled");
        return Ok(());
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(port = %config.port, "scanner_listener_started");

    loop {
        tokio::select! {
            // Check for shutdown
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("scanner_listener_shutdown");
                    return Ok(());
                }
            }
            // Accept new connections
            result = listener.accept() => {
                match result {
                    Ok((socket, addr)) => {
                        let tx = event_tx.clone();
                        let m = metrics.clone();
                        tokio::spawn(async move {
                            handle_scanner_connection(socket, addr, tx, m).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "scanner_listener_accept_failed");
                    }
                }
            }
        }
    }
}

async fn handle_scanner_connection(
    socket: tokio::net::TcpStream,
    addr: SocketAddr,
    event_tx: mpsc::Sender<CaptureEvent>,
    metrics: Arc<Metrics>,
) {
    let peer_ip = addr.ip().to_string();
    debug!(peer = %peer_ip, "scanner_connected");

    let reader = BufReader::new(socket);
    let mut lines = reader.lines();

    // Rate-limit drop warnings to 1 per second
    let mut last_drop_warn = Instant::now() - Duration::from_secs(2);

    // Each non-empty line is one decoded barcode
    while let Ok(Some(line)) = lines.next_line().await {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        debug!(peer = %peer_ip, text = %text, "decode_received");
        metrics.record_scan_received();

        let event = CaptureEvent::Decode { text: text.to_string(), received_at: Instant::now() };

        match event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                metrics.record_scan_dropped();
                if last_drop_warn.elapsed() > Duration::from_secs(1) {
                    warn!(peer = %peer_ip, "decode_dropped: channel full");
                    last_drop_warn = Instant::now();
                }
            }
            Err(TrySendError::Closed(_)) => {
                warn!(peer = %peer_ip, "decode_channel_closed");
                break;
            }
        }
    }

    debug!(peer = %peer_ip, "scanner_disconnected");
}
