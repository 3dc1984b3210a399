//! Capture orchestration - the single thread of control
//!
//! The CaptureController is the only task that touches session state. It
//! consumes capture events from a bounded channel and coordinates:
//! - row validation and construction (store code, barcode, date)
//! - staging of decodes that arrive before a store code is set
//! - CSV export and share hand-off
//! - presentation refresh via a watch snapshot

mod handlers;

use crate::domain::types::{CaptureEvent, SessionView};
use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::exporter::CsvExporter;
use crate::io::share::ShareTarget;
use crate::services::scan_log::ScanLog;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// Central event processor for the capture session
pub struct CaptureController {
    /// Captured rows for this session
    pub(crate) log: ScanLog,
    /// Store code context applied to incoming scans
    pub(crate) store_code: String,
    /// Explicitly picked date; `None` resolves to today at capture time
    pub(crate) picked_date: Option<String>,
    /// Decode waiting for a store code (last decode wins)
    pub(crate) pending_barcode: Option<String>,
    /// Writes rows to timestamped CSV files
    pub(crate) exporter: CsvExporter,
    /// OS share collaborator
    pub(crate) share_target: Arc<dyn ShareTarget>,
    /// Counters
    pub(crate) metrics: Arc<Metrics>,
    /// Presentation snapshot publisher
    pub(crate) view_tx: watch::Sender<SessionView>,
}

impl CaptureController {
    /// Create a controller with the given configuration and collaborators
    pub fn new(
        config: &Config,
        share_target: Arc<dyn ShareTarget>,
        metrics: Arc<Metrics>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        let exporter = CsvExporter::new(config.export_dir());
        Self {
            log: ScanLog::new(),
            store_code: config.default_store_code().to_string(),
            picked_date: None,
            pending_barcode: None,
            exporter,
            share_target,
            metrics,
            view_tx,
        }
    }

    /// Start the controller, consuming events until the channel closes
    pub async fn run(&mut self, mut event_rx: mpsc::Receiver<CaptureEvent>) {
        while let Some(event) = event_rx.recv().await {
            self.process_event(event).await;
        }
    }

    /// Process a single event, dispatching to the appropriate handler
    pub async fn process_event(&mut self, event: CaptureEvent) {
        let process_start = Instant::now();

        match event {
            CaptureEvent::Decode { text, received_at } => {
                self.handle_decode(&text, received_at);
            }
            CaptureEvent::ManualAdd { barcode } => {
                self.handle_manual_add(barcode.as_deref());
            }
            CaptureEvent::SetStoreCode(code) => {
                self.handle_set_store_code(&code);
            }
            CaptureEvent::SetDate(date) => {
                self.handle_set_date(date);
            }
            CaptureEvent::Export => {
                self.handle_export();
            }
            CaptureEvent::ShareLatest => {
                self.handle_share().await;
            }
        }

        let latency_us = process_start.elapsed().as_micros() as u64;
        self.metrics.record_event_processed(latency_us);
    }

    /// Number of rows captured this session
    pub fn row_count(&self) -> usize {
        self.log.len()
    }

    /// Build a snapshot of the current session state
    pub fn view_with_status(&self, status: String) -> SessionView {
        SessionView {
            rows: self.log.rows().to_vec(),
            store_code: self.store_code.clone(),
            picked_date: self.picked_date.clone(),
            pending_barcode: self.pending_barcode.clone(),
            status,
        }
    }

    /// Publish a refreshed snapshot to the presentation layer
    pub(crate) fn refresh(&self, status: impl Into<String>) {
        self.view_tx.send_replace(self.view_with_status(status.into()));
    }
}
