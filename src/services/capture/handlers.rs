//! Event handlers for the capture controller
//!
//! Each handler applies one event to session state and ends with exactly
//! one snapshot refresh, so the presentation layer always sees the final
//! state of the mutation.

use super::CaptureController;
use crate::domain::scan::{ScanRow, ValidationError};
use crate::io::share;
use std::time::Instant;
use tracing::{debug, info, warn};

impl CaptureController {
    /// Validate, construct and append one row.
    ///
    /// Nothing is appended on a validation failure. Callers publish the
    /// snapshot refresh for both outcomes.
    pub fn add_scan(
        &mut self,
        store_code: &str,
        barcode_text: &str,
        date_text: Option<&str>,
    ) -> Result<ScanRow, ValidationError> {
        let row = match ScanRow::capture(store_code, barcode_text, date_text) {
            Ok(row) => row,
            Err(e) => {
                self.metrics.record_row_rejected();
                return Err(e);
            }
        };

        self.log.append(row.clone());
        self.metrics.record_row_appended();
        info!(
            store = %row.store_code,
            barcode = %row.barcode,
            date = %row.date,
            total = %self.log.len(),
            "row_captured"
        );
        Ok(row)
    }

    /// Handle decoded text from the scanner collaborator.
    ///
    /// With a store code in place the decode becomes a row immediately,
    /// using the currently picked date. Without one it is staged instead,
    /// and the operator is prompted to supply the store code first.
    pub(crate) fn handle_decode(&mut self, text: &str, received_at: Instant) {
        debug!(text = %text, queue_ms = %received_at.elapsed().as_millis(), "decode_dequeued");

        if self.store_code.trim().is_empty() {
            // A later decode replaces the staged one, matching a scratch
            // entry field that each scan overwrites
            self.pending_barcode = Some(text.trim().to_string());
            info!(barcode = %text.trim(), "decode_staged");
            self.refresh("Barcode detected. Set a store code, then add.");
            return;
        }

        let store = self.store_code.clone();
        let date = self.picked_date.clone();
        match self.add_scan(&store, text, date.as_deref()) {
            Ok(row) => self.refresh(format!("Scanned: {} ({} rows)", row.barcode, self.log.len())),
            Err(e) => {
                warn!(error = %e, "decode_rejected");
                self.refresh(e.to_string());
            }
        }
    }

    /// Handle an operator-triggered add.
    ///
    /// An explicit barcode is used as typed; an empty one falls back to the
    /// staged decode, which is consumed only when the append succeeds.
    pub(crate) fn handle_manual_add(&mut self, barcode: Option<&str>) {
        let typed = barcode.map(str::trim).filter(|b| !b.is_empty());
        let (text, from_staged) = match typed {
            Some(b) => (b.to_string(), false),
            None => match self.pending_barcode.clone() {
                Some(staged) => (staged, true),
                None => (String::new(), false),
            },
        };

        let store = self.store_code.clone();
        let date = self.picked_date.clone();
        match self.add_scan(&store, &text, date.as_deref()) {
            Ok(row) => {
                if from_staged {
                    self.pending_barcode = None;
                }
                self.refresh(format!("Added: {} ({} rows)", row.barcode, self.log.len()));
            }
            Err(e) => {
                warn!(error = %e, "manual_add_rejected");
                self.refresh(e.to_string());
            }
        }
    }

    pub(crate) fn handle_set_store_code(&mut self, code: &str) {
        self.store_code = code.trim().to_string();
        if self.store_code.is_empty() {
            self.refresh("Store code cleared");
        } else if self.pending_barcode.is_some() {
            self.refresh(format!("Store code {} set. Add to record the staged barcode.", self.store_code));
        } else {
            self.refresh(format!("Store code set to {}", self.store_code));
        }
    }

    pub(crate) fn handle_set_date(&mut self, date: Option<String>) {
        self.picked_date = date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        match &self.picked_date {
            Some(d) => self.refresh(format!("Date set to {}", d)),
            None => self.refresh("Date cleared (today)"),
        }
    }

    pub(crate) fn handle_export(&mut self) {
        match self.exporter.export(self.log.rows()) {
            Ok(path) => {
                self.metrics.record_export_written();
                info!(path = %path.display(), rows = %self.log.len(), "export_saved");
                self.refresh(format!("Saved: {}", path.display()));
            }
            Err(e) => {
                self.metrics.record_export_failed();
                warn!(error = %e, "export_failed");
                self.refresh(e.to_string());
            }
        }
    }

    pub(crate) async fn handle_share(&mut self) {
        match share::share_latest(self.exporter.dir(), self.share_target.as_ref()).await {
            Ok(path) => {
                self.metrics.record_share_sent();
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                self.refresh(format!("Sharing {}", name));
            }
            Err(e) => {
                self.metrics.record_share_failed();
                warn!(error = %e, "share_failed");
                self.refresh(e.to_string());
            }
        }
    }
}
