//! Shared types for the scan station

use crate::domain::scan::ScanRow;
use std::time::Instant;

/// Inbound events processed by the capture controller
///
/// All sources (scanner intake, operator console, TUI) funnel through one
/// bounded channel; the controller task is the only consumer, so no two
/// events are ever handled concurrently.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// Decoded text delivered by the scanner collaborator
    Decode { text: String, received_at: Instant },
    /// Operator-triggered add; `barcode: None` consumes the staged decode
    ManualAdd { barcode: Option<String> },
    /// Set the store code used for subsequent scans
    SetStoreCode(String),
    /// Set or clear the picked date (`YYYY-MM-DD`; `None` = today)
    SetDate(Option<String>),
    /// Write all captured rows to a new CSV file
    Export,
    /// Hand the most recent export to the OS share handler
    ShareLatest,
}

/// Session snapshot for the presentation layer
///
/// Published on a watch channel after every controller mutation; consumers
/// render it, they never mutate session state directly.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    /// Captured rows in insertion order
    pub rows: Vec<ScanRow>,
    /// Store code context for subsequent scans
    pub store_code: String,
    /// Explicitly picked date, if any
    pub picked_date: Option<String>,
    /// Decode waiting for a store code
    pub pending_barcode: Option<String>,
    /// Transient, dismissible outcome of the last action
    pub status: String,
}

impl SessionView {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Numbered listing of captured rows, one per line
    pub fn listing(&self) -> String {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| format!("{}. {}", idx + 1, row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_is_numbered_in_order() {
        let view = SessionView {
            rows: vec![
                ScanRow::capture("S1", "B1", Some("2024-01-01")).unwrap(),
                ScanRow::capture("S2", "B2", Some("2024-01-02")).unwrap(),
            ],
            ..Default::default()
        };
        assert_eq!(view.count(), 2);
        assert_eq!(view.listing(), "1. S1, B1, 2024-01-01\n2. S2, B2, 2024-01-02");
    }

    #[test]
    fn test_empty_listing() {
        let view = SessionView::default();
        assert_eq!(view.count(), 0);
        assert_eq!(view.listing(), "");
    }
}
