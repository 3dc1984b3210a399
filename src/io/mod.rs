//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `scanner` - TCP intake for decoded barcode text
//! - `exporter` - CSV export to timestamped files
//! - `share` - export discovery and OS share hand-off
//! - `operator` - stdin command console for the daemon

pub mod exporter;
pub mod operator;
pub mod scanner;
pub mod share;

// Re-export commonly used types
pub use exporter::{CsvExporter, ExportError};
pub use operator::run_operator_console;
pub use scanner::{start_scanner_listener, ScannerListenerConfig};
pub use share::{latest_export, share_latest, CommandShare, ShareError, ShareTarget, CSV_MIME};
