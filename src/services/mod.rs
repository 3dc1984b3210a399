//! Services - business logic and session state
//!
//! This module contains the core business logic services:
//! - `capture` - central event processor (validation, decode staging, export/share dispatch)
//! - `scan_log` - append-only session row storage

pub mod capture;
pub mod scan_log;

// Re-export commonly used types
pub use capture::CaptureController;
pub use scan_log::ScanLog;
