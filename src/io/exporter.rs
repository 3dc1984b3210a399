//! CSV export - writes captured rows to timestamped files
//!
//! One file per export action, named `scans_<epoch-ms>.csv`, never
//! overwritten. Format is fixed: `StoreCode,Barcode,Date` header, unquoted
//! comma-separated fields, `\n` line terminator. Fields are expected to be
//! free of commas and newlines; nothing is escaped.

use crate::domain::scan::{epoch_ms, ScanRow};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Column order of every export
pub const CSV_HEADER: [&str; 3] = ["StoreCode", "Barcode", "Date"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no rows captured yet")]
    NothingToExport,
    #[error("export storage unavailable: {0}")]
    Storage(#[source] std::io::Error),
    #[error("failed to write csv: {0}")]
    Write(#[from] csv::Error),
}

/// Writes scan rows to CSV files in the export directory
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        info!(dir = %dir.display(), "exporter_initialized");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `rows` to a new timestamped CSV file and return its path.
    ///
    /// Fails without touching the filesystem when `rows` is empty. The file
    /// name carries the export time in milliseconds; two exports within the
    /// same millisecond would collide - accepted, not mitigated.
    pub fn export(&self, rows: &[ScanRow]) -> Result<PathBuf, ExportError> {
        if rows.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        fs::create_dir_all(&self.dir).map_err(ExportError::Storage)?;
        let path = self.dir.join(format!("scans_{}.csv", epoch_ms()));
        let file = File::create(&path).map_err(ExportError::Storage)?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(file));

        writer.write_record(CSV_HEADER)?;
        for row in rows {
            writer.write_record([
                row.store_code.as_str(),
                row.barcode.as_str(),
                row.date.as_str(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;

        info!(path = %path.display(), rows = %rows.len(), "csv_exported");
        Ok(path)
    }
}
