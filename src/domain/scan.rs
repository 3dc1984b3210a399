//! Scan row data model and capture-time helpers

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Get current epoch milliseconds
#[inline]
pub fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Current local date as zero-padded `YYYY-MM-DD`
pub fn today_local() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Input failures when constructing a scan row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("store code is required before a scan can be recorded")]
    EmptyStoreCode,
    #[error("barcode text is empty")]
    EmptyBarcode,
}

/// One captured (store code, barcode, date) tuple
///
/// Only constructible through [`ScanRow::capture`], so a row always carries
/// a non-empty trimmed store code and barcode and a resolved date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRow {
    pub store_code: String,
    pub barcode: String,
    pub date: String,
}

impl ScanRow {
    /// Build a row from raw operator/scanner input.
    ///
    /// Store code and barcode are trimmed and must be non-empty; the store
    /// code is checked first. A missing or blank `date_text` resolves to the
    /// current local date. A non-blank `date_text` is used as-is - it comes
    /// from a picker-style flow and is assumed `YYYY-MM-DD`.
    pub fn capture(
        store_code: &str,
        barcode: &str,
        date_text: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let store_code = store_code.trim();
        if store_code.is_empty() {
            return Err(ValidationError::EmptyStoreCode);
        }

        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(ValidationError::EmptyBarcode);
        }

        let date = match date_text.map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => today_local(),
        };

        Ok(Self { store_code: store_code.to_string(), barcode: barcode.to_string(), date })
    }
}

impl std::fmt::Display for ScanRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.store_code, self.barcode, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_trims_inputs() {
        let row = ScanRow::capture("  S1 ", " 12345 ", Some("2024-01-01")).unwrap();
        assert_eq!(row.store_code, "S1");
        assert_eq!(row.barcode, "12345");
        assert_eq!(row.date, "2024-01-01");
    }

    #[test]
    fn test_capture_rejects_empty_store_code() {
        assert_eq!(
            ScanRow::capture("   ", "12345", Some("2024-01-01")),
            Err(ValidationError::EmptyStoreCode)
        );
    }

    #[test]
    fn test_capture_rejects_empty_barcode() {
        assert_eq!(
            ScanRow::capture("S1", "  ", Some("2024-01-01")),
            Err(ValidationError::EmptyBarcode)
        );
    }

    #[test]
    fn test_store_code_checked_before_barcode() {
        // Both empty: the store code error wins - it is the required context
        assert_eq!(ScanRow::capture("", "", None), Err(ValidationError::EmptyStoreCode));
    }

    #[test]
    fn test_capture_defaults_to_today() {
        let row = ScanRow::capture("S1", "B1", None).unwrap();
        assert_eq!(row.date, today_local());

        let row = ScanRow::capture("S1", "B1", Some("  ")).unwrap();
        assert_eq!(row.date, today_local());
    }

    #[test]
    fn test_today_local_format() {
        let today = today_local();
        assert_eq!(today.len(), 10);
        let parts: Vec<&str> = today.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 2);
    }

    #[test]
    fn test_display_matches_listing_shape() {
        let row = ScanRow::capture("S1", "B1", Some("2024-01-01")).unwrap();
        assert_eq!(row.to_string(), "S1, B1, 2024-01-01");
    }
}
