//! Session scan log - ordered, append-only row storage
//!
//! Rows are kept in insertion order; nothing removes or reorders them. The
//! log lives and dies with the process - exported CSV files are the only
//! durable output. Not internally synchronized: all access happens on the
//! capture controller task.

use crate::domain::scan::ScanRow;

#[derive(Debug, Default)]
pub struct ScanLog {
    rows: Vec<ScanRow>,
}

impl ScanLog {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a row at the end of the log
    pub fn append(&mut self, row: ScanRow) {
        self.rows.push(row);
    }

    /// All rows in insertion order
    pub fn rows(&self) -> &[ScanRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(store: &str, barcode: &str) -> ScanRow {
        ScanRow::capture(store, barcode, Some("2024-01-01")).unwrap()
    }

    #[test]
    fn test_append_grows_by_one() {
        let mut log = ScanLog::new();
        assert!(log.is_empty());

        log.append(row("S1", "B1"));
        assert_eq!(log.len(), 1);

        log.append(row("S1", "B2"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut log = ScanLog::new();
        log.append(row("S1", "B1"));
        log.append(row("S2", "B2"));
        log.append(row("S1", "B1")); // duplicates are kept

        let barcodes: Vec<&str> = log.rows().iter().map(|r| r.barcode.as_str()).collect();
        assert_eq!(barcodes, ["B1", "B2", "B1"]);
        assert_eq!(log.len(), 3);
    }
}
