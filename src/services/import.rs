//! Import of the service-name registry from a delimited text file.
//!
//! The dataset starts with a header row; its first three columns are the
//! service name, the port number and the transport protocol. Any further
//! columns (descriptions, contacts, dates) are ignored.

use super::store::{ServiceRecord, ServiceStore};
use crate::error::{DirectoryError, DirectoryResult};
use std::path::Path;

/// Outcome of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows appended to the store.
    pub imported: usize,
    /// Rows dropped for a blank service name or port number.
    pub skipped: usize,
}

/// Parse `csv_path` and append its usable rows to `store`.
///
/// Not idempotent: every run appends, so importing twice duplicates rows.
pub fn import_csv(csv_path: &Path, store: &ServiceStore) -> DirectoryResult<ImportSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)?;

    if reader.headers()?.is_empty() {
        return Err(DirectoryError::MissingHeader(csv_path.to_path_buf()));
    }

    let mut records = Vec::new();
    let mut summary = ImportSummary::default();

    for row in reader.records() {
        let row = row?;
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let (service_name, port_number) = (field(0), field(1));
        if service_name.is_empty() || port_number.is_empty() {
            summary.skipped += 1;
            continue;
        }

        records.push(ServiceRecord::new(service_name, port_number, field(2)));
    }

    summary.imported = store.append(&records)?;

    tracing::info!(
        "imported {} service rows from {} ({} skipped)",
        summary.imported,
        csv_path.display(),
        summary.skipped
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DATASET: &str = "\
Service Name,Port Number,Transport Protocol,Description
ssh,22,tcp,The Secure Shell (SSH) Protocol
ssh,22,udp,The Secure Shell (SSH) Protocol
,23,tcp,Reserved
http,80,tcp,\"World Wide Web HTTP,
multi-line description\"
x11,6000-6063,tcp,X Window System
unassigned,,tcp,
short,9999
";

    fn fixture(dir: &TempDir) -> (std::path::PathBuf, ServiceStore) {
        let csv_path = dir.path().join("service-names-port-numbers.csv");
        fs::write(&csv_path, DATASET).unwrap();
        let store = ServiceStore::new(dir.path().join("services.json"));
        (csv_path, store)
    }

    #[test]
    fn test_import_skips_blank_rows() {
        let dir = TempDir::new().unwrap();
        let (csv_path, store) = fixture(&dir);

        let summary = import_csv(&csv_path, &store).unwrap();
        assert_eq!(summary, ImportSummary { imported: 5, skipped: 2 });

        let rows = store.load().unwrap();
        assert_eq!(rows[0], ServiceRecord::new("ssh", "22", "tcp"));
        assert_eq!(rows[2].service_name, "http");
        assert_eq!(rows[4], ServiceRecord::new("short", "9999", ""));
    }

    #[test]
    fn test_import_twice_appends() {
        let dir = TempDir::new().unwrap();
        let (csv_path, store) = fixture(&dir);

        import_csv(&csv_path, &store).unwrap();
        import_csv(&csv_path, &store).unwrap();
        assert_eq!(store.load().unwrap().len(), 10);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("empty.csv");
        fs::write(&csv_path, "").unwrap();
        let store = ServiceStore::new(dir.path().join("services.json"));

        assert!(matches!(
            import_csv(&csv_path, &store),
            Err(DirectoryError::MissingHeader(_))
        ));
        assert!(!store.exists());
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = ServiceStore::new(dir.path().join("services.json"));
        assert!(import_csv(&dir.path().join("nope.csv"), &store).is_err());
    }
}
