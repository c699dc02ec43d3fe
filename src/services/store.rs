//! JSON-backed service store.
//!
//! Holds the rows imported from the service-name registry as a single JSON
//! array. The store is append-only: importing the same dataset twice keeps
//! both copies and readers resolve duplicates by taking the first row.

use crate::error::{DirectoryError, DirectoryResult};
use crate::types::PortRange;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One registry row: a service name bound to a port (or port range).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub service_name: String,
    /// Kept as text, the registry uses both `80` and `6000-6063`.
    pub port_number: String,
    #[serde(default)]
    pub transport_protocol: String,
}

impl ServiceRecord {
    pub fn new(
        service_name: impl Into<String>,
        port_number: impl Into<String>,
        transport_protocol: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            port_number: port_number.into(),
            transport_protocol: transport_protocol.into(),
        }
    }

    /// Ports covered by this row, if the port number is well formed.
    pub fn port_range(&self) -> Option<PortRange> {
        self.port_number.trim().parse().ok()
    }
}

/// File-based store of [`ServiceRecord`] rows.
#[derive(Debug, Clone)]
pub struct ServiceStore {
    path: PathBuf,
}

impl ServiceStore {
    /// Create a store handle for `path`. Nothing is touched on disk yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every row. A store that does not exist yet is empty.
    pub fn load(&self) -> DirectoryResult<Vec<ServiceRecord>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| DirectoryError::ReadFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Append rows after any existing ones and persist the result.
    ///
    /// Returns the number of rows appended.
    pub fn append(&self, records: &[ServiceRecord]) -> DirectoryResult<usize> {
        let mut rows = self.load()?;
        rows.extend_from_slice(records);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DirectoryError::WriteFailed {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let content = serde_json::to_string_pretty(&rows)?;
        fs::write(&self.path, content).map_err(|e| DirectoryError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(records.len())
    }
}
