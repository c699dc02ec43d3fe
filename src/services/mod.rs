//! Service name lookup for open ports.
//!
//! A [`ServiceDirectory`] is built once per scan from the persisted
//! [`ServiceStore`] (populated by `porthole import`) and then shared
//! read-only between every probe. Lookups never fail: anything the
//! directory cannot answer is simply an unknown service.

mod import;
mod store;

pub use import::import_csv;
pub use store::{ServiceRecord, ServiceStore};

use crate::types::Port;
use std::collections::HashMap;
use std::path::Path;

/// Port-to-service-name lookup.
///
/// Implementations must be safe to call from many probes at once.
pub trait ServiceLookup: Send + Sync {
    /// Name of the service registered for `port`, if any.
    fn lookup(&self, port: Port) -> Option<String>;
}

/// Well-known TCP services, used when no store has been imported yet.
const WELL_KNOWN: &[(u16, &str)] = &[
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "domain"),
    (80, "http"),
    (88, "kerberos"),
    (110, "pop3"),
    (111, "sunrpc"),
    (119, "nntp"),
    (135, "epmap"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (179, "bgp"),
    (389, "ldap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (465, "submissions"),
    (514, "shell"),
    (515, "printer"),
    (548, "afpovertcp"),
    (554, "rtsp"),
    (587, "submission"),
    (631, "ipp"),
    (636, "ldaps"),
    (873, "rsync"),
    (993, "imaps"),
    (995, "pop3s"),
    (1080, "socks"),
    (1433, "ms-sql-s"),
    (1521, "ncube-lm"),
    (1723, "pptp"),
    (1883, "mqtt"),
    (2049, "nfs"),
    (2181, "eforward"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (3690, "svn"),
    (4369, "epmd"),
    (5060, "sip"),
    (5222, "xmpp-client"),
    (5432, "postgresql"),
    (5672, "amqp"),
    (5900, "rfb"),
    (5984, "couchdb"),
    (6379, "redis"),
    (6443, "sun-sr-https"),
    (8080, "http-alt"),
    (8443, "pcsync-https"),
    (9042, "cassandra"),
    (9092, "XmlIpcRegSvc"),
    (9200, "wap-wsp"),
    (9418, "git"),
    (11211, "memcache"),
    (27017, "mongodb"),
];

/// Read-only port to service-name index.
#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    entries: HashMap<u16, String>,
}

impl ServiceDirectory {
    /// A directory that knows no services.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Directory seeded from the compiled-in well-known table.
    pub fn builtin() -> Self {
        let entries = WELL_KNOWN
            .iter()
            .map(|&(port, name)| (port, name.to_string()))
            .collect();
        Self { entries }
    }

    /// Build an index from store rows.
    ///
    /// The first row covering a port wins, so duplicated rows from repeated
    /// imports are harmless. Rows whose port number does not parse (or whose
    /// name is blank) are skipped. `a-b` ranges cover every port in between.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ServiceRecord>,
    {
        let mut entries = HashMap::new();

        for record in records {
            let name = record.service_name.trim();
            if name.is_empty() {
                continue;
            }
            let Some(range) = record.port_range() else {
                continue;
            };
            for port in range.iter() {
                entries
                    .entry(port.as_u16())
                    .or_insert_with(|| name.to_string());
            }
        }

        Self { entries }
    }

    /// Open the directory backed by the store at `path`.
    ///
    /// Never fails: a store that has not been imported yet falls back to the
    /// built-in table, and an unreadable store degrades to an empty directory
    /// so the scan still runs with unknown services.
    pub fn open(path: &Path) -> Self {
        let store = ServiceStore::new(path);

        if !store.exists() {
            tracing::debug!(
                "no service store at {}, using built-in table",
                path.display()
            );
            return Self::builtin();
        }

        match store.load() {
            Ok(records) => {
                let directory = Self::from_records(&records);
                tracing::debug!(
                    "loaded {} service entries from {}",
                    directory.len(),
                    path.display()
                );
                directory
            }
            Err(e) => {
                tracing::warn!("service lookup disabled: {}", e);
                Self::empty()
            }
        }
    }

    /// Number of ports with a known service.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ServiceLookup for ServiceDirectory {
    fn lookup(&self, port: Port) -> Option<String> {
        self.entries.get(&port.as_u16()).cloned()
    }
}

impl<const N: usize> From<[(u16, &str); N]> for ServiceDirectory {
    fn from(pairs: [(u16, &str); N]) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(port, name)| (port, name.to_string()))
            .collect();
        Self { entries }
    }
}
