//! Registry Loader
//!
//! Reads the CSV configuration source (`service_name,host,port`) into a
//! [`Registry`] snapshot. A missing or unreadable source and a malformed
//! header are fatal; individual bad rows are skipped with a warning and
//! the rest of the source still loads.

use crate::error::{Error, Result};
use crate::registry::store::{Registry, ServiceRecord};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Expected header columns, in order
const EXPECTED_HEADER: [&str; 3] = ["service_name", "host", "port"];

// =============================================================================
// Load Report
// =============================================================================

/// Outcome of one load pass over the configuration source
#[derive(Debug)]
pub struct LoadReport {
    /// The fully built registry snapshot
    pub registry: Registry,
    /// Number of data rows accepted
    pub loaded: usize,
    /// Number of data rows rejected by validation
    pub skipped: usize,
    /// Number of rows that overwrote an earlier duplicate name
    pub overwritten: usize,
}

// =============================================================================
// Loader
// =============================================================================

/// Load the service registry from a CSV file.
///
/// Duplicate service names resolve last-write-wins: the row appearing
/// later in the file replaces the earlier record.
pub fn load(path: impl AsRef<Path>) -> Result<LoadReport> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    parse(&contents).map_err(|reason| Error::ConfigLoad {
        path: path.display().to_string(),
        reason,
    })
}

/// Parse CSV contents into a registry. Returns a plain reason string so
/// the caller can attach the source path.
fn parse(contents: &str) -> std::result::Result<LoadReport, String> {
    let mut lines = contents.lines().enumerate();

    // Header row is required; a zero-byte source counts as zero rows.
    match lines.next() {
        None => {
            return Ok(LoadReport {
                registry: Registry::new(),
                loaded: 0,
                skipped: 0,
                overwritten: 0,
            })
        }
        Some((_, header)) => validate_header(header)?,
    }

    let mut services: HashMap<String, ServiceRecord> = HashMap::new();
    let mut loaded = 0;
    let mut skipped = 0;
    let mut overwritten = 0;

    for (index, line) in lines {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(line) {
            Ok((name, record)) => {
                if let Some(previous) = services.insert(name.clone(), record) {
                    debug!(
                        "Duplicate service '{}' at line {}: replacing {}",
                        name, line_no, previous
                    );
                    overwritten += 1;
                } else {
                    loaded += 1;
                }
            }
            Err(reason) => {
                warn!("Skipping row at line {}: {}", line_no, reason);
                skipped += 1;
            }
        }
    }

    Ok(LoadReport {
        registry: Registry::from_records(services),
        loaded,
        skipped,
        overwritten,
    })
}

fn validate_header(header: &str) -> std::result::Result<(), String> {
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    if columns != EXPECTED_HEADER {
        return Err(format!(
            "expected header '{}', got '{}'",
            EXPECTED_HEADER.join(","),
            header.trim()
        ));
    }
    Ok(())
}

fn parse_row(line: &str) -> std::result::Result<(String, ServiceRecord), String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!("expected 3 fields, got {}", fields.len()));
    }

    let name = fields[0];
    let host = fields[1];
    let port_str = fields[2];

    if name.is_empty() {
        return Err("empty service_name".to_string());
    }
    if host.is_empty() {
        return Err("empty host".to_string());
    }

    let port: u16 = port_str
        .parse()
        .map_err(|_| format!("invalid port '{}'", port_str))?;
    if port == 0 {
        return Err("port 0 is out of range".to_string());
    }

    Ok((name.to_string(), ServiceRecord::new(host, port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_well_formed_rows() {
        let file = write_csv(
            "service_name,host,port\n\
             auth_devs,pi7.local,5001\n\
             network_scan,pi7.local,5002\n",
        );

        let report = load(file.path()).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(
            report.registry.resolve("auth_devs").unwrap(),
            &ServiceRecord::new("pi7.local", 5001)
        );
        assert_eq!(
            report.registry.resolve("network_scan").unwrap(),
            &ServiceRecord::new("pi7.local", 5002)
        );
    }

    #[test]
    fn test_missing_source_is_config_load_error() {
        let err = load("/nonexistent/services.csv").unwrap_err();
        assert_matches!(err, Error::ConfigLoad { .. });
        assert!(err.is_fatal());
    }

    #[test]
    fn test_header_only_source_yields_empty_registry() {
        let file = write_csv("service_name,host,port\n");
        let report = load(file.path()).unwrap();
        assert!(report.registry.is_empty());
        assert_eq!(report.loaded, 0);
    }

    #[test]
    fn test_zero_byte_source_yields_empty_registry() {
        let file = write_csv("");
        let report = load(file.path()).unwrap();
        assert!(report.registry.is_empty());
    }

    #[test]
    fn test_malformed_header_is_fatal() {
        let file = write_csv("name,address,port\nauth_devs,pi7.local,5001\n");
        let err = load(file.path()).unwrap_err();
        assert_matches!(err, Error::ConfigLoad { .. });
    }

    #[test]
    fn test_bad_port_row_is_skipped_individually() {
        let file = write_csv(
            "service_name,host,port\n\
             auth_devs,pi7.local,5001\n\
             broken_svc,pi7.local,not-a-port\n\
             network_scan,pi7.local,5002\n",
        );

        let report = load(file.path()).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.registry.resolve("broken_svc").is_none());
        assert!(report.registry.resolve("auth_devs").is_some());
        assert!(report.registry.resolve("network_scan").is_some());
    }

    #[test]
    fn test_out_of_range_port_rows_are_skipped() {
        let file = write_csv(
            "service_name,host,port\n\
             zero_port,pi7.local,0\n\
             too_big,pi7.local,70000\n\
             negative,pi7.local,-1\n\
             ok_svc,pi7.local,65535\n",
        );

        let report = load(file.path()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(
            report.registry.resolve("ok_svc").unwrap(),
            &ServiceRecord::new("pi7.local", 65535)
        );
    }

    #[test]
    fn test_missing_fields_row_is_skipped() {
        let file = write_csv(
            "service_name,host,port\n\
             auth_devs,pi7.local\n\
             ,pi7.local,5001\n\
             network_scan,,5002\n",
        );

        let report = load(file.path()).unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped, 3);
        assert!(report.registry.is_empty());
    }

    #[test]
    fn test_duplicate_name_last_row_wins() {
        let file = write_csv(
            "service_name,host,port\n\
             auth_devs,pi7.local,5001\n\
             auth_devs,pi8.local,6001\n",
        );

        let report = load(file.path()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.overwritten, 1);
        assert_eq!(
            report.registry.resolve("auth_devs").unwrap(),
            &ServiceRecord::new("pi8.local", 6001)
        );
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let file = write_csv(
            "service_name,host,port\n\
             \n\
             auth_devs,pi7.local,5001\n\
             \n",
        );

        let report = load(file.path()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 0);
    }
}
