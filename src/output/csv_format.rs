//! CSV output formatting.

use crate::aggregate::ScanReport;
use crate::error::{OutputError, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write the report as CSV, one row per host. List columns are joined
/// with `;` so they survive spreadsheet import.
pub fn write_csv<W: Write>(writer: W, report: &ScanReport) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["ip", "hostname", "open_ports", "services"])?;

    for host in report.hosts() {
        let ports: Vec<String> = host.open_ports().iter().map(|p| p.to_string()).collect();
        let ports = ports.join(";");
        let services = host.services().join(";");
        wtr.write_record([
            host.address(),
            host.hostname().unwrap_or(""),
            ports.as_str(),
            services.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the report as CSV to `path`, replacing any existing file.
pub fn save_csv(path: &Path, report: &ScanReport) -> OutputResult<()> {
    let file = File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, report)
}
