//! JSON output formatting.

use crate::aggregate::ScanReport;
use crate::error::{OutputError, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the report as an indented JSON array.
pub fn write_json<W: Write>(mut writer: W, report: &ScanReport) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the report as JSON to `path`, replacing any existing file.
pub fn save_json(path: &Path, report: &ScanReport) -> OutputResult<()> {
    let file = File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_json(BufWriter::new(file), report)
}
