//! Input/output operations at the system boundary.
//!
//! This module keeps I/O — source-tree enumeration, report writing, plain
//! file access — out of the analysis core. [`walker`] implements the
//! Source Collector (§4.13); [`output`] implements the report writers
//! (§4.15).
//!
//! # Key Components
//!
//! - **File operations**: read, write, and check file/directory existence
//! - **Source collection**: enumerate files under configured scan roots
//! - **Report writers**: JSON and text coverage report rendering

pub mod output;
pub mod walker;

pub use output::{CoverageReport, FileReport, JsonWriter, ReportWriter, TextWriter};
pub use walker::{pattern_to_regex, SourceCollector};

use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn read_file(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

pub fn dir_exists(path: &Path) -> bool {
    path.exists() && path.is_dir()
}
