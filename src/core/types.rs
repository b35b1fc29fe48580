//! Common type definitions shared across the analysis engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source language of an analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Cpp,
    Go,
}

impl Language {
    /// File extensions recognized for this language during source collection.
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Cpp => &["cpp", "cc", "cxx", "h", "hpp", "hxx"],
            Language::Go => &["go"],
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Language::Cpp => "C++",
            Language::Go => "Go",
        }
    }

    /// Determine the language of a file from its extension, if recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lower = ext.to_ascii_lowercase();
        if Language::Cpp.extensions().contains(&lower.as_str()) {
            Some(Language::Cpp)
        } else if Language::Go.extensions().contains(&lower.as_str()) {
            Some(Language::Go)
        } else {
            None
        }
    }
}

/// A position in a source file, used for both AST node locations and
/// reported uncovered-path locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
}

impl SourceLocation {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }
}

/// Log severity levels recognized across the Qt and custom logging
/// function families. Ordering matches increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}
