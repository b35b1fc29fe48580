//! Error types and batch-analysis error handling.
//!
//! Analysis of a source tree is a batch operation over many independently
//! fallible files: a single unreadable or unparsable file should not abort
//! the run. This module separates two concerns:
//!
//! - [`AnalysisError`]: the typed, structured error enum returned by
//!   fallible operations (config loading, compile-commands parsing, the Go
//!   bridge, cache I/O). Library code returns `Result<T, AnalysisError>`.
//! - [`collection::AnalysisResults`]: the "fail completely" pattern for
//!   batch operations - collect every success and every failure instead of
//!   stopping at the first one, then report a summary.

pub mod collection;
pub mod partition;
pub mod reporting;
pub mod summary;

pub use collection::{AnalysisFailure, AnalysisResults, OperationType};
pub use partition::{ParPartitionResult, PartitionResult};
pub use reporting::{report_brief_summary, report_completion_summary};
pub use summary::ErrorSummary;

use std::path::PathBuf;
use thiserror::Error;

/// Structured error type covering every fallible operation in the analysis
/// pipeline. CLI-boundary code wraps this in `anyhow::Error` via `?`;
/// library code matches on variants to decide exit codes.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("project directory does not exist: {0}")]
    ProjectDirectoryMissing(PathBuf),

    #[error("no source files found matching configured scan directories and extensions")]
    NoSourceFiles,

    #[error("failed to read compile_commands.json at {path}: {source}")]
    CompileCommandsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse compile_commands.json at {path}: {source}")]
    CompileCommandsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid compile_commands.json at {path}: {message}")]
    CompileCommandsInvalid { path: PathBuf, message: String },

    #[error("failed to generate compile_commands.json via cmake: {0}")]
    CompileCommandsGenerate(String),

    #[error("failed to parse {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },

    #[error("go analyzer worker failed for {path}: {message}")]
    GoAnalyzerFailure { path: PathBuf, message: String },

    #[error("go analyzer worker binary not found on PATH: {0}")]
    GoAnalyzerNotFound(String),

    #[error("pipeline stage '{stage}' timed out after {timeout_secs}s")]
    StageTimeout { stage: String, timeout_secs: u64 },

    #[error("pipeline timed out after {0}s")]
    PipelineTimeout(u64),

    #[error("failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Maps an error to the process exit code described in the external
    /// interface contract: 0 success, 1 configuration error, 2
    /// source-enumeration error, 3 parse/analysis fatal error, 4 I/O error
    /// writing the report.
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalysisError::ConfigRead { .. }
            | AnalysisError::ConfigParse { .. }
            | AnalysisError::ConfigInvalid(_)
            | AnalysisError::ProjectDirectoryMissing(_) => 1,
            AnalysisError::NoSourceFiles => 2,
            AnalysisError::CompileCommandsRead { .. }
            | AnalysisError::CompileCommandsParse { .. }
            | AnalysisError::CompileCommandsInvalid { .. }
            | AnalysisError::CompileCommandsGenerate(_)
            | AnalysisError::ParseFailure { .. }
            | AnalysisError::GoAnalyzerFailure { .. }
            | AnalysisError::GoAnalyzerNotFound(_)
            | AnalysisError::StageTimeout { .. }
            | AnalysisError::PipelineTimeout(_)
            | AnalysisError::Io(_) => 3,
            AnalysisError::ReportWrite { .. } | AnalysisError::ReportSerialize(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_code_one() {
        let err = AnalysisError::ConfigInvalid("missing project.name".into());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn no_source_files_exit_code_two() {
        let err = AnalysisError::NoSourceFiles;
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn parse_failure_exit_code_three() {
        let err = AnalysisError::ParseFailure {
            path: PathBuf::from("a.cpp"),
            message: "bad token".into(),
        };
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn report_write_exit_code_four() {
        let err = AnalysisError::ReportWrite {
            path: PathBuf::from("report.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.exit_code(), 4);
    }
}
