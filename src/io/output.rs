//! Report writers (§4.15): JSON and text, built from the coverage
//! calculator's output. Both gate uncovered-path detail on
//! `output.show_uncovered_paths_details`.

use crate::coverage::{AxisConfig, CoverageStats};
use crate::errors::AnalysisError;
use crate::formatting::{ColoredFormatter, FormattingConfig, OutputFormatter, PlainFormatter};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub stats: CoverageStats,
    pub overall_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub files: Vec<FileReport>,
    pub overall: CoverageStats,
    pub overall_ratio: f64,
}

impl CoverageReport {
    pub fn build(per_file: Vec<(PathBuf, CoverageStats)>, overall: CoverageStats, axes: &AxisConfig) -> Self {
        let overall_ratio = overall.overall_ratio(axes);
        let files = per_file
            .into_iter()
            .map(|(path, stats)| {
                let overall_ratio = stats.overall_ratio(axes);
                FileReport {
                    path,
                    stats,
                    overall_ratio,
                }
            })
            .collect();
        Self {
            files,
            overall,
            overall_ratio,
        }
    }
}

pub trait ReportWriter {
    fn write_report(&self, report: &CoverageReport, show_uncovered_paths_details: bool) -> Result<String, AnalysisError>;
}

pub struct JsonWriter;

impl ReportWriter for JsonWriter {
    fn write_report(&self, report: &CoverageReport, show_uncovered_paths_details: bool) -> Result<String, AnalysisError> {
        if show_uncovered_paths_details {
            serde_json::to_string_pretty(report).map_err(AnalysisError::ReportSerialize)
        } else {
            let mut stripped = report.clone();
            stripped.overall.uncovered_paths.clear();
            for file in &mut stripped.files {
                file.stats.uncovered_paths.clear();
            }
            serde_json::to_string_pretty(&stripped).map_err(AnalysisError::ReportSerialize)
        }
    }
}

pub struct TextWriter;

/// Picks a colored or plain formatter for the overall-coverage line based
/// on `NO_COLOR`/`CLICOLOR`/`CLICOLOR_FORCE` and whether stdout is a TTY.
fn formatter() -> Box<dyn OutputFormatter> {
    let config = FormattingConfig::from_env();
    if config.color.should_use_color() {
        Box::new(ColoredFormatter::new(config))
    } else {
        Box::new(PlainFormatter)
    }
}

impl ReportWriter for TextWriter {
    fn write_report(&self, report: &CoverageReport, show_uncovered_paths_details: bool) -> Result<String, AnalysisError> {
        let fmt = formatter();
        let mut out = String::new();
        out.push_str(&fmt.header("DLogCover Coverage Report"));
        out.push('\n');
        out.push_str("=========================\n\n");
        let overall_line = format!("Overall coverage: {:.1}%", report.overall_ratio * 100.0);
        let overall_line = if report.overall_ratio >= 0.8 {
            fmt.success(&overall_line)
        } else if report.overall_ratio >= 0.5 {
            fmt.warning(&overall_line)
        } else {
            fmt.error(&overall_line)
        };
        out.push_str(&overall_line);
        out.push('\n');
        write_axis_line(&mut out, "Function", report.overall.function.ratio());
        write_axis_line(&mut out, "Branch", report.overall.branch.ratio());
        write_axis_line(&mut out, "Exception", report.overall.exception.ratio());
        write_axis_line(&mut out, "Key-path", report.overall.key_path.ratio());
        out.push('\n');

        for file in &report.files {
            out.push_str(&format!(
                "{}: {:.1}%\n",
                file.path.display(),
                file.overall_ratio * 100.0
            ));
            if show_uncovered_paths_details {
                for uncovered in &file.stats.uncovered_paths {
                    out.push_str(&format!(
                        "    uncovered {:?} {:?} at {}:{} — {}\n",
                        uncovered.axis,
                        uncovered.kind,
                        uncovered.location.file.display(),
                        uncovered.location.line,
                        uncovered.suggestion
                    ));
                }
            }
        }
        Ok(out)
    }
}

fn write_axis_line(out: &mut String, label: &str, ratio: f64) {
    out.push_str(&format!("  {label}: {:.1}%\n", ratio * 100.0));
}

/// Writes a pre-rendered report to a file or stdout, keeping formatting
/// logic separate from the I/O at the edges.
pub fn write_to(destination: Option<&std::path::Path>, contents: &str) -> Result<(), AnalysisError> {
    match destination {
        Some(path) => std::fs::write(path, contents).map_err(|e| AnalysisError::ReportWrite {
            path: path.to_path_buf(),
            source: e,
        }),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(contents.as_bytes())
                .map_err(|e| AnalysisError::ReportWrite {
                    path: PathBuf::from("<stdout>"),
                    source: e,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::AxisStats;

    fn sample_report() -> CoverageReport {
        let mut overall = CoverageStats::default();
        overall.function = AxisStats { total: 2, covered: 1 };
        let axes = AxisConfig::default();
        CoverageReport::build(
            vec![(PathBuf::from("a.cpp"), overall.clone())],
            overall,
            &axes,
        )
    }

    #[test]
    fn json_writer_produces_parseable_json() {
        let report = sample_report();
        let json = JsonWriter.write_report(&report, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("overall_ratio").is_some());
    }

    #[test]
    fn json_writer_strips_uncovered_paths_when_disabled() {
        let mut report = sample_report();
        report.overall.uncovered_paths.push(crate::coverage::UncoveredPath {
            axis: crate::coverage::CoverageAxis::Function,
            kind: crate::core::NodeKind::Function,
            location: crate::core::SourceLocation::new(PathBuf::from("a.cpp"), 1, 1),
            name: "f".into(),
            text: String::new(),
            suggestion: "add logging".into(),
        });
        let json = JsonWriter.write_report(&report, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["overall"]["uncovered_paths"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn text_writer_includes_overall_percentage() {
        let report = sample_report();
        let text = TextWriter.write_report(&report, false).unwrap();
        assert!(text.contains("Overall coverage"));
    }
}
