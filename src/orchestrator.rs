//! Multi-language dispatcher and run orchestrator.
//!
//! A thin "Shell" layer (small, named stages, each doing one I/O or
//! dispatch step) that decides which
//! language analyzer(s) to build from `analysis.mode`, runs them over the
//! collected sources, and hands the aggregated node forest to the
//! coverage calculator. Heavy lifting stays in `analyzers`, `coverage`,
//! and `io::walker`; this module only wires them together.

use crate::analyzers::{build_identifier, CppAnalyzer, GoAnalyzerAdapter};
use crate::compile_commands::CompileCommandsStore;
use crate::config::{AnalysisConfig, AnalysisMode, Config};
use crate::core::{AstCache, AstCacheConfig, AstNode, Language, LanguageAnalyzer};
use crate::coverage::{AxisConfig, CoverageCalculator, CoverageStats};
use crate::errors::{AnalysisError, AnalysisFailure, OperationType};
use crate::io::walker::SourceCollector;
use crate::observability::{set_phase, set_phase_persistent, AnalysisPhase};
use crate::pipeline::SourceFileInfo;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Informational verdict from the auto-detect sampling heuristic (§4.11).
/// Never changes which analyzer a file is routed to — every file is
/// still dispatched by its own extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantLanguage {
    Cpp,
    Go,
    Mixed,
    Unknown,
}

/// Samples up to `sample_size` collected files and reports the dominant
/// language if at least `confidence_threshold` of the sample agrees.
pub fn detect_dominant_language(
    sources: &[SourceFileInfo],
    sample_size: usize,
    confidence_threshold: f64,
) -> DominantLanguage {
    let sample_len = sources.len().min(sample_size);
    let sample = &sources[..sample_len];

    let mut cpp = 0usize;
    let mut go = 0usize;
    for info in sample {
        match language_of(&info.absolute_path) {
            Some(Language::Cpp) => cpp += 1,
            Some(Language::Go) => go += 1,
            None => {}
        }
    }

    let total = cpp + go;
    if total == 0 {
        return DominantLanguage::Unknown;
    }
    if cpp as f64 / total as f64 >= confidence_threshold {
        DominantLanguage::Cpp
    } else if go as f64 / total as f64 >= confidence_threshold {
        DominantLanguage::Go
    } else {
        DominantLanguage::Mixed
    }
}

fn language_of(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;
    Language::from_extension(ext)
}

fn partition_by_language(sources: &[SourceFileInfo]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut cpp = Vec::new();
    let mut go = Vec::new();
    for info in sources {
        match language_of(&info.absolute_path) {
            Some(Language::Cpp) => cpp.push(info.absolute_path.clone()),
            Some(Language::Go) => go.push(info.absolute_path.clone()),
            None => {}
        }
    }
    (cpp, go)
}

fn group_by_file(nodes: &[Arc<AstNode>], by_file: &mut HashMap<PathBuf, Vec<Arc<AstNode>>>) {
    for node in nodes {
        by_file
            .entry(node.location.file.clone())
            .or_default()
            .push(node.clone());
    }
}

/// Records a batch-level failure when an adapter's `analyze_all` bails
/// out early. Per-file parse failures that don't abort the whole batch
/// are already reflected in the adapter's own statistics.
fn record_batch_failure(
    failures: &mut Vec<AnalysisFailure>,
    paths: &[PathBuf],
    result: Result<(), AnalysisError>,
) {
    if let Err(e) = result {
        failures.push(AnalysisFailure::new(
            paths.first().cloned().unwrap_or_default(),
            OperationType::Analysis,
            anyhow::anyhow!(e.to_string()),
        ));
    }
}

fn axis_config(analysis: &AnalysisConfig) -> AxisConfig {
    AxisConfig {
        function: analysis.function_coverage,
        branch: analysis.branch_coverage,
        exception: analysis.exception_coverage,
        key_path: analysis.key_path_coverage,
    }
}

/// Owns the analyzer(s) selected by `analysis.mode` and runs them over a
/// set of collected sources.
///
/// Implements the bypass rule from §4.11: `cpp_only` and `go_only` call
/// each adapter's own batch `analyze_all` directly rather than routing
/// through the generic three-stage pipeline, preserving the adapter's own
/// cache/compile-commands optimizations. `auto_detect` constructs both
/// adapters and, when parallel analysis is enabled, runs the C++ set and
/// the Go set concurrently on two threads.
pub struct LanguageDispatcher {
    cpp: Option<CppAnalyzer>,
    go: Option<GoAnalyzerAdapter>,
}

impl LanguageDispatcher {
    pub fn new(
        config: &Config,
        cache: Option<Arc<AstCache>>,
        compile_commands: Option<Arc<CompileCommandsStore>>,
    ) -> Self {
        let identifier = Arc::new(build_identifier(config));

        let cpp = (!matches!(config.analysis.mode, AnalysisMode::GoOnly)).then(|| {
            let mut analyzer = CppAnalyzer::new(identifier);
            if let Some(cache) = cache {
                analyzer = analyzer.with_cache(cache);
            }
            if let Some(store) = compile_commands {
                analyzer = analyzer.with_compile_commands(store);
            }
            analyzer.set_parallel_mode(
                config.performance.enable_parallel_analysis,
                config.performance.max_threads,
            );
            analyzer
        });

        let go = (!matches!(config.analysis.mode, AnalysisMode::CppOnly)).then(|| {
            let mut adapter = GoAnalyzerAdapter::new(config);
            adapter.set_parallel_mode(
                config.performance.enable_parallel_analysis,
                config.performance.max_threads,
            );
            adapter
        });

        Self { cpp, go }
    }

    /// Splits `sources` by language, analyzes each set through its own
    /// adapter, and returns the aggregated node forest keyed by file plus
    /// any batch-level failures.
    pub fn analyze(
        &mut self,
        sources: &[SourceFileInfo],
        parallel: bool,
    ) -> (HashMap<PathBuf, Vec<Arc<AstNode>>>, Vec<AnalysisFailure>) {
        let (cpp_paths, go_paths) = partition_by_language(sources);
        let mut failures = Vec::new();

        if parallel && self.cpp.is_some() && self.go.is_some() {
            let cpp = self.cpp.as_mut().unwrap();
            let go = self.go.as_mut().unwrap();
            let (cpp_result, go_result) = std::thread::scope(|scope| {
                let cpp_handle = scope.spawn(|| cpp.analyze_all(&cpp_paths));
                let go_handle = scope.spawn(|| go.analyze_all(&go_paths));
                (
                    cpp_handle.join().expect("cpp analysis thread panicked"),
                    go_handle.join().expect("go analysis thread panicked"),
                )
            });
            record_batch_failure(&mut failures, &cpp_paths, cpp_result);
            record_batch_failure(&mut failures, &go_paths, go_result);
        } else {
            if let Some(cpp) = self.cpp.as_mut() {
                let result = cpp.analyze_all(&cpp_paths);
                record_batch_failure(&mut failures, &cpp_paths, result);
            }
            if let Some(go) = self.go.as_mut() {
                let result = go.analyze_all(&go_paths);
                record_batch_failure(&mut failures, &go_paths, result);
            }
        }

        let mut by_file: HashMap<PathBuf, Vec<Arc<AstNode>>> = HashMap::new();
        if let Some(cpp) = &self.cpp {
            group_by_file(cpp.results(), &mut by_file);
        }
        if let Some(go) = &self.go {
            group_by_file(go.results(), &mut by_file);
        }

        (by_file, failures)
    }

    /// One human-readable statistics line per active analyzer, matching
    /// the AST cache stats text format described in §6.4.
    pub fn statistics(&self) -> Vec<String> {
        let mut stats = Vec::new();
        if let Some(cpp) = &self.cpp {
            stats.push(cpp.statistics());
        }
        if let Some(go) = &self.go {
            stats.push(go.statistics());
        }
        stats
    }
}

/// Outcome of one orchestrator run, ready to be handed to a report writer.
pub struct OrchestratorRun {
    pub per_file: Vec<(PathBuf, CoverageStats)>,
    pub overall: CoverageStats,
    pub overall_ratio: f64,
    pub failures: Vec<AnalysisFailure>,
    pub dominant_language: DominantLanguage,
    pub analyzer_statistics: Vec<String>,
}

/// Owns one frozen `Config` snapshot and runs the full analysis sequence
/// described in §4.11: load/validate config (already done by
/// `Config::load`) → enumerate sources → dispatch → drain → feed the
/// coverage calculator → return results.
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<OrchestratorRun, AnalysisError> {
        let collected = {
            let _phase = set_phase(AnalysisPhase::SourceCollection);
            SourceCollector::new(&self.config).collect()
        };
        if collected.successes.is_empty() {
            return Err(AnalysisError::NoSourceFiles);
        }

        set_phase_persistent(AnalysisPhase::CompileCommandsLoad);
        let compile_commands = self.load_compile_commands()?;
        let cache = self.build_cache();

        let dominant_language = if self.config.analysis.mode == AnalysisMode::AutoDetect {
            detect_dominant_language(
                &collected.successes,
                self.config.analysis.auto_detection.sample_size,
                self.config.analysis.auto_detection.confidence_threshold,
            )
        } else {
            DominantLanguage::Unknown
        };

        set_phase_persistent(AnalysisPhase::AstParsing);
        let mut dispatcher = LanguageDispatcher::new(&self.config, cache, compile_commands);
        let (by_file, mut failures) = dispatcher.analyze(
            &collected.successes,
            self.config.performance.enable_parallel_analysis,
        );
        failures.extend(collected.failures);

        set_phase_persistent(AnalysisPhase::CoverageAggregation);
        let axes = axis_config(&self.config.analysis);
        let calculator = CoverageCalculator::new(axes);
        let per_file: Vec<(PathBuf, CoverageStats)> = by_file
            .into_iter()
            .map(|(path, roots)| (path, calculator.compute_file(&roots)))
            .collect();
        let per_file_stats: Vec<CoverageStats> =
            per_file.iter().map(|(_, stats)| stats.clone()).collect();
        let overall = calculator.aggregate(&per_file_stats);
        let overall_ratio = overall.overall_ratio(&axes);

        Ok(OrchestratorRun {
            analyzer_statistics: dispatcher.statistics(),
            per_file,
            overall,
            overall_ratio,
            failures,
            dominant_language,
        })
    }

    fn load_compile_commands(&self) -> Result<Option<Arc<CompileCommandsStore>>, AnalysisError> {
        if matches!(self.config.analysis.mode, AnalysisMode::GoOnly) {
            return Ok(None);
        }
        if let Some(path) = &self.config.compile_commands.path {
            return CompileCommandsStore::load(path).map(Arc::new).map(Some);
        }
        if self.config.compile_commands.auto_generate {
            let build_dir = self
                .config
                .project
                .build_directory
                .clone()
                .unwrap_or_else(|| self.config.project.directory.join("build"));
            return CompileCommandsStore::generate(
                &self.config.project.directory,
                &build_dir,
                &self.config.compile_commands.cmake_args,
            )
            .map(Arc::new)
            .map(Some);
        }
        Ok(None)
    }

    fn build_cache(&self) -> Option<Arc<AstCache>> {
        if !self.config.performance.enable_ast_cache {
            return None;
        }
        let cache_config = AstCacheConfig {
            max_entries: self.config.performance.max_cache_size,
            ..AstCacheConfig::default()
        };
        Some(Arc::new(AstCache::new(cache_config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> SourceFileInfo {
        SourceFileInfo {
            absolute_path: PathBuf::from(path),
            relative_path: PathBuf::from(path),
            content: String::new(),
            size_bytes: 0,
            is_header: false,
        }
    }

    #[test]
    fn dominant_language_detected_above_threshold() {
        let sources = vec![file("a.cpp"), file("b.cpp"), file("c.cpp"), file("d.go")];
        let verdict = detect_dominant_language(&sources, 50, 0.7);
        assert_eq!(verdict, DominantLanguage::Cpp);
    }

    #[test]
    fn mixed_language_below_threshold() {
        let sources = vec![file("a.cpp"), file("b.go")];
        let verdict = detect_dominant_language(&sources, 50, 0.8);
        assert_eq!(verdict, DominantLanguage::Mixed);
    }

    #[test]
    fn sample_size_limits_inspected_files() {
        let sources = vec![file("a.go"), file("b.cpp"), file("c.cpp"), file("d.cpp")];
        // Only the first file (a .go file) is sampled, so it should read
        // as dominant despite being outnumbered overall.
        let verdict = detect_dominant_language(&sources, 1, 0.5);
        assert_eq!(verdict, DominantLanguage::Go);
    }

    #[test]
    fn partition_splits_by_extension() {
        let sources = vec![file("a.cpp"), file("b.go"), file("c.h")];
        let (cpp, go) = partition_by_language(&sources);
        assert_eq!(cpp.len(), 2);
        assert_eq!(go.len(), 1);
    }

    #[test]
    fn dispatcher_skips_go_analyzer_in_cpp_only_mode() {
        let mut config = Config::default();
        config.analysis.mode = AnalysisMode::CppOnly;
        let dispatcher = LanguageDispatcher::new(&config, None, None);
        assert!(dispatcher.go.is_none());
        assert!(dispatcher.cpp.is_some());
    }

    #[test]
    fn orchestrator_reports_no_source_files_on_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.project.directory = dir.path().to_path_buf();
        config.scan.directories = vec![PathBuf::from(".")];
        let orchestrator = Orchestrator::new(config);
        let err = orchestrator.run().unwrap_err();
        assert!(matches!(err, AnalysisError::NoSourceFiles));
    }

    #[test]
    fn orchestrator_runs_end_to_end_over_a_single_cpp_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("main.cpp"),
            "void f() { qDebug() << \"hi\"; }",
        )
        .unwrap();

        let mut config = Config::default();
        config.project.directory = dir.path().to_path_buf();
        config.scan.directories = vec![PathBuf::from(".")];
        config.scan.file_extensions = vec![".cpp".to_string()];
        config.performance.enable_parallel_analysis = false;

        let orchestrator = Orchestrator::new(config);
        let run = orchestrator.run().unwrap();
        assert_eq!(run.per_file.len(), 1);
        assert_eq!(run.overall.function.total, 1);
        assert_eq!(run.overall.function.covered, 1);
    }
}
