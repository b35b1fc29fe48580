//! C++ [`LanguageAnalyzer`] adapter. Delegates to [`CppFrontEnd`] (§4.5)
//! and additionally exposes cache controls and a batch `analyze_all`
//! call, per §4.7's description of the C++ adapter's extra surface.

use crate::compile_commands::CompileCommandsStore;
use crate::core::{AstCache, AstNode, Language, LanguageAnalyzer};
use crate::errors::AnalysisError;
use crate::frontend::CppFrontEnd;
use crate::log_identifier::LogCallIdentifier;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const EXTENSIONS: &[&str] = &[".cpp", ".cc", ".cxx", ".h", ".hpp", ".hxx"];

pub struct CppAnalyzer {
    front_end: CppFrontEnd,
    identifier: Arc<LogCallIdentifier>,
    cache: Option<Arc<AstCache>>,
    compile_commands: Option<Arc<CompileCommandsStore>>,
    results: Vec<Arc<AstNode>>,
    parallel_enabled: bool,
    max_threads: usize,
    files_analyzed: AtomicU64,
    parse_errors: AtomicU64,
}

impl CppAnalyzer {
    pub fn new(identifier: Arc<LogCallIdentifier>) -> Self {
        Self {
            front_end: CppFrontEnd::new(),
            identifier,
            cache: None,
            compile_commands: None,
            results: Vec::new(),
            parallel_enabled: true,
            max_threads: 0,
            files_analyzed: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
        }
    }

    pub fn with_cache(mut self, cache: Arc<AstCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_compile_commands(mut self, store: Arc<CompileCommandsStore>) -> Self {
        self.compile_commands = Some(store);
        self
    }

    /// Analyzes every file in `paths`, honoring the "≤ 1 element always
    /// serial" rule (§9) regardless of `parallel_enabled`.
    pub fn analyze_all(&mut self, paths: &[std::path::PathBuf]) -> Result<(), AnalysisError> {
        if paths.len() <= 1 || !self.parallel_enabled {
            for path in paths {
                self.analyze(path)?;
            }
            return Ok(());
        }

        use rayon::prelude::*;
        let identifier = self.identifier.clone();
        let front_end = CppFrontEnd::new();
        let outcomes: Vec<Result<Vec<Arc<AstNode>>, AnalysisError>> = paths
            .par_iter()
            .map(|path| analyze_one(&front_end, &identifier, path, self.compile_args(path)))
            .collect();

        for outcome in outcomes {
            match outcome {
                Ok(nodes) => {
                    self.files_analyzed.fetch_add(1, Ordering::Relaxed);
                    self.results.extend(nodes);
                }
                Err(_) => {
                    self.parse_errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        Ok(())
    }

    fn compile_args(&self, path: &Path) -> Vec<String> {
        self.compile_commands
            .as_ref()
            .map(|store| store.get_compiler_args(path))
            .unwrap_or_default()
    }
}

fn analyze_one(
    front_end: &CppFrontEnd,
    identifier: &LogCallIdentifier,
    path: &Path,
    compile_args: Vec<String>,
) -> Result<Vec<Arc<AstNode>>, AnalysisError> {
    let content = std::fs::read_to_string(path).map_err(AnalysisError::Io)?;
    front_end.parse(path, &content, identifier, &compile_args)
}

impl LanguageAnalyzer for CppAnalyzer {
    fn analyze(&mut self, file_path: &Path) -> Result<bool, AnalysisError> {
        if let Some(cache) = &self.cache {
            let content = std::fs::read_to_string(file_path).map_err(AnalysisError::Io)?;
            if let Some(root) = cache.get(file_path, &content) {
                self.files_analyzed.fetch_add(1, Ordering::Relaxed);
                self.results.push(root);
                return Ok(true);
            }
            let compile_args = self.compile_args(file_path);
            let roots = self
                .front_end
                .parse(file_path, &content, &self.identifier, &compile_args)
                .map_err(|e| {
                    self.parse_errors.fetch_add(1, Ordering::Relaxed);
                    e
                })?;
            let deps = crate::core::cache::scan_include_dependencies(
                &content,
                file_path.parent().unwrap_or(file_path),
                &[],
            );
            if let Some(first) = roots.first() {
                cache.insert(file_path.to_path_buf(), &content, first.clone(), deps);
            }
            self.files_analyzed.fetch_add(1, Ordering::Relaxed);
            self.results.extend(roots);
            return Ok(true);
        }

        match analyze_one(&self.front_end, &self.identifier, file_path, self.compile_args(file_path)) {
            Ok(nodes) => {
                self.files_analyzed.fetch_add(1, Ordering::Relaxed);
                self.results.extend(nodes);
                Ok(true)
            }
            Err(e) => {
                self.parse_errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    fn results(&self) -> &[Arc<AstNode>] {
        &self.results
    }

    fn clear(&mut self) {
        self.results.clear();
        self.files_analyzed.store(0, Ordering::Relaxed);
        self.parse_errors.store(0, Ordering::Relaxed);
    }

    fn language_name(&self) -> &'static str {
        "C++"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn supported_extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn set_parallel_mode(&mut self, enabled: bool, max_threads: usize) {
        self.parallel_enabled = enabled;
        self.max_threads = max_threads;
    }

    fn statistics(&self) -> String {
        format!(
            "C++ analyzer: {} files analyzed, {} parse errors, {} functions found",
            self.files_analyzed.load(Ordering::Relaxed),
            self.parse_errors.load(Ordering::Relaxed),
            self.results.len()
        )
    }

    fn language(&self) -> Language {
        Language::Cpp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_identifier::LogCallIdentifier;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("dlogcover-cpp-analyzer-{}.cpp", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn analyze_single_file_populates_results() {
        let identifier = Arc::new(
            LogCallIdentifier::new()
                .with_qt_functions(&["qDebug".to_string()])
                .build(),
        );
        let mut analyzer = CppAnalyzer::new(identifier);
        let path = write_temp("void f(){ qDebug() << \"x\"; }");
        assert!(analyzer.analyze(&path).unwrap());
        assert_eq!(analyzer.results().len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn clear_resets_results_and_counters() {
        let identifier = Arc::new(LogCallIdentifier::new().build());
        let mut analyzer = CppAnalyzer::new(identifier);
        let path = write_temp("void f(){}");
        analyzer.analyze(&path).unwrap();
        analyzer.clear();
        assert!(analyzer.results().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn single_file_analyze_all_uses_serial_path() {
        // Regression coverage for the historical deadlock: ≤1 input must
        // never dispatch through the parallel path.
        let identifier = Arc::new(LogCallIdentifier::new().build());
        let mut analyzer = CppAnalyzer::new(identifier);
        let path = write_temp("void f(){}");
        analyzer.analyze_all(&[path.clone()]).unwrap();
        assert_eq!(analyzer.results().len(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
