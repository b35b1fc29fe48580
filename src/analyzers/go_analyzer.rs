//! Go [`LanguageAnalyzer`] adapter. Delegates to [`GoAnalyzerBridge`]
//! (§4.6); disabled whenever no worker binary can be found, in which
//! case every file is skipped rather than failed.

use crate::config::Config;
use crate::core::{AstNode, Language, LanguageAnalyzer};
use crate::errors::AnalysisError;
use crate::go_bridge::{GoAnalyzerBridge, GoAnalyzerConfig};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const EXTENSIONS: &[&str] = &[".go"];

pub struct GoAnalyzerAdapter {
    bridge: GoAnalyzerBridge,
    config: GoAnalyzerConfig,
    results: Vec<Arc<AstNode>>,
    parallel_enabled: bool,
    max_threads: usize,
    files_analyzed: AtomicU64,
}

impl GoAnalyzerAdapter {
    pub fn new(config: &Config) -> Self {
        Self {
            bridge: GoAnalyzerBridge::new(),
            config: go_analyzer_config_from(config),
            results: Vec::new(),
            parallel_enabled: true,
            max_threads: 0,
            files_analyzed: AtomicU64::new(0),
        }
    }

    /// Batch-analyzes `paths` in one worker invocation, honoring the
    /// "≤ 1 element always serial" rule by delegating to the single-file
    /// path when there's nothing to parallelize.
    pub fn analyze_all(&mut self, paths: &[std::path::PathBuf]) -> Result<(), AnalysisError> {
        if paths.len() <= 1 {
            for path in paths {
                self.analyze(path)?;
            }
            return Ok(());
        }

        let parallel = if self.parallel_enabled {
            self.max_threads
        } else {
            1
        };
        let by_file = self.bridge.analyze_batch(paths, parallel, &self.config)?;
        for path in paths {
            if let Some(nodes) = by_file.get(path) {
                self.files_analyzed.fetch_add(1, Ordering::Relaxed);
                self.results.extend(nodes.clone());
            }
        }
        Ok(())
    }
}

fn go_analyzer_config_from(config: &Config) -> GoAnalyzerConfig {
    GoAnalyzerConfig {
        standard_log: Some((
            config.go.standard_log.enabled,
            config.go.standard_log.functions.clone(),
        )),
        logrus: Some((config.go.logrus.enabled, config.go.logrus.functions.clone())),
        zap: Some((
            config.go.zap.enabled,
            config.go.zap.logger_functions.clone(),
        )),
        golib: Some((config.go.golib.enabled, config.go.golib.functions.clone())),
    }
}

impl LanguageAnalyzer for GoAnalyzerAdapter {
    fn analyze(&mut self, file_path: &Path) -> Result<bool, AnalysisError> {
        let nodes = self.bridge.analyze_file(file_path, &self.config)?;
        if self.bridge.is_enabled() {
            self.files_analyzed.fetch_add(1, Ordering::Relaxed);
        }
        self.results.extend(nodes);
        Ok(true)
    }

    fn results(&self) -> &[Arc<AstNode>] {
        &self.results
    }

    fn clear(&mut self) {
        self.results.clear();
        self.files_analyzed.store(0, Ordering::Relaxed);
    }

    fn language_name(&self) -> &'static str {
        "Go"
    }

    fn is_enabled(&self) -> bool {
        self.bridge.is_enabled()
    }

    fn supported_extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn set_parallel_mode(&mut self, enabled: bool, max_threads: usize) {
        self.parallel_enabled = enabled;
        self.max_threads = max_threads;
    }

    fn statistics(&self) -> String {
        let stats = self.bridge.cache_stats();
        format!(
            "Go analyzer: enabled={}, {} files analyzed, cache hits={}, misses={}",
            self.bridge.is_enabled(),
            self.files_analyzed.load(Ordering::Relaxed),
            stats.hits,
            stats.misses
        )
    }

    fn language(&self) -> Language {
        Language::Go
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_adapter_skips_file_without_error() {
        let config = Config::default();
        let mut adapter = GoAnalyzerAdapter::new(&config);
        let result = adapter.analyze(Path::new("main.go")).unwrap();
        assert!(result);
        assert!(adapter.results().is_empty());
    }
}
