//! Out-of-process Go analyzer bridge.
//!
//! Talks to an external worker binary over the file system: write a JSON
//! request to a temp file, invoke the worker, parse its JSON response
//! from stdout. The worker's absence is the only failure mode that
//! "succeeds" — every Go file is simply skipped and the analyzer reports
//! itself disabled.

use crate::core::{AstNode, LogCallSite, LogLibrary, NodeKind, SourceLocation};
use crate::errors::AnalysisError;
use crate::log_identifier::LogLevel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

const CANDIDATE_SUBDIRS: &[&str] = &["./build/bin/", "./tools/go-analyzer/"];
const WORKER_NAMES: &[&str] = &["dlogcover-go-worker", "go-analyzer"];

#[derive(Debug, Serialize)]
struct GoLibraryConfig {
    enabled: bool,
    functions: Vec<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct GoAnalyzerConfig {
    pub standard_log: Option<(bool, Vec<String>)>,
    pub logrus: Option<(bool, Vec<String>)>,
    pub zap: Option<(bool, Vec<String>, Vec<String>)>,
    pub golib: Option<(bool, Vec<String>)>,
}

#[derive(Debug, Serialize)]
struct SingleRequest<'a> {
    file_path: &'a str,
    config: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    files: &'a [String],
    parallel: usize,
    config: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct LogCallResponse {
    function_name: String,
    library: String,
    level: String,
    line: usize,
    column: usize,
}

#[derive(Debug, Deserialize)]
struct FunctionResponse {
    name: String,
    line: usize,
    column: usize,
    #[serde(default)]
    end_line: usize,
    #[serde(default)]
    end_column: usize,
    has_logging: bool,
    #[serde(default)]
    log_calls: Vec<LogCallResponse>,
}

#[derive(Debug, Deserialize)]
struct WorkerResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    functions: Vec<FunctionResponse>,
}

#[derive(Debug, Deserialize)]
struct BatchWorkerResponse {
    results: Vec<WorkerResponse>,
}

struct BridgeCacheEntry {
    content_hash: String,
    mtime: SystemTime,
    nodes: Vec<Arc<AstNode>>,
}

#[derive(Debug, Clone, Default)]
pub struct BridgeCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bridge to the external Go analyzer worker. Disabled (all calls
/// succeed as no-ops) when no worker binary can be found.
pub struct GoAnalyzerBridge {
    worker_path: Option<PathBuf>,
    cache: Mutex<HashMap<PathBuf, BridgeCacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GoAnalyzerBridge {
    pub fn new() -> Self {
        Self {
            worker_path: find_worker_binary(),
            cache: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.worker_path.is_some()
    }

    pub fn cache_stats(&self) -> BridgeCacheStats {
        BridgeCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Analyzes a single file. Returns `Ok(vec![])` (a no-op skip) when
    /// the worker is absent.
    pub fn analyze_file(
        &self,
        path: &Path,
        config: &GoAnalyzerConfig,
    ) -> Result<Vec<Arc<AstNode>>, AnalysisError> {
        let Some(worker) = &self.worker_path else {
            return Ok(Vec::new());
        };

        let content = std::fs::read_to_string(path).map_err(AnalysisError::Io)?;
        if let Some(cached) = self.cache_lookup(path, &content) {
            return Ok(cached);
        }

        let request = SingleRequest {
            file_path: &path.to_string_lossy(),
            config: config_to_json(config),
        };
        let request_path = write_temp_request(&request)?;

        let output = Command::new(worker)
            .arg(&request_path)
            .output()
            .map_err(|e| AnalysisError::GoAnalyzerFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let _ = std::fs::remove_file(&request_path);

        let response: WorkerResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            AnalysisError::GoAnalyzerFailure {
                path: path.to_path_buf(),
                message: format!("invalid worker response: {e}"),
            }
        })?;

        if !response.success {
            return Err(AnalysisError::GoAnalyzerFailure {
                path: path.to_path_buf(),
                message: response.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let nodes = functions_to_nodes(path, &response.functions);
        self.cache_insert(path, &content, nodes.clone());
        Ok(nodes)
    }

    /// Batch-analyzes a set of files in one worker invocation.
    pub fn analyze_batch(
        &self,
        paths: &[PathBuf],
        parallel: usize,
        config: &GoAnalyzerConfig,
    ) -> Result<HashMap<PathBuf, Vec<Arc<AstNode>>>, AnalysisError> {
        let Some(worker) = &self.worker_path else {
            return Ok(HashMap::new());
        };

        let files: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let request = BatchRequest {
            files: &files,
            parallel,
            config: config_to_json(config),
        };
        let request_path = write_temp_request(&request)?;

        let output = Command::new(worker)
            .arg("--mode=batch")
            .arg(format!("--config={}", request_path.display()))
            .arg(format!("--parallel={parallel}"))
            .arg("--output=json")
            .output()
            .map_err(|e| AnalysisError::GoAnalyzerFailure {
                path: paths.first().cloned().unwrap_or_default(),
                message: e.to_string(),
            })?;
        let _ = std::fs::remove_file(&request_path);

        let batch: BatchWorkerResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            AnalysisError::GoAnalyzerFailure {
                path: paths.first().cloned().unwrap_or_default(),
                message: format!("invalid batch worker response: {e}"),
            }
        })?;

        let mut out = HashMap::new();
        for result in batch.results {
            let Some(file_path) = result.file_path.clone() else {
                continue;
            };
            if !result.success {
                continue;
            }
            let path = PathBuf::from(file_path);
            let nodes = functions_to_nodes(&path, &result.functions);
            out.insert(path, nodes);
        }
        Ok(out)
    }

    fn cache_lookup(&self, path: &Path, content: &str) -> Option<Vec<Arc<AstNode>>> {
        let metadata = std::fs::metadata(path).ok()?;
        let mtime = metadata.modified().ok()?;
        let mut cache = self.cache.lock();
        let entry = cache.get(path)?;
        if entry.mtime == mtime && entry.content_hash == hash_hex(content) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry.nodes.clone())
        } else {
            cache.remove(path);
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    fn cache_insert(&self, path: &Path, content: &str, nodes: Vec<Arc<AstNode>>) {
        let Ok(metadata) = std::fs::metadata(path) else {
            return;
        };
        let Ok(mtime) = metadata.modified() else {
            return;
        };
        self.cache.lock().insert(
            path.to_path_buf(),
            BridgeCacheEntry {
                content_hash: hash_hex(content),
                mtime,
                nodes,
            },
        );
    }
}

impl Default for GoAnalyzerBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn find_worker_binary() -> Option<PathBuf> {
    let exe_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    for name in WORKER_NAMES {
        let beside_exe = exe_dir.join(name);
        if beside_exe.exists() {
            return Some(beside_exe);
        }
        for subdir in CANDIDATE_SUBDIRS {
            let candidate = PathBuf::from(subdir).join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        if let Ok(on_path) = which::which(name) {
            return Some(on_path);
        }
    }
    None
}

fn write_temp_request<T: Serialize>(request: &T) -> Result<PathBuf, AnalysisError> {
    let json = serde_json::to_string(request).map_err(AnalysisError::ReportSerialize)?;
    let mut path = std::env::temp_dir();
    path.push(format!("dlogcover-go-request-{}.json", std::process::id()));
    std::fs::write(&path, json).map_err(AnalysisError::Io)?;
    Ok(path)
}

fn config_to_json(config: &GoAnalyzerConfig) -> serde_json::Value {
    let lib = |enabled: bool, functions: &[String]| {
        serde_json::json!({ "enabled": enabled, "functions": functions })
    };
    let mut obj = serde_json::Map::new();
    if let Some((enabled, functions)) = &config.standard_log {
        obj.insert("standard_log".to_string(), lib(*enabled, functions));
    }
    if let Some((enabled, functions)) = &config.logrus {
        obj.insert("logrus".to_string(), lib(*enabled, functions));
    }
    if let Some((enabled, logger_functions, sugared_functions)) = &config.zap {
        obj.insert(
            "zap".to_string(),
            serde_json::json!({
                "enabled": enabled,
                "logger_functions": logger_functions,
                "sugared_functions": sugared_functions,
            }),
        );
    }
    if let Some((enabled, functions)) = &config.golib {
        obj.insert("golib".to_string(), lib(*enabled, functions));
    }
    serde_json::Value::Object(obj)
}

fn functions_to_nodes(path: &Path, functions: &[FunctionResponse]) -> Vec<Arc<AstNode>> {
    functions
        .iter()
        .map(|f| {
            let mut node = AstNode::leaf(
                NodeKind::Function,
                f.name.clone(),
                SourceLocation::new(path.to_path_buf(), f.line, f.column)
                    .with_end(f.end_line, f.end_column),
            );
            node.children = f
                .log_calls
                .iter()
                .map(|call| {
                    let mut call_node = AstNode::leaf(
                        NodeKind::LogCallExpr,
                        call.function_name.clone(),
                        SourceLocation::new(path.to_path_buf(), call.line, call.column),
                    );
                    call_node.has_logging = true;
                    call_node.log_call = Some(LogCallSite {
                        file: path.to_path_buf(),
                        line: call.line,
                        column: call.column,
                        function_name: call.function_name.clone(),
                        library: go_library(&call.library),
                        level: go_level(&call.level),
                        message: String::new(),
                        shape: crate::core::CallShape::Unknown,
                    });
                    call_node
                })
                .collect();
            node.has_logging = f.has_logging || node.children.iter().any(|c| c.has_logging);
            node
        })
        .map(Arc::new)
        .collect()
}

fn go_library(name: &str) -> LogLibrary {
    match name {
        "slog" => LogLibrary::GoSlog,
        "logrus" => LogLibrary::Logrus,
        "zap" => LogLibrary::Zap,
        "golib" => LogLibrary::Golib,
        _ => LogLibrary::GoStd,
    }
}

fn go_level(name: &str) -> LogLevel {
    match name {
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        "warn" | "warning" => LogLevel::Warning,
        "fatal" => LogLevel::Fatal,
        _ => LogLevel::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_bridge_skips_every_file() {
        // No worker binary exists in the test sandbox's PATH/candidate
        // dirs, so construction should leave the bridge disabled.
        let bridge = GoAnalyzerBridge {
            worker_path: None,
            cache: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        };
        assert!(!bridge.is_enabled());
        let result = bridge
            .analyze_file(Path::new("main.go"), &GoAnalyzerConfig::default())
            .unwrap();
        assert!(result.is_empty());
    }
}
