//! Envelopes carried between pipeline stages.

use crate::core::ParsedAst;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Packet<T> {
    pub payload: T,
    pub timestamp: Instant,
    pub stage_id: &'static str,
    pub source_file: PathBuf,
}

impl<T> Packet<T> {
    pub fn new(payload: T, stage_id: &'static str, source_file: PathBuf) -> Self {
        Self {
            payload,
            timestamp: Instant::now(),
            stage_id,
            source_file,
        }
    }
}

/// Input to the parse stage.
#[derive(Debug, Clone)]
pub struct SourceFileInfo {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub content: String,
    pub size_bytes: u64,
    pub is_header: bool,
}

/// Output of the parse stage / input to decomposition.
#[derive(Debug, Clone)]
pub struct ParsedAstInfo {
    pub file: PathBuf,
    pub ast: Arc<ParsedAst>,
}

/// One function's work item, produced by decomposition and consumed by
/// analysis. Carries a strong reference to its parent AST so the AST
/// outlives every task spawned from it.
#[derive(Debug, Clone)]
pub struct FunctionTask {
    pub function_name: String,
    pub file_path: PathBuf,
    pub ast_info: Arc<ParsedAst>,
    pub complexity: u32,
    pub priority: u32,
}

impl PartialEq for FunctionTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for FunctionTask {}
impl PartialOrd for FunctionTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FunctionTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority)
    }
}
