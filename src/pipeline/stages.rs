//! The three pipeline stages: AST parsing, function decomposition, and
//! function analysis. Each stage is a worker-pool fed by one bounded
//! queue, forwarding its output to the next stage's queue via a
//! callback.

use super::config::{
    complexity_score, CONSTRUCTOR_PRIORITY_BONUS, DESTRUCTOR_PRIORITY_BONUS, MAIN_PRIORITY_BONUS,
};
use super::packet::{FunctionTask, Packet, ParsedAstInfo, SourceFileInfo};
use super::queue::BoundedQueue;
use crate::core::{AstCache, Language, NodeKind, ParsedAst};
use crate::frontend::CppFrontEnd;
use crate::log_identifier::LogCallIdentifier;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

#[derive(Debug, Default)]
pub struct StageCounters {
    pub processed: AtomicUsize,
    pub errors: AtomicUsize,
}

/// Spawns the AST-parsing worker pool. Each worker checks the AST cache,
/// falls back to the C++ front end on a miss, and forwards successful
/// parses to `decompose_queue`.
pub fn spawn_parse_workers(
    worker_count: usize,
    running: Arc<AtomicBool>,
    input: BoundedQueue<Packet<SourceFileInfo>>,
    output: BoundedQueue<Packet<ParsedAstInfo>>,
    cache: Arc<AstCache>,
    identifier: Arc<LogCallIdentifier>,
    counters: Arc<StageCounters>,
) -> Vec<JoinHandle<()>> {
    (0..worker_count.max(1))
        .map(|_| {
            let running = running.clone();
            let input = input.clone();
            let output = output.clone();
            let cache = cache.clone();
            let identifier = identifier.clone();
            let counters = counters.clone();
            std::thread::spawn(move || {
                let front_end = CppFrontEnd::new();
                while let Some(packet) = input.dequeue_or_stop(&running) {
                    match parse_one(&front_end, &cache, &identifier, &packet.payload) {
                        Ok(parsed) => {
                            counters.processed.fetch_add(1, Ordering::Relaxed);
                            let out = Packet::new(
                                ParsedAstInfo {
                                    file: packet.source_file.clone(),
                                    ast: Arc::new(parsed),
                                },
                                "decompose",
                                packet.source_file,
                            );
                            output.enqueue(out);
                        }
                        Err(_) => {
                            counters.errors.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect()
}

fn parse_one(
    front_end: &CppFrontEnd,
    cache: &AstCache,
    identifier: &LogCallIdentifier,
    info: &SourceFileInfo,
) -> Result<ParsedAst, crate::errors::AnalysisError> {
    if let Some(cached_root) = cache.get(&info.absolute_path, &info.content) {
        return Ok(ParsedAst {
            language: Language::Cpp,
            file: info.absolute_path.clone(),
            function_roots: vec![cached_root],
            dependencies: Vec::new(),
            parse_success: true,
            diagnostic: None,
        });
    }

    match front_end.parse(&info.absolute_path, &info.content, identifier, &[]) {
        Ok(roots) => {
            let deps = crate::core::cache::scan_include_dependencies(
                &info.content,
                info.absolute_path.parent().unwrap_or(&info.absolute_path),
                &[],
            );
            if let Some(first) = roots.first() {
                cache.insert(
                    info.absolute_path.clone(),
                    &info.content,
                    first.clone(),
                    deps.clone(),
                );
            }
            Ok(ParsedAst {
                language: Language::Cpp,
                file: info.absolute_path.clone(),
                function_roots: roots,
                dependencies: deps,
                parse_success: true,
                diagnostic: None,
            })
        }
        Err(e) => Ok(ParsedAst {
            language: Language::Cpp,
            file: info.absolute_path.clone(),
            function_roots: Vec::new(),
            dependencies: Vec::new(),
            parse_success: false,
            diagnostic: Some(e.to_string()),
        }),
    }
}

/// Spawns the function-decomposition worker pool (one worker by
/// default). For each function root, computes complexity and priority
/// and emits a `FunctionTask`.
pub fn spawn_decompose_workers(
    worker_count: usize,
    running: Arc<AtomicBool>,
    input: BoundedQueue<Packet<ParsedAstInfo>>,
    output: BoundedQueue<Packet<FunctionTask>>,
    counters: Arc<StageCounters>,
) -> Vec<JoinHandle<()>> {
    (0..worker_count.max(1))
        .map(|_| {
            let running = running.clone();
            let input = input.clone();
            let output = output.clone();
            let counters = counters.clone();
            std::thread::spawn(move || {
                while let Some(packet) = input.dequeue_or_stop(&running) {
                    for root in &packet.payload.ast.function_roots {
                        let branch_or_loop_count = root
                            .walk()
                            .filter(|n| {
                                matches!(
                                    n.kind,
                                    NodeKind::IfStmt
                                        | NodeKind::ForStmt
                                        | NodeKind::WhileStmt
                                        | NodeKind::DoStmt
                                        | NodeKind::SwitchStmt
                                )
                            })
                            .count();
                        let complexity =
                            complexity_score(root.parameter_count, branch_or_loop_count);
                        let priority = complexity + special_member_bonus(&root.name);

                        let task = FunctionTask {
                            function_name: root.name.clone(),
                            file_path: packet.source_file.clone(),
                            ast_info: packet.payload.ast.clone(),
                            complexity,
                            priority,
                        };
                        counters.processed.fetch_add(1, Ordering::Relaxed);
                        output.enqueue(Packet::new(
                            task,
                            "analyze",
                            packet.source_file.clone(),
                        ));
                    }
                }
            })
        })
        .collect()
}

fn special_member_bonus(name: &str) -> u32 {
    if name == "main" {
        MAIN_PRIORITY_BONUS
    } else if name.starts_with('~') || name.contains("::~") {
        DESTRUCTOR_PRIORITY_BONUS
    } else if is_likely_constructor(name) {
        CONSTRUCTOR_PRIORITY_BONUS
    } else {
        0
    }
}

fn is_likely_constructor(name: &str) -> bool {
    match name.rsplit_once("::") {
        Some((class_name, method_name)) => class_name == method_name,
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct FunctionAnalysisResult {
    pub function_name: String,
    pub file_path: PathBuf,
    pub contains_log_calls: bool,
    pub total_statements: u64,
    pub logged_statements: u64,
    pub total_branches: u64,
    pub logged_branches: u64,
    pub total_exceptions: u64,
    pub logged_exceptions: u64,
    pub log_functions_found: Vec<String>,
    pub log_locations: Vec<(i32, String)>,
    pub uncovered_paths: Vec<String>,
    pub complexity_score: u32,
}

/// Spawns the function-analysis worker pool (~4 workers by default).
/// Each worker walks a function body to produce a
/// [`FunctionAnalysisResult`], appending it to the shared results
/// collector.
pub fn spawn_analyze_workers(
    worker_count: usize,
    running: Arc<AtomicBool>,
    input: BoundedQueue<Packet<FunctionTask>>,
    results: Arc<Mutex<Vec<FunctionAnalysisResult>>>,
    counters: Arc<StageCounters>,
) -> Vec<JoinHandle<()>> {
    (0..worker_count.max(1))
        .map(|_| {
            let running = running.clone();
            let input = input.clone();
            let results = results.clone();
            let counters = counters.clone();
            std::thread::spawn(move || {
                while let Some(packet) = input.dequeue_or_stop(&running) {
                    let result = analyze_one(&packet.payload);
                    counters.processed.fetch_add(1, Ordering::Relaxed);
                    results.lock().expect("results mutex poisoned").push(result);
                }
            })
        })
        .collect()
}

fn analyze_one(task: &FunctionTask) -> FunctionAnalysisResult {
    let root = task
        .ast_info
        .function_roots
        .iter()
        .find(|r| r.name == task.function_name);

    let mut total_statements = 0u64;
    let mut logged_statements = 0u64;
    let mut total_branches = 0u64;
    let mut logged_branches = 0u64;
    let mut total_exceptions = 0u64;
    let mut logged_exceptions = 0u64;
    let mut log_functions_found = Vec::new();
    let mut log_locations = Vec::new();
    let mut uncovered_paths = Vec::new();

    if let Some(root) = root {
        for node in root.walk() {
            total_statements += 1;
            if node.has_logging {
                logged_statements += 1;
            }
            if node.kind.is_branch() {
                total_branches += 1;
                if node.has_logging {
                    logged_branches += 1;
                } else {
                    uncovered_paths.push(format!("{:?} at line {}", node.kind, node.location.line));
                }
            }
            if node.kind.is_exception() {
                total_exceptions += 1;
                if node.has_logging {
                    logged_exceptions += 1;
                } else {
                    uncovered_paths.push(format!("{:?} at line {}", node.kind, node.location.line));
                }
            }
            if let Some(call) = &node.log_call {
                log_functions_found.push(call.function_name.clone());
                log_locations.push((call.line as i32, call.function_name.clone()));
            }
        }
    }

    FunctionAnalysisResult {
        function_name: task.function_name.clone(),
        file_path: task.file_path.clone(),
        contains_log_calls: !log_functions_found.is_empty(),
        total_statements,
        logged_statements,
        total_branches,
        logged_branches,
        total_exceptions,
        logged_exceptions,
        log_functions_found,
        log_locations,
        uncovered_paths,
        complexity_score: task.complexity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_gets_additive_bonus() {
        assert_eq!(special_member_bonus("main"), MAIN_PRIORITY_BONUS);
    }

    #[test]
    fn destructor_gets_additive_bonus() {
        assert_eq!(special_member_bonus("Widget::~Widget"), DESTRUCTOR_PRIORITY_BONUS);
    }

    #[test]
    fn constructor_gets_additive_bonus() {
        assert_eq!(special_member_bonus("Widget::Widget"), CONSTRUCTOR_PRIORITY_BONUS);
    }

    #[test]
    fn plain_function_gets_no_bonus() {
        assert_eq!(special_member_bonus("doWork"), 0);
    }
}
