//! Thread-local context tracking for crash reports.
//!
//! Provides context information about the current analysis phase and file
//! being processed. Uses thread-local storage for per-thread context (works
//! with rayon parallel iterators) and atomic counters for global progress.
//!
//! ## Thread Safety
//!
//! - Thread-local context: each thread has its own context (via `thread_local!`)
//! - Global progress: atomic counters for files processed/total
//! - Context guards use RAII for automatic cleanup on drop

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static FILES_PROCESSED: AtomicUsize = AtomicUsize::new(0);
static FILES_TOTAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    pub(crate) static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// Context snapshot for the current analysis operation: what dlogcover
/// was doing when an error or panic occurred.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    pub current_file: Option<PathBuf>,
    pub current_function: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_file: None,
            current_function: None,
        }
    }
}

/// Phases of the orchestrator's run, mirroring the pipeline stages
/// (§4.10/§4.11): used for context tracking, not control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    ConfigLoad,
    SourceCollection,
    CompileCommandsLoad,
    AstParsing,
    FunctionDecomposition,
    FunctionAnalysis,
    CoverageAggregation,
    ReportWriting,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigLoad => write!(f, "config_load"),
            Self::SourceCollection => write!(f, "source_collection"),
            Self::CompileCommandsLoad => write!(f, "compile_commands_load"),
            Self::AstParsing => write!(f, "ast_parsing"),
            Self::FunctionDecomposition => write!(f, "function_decomposition"),
            Self::FunctionAnalysis => write!(f, "function_analysis"),
            Self::CoverageAggregation => write!(f, "coverage_aggregation"),
            Self::ReportWriting => write!(f, "report_writing"),
        }
    }
}

/// RAII guard restoring the previous context on drop, enabling nested
/// context tracking (e.g. a file context inside a phase context).
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

/// Sets the current analysis phase; returns a guard that restores the
/// previous phase on drop.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

/// Sets the current phase without returning a guard; the phase persists
/// until the next call. Used for top-level phase transitions in the
/// orchestrator's run sequence.
pub fn set_phase_persistent(phase: AnalysisPhase) {
    CURRENT_CONTEXT.with(|ctx| {
        ctx.borrow_mut().phase = Some(phase);
    });
}

/// Sets the file currently being analyzed; returns a guard restoring the
/// previous value on drop.
#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_file = Some(path.into());
        ContextGuard { previous }
    })
}

/// Sets the function currently being analyzed; returns a guard restoring
/// the previous value on drop.
#[must_use]
pub fn set_current_function(name: impl Into<String>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_function = Some(name.into());
        ContextGuard { previous }
    })
}

/// Sets the progress counters (processed, total). Thread-safe.
pub fn set_progress(processed: usize, total: usize) {
    FILES_PROCESSED.store(processed, Ordering::Relaxed);
    FILES_TOTAL.store(total, Ordering::Relaxed);
}

/// Increments the processed-file count. Safe to call from parallel workers.
pub fn increment_processed() {
    FILES_PROCESSED.fetch_add(1, Ordering::Relaxed);
}

/// Returns a snapshot of the calling thread's context.
#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Returns the current progress as (processed, total).
#[must_use]
pub fn get_progress() -> (usize, usize) {
    (
        FILES_PROCESSED.load(Ordering::Relaxed),
        FILES_TOTAL.load(Ordering::Relaxed),
    )
}

/// Resets progress counters to zero. Useful in tests.
pub fn reset_progress() {
    FILES_PROCESSED.store(0, Ordering::Relaxed);
    FILES_TOTAL.store(0, Ordering::Relaxed);
}

/// Resets the calling thread's context to empty. Useful in tests.
pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_guard_restores_previous() {
        reset_context();

        let _phase1 = set_phase(AnalysisPhase::AstParsing);
        assert_eq!(get_current_context().phase, Some(AnalysisPhase::AstParsing));

        {
            let _phase2 = set_phase(AnalysisPhase::CoverageAggregation);
            assert_eq!(
                get_current_context().phase,
                Some(AnalysisPhase::CoverageAggregation)
            );
        }

        assert_eq!(get_current_context().phase, Some(AnalysisPhase::AstParsing));
    }

    #[test]
    fn nested_context_guards() {
        reset_context();

        let _phase = set_phase(AnalysisPhase::AstParsing);
        let _file = set_current_file("/path/to/test.cpp");
        let _func = set_current_function("test_function");

        let ctx = get_current_context();
        assert_eq!(ctx.phase, Some(AnalysisPhase::AstParsing));
        assert_eq!(ctx.current_file, Some(PathBuf::from("/path/to/test.cpp")));
        assert_eq!(ctx.current_function, Some("test_function".to_string()));
    }

    #[test]
    fn progress_tracking() {
        reset_progress();

        set_progress(50, 100);
        assert_eq!(get_progress(), (50, 100));
    }

    #[test]
    fn increment_processed_advances_counter() {
        reset_progress();
        set_progress(0, 100);
        increment_processed();
        increment_processed();
        assert_eq!(get_progress(), (2, 100));
    }

    #[test]
    fn analysis_phase_display() {
        assert_eq!(format!("{}", AnalysisPhase::AstParsing), "ast_parsing");
        assert_eq!(
            format!("{}", AnalysisPhase::CoverageAggregation),
            "coverage_aggregation"
        );
    }

    #[test]
    fn empty_context_by_default() {
        reset_context();
        let ctx = get_current_context();
        assert!(ctx.phase.is_none());
        assert!(ctx.current_file.is_none());
        assert!(ctx.current_function.is_none());
    }
}
