//! Observability infrastructure: structured tracing, thread-local analysis
//! context, and a crash-report panic hook.
//!
//! ## Features
//!
//! - **Panic Hook**: produces a structured crash report including whatever
//!   phase/file context was active on the panicking thread.
//! - **Context Tracking**: thread-local analysis phase and file tracking,
//!   so a crash inside a rayon worker still reports which file it was on.
//! - **Progress Tracking**: atomic counters for overall analysis progress.
//!
//! ## Usage
//!
//! Install the panic hook at application startup:
//!
//! ```ignore
//! use dlogcover::observability::install_panic_hook;
//!
//! fn main() {
//!     install_panic_hook();
//!     // ... rest of application
//! }
//! ```
//!
//! Track context during analysis:
//!
//! ```ignore
//! use dlogcover::observability::{set_phase, set_current_file, AnalysisPhase};
//!
//! fn analyze_files(files: &[PathBuf]) {
//!     let _phase = set_phase(AnalysisPhase::AstParsing);
//!     for file in files {
//!         let _file_guard = set_current_file(file);
//!         // If panic occurs here, crash report shows phase and file
//!         parse_file(file)?;
//!     }
//! }
//! ```

pub mod context;
pub mod panic_hook;
pub mod tracing_init;

pub use context::{
    get_current_context, get_progress, increment_processed, set_current_file, set_phase,
    set_phase_persistent, set_progress, AnalysisContext, AnalysisPhase, ContextGuard,
};
pub use panic_hook::{extract_thread_panic_message, install_panic_hook};
pub use tracing_init::init_tracing;
