//! The capability interfaces every component is built against, rather
//! than concrete types: a [`LanguageAnalyzer`] per supported language.

use crate::core::ast::AstNode;
use crate::core::types::Language;
use crate::errors::AnalysisError;
use std::path::Path;
use std::sync::Arc;

/// Every language analyzer (the C++ adapter, the Go bridge, any future
/// addition) exposes this contract so the dispatcher can hold a
/// `Vec<Box<dyn LanguageAnalyzer>>` without knowing which languages are
/// actually present.
pub trait LanguageAnalyzer: Send + Sync {
    /// Parses and analyzes one file, appending to this instance's
    /// accumulated results. `Ok(true)` covers both a successful analysis
    /// and an intentional skip (e.g. the Go bridge with no worker
    /// present); `Err` is reserved for failures the caller should treat
    /// as a per-file non-fatal error.
    fn analyze(&mut self, file_path: &Path) -> Result<bool, AnalysisError>;

    /// The accumulated Node Info forest for every file analyzed so far.
    fn results(&self) -> &[Arc<AstNode>];

    /// Drops results and resets per-instance counters.
    fn clear(&mut self);

    fn language_name(&self) -> &'static str;

    /// Whether this analyzer can run at all.
    fn is_enabled(&self) -> bool;

    fn supported_extensions(&self) -> &[&'static str];

    /// Hint; `max_threads == 0` means "use hardware concurrency".
    fn set_parallel_mode(&mut self, enabled: bool, max_threads: usize);

    fn statistics(&self) -> String;

    fn language(&self) -> Language;
}
