//! Concrete [`crate::core::LanguageAnalyzer`] adapters. Each wraps one of
//! the two language engines (the in-process C++ front end, the
//! out-of-process Go bridge) behind the shared contract so the
//! dispatcher (§4.11) can hold a homogeneous `Vec<Box<dyn
//! LanguageAnalyzer>>` regardless of which languages are present.

pub mod cpp_analyzer;
pub mod go_analyzer;

pub use cpp_analyzer::CppAnalyzer;
pub use go_analyzer::GoAnalyzerAdapter;

use crate::config::Config;
use std::collections::HashMap;

/// Builds a [`crate::log_identifier::LogCallIdentifier`] from the
/// configured Qt and custom function name sets.
pub fn build_identifier(config: &Config) -> crate::log_identifier::LogCallIdentifier {
    let custom: HashMap<String, Vec<String>> = config
        .log_functions
        .custom
        .functions
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut builder = crate::log_identifier::LogCallIdentifier::new();
    if config.log_functions.qt.enabled {
        builder = builder
            .with_qt_functions(&config.log_functions.qt.functions)
            .with_qt_category_functions(&config.log_functions.qt.category_functions);
    }
    if config.log_functions.custom.enabled {
        builder = builder.with_custom_functions(&custom);
    }
    builder.build()
}
