//! Classifies call expressions as logging calls using a configured name
//! set, built once per engine instance.

use crate::core::{CallShape, LogLevel, LogLibrary};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct LogFunctionEntry {
    pub library: LogLibrary,
    pub level: LogLevel,
}

/// Special-case identifiers that classify at a level different from
/// their family's usual suffix-derived level. `LOG_ERROR`/`LOG_ERROR_FMT`
/// are treated as Fatal by convention, carried over intentionally from
/// the source project.
const FATAL_OVERRIDES: &[&str] = &["LOG_ERROR", "LOG_ERROR_FMT"];

/// O(1) membership lookup built once from configuration.
pub struct LogCallIdentifier {
    names: HashMap<String, LogFunctionEntry>,
}

impl LogCallIdentifier {
    pub fn new() -> LogCallIdentifierBuilder {
        LogCallIdentifierBuilder::default()
    }

    pub fn classify(&self, callee: &str) -> Option<&LogFunctionEntry> {
        self.names.get(callee)
    }

    pub fn is_log_call(&self, callee: &str) -> bool {
        self.names.contains_key(callee)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Default)]
pub struct LogCallIdentifierBuilder {
    names: HashMap<String, LogFunctionEntry>,
}

impl LogCallIdentifierBuilder {
    /// Qt functions (`qDebug`, `qInfo`, `qWarning`, `qCritical`, `qFatal`);
    /// level derived from the recognized name suffix.
    pub fn with_qt_functions(mut self, functions: &[String]) -> Self {
        for name in functions {
            if let Some(level) = qt_level_from_name(name) {
                self.names.insert(
                    name.clone(),
                    LogFunctionEntry {
                        library: LogLibrary::Qt,
                        level,
                    },
                );
            }
        }
        self
    }

    /// Qt category-logging functions (`qCDebug`, `qCInfo`, ...).
    pub fn with_qt_category_functions(mut self, functions: &[String]) -> Self {
        for name in functions {
            if let Some(level) = qt_level_from_name(name) {
                self.names.insert(
                    name.clone(),
                    LogFunctionEntry {
                        library: LogLibrary::QtCategory,
                        level,
                    },
                );
            }
        }
        self
    }

    /// Custom level → function-name-list map from configuration.
    pub fn with_custom_functions(mut self, by_level: &HashMap<String, Vec<String>>) -> Self {
        for (level_name, functions) in by_level {
            let Some(level) = level_from_str(level_name) else {
                continue;
            };
            for name in functions {
                let effective_level = if FATAL_OVERRIDES.contains(&name.as_str()) {
                    LogLevel::Fatal
                } else {
                    level
                };
                self.names.insert(
                    name.clone(),
                    LogFunctionEntry {
                        library: LogLibrary::Custom,
                        level: effective_level,
                    },
                );
            }
        }
        self
    }

    pub fn with_go_functions(mut self, library: LogLibrary, level: LogLevel, functions: &[String]) -> Self {
        for name in functions {
            self.names
                .insert(name.clone(), LogFunctionEntry { library, level });
        }
        self
    }

    pub fn build(self) -> LogCallIdentifier {
        LogCallIdentifier { names: self.names }
    }
}

fn qt_level_from_name(name: &str) -> Option<LogLevel> {
    let lower = name.to_ascii_lowercase();
    if lower.contains("debug") {
        Some(LogLevel::Debug)
    } else if lower.contains("info") {
        Some(LogLevel::Info)
    } else if lower.contains("warning") {
        Some(LogLevel::Warning)
    } else if lower.contains("critical") {
        Some(LogLevel::Error)
    } else if lower.contains("fatal") {
        Some(LogLevel::Fatal)
    } else {
        None
    }
}

fn level_from_str(level: &str) -> Option<LogLevel> {
    match level.to_ascii_lowercase().as_str() {
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warning" | "warn" => Some(LogLevel::Warning),
        "error" => Some(LogLevel::Error),
        "fatal" => Some(LogLevel::Fatal),
        _ => None,
    }
}

/// Classifies a recognized call's shape from its callee name and whether
/// it's followed by a stream-insertion chain.
pub fn classify_shape(callee: &str, is_streamed: bool, has_single_string_arg: bool) -> CallShape {
    if is_streamed {
        CallShape::Stream
    } else if callee.ends_with("_FMT") || callee.ends_with("Printf") || callee.ends_with("f") {
        CallShape::Format
    } else if has_single_string_arg {
        CallShape::Function
    } else {
        CallShape::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qt_functions_classify_by_suffix() {
        let id = LogCallIdentifier::new()
            .with_qt_functions(&[
                "qDebug".to_string(),
                "qInfo".to_string(),
                "qWarning".to_string(),
                "qCritical".to_string(),
                "qFatal".to_string(),
            ])
            .build();
        assert_eq!(id.classify("qDebug").unwrap().level, LogLevel::Debug);
        assert_eq!(id.classify("qFatal").unwrap().level, LogLevel::Fatal);
        assert!(id.classify("notALogFn").is_none());
    }

    #[test]
    fn log_error_classifies_as_fatal() {
        let mut custom = HashMap::new();
        custom.insert(
            "error".to_string(),
            vec!["LOG_ERROR".to_string(), "LOG_ERROR_FMT".to_string()],
        );
        let id = LogCallIdentifier::new()
            .with_custom_functions(&custom)
            .build();
        assert_eq!(id.classify("LOG_ERROR").unwrap().level, LogLevel::Fatal);
        assert_eq!(id.classify("LOG_ERROR_FMT").unwrap().level, LogLevel::Fatal);
    }

    #[test]
    fn lookup_is_independent_of_insertion_order() {
        let mut custom_a = HashMap::new();
        custom_a.insert("debug".to_string(), vec!["logDebug".to_string()]);
        custom_a.insert("info".to_string(), vec!["logInfo".to_string()]);

        let mut custom_b = HashMap::new();
        custom_b.insert("info".to_string(), vec!["logInfo".to_string()]);
        custom_b.insert("debug".to_string(), vec!["logDebug".to_string()]);

        let id_a = LogCallIdentifier::new().with_custom_functions(&custom_a).build();
        let id_b = LogCallIdentifier::new().with_custom_functions(&custom_b).build();

        assert_eq!(
            id_a.classify("logDebug").unwrap().level,
            id_b.classify("logDebug").unwrap().level
        );
        assert_eq!(
            id_a.classify("logInfo").unwrap().level,
            id_b.classify("logInfo").unwrap().level
        );
    }
}
