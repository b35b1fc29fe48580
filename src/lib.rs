//! dlogcover: static analysis of log coverage across C/C++ and Go source
//! trees.
//!
//! The crate is organized around the pipeline described in the design
//! docs: a [`core`] data model shared by both language engines, a
//! [`frontend`] (C++) and [`go_bridge`] (Go) analyzer pair unified behind
//! [`core::LanguageAnalyzer`] and wired up by [`analyzers`], an
//! [`orchestrator`] that dispatches sources to the right analyzer and
//! feeds the result into [`coverage`], and an [`io`] layer for source
//! collection and report writing.

pub mod analyzers;
pub mod compile_commands;
pub mod config;
pub mod core;
pub mod coverage;
pub mod errors;
pub mod formatting;
pub mod frontend;
pub mod go_bridge;
pub mod log_identifier;
pub mod observability;
pub mod orchestrator;
pub mod ownership;
pub mod path_normalizer;
pub mod pipeline;
pub mod io;

pub use crate::config::Config;
pub use crate::core::{AstNode, Language, LanguageAnalyzer, NodeKind};
pub use crate::coverage::{AxisConfig, CoverageCalculator, CoverageStats};
pub use crate::errors::AnalysisError;
pub use crate::orchestrator::{DominantLanguage, Orchestrator, OrchestratorRun};
