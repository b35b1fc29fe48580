//! Core data model shared across every analysis component: AST node
//! representation, the content-hash-keyed AST cache, common value types,
//! and the traits that define component boundaries.

pub mod ast;
pub mod cache;
pub mod traits;
pub mod types;

pub use ast::{AstNode, CallShape, LogCallSite, LogLibrary, NodeKind, ParsedAst};
pub use cache::{AstCache, AstCacheConfig, CacheStats};
pub use traits::LanguageAnalyzer;
pub use types::{Language, LogLevel, SourceLocation};
