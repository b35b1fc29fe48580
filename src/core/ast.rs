//! AST node representation shared by both language front ends.
//!
//! A C++ translation unit and a Go analyzer-bridge response are both
//! flattened into the same [`AstNode`] tree so the coverage calculator
//! and the statement analyzers never need to know which language produced
//! a given node.

use crate::core::types::{Language, LogLevel, SourceLocation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Syntactic kind of an AST node. Mirrors the node tags a depth-first walk
/// of a function body can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Function,
    Method,
    IfStmt,
    ElseStmt,
    SwitchStmt,
    CaseStmt,
    ForStmt,
    WhileStmt,
    DoStmt,
    TryStmt,
    CatchStmt,
    CallExpr,
    LogCallExpr,
    Declaration,
}

impl NodeKind {
    /// Whether this kind contributes to the branch-coverage axis.
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            NodeKind::IfStmt | NodeKind::ElseStmt | NodeKind::SwitchStmt | NodeKind::CaseStmt
        )
    }

    /// Whether this kind contributes to the exception-coverage axis.
    pub fn is_exception(&self) -> bool {
        matches!(self, NodeKind::TryStmt | NodeKind::CatchStmt)
    }

    /// Whether this kind contributes to the function-coverage axis.
    pub fn is_function(&self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method)
    }
}

/// Logging library family a recognized log call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLibrary {
    Qt,
    QtCategory,
    Custom,
    GoStd,
    GoSlog,
    Logrus,
    Zap,
    Golib,
}

/// Shape of a recognized log call, used for message-extraction strategy
/// and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallShape {
    Stream,
    Function,
    Format,
    Unknown,
}

/// A recognized logging call site, recorded alongside its containing node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogCallSite {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub function_name: String,
    pub library: LogLibrary,
    pub level: LogLevel,
    pub message: String,
    pub shape: CallShape,
}

/// One node of the flattened AST tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub name: String,
    pub text: String,
    pub location: SourceLocation,
    pub end_location: Option<SourceLocation>,
    /// True iff this node or any descendant directly contains a log call.
    pub has_logging: bool,
    pub children: Vec<AstNode>,
    /// Populated only when `kind == LogCallExpr`.
    pub log_call: Option<LogCallSite>,
    /// Declared parameter count; only meaningful on `Function`/`Method`
    /// roots, used by the decomposition stage's complexity formula.
    pub parameter_count: usize,
}

impl AstNode {
    pub fn leaf(kind: NodeKind, name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            name: name.into(),
            text: String::new(),
            location,
            end_location: None,
            has_logging: false,
            children: Vec::new(),
            log_call: None,
            parameter_count: 0,
        }
    }

    /// Recompute `has_logging` for this node from its children, per the
    /// monotone-upward-propagation invariant: true iff any child is true
    /// or the node is itself a log call.
    pub fn recompute_has_logging(&mut self) {
        let self_is_log = matches!(self.kind, NodeKind::LogCallExpr);
        self.has_logging = self_is_log || self.children.iter().any(|c| c.has_logging);
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &AstNode> {
        AstNodeIter {
            stack: vec![self],
        }
    }

    /// Recursive estimate of this node's memory footprint, used by the
    /// AST cache's memory-ceiling accounting.
    pub fn estimated_size(&self) -> usize {
        let base = std::mem::size_of::<AstNode>();
        let text_bytes = self.text.len() + self.name.len();
        let children_bytes: usize = self.children.iter().map(|c| c.estimated_size()).sum();
        base + text_bytes + children_bytes
    }
}

struct AstNodeIter<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for AstNodeIter<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// A parsed translation unit (C++) or analyzed file (Go): one root node
/// per function/method found, plus metadata needed by later pipeline
/// stages.
#[derive(Debug, Clone)]
pub struct ParsedAst {
    pub language: Language,
    pub file: PathBuf,
    pub function_roots: Vec<Arc<AstNode>>,
    /// Resolved dependency files (headers included, etc.) used for cache
    /// invalidation.
    pub dependencies: Vec<PathBuf>,
    pub parse_success: bool,
    pub diagnostic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(PathBuf::from("a.cpp"), 1, 1)
    }

    #[test]
    fn has_logging_propagates_upward() {
        let mut leaf = AstNode::leaf(NodeKind::LogCallExpr, "LOG_INFO", loc());
        leaf.has_logging = true;
        let mut parent = AstNode::leaf(NodeKind::IfStmt, "if", loc());
        parent.children.push(leaf);
        parent.recompute_has_logging();
        assert!(parent.has_logging);
    }

    #[test]
    fn has_logging_false_without_log_descendant() {
        let child = AstNode::leaf(NodeKind::CallExpr, "doWork", loc());
        let mut parent = AstNode::leaf(NodeKind::IfStmt, "if", loc());
        parent.children.push(child);
        parent.recompute_has_logging();
        assert!(!parent.has_logging);
    }

    #[test]
    fn walk_visits_all_descendants() {
        let mut root = AstNode::leaf(NodeKind::Function, "f", loc());
        root.children.push(AstNode::leaf(NodeKind::IfStmt, "if", loc()));
        root.children
            .push(AstNode::leaf(NodeKind::CallExpr, "call", loc()));
        assert_eq!(root.walk().count(), 3);
    }
}
