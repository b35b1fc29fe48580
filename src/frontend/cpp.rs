//! C++ front-end driver.
//!
//! Responsibility per the design: given `(file path, compile args,
//! original file content)`, produce a parsed translation unit and a
//! shallow root [`AstNode`] per function found in it. There is no
//! Clang-compatible AST library in this crate's dependency stack, so
//! this driver is a purpose-built tokenizer and recursive statement
//! walker sufficient for the node kinds the coverage calculator needs
//! (Function/Method, If/Else, Switch/Case, For/While/Do, Try/Catch,
//! CallExpr). It does not attempt full C++ grammar coverage — template
//! metaprogramming, preprocessor conditionals, and ambiguous grammar
//! constructs are handled heuristically, which is adequate for deciding
//! whether a statement contains a logging call.
//!
//! Re-entrant: holds no mutable state, so each pipeline worker can own
//! one instance without contention.

use super::tokenizer::{tokenize, Token, TokenKind};
use crate::core::{AstNode, LogCallSite, NodeKind, SourceLocation};
use crate::errors::AnalysisError;
use crate::log_identifier::LogCallIdentifier;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct CppFrontEnd;

impl CppFrontEnd {
    pub fn new() -> Self {
        Self
    }

    /// Parses one translation unit, returning one root node per function
    /// or method definition found at any nesting depth. Compile args are
    /// accepted for interface fidelity with the compile-commands store
    /// but do not change tokenizer behavior — there is no preprocessor.
    pub fn parse(
        &self,
        path: &Path,
        source: &str,
        identifier: &LogCallIdentifier,
        _compile_args: &[String],
    ) -> Result<Vec<Arc<AstNode>>, AnalysisError> {
        let tokens = tokenize(source);
        let functions = find_functions(&tokens);

        let mut roots = Vec::with_capacity(functions.len());
        for func in functions {
            let mut walker = Walker {
                path: path.to_path_buf(),
                identifier,
            };
            let mut node = AstNode::leaf(
                if func.is_method { NodeKind::Method } else { NodeKind::Function },
                func.name.clone(),
                SourceLocation::new(path.to_path_buf(), func.line, func.column),
            );
            node.parameter_count = func.parameter_count;
            node.children = walker.walk_block(&func.body);
            node.recompute_has_logging();
            roots.push(Arc::new(node));
        }
        Ok(roots)
    }
}

impl Default for CppFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

struct FunctionDef<'a> {
    name: String,
    is_method: bool,
    line: usize,
    column: usize,
    body: &'a [Token],
    parameter_count: usize,
}

/// Heuristically locates function/method definitions: an identifier
/// followed by a balanced `(...)` parameter list followed by a balanced
/// `{...}` body, not preceded by a control-flow keyword.
fn find_functions(tokens: &[Token]) -> Vec<FunctionDef<'_>> {
    const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch"];
    let mut out = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].text == "(" {
            // Find the matching close paren.
            if let Some(close) = matching(tokens, i, "(", ")") {
                if tokens.get(close + 1).map(|t| t.text.as_str()) == Some("{") {
                    let name_idx = i.checked_sub(1);
                    let is_control = name_idx
                        .map(|idx| CONTROL_KEYWORDS.contains(&tokens[idx].text.as_str()))
                        .unwrap_or(false);
                    if let Some(name_idx) = name_idx {
                        if !is_control && tokens[name_idx].kind == TokenKind::Ident {
                            if let Some(body_close) = matching(tokens, close + 1, "{", "}") {
                                let name = function_name(tokens, name_idx);
                                let is_method = name.contains("::");
                                let parameter_count = count_parameters(&tokens[i + 1..close]);
                                out.push(FunctionDef {
                                    name,
                                    is_method,
                                    line: tokens[name_idx].line,
                                    column: tokens[name_idx].column,
                                    body: &tokens[close + 2..body_close],
                                    parameter_count,
                                });
                                i = body_close + 1;
                                continue;
                            }
                        }
                    }
                }
            }
        }
        i += 1;
    }
    out
}

/// Reconstructs a qualified function name by walking back over
/// `Ident ("::" Ident)*` and `operator` sequences preceding the name.
fn function_name(tokens: &[Token], name_idx: usize) -> String {
    let mut parts = vec![tokens[name_idx].text.clone()];
    let mut idx = name_idx;
    while idx >= 2 && tokens[idx - 1].text == "::" && tokens[idx - 2].kind == TokenKind::Ident {
        parts.push(tokens[idx - 2].text.clone());
        idx -= 2;
    }
    parts.reverse();
    parts.join("::")
}

/// Counts declared parameters in a balanced `(...)` parameter-list token
/// slice (braces already stripped): top-level commas plus one, treating
/// an empty list or a lone `void` as zero parameters.
fn count_parameters(tokens: &[Token]) -> usize {
    if tokens.is_empty() || (tokens.len() == 1 && tokens[0].text == "void") {
        return 0;
    }
    let mut depth = 0i32;
    let mut count = 1usize;
    for tok in tokens {
        match tok.text.as_str() {
            "(" | "[" | "<" => depth += 1,
            ")" | "]" | ">" => depth -= 1,
            "," if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

fn matching(tokens: &[Token], open_idx: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (offset, tok) in tokens[open_idx..].iter().enumerate() {
        if tok.text == open {
            depth += 1;
        } else if tok.text == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_idx + offset);
            }
        }
    }
    None
}

struct Walker<'a> {
    path: PathBuf,
    identifier: &'a LogCallIdentifier,
}

impl<'a> Walker<'a> {
    /// Parses a sequence of tokens representing the contents of a block
    /// (or a single statement) into the flattened list of statement
    /// nodes it contains.
    fn walk_block(&mut self, tokens: &[Token]) -> Vec<AstNode> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let (node, consumed) = self.walk_statement(&tokens[i..]);
            if let Some(node) = node {
                out.push(node);
            }
            i += consumed.max(1);
        }
        out
    }

    /// Parses exactly one statement starting at `tokens[0]`, returning
    /// the node(s) it produces (flattened when it is itself a block) and
    /// how many tokens were consumed.
    fn walk_statement(&mut self, tokens: &[Token]) -> (Option<AstNode>, usize) {
        if tokens.is_empty() {
            return (None, 0);
        }
        let head = &tokens[0];

        if head.text == ";" {
            return (None, 1);
        }

        if head.text == "{" {
            if let Some(close) = matching(tokens, 0, "{", "}") {
                // A bare nested block: flatten isn't representable as a
                // single node, so we synthesize nothing here; caller
                // treats this as a single "other statement" region
                // handled by walk_other below would be wrong since it
                // contains braces. Represent as an anonymous Declaration
                // wrapper carrying the flattened children.
                let mut wrapper = AstNode::leaf(
                    NodeKind::Declaration,
                    "{block}",
                    self.location(head),
                );
                wrapper.children = self.walk_block(&tokens[1..close]);
                wrapper.recompute_has_logging();
                return (Some(wrapper), close + 1);
            }
        }

        match head.text.as_str() {
            "if" => self.walk_if(tokens),
            "switch" => self.walk_switch(tokens),
            "for" => self.walk_loop(tokens, NodeKind::ForStmt, "for"),
            "while" => self.walk_loop(tokens, NodeKind::WhileStmt, "while"),
            "do" => self.walk_do(tokens),
            "try" => self.walk_try(tokens),
            _ => self.walk_other(tokens),
        }
    }

    fn location(&self, tok: &Token) -> SourceLocation {
        SourceLocation::new(self.path.clone(), tok.line, tok.column)
    }

    fn branch_tokens<'t>(&self, tokens: &'t [Token]) -> (&'t [Token], usize) {
        // tokens[0] is the start of a statement or a `{`-block; returns
        // the token slice to recurse into and how many tokens it spans.
        if tokens.first().map(|t| t.text.as_str()) == Some("{") {
            let close = matching(tokens, 0, "{", "}").unwrap_or(tokens.len() - 1);
            (&tokens[1..close], close + 1)
        } else {
            // Single statement: find its extent via walk_statement's own
            // consumption logic, but we need the raw span, not the node.
            let end = single_statement_extent(tokens);
            (&tokens[..end], end)
        }
    }

    fn walk_if(&mut self, tokens: &[Token]) -> (Option<AstNode>, usize) {
        let mut i = 1;
        let Some(cond_open) = find_from(tokens, i, "(") else {
            return (None, tokens.len());
        };
        let Some(cond_close) = matching(tokens, cond_open, "(", ")") else {
            return (None, tokens.len());
        };
        i = cond_close + 1;

        let mut node = AstNode::leaf(NodeKind::IfStmt, "if", self.location(&tokens[0]));
        let (then_tokens, then_span) = self.branch_tokens(&tokens[i..]);
        node.children = self.walk_block(then_tokens);
        i += then_span;

        if tokens.get(i).map(|t| t.text.as_str()) == Some("else") {
            let else_loc = self.location(&tokens[i]);
            i += 1;
            let (else_tokens, else_span) = self.branch_tokens(&tokens[i..]);
            let mut else_node = AstNode::leaf(NodeKind::ElseStmt, "else", else_loc);
            else_node.children = self.walk_block(else_tokens);
            else_node.recompute_has_logging();
            i += else_span;
            node.children.push(else_node);
        }

        node.recompute_has_logging();
        (Some(node), i)
    }

    fn walk_switch(&mut self, tokens: &[Token]) -> (Option<AstNode>, usize) {
        let Some(cond_open) = find_from(tokens, 1, "(") else {
            return (None, tokens.len());
        };
        let Some(cond_close) = matching(tokens, cond_open, "(", ")") else {
            return (None, tokens.len());
        };
        let Some(body_open) = find_from(tokens, cond_close + 1, "{") else {
            return (None, tokens.len());
        };
        let Some(body_close) = matching(tokens, body_open, "{", "}") else {
            return (None, tokens.len());
        };

        let mut node = AstNode::leaf(NodeKind::SwitchStmt, "switch", self.location(&tokens[0]));
        node.children = self.walk_case_body(&tokens[body_open + 1..body_close]);
        node.recompute_has_logging();
        (Some(node), body_close + 1)
    }

    /// Parses the contents of a switch body, grouping statements under
    /// `case`/`default` labels into CaseStmt nodes.
    fn walk_case_body(&mut self, tokens: &[Token]) -> Vec<AstNode> {
        let mut out = Vec::new();
        let mut i = 0;
        let mut current: Option<AstNode> = None;

        while i < tokens.len() {
            if tokens[i].text == "case" || tokens[i].text == "default" {
                if let Some(node) = current.take() {
                    out.push(node);
                }
                let loc = self.location(&tokens[i]);
                // Skip to the colon that ends the label.
                let mut j = i + 1;
                while j < tokens.len() && tokens[j].text != ":" {
                    j += 1;
                }
                current = Some(AstNode::leaf(NodeKind::CaseStmt, "case", loc));
                i = j + 1;
                continue;
            }

            let (node, consumed) = self.walk_statement(&tokens[i..]);
            if let (Some(n), Some(case_node)) = (node, current.as_mut()) {
                case_node.children.push(n);
            }
            i += consumed.max(1);
        }
        if let Some(mut node) = current {
            node.recompute_has_logging();
            out.push(node);
        }
        out
    }

    fn walk_loop(
        &mut self,
        tokens: &[Token],
        kind: NodeKind,
        _keyword: &str,
    ) -> (Option<AstNode>, usize) {
        let Some(cond_open) = find_from(tokens, 1, "(") else {
            return (None, tokens.len());
        };
        let Some(cond_close) = matching(tokens, cond_open, "(", ")") else {
            return (None, tokens.len());
        };

        let mut node = AstNode::leaf(kind, "loop", self.location(&tokens[0]));
        let (body_tokens, body_span) = self.branch_tokens(&tokens[cond_close + 1..]);
        node.children = self.walk_block(body_tokens);
        node.recompute_has_logging();
        (Some(node), cond_close + 1 + body_span)
    }

    fn walk_do(&mut self, tokens: &[Token]) -> (Option<AstNode>, usize) {
        let mut node = AstNode::leaf(NodeKind::DoStmt, "do", self.location(&tokens[0]));
        let (body_tokens, body_span) = self.branch_tokens(&tokens[1..]);
        node.children = self.walk_block(body_tokens);
        node.recompute_has_logging();

        let mut i = 1 + body_span;
        // Skip `while (...) ;`.
        if tokens.get(i).map(|t| t.text.as_str()) == Some("while") {
            if let Some(open) = find_from(tokens, i + 1, "(") {
                if let Some(close) = matching(tokens, open, "(", ")") {
                    i = close + 1;
                    if tokens.get(i).map(|t| t.text.as_str()) == Some(";") {
                        i += 1;
                    }
                }
            }
        }
        (Some(node), i)
    }

    fn walk_try(&mut self, tokens: &[Token]) -> (Option<AstNode>, usize) {
        let Some(body_open) = find_from(tokens, 1, "{") else {
            return (None, tokens.len());
        };
        let Some(body_close) = matching(tokens, body_open, "{", "}") else {
            return (None, tokens.len());
        };

        let mut node = AstNode::leaf(NodeKind::TryStmt, "try", self.location(&tokens[0]));
        node.children = self.walk_block(&tokens[body_open + 1..body_close]);

        let mut i = body_close + 1;
        while tokens.get(i).map(|t| t.text.as_str()) == Some("catch") {
            let catch_loc = self.location(&tokens[i]);
            let Some(params_open) = find_from(tokens, i + 1, "(") else {
                break;
            };
            let Some(params_close) = matching(tokens, params_open, "(", ")") else {
                break;
            };
            let Some(handler_open) = find_from(tokens, params_close + 1, "{") else {
                break;
            };
            let Some(handler_close) = matching(tokens, handler_open, "{", "}") else {
                break;
            };

            let mut catch_node = AstNode::leaf(NodeKind::CatchStmt, "catch", catch_loc);
            catch_node.children = self.walk_block(&tokens[handler_open + 1..handler_close]);
            catch_node.recompute_has_logging();
            node.children.push(catch_node);
            i = handler_close + 1;
        }

        node.recompute_has_logging();
        (Some(node), i)
    }

    /// Any non-control-flow statement becomes a single CallExpr-tagged
    /// leaf whose text is the source slice; the log-call identifier then
    /// decides whether to retag it.
    fn walk_other(&mut self, tokens: &[Token]) -> (Option<AstNode>, usize) {
        let end = statement_extent_balanced(tokens);
        let slice = &tokens[..end];
        let text = render(slice);
        let loc = self.location(&tokens[0]);

        let mut node = AstNode::leaf(NodeKind::CallExpr, synth_name(slice), loc.clone());
        node.text = text.clone();

        if let Some(site) = self.try_classify_call(slice, &loc) {
            node.kind = NodeKind::LogCallExpr;
            node.has_logging = true;
            node.log_call = Some(site);
        }

        let consumed = if end < tokens.len() && tokens[end].text == ";" {
            end + 1
        } else {
            end
        };
        (Some(node), consumed.max(1))
    }

    fn try_classify_call(&self, slice: &[Token], loc: &SourceLocation) -> Option<LogCallSite> {
        for (idx, tok) in slice.iter().enumerate() {
            if tok.kind != TokenKind::Ident {
                continue;
            }
            if slice.get(idx + 1).map(|t| t.text.as_str()) != Some("(") {
                continue;
            }
            let Some(entry) = self.identifier.classify(&tok.text) else {
                continue;
            };
            let open = idx + 1;
            let Some(close) = matching(slice, open, "(", ")") else {
                continue;
            };
            let args = &slice[open + 1..close];
            let is_streamed = slice.get(close + 1).map(|t| t.text.as_str()) == Some("<<");
            let single_string_arg = args.len() == 1 && args[0].kind == TokenKind::StringLit;

            let message = if single_string_arg {
                strip_quotes(&args[0].text)
            } else if is_streamed {
                slice[close + 1..]
                    .iter()
                    .filter(|t| t.kind == TokenKind::StringLit)
                    .last()
                    .map(|t| strip_quotes(&t.text))
                    .unwrap_or_default()
            } else {
                String::new()
            };

            let shape = crate::log_identifier::classify_shape(
                &tok.text,
                is_streamed,
                single_string_arg,
            );

            let library = entry.library;
            return Some(LogCallSite {
                file: loc.file.clone(),
                line: loc.line,
                column: loc.column,
                function_name: tok.text.clone(),
                library,
                level: entry.level,
                message,
                shape,
            });
        }
        None
    }
}

fn synth_name(slice: &[Token]) -> String {
    slice
        .iter()
        .find(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text.clone())
        .unwrap_or_else(|| "stmt".to_string())
}

fn strip_quotes(s: &str) -> String {
    s.trim_matches('"').to_string()
}

fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&tok.text);
    }
    out
}

fn find_from(tokens: &[Token], start: usize, text: &str) -> Option<usize> {
    tokens[start.min(tokens.len())..]
        .iter()
        .position(|t| t.text == text)
        .map(|p| p + start)
}

/// Extent (in tokens) of one "other" statement: up to the first
/// top-level `;`, respecting nested `()`/`{}`/`[]` so expressions like
/// lambda bodies or initializer lists don't terminate early.
fn statement_extent_balanced(tokens: &[Token]) -> usize {
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.text.as_str() {
            "(" | "{" | "[" => depth += 1,
            ")" | "}" | "]" => depth -= 1,
            ";" if depth <= 0 => return i,
            _ => {}
        }
    }
    tokens.len()
}

/// Extent of a single statement used as an if/for/while branch when it
/// is not a `{...}` block: up to and including its terminating `;`, or
/// to the end of a nested block if the single statement is itself a
/// control-flow statement with its own block.
fn single_statement_extent(tokens: &[Token]) -> usize {
    if tokens.is_empty() {
        return 0;
    }
    match tokens[0].text.as_str() {
        "if" | "for" | "while" | "switch" | "try" => {
            // Defer to the structural walk; consumers call walk_statement
            // directly for these, this helper is only reached via
            // branch_tokens for a *non-brace* branch, so fall back to a
            // generous heuristic: consume to the matching end of the
            // first `{...}` found, handling an optional trailing `else`.
            if let Some(open) = tokens.iter().position(|t| t.text == "{") {
                if let Some(close) = matching(tokens, open, "{", "}") {
                    return close + 1;
                }
            }
            statement_extent_balanced(tokens) + 1
        }
        "do" => {
            if let Some(open) = tokens.iter().position(|t| t.text == "{") {
                if let Some(close) = matching(tokens, open, "{", "}") {
                    // followed by while (...) ;
                    if let Some(w) = find_from(tokens, close + 1, "while") {
                        if let Some(popen) = find_from(tokens, w + 1, "(") {
                            if let Some(pclose) = matching(tokens, popen, "(", ")") {
                                let mut end = pclose + 1;
                                if tokens.get(end).map(|t| t.text.as_str()) == Some(";") {
                                    end += 1;
                                }
                                return end;
                            }
                        }
                    }
                    return close + 1;
                }
            }
            statement_extent_balanced(tokens) + 1
        }
        _ => {
            let extent = statement_extent_balanced(tokens);
            if extent < tokens.len() { extent + 1 } else { extent }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_identifier::LogCallIdentifier;
    use std::path::PathBuf;

    fn identifier() -> LogCallIdentifier {
        LogCallIdentifier::new()
            .with_qt_functions(&[
                "qDebug".to_string(),
                "qInfo".to_string(),
                "qWarning".to_string(),
                "qCritical".to_string(),
                "qFatal".to_string(),
            ])
            .with_custom_functions(&{
                let mut m = std::collections::HashMap::new();
                m.insert("error".to_string(), vec!["LOG_ERROR".to_string()]);
                m
            })
            .build()
    }

    #[test]
    fn single_function_with_one_log_call() {
        let source = r#"void f(){ qDebug() << "x"; }"#;
        let id = identifier();
        let roots = CppFrontEnd::new()
            .parse(&PathBuf::from("a.cpp"), source, &id, &[])
            .unwrap();
        assert_eq!(roots.len(), 1);
        let f = &roots[0];
        assert!(f.has_logging);
        assert_eq!(f.children.len(), 1);
        assert_eq!(f.children[0].kind, NodeKind::LogCallExpr);
    }

    #[test]
    fn if_else_only_then_logs() {
        let source = r#"void f(int x){ if(x>0){ qInfo() << "pos"; } else { return; } }"#;
        let id = identifier();
        let roots = CppFrontEnd::new()
            .parse(&PathBuf::from("a.cpp"), source, &id, &[])
            .unwrap();
        let f = &roots[0];
        assert_eq!(f.children.len(), 1);
        let if_node = &f.children[0];
        assert_eq!(if_node.kind, NodeKind::IfStmt);
        assert!(if_node.has_logging);
        let else_node = if_node
            .children
            .iter()
            .find(|c| c.kind == NodeKind::ElseStmt)
            .unwrap();
        assert!(!else_node.has_logging);
    }

    #[test]
    fn try_with_logging_catch_propagates_up() {
        let source = r#"void f(){ try{ do_it(); } catch(const E& e){ LOG_ERROR("boom"); } }"#;
        let id = identifier();
        let roots = CppFrontEnd::new()
            .parse(&PathBuf::from("a.cpp"), source, &id, &[])
            .unwrap();
        let f = &roots[0];
        let try_node = &f.children[0];
        assert_eq!(try_node.kind, NodeKind::TryStmt);
        assert!(try_node.has_logging);
        let catch_node = try_node
            .children
            .iter()
            .find(|c| c.kind == NodeKind::CatchStmt)
            .unwrap();
        assert!(catch_node.has_logging);
        let log_node = catch_node
            .children
            .iter()
            .find(|c| c.kind == NodeKind::LogCallExpr)
            .unwrap();
        assert_eq!(log_node.log_call.as_ref().unwrap().level, crate::core::LogLevel::Fatal);
    }

    #[test]
    fn parameter_count_reflects_signature() {
        let source = "void f(int a, int b, const std::string& c){}";
        let id = identifier();
        let roots = CppFrontEnd::new()
            .parse(&PathBuf::from("a.cpp"), source, &id, &[])
            .unwrap();
        assert_eq!(roots[0].parameter_count, 3);
    }

    #[test]
    fn void_parameter_list_counts_as_zero() {
        let source = "void f(void){}";
        let id = identifier();
        let roots = CppFrontEnd::new()
            .parse(&PathBuf::from("a.cpp"), source, &id, &[])
            .unwrap();
        assert_eq!(roots[0].parameter_count, 0);
    }

    #[test]
    fn empty_function_has_no_children() {
        let source = "void f(){}";
        let id = identifier();
        let roots = CppFrontEnd::new()
            .parse(&PathBuf::from("a.cpp"), source, &id, &[])
            .unwrap();
        assert_eq!(roots[0].children.len(), 0);
        assert!(!roots[0].has_logging);
    }
}
