//! Java tree producer built on tree-sitter
//!
//! Thin adapter over the tree-sitter Java grammar: parsing plus the handful
//! of CST helpers the detector needs (annotation extraction, modifier
//! keywords, raw node text). The detector never touches grammar node
//! internals outside this module and `detector.rs`.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::domain::{DetectorError, DetectorResult};

/// One annotation attached to a declaration, reduced to what the exemption
/// rules consume: the simple (last dot-segment) name and the raw argument
/// text including parentheses and quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInfo {
    pub name: String,
    pub arguments: Option<String>,
}

/// Parser for Java compilation units.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    /// Create a parser with the Java grammar loaded.
    pub fn new() -> DetectorResult<Self> {
        let language: Language = tree_sitter_java::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| DetectorError::config(format!("failed to load Java grammar: {e}")))?;
        Ok(Self { parser })
    }

    /// Parse one compilation unit. Returns `None` only when the parser
    /// produces no tree at all; malformed source still yields a best-effort
    /// tree with error nodes, which the detector traverses normally.
    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

/// Raw source text covered by a node.
pub fn node_text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

/// Annotations in a declaration's `modifiers` child, in source order.
pub fn annotations(node: Node<'_>, src: &[u8]) -> Vec<AnnotationInfo> {
    let mut found = Vec::new();
    let Some(modifiers) = modifiers_child(node) else {
        return found;
    };

    let mut cursor = modifiers.walk();
    for child in modifiers.children(&mut cursor) {
        if child.kind() != "annotation" && child.kind() != "marker_annotation" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = simple_name(node_text(name_node, src)).to_string();
        let arguments = child
            .child_by_field_name("arguments")
            .map(|args| node_text(args, src).to_string());
        found.push(AnnotationInfo { name, arguments });
    }

    found
}

/// Whether a declaration carries the given modifier keyword (`final`,
/// `static`, ...).
pub fn has_modifier(node: Node<'_>, keyword: &str) -> bool {
    let Some(modifiers) = modifiers_child(node) else {
        return false;
    };

    let mut cursor = modifiers.walk();
    let has_keyword = modifiers
        .children(&mut cursor)
        .any(|child| child.kind() == keyword);
    has_keyword
}

/// Simple name of a possibly qualified annotation type
/// (`org.springframework.stereotype.Service` -> `Service`).
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn modifiers_child<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");
    found
}
