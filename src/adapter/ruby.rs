//! Ruby source adapter backed by tree-sitter.

use std::path::Path;

use parking_lot::Mutex;
use tree_sitter::{Node as TsNode, Parser as TsParser};

use crate::core::{Error, NodeKind, Result, ScopeRoot, SourceSpan, SyntaxNode};

/// Converts Ruby sources into scorer input trees.
///
/// Holds one tree-sitter parser behind a mutex so a single adapter can be
/// shared across threads; parsers are stateful and cannot be used
/// concurrently.
pub struct RubyAdapter {
    parser: Mutex<TsParser>,
    max_depth: usize,
}

impl Default for RubyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RubyAdapter {
    /// Create an adapter with the default depth bound.
    pub fn new() -> Self {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_ruby::LANGUAGE.into())
            .expect("Ruby grammar should be valid");
        Self {
            parser: Mutex::new(parser),
            max_depth: 512,
        }
    }

    /// Override the conversion depth bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a Ruby file into a scope root named after its path.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ScopeRoot> {
        let path = path.as_ref();
        let source = std::fs::read(path)?;
        self.parse_source(path, &source)
    }

    /// Parse Ruby source content.
    pub fn parse_source(&self, path: &Path, source: &[u8]) -> Result<ScopeRoot> {
        let tree = {
            let mut parser = self.parser.lock();
            parser.parse(source, None).ok_or_else(|| Error::Parse {
                path: path.to_path_buf(),
                message: "failed to parse".to_string(),
            })?
        };
        let root = convert(tree.root_node(), source, 0, self.max_depth, path)?;
        Ok(ScopeRoot::new(path.to_string_lossy().into_owned(), root))
    }
}

/// Convert a tree-sitter node into the normalized model. Named children
/// only; punctuation and keyword tokens carry no scoring signal, and
/// comments are skipped outright.
fn convert(
    node: TsNode<'_>,
    source: &[u8],
    depth: usize,
    max_depth: usize,
    path: &Path,
) -> Result<SyntaxNode> {
    if depth > max_depth {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: format!("syntax tree deeper than {max_depth}"),
        });
    }

    let kind = map_kind(node.kind());
    let span = SourceSpan::new(
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    );

    let mut children = Vec::with_capacity(node.named_child_count());
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        children.push(convert(child, source, depth + 1, max_depth, path)?);
    }

    let mut converted = SyntaxNode::new(kind).with_span(span).with_children(children);
    if let Some(payload) = payload_for(&node, kind, source) {
        converted = converted.with_payload(payload);
    }
    Ok(converted)
}

/// Map a tree-sitter-ruby node kind onto the normalized kind set.
fn map_kind(kind: &str) -> NodeKind {
    match kind {
        "class" | "singleton_class" => NodeKind::ClassDef,
        "module" => NodeKind::ModuleDef,
        "method" | "singleton_method" => NodeKind::MethodDef,
        "call" | "super" | "yield" => NodeKind::Call,
        "block" | "do_block" | "lambda" => NodeKind::Block,
        "if" | "unless" | "elsif" | "if_modifier" | "unless_modifier" | "case" | "case_match"
        | "when" | "in_clause" | "conditional" => NodeKind::Branch,
        "while" | "until" | "for" | "while_modifier" | "until_modifier" => NodeKind::Loop,
        "rescue" | "rescue_modifier" | "ensure" | "retry" => NodeKind::Rescue,
        "assignment" | "operator_assignment" | "left_assignment_list" => NodeKind::Assignment,
        "integer" | "float" | "rational" | "string" | "symbol" | "simple_symbol"
        | "delimited_symbol" | "regex" | "true" | "false" | "nil" | "character" => {
            NodeKind::Literal
        }
        "identifier" | "constant" | "instance_variable" | "class_variable" | "global_variable"
        | "self" => NodeKind::Identifier,
        _ => NodeKind::Other,
    }
}

/// Extract the payload a kind carries: definition names, callee names,
/// identifier text. Singleton method names take a `self.` prefix so the
/// scorer can qualify them with `::`.
fn payload_for(node: &TsNode<'_>, kind: NodeKind, source: &[u8]) -> Option<String> {
    match kind {
        NodeKind::ClassDef | NodeKind::ModuleDef => field_text(node, "name", source),
        NodeKind::MethodDef => {
            let name = field_text(node, "name", source)?;
            if node.kind() == "singleton_method" {
                Some(format!("self.{name}"))
            } else {
                Some(name)
            }
        }
        NodeKind::Call => match node.kind() {
            "super" => Some("super".to_string()),
            "yield" => Some("yield".to_string()),
            _ => field_text(node, "method", source),
        },
        NodeKind::Identifier => node.utf8_text(source).ok().map(str::to_owned),
        _ => None,
    }
}

fn field_text(node: &TsNode<'_>, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|child| child.utf8_text(source).ok())
        .map(str::to_owned)
}
