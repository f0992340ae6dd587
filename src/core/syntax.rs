//! Normalized syntax tree model.
//!
//! This is the contract between the scorer and whatever produced the tree:
//! a built-in adapter, or an external parser handing over serialized trees.
//! The scorer treats the tree as read-only input; children are owned
//! exclusively by their parent, so cycles are unrepresentable by
//! construction.

use serde::{Deserialize, Serialize};

/// Node kinds the scorer understands.
///
/// Closed enumeration with an explicit fallback arm: adapters mapping an
/// unfamiliar construct emit [`NodeKind::Other`], and unknown kind names in
/// serialized trees deserialize to it as well, so every traversal match stays
/// exhaustive and a new kind is a compile-time-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Class definition. Payload is the class name.
    ClassDef,
    /// Module definition. Payload is the module name.
    ModuleDef,
    /// Method definition. Payload is the method name; singleton definitions
    /// (`def self.x`) carry a `self.` prefix.
    MethodDef,
    /// Method call. Payload is the callee name.
    Call,
    /// Iterator or lambda block.
    Block,
    /// Conditional: if/unless/case/when/ternary.
    Branch,
    /// Loop: while/until/for.
    Loop,
    /// Exception handling: rescue/ensure.
    Rescue,
    /// Assignment, including operator and multiple assignment.
    Assignment,
    /// Literal value.
    Literal,
    /// Bare identifier, constant, or variable reference.
    Identifier,
    /// Anything else. Weighted 0.0 by default.
    Other,
}

impl Serialize for NodeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    /// Unknown kind names deserialize to [`NodeKind::Other`], keeping the
    /// input contract total across adapter versions.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name).unwrap_or(Self::Other))
    }
}

impl NodeKind {
    /// Every kind, in declaration order. Used to keep weight tables and
    /// override validation total.
    pub const ALL: [NodeKind; 12] = [
        NodeKind::ClassDef,
        NodeKind::ModuleDef,
        NodeKind::MethodDef,
        NodeKind::Call,
        NodeKind::Block,
        NodeKind::Branch,
        NodeKind::Loop,
        NodeKind::Rescue,
        NodeKind::Assignment,
        NodeKind::Literal,
        NodeKind::Identifier,
        NodeKind::Other,
    ];

    /// Stable snake_case name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClassDef => "class_def",
            Self::ModuleDef => "module_def",
            Self::MethodDef => "method_def",
            Self::Call => "call",
            Self::Block => "block",
            Self::Branch => "branch",
            Self::Loop => "loop",
            Self::Rescue => "rescue",
            Self::Assignment => "assignment",
            Self::Literal => "literal",
            Self::Identifier => "identifier",
            Self::Other => "other",
        }
    }

    /// Look up a kind by its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether this kind starts a nesting level: entering it increments the
    /// nesting depth for its children, and its own penalty takes the depth
    /// multiplier.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, Self::Branch | Self::Loop | Self::Block | Self::Rescue)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Line range of a node in its source file. 1-indexed, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceSpan {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }
}

/// One node of a normalized syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Kind tag.
    pub kind: NodeKind,
    /// Method or identifier name, where the kind carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Source location, for reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    /// Children in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a leaf node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            payload: None,
            span: None,
            children: Vec::new(),
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attach a source span.
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach children.
    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }
}

/// One top-level tree handed to the scorer, named for reporting (usually the
/// source file path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeRoot {
    /// Display name of the root, e.g. the file path.
    pub name: String,
    /// The tree itself.
    pub root: SyntaxNode,
}

impl ScopeRoot {
    pub fn new(name: impl Into<String>, root: SyntaxNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}
