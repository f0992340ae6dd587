//! Adapters producing normalized syntax trees for the scorer.
//!
//! The scorer only ever sees [`crate::core::SyntaxNode`] trees. The Ruby
//! adapter builds them from source with tree-sitter; the JSON adapter accepts
//! pre-parsed trees from any external parser.

pub mod json;
pub mod ruby;

pub use ruby::RubyAdapter;
