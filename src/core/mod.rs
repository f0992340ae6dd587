//! Core types shared across the crate.

mod error;
mod syntax;

pub use error::{Error, Result};
pub use syntax::{NodeKind, ScopeRoot, SourceSpan, SyntaxNode};
