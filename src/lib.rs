//! Flay - flog-style syntactic complexity scoring.
//!
//! Flay walks normalized syntax trees, charges weighted penalties for the
//! constructs that correlate with complexity (calls, branches, blocks,
//! assignments, exception handling), multiplies control-flow penalties
//! super-linearly with nesting depth, and ranks every method-like scope by
//! its total pain. Trees come from the built-in tree-sitter Ruby adapter or
//! from any external parser via the JSON contract.
//!
//! # Example
//!
//! ```
//! use flay::core::{NodeKind, ScopeRoot, SyntaxNode};
//! use flay::score::{aggregate, score_roots, Scorer};
//!
//! let method = SyntaxNode::new(NodeKind::MethodDef)
//!     .with_payload("buy")
//!     .with_children(vec![
//!         SyntaxNode::new(NodeKind::Branch)
//!             .with_children(vec![SyntaxNode::new(NodeKind::Assignment)]),
//!     ]);
//! let root = ScopeRoot::new("shop.rb", method);
//!
//! let run = score_roots(&Scorer::default(), &[root], None).unwrap();
//! let report = aggregate(run.entries);
//! assert_eq!(report.entries[0].scope_name, "main#buy");
//! assert_eq!(report.total_score, 2.0);
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod core;
pub mod report;
pub mod score;

pub use score::{aggregate, score_roots, AggregateReport, ScoreEntry, Scorer, WeightTable};
