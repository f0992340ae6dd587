//! Scoring engine: weight table, scorer, aggregation, and the multi-root
//! driver.
//!
//! # Overview
//!
//! Flay assigns every method-like scope a weighted-sum "pain" score in the
//! flog tradition: calls, branches, blocks, assignments and exception
//! handling each cost a configured penalty, control flow costs more the
//! deeper it nests, and volatile calls (`eval`, `send`, reflection) cost the
//! most. Scoring is a pure, single-pass computation over immutable input
//! trees, so independent roots are scored in parallel and merged by the
//! deterministic [`aggregate`] sort.
//!
//! # Example
//!
//! ```
//! use flay::core::{NodeKind, ScopeRoot, SyntaxNode};
//! use flay::score::{aggregate, score_roots, Scorer};
//!
//! let method = SyntaxNode::new(NodeKind::MethodDef)
//!     .with_payload("checkout")
//!     .with_children(vec![SyntaxNode::new(NodeKind::Branch)]);
//! let root = ScopeRoot::new("shop.rb", method);
//!
//! let run = score_roots(&Scorer::default(), &[root], None).unwrap();
//! let report = aggregate(run.entries);
//! assert_eq!(report.entries[0].scope_name, "main#checkout");
//! ```

pub mod aggregate;
pub mod scorer;
pub mod weights;

pub use aggregate::{aggregate, AggregateReport};
pub use scorer::{ScoreEntry, Scorer};
pub use weights::WeightTable;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, ScopeRoot};

/// A traversal failure captured against one root. One malformed tree never
/// aborts the rest of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeFailure {
    /// Name of the failed root.
    pub scope: String,
    /// What went wrong.
    pub message: String,
}

/// Partial-success result of scoring many roots: every entry that scored,
/// plus every per-root failure, never silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredRun {
    pub entries: Vec<ScoreEntry>,
    pub failures: Vec<ScopeFailure>,
}

/// Score a set of roots, in parallel.
///
/// Roots have no data dependency on each other, so they are scored across
/// the rayon pool; result order comes from the input order (and final
/// ranking from [`aggregate`]), never from scheduling. When `cancel` is
/// observed set, the whole run returns [`Error::Cancelled`] and any partial
/// results are discarded rather than merged.
pub fn score_roots(
    scorer: &Scorer,
    roots: &[ScopeRoot],
    cancel: Option<&AtomicBool>,
) -> Result<ScoredRun> {
    let start = Instant::now();

    let results: Vec<std::result::Result<Vec<ScoreEntry>, ScopeFailure>> = roots
        .par_iter()
        .map(|root| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(ScopeFailure {
                    scope: root.name.clone(),
                    message: "cancelled".to_string(),
                });
            }
            scorer.score_root(root).map_err(|err| ScopeFailure {
                scope: root.name.clone(),
                message: err.to_string(),
            })
        })
        .collect();

    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Err(Error::Cancelled);
    }

    let mut run = ScoredRun::default();
    for result in results {
        match result {
            Ok(entries) => run.entries.extend(entries),
            Err(failure) => run.failures.push(failure),
        }
    }

    tracing::info!(
        "scored {} scopes across {} roots in {:?} ({} failed)",
        run.entries.len(),
        roots.len(),
        start.elapsed(),
        run.failures.len()
    );
    Ok(run)
}
