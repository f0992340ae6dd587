//! Depth-first scorer producing one score entry per method-like scope.
//!
//! The traversal uses an explicit work stack rather than recursion: children
//! are owned by their parents so a cycle cannot be expressed, but a
//! degenerate adapter can still hand over a pathologically deep tree, and the
//! depth bound converts that into a per-scope structural error instead of
//! stack exhaustion.

use serde::{Deserialize, Serialize};

use crate::core::{Error, NodeKind, Result, ScopeRoot, SourceSpan, SyntaxNode};

use super::weights::WeightTable;

/// One scored unit: a method, a singleton method, or the loose top-level
/// code of a root. Immutable once the traversal that produced it finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Qualified scope name: `Class#method`, `Class::method` for singleton
    /// definitions, `main` for loose top-level code.
    pub scope_name: String,
    /// Accumulated weighted penalty.
    pub raw_score: f64,
    /// Nodes attributed to this scope, including zero-weight ones.
    pub node_count: usize,
    /// Peak nesting depth observed inside the scope.
    pub max_nesting_depth: u32,
    /// Line range of the scope, when the adapter provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

/// Running accumulation for one open scope.
struct ScopeAcc {
    name: String,
    is_method: bool,
    score: f64,
    nodes: usize,
    depth: u32,
    peak: u32,
    span: Option<SourceSpan>,
}

impl ScopeAcc {
    fn new(name: String, is_method: bool, span: Option<SourceSpan>) -> Self {
        Self {
            name,
            is_method,
            score: 0.0,
            nodes: 0,
            depth: 0,
            peak: 0,
            span,
        }
    }

    fn finish(self) -> ScoreEntry {
        ScoreEntry {
            scope_name: self.name,
            raw_score: self.score,
            node_count: self.nodes,
            max_nesting_depth: self.peak,
            span: self.span,
        }
    }
}

/// Work-stack items. `Leave` undoes whatever `Enter` set up: nesting depth
/// for control flow, the namespace for classes and modules, the open scope
/// for method definitions.
enum Walk<'a> {
    Enter(&'a SyntaxNode, usize),
    Leave(&'a SyntaxNode),
}

/// Scores syntax trees against an injected weight table.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: WeightTable,
    nesting_factor: f64,
    max_depth: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(
            WeightTable::new(),
            Self::DEFAULT_NESTING_FACTOR,
            Self::DEFAULT_MAX_DEPTH,
        )
    }
}

impl Scorer {
    /// Multiplier growth per nesting level.
    pub const DEFAULT_NESTING_FACTOR: f64 = 0.5;
    /// Tree depth bound before a root is rejected as malformed.
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Create a scorer with explicit policy. Both values normally come from
    /// [`crate::config::WeightsConfig`].
    pub fn new(weights: WeightTable, nesting_factor: f64, max_depth: usize) -> Self {
        Self {
            weights,
            nesting_factor,
            max_depth,
        }
    }

    /// Score one root, producing an entry per method-like scope in the order
    /// the scopes finish.
    ///
    /// Control-flow nodes cost `base × (1 + depth × nesting_factor)` with the
    /// depth sampled before entry, so a top-level branch costs its base
    /// weight and deeply nested branches cost super-linearly more. Method
    /// definitions open an independent scope: their subtree never adds to the
    /// enclosing total, though a definition nested inside another method body
    /// charges the enclosing scope a small penalty. Loose code outside any
    /// method accumulates into a synthetic `main` scope, emitted only when it
    /// scored anything.
    pub fn score_root(&self, root: &ScopeRoot) -> Result<Vec<ScoreEntry>> {
        let mut entries = Vec::new();
        let mut namespace: Vec<String> = Vec::new();
        let mut methods: Vec<ScopeAcc> = Vec::new();
        let mut main = ScopeAcc::new("main".to_string(), false, root.root.span);
        let mut work = vec![Walk::Enter(&root.root, 0)];

        while let Some(item) = work.pop() {
            match item {
                Walk::Enter(node, depth) => {
                    if depth > self.max_depth {
                        return Err(Error::structural(
                            &root.name,
                            format!("tree depth exceeds bound of {}", self.max_depth),
                        ));
                    }
                    let weight = self.weights.weight_for(node);
                    match node.kind {
                        NodeKind::ClassDef | NodeKind::ModuleDef => {
                            let scope = methods.last_mut().unwrap_or(&mut main);
                            scope.nodes += 1;
                            scope.score += weight;
                            namespace.push(
                                node.payload
                                    .clone()
                                    .unwrap_or_else(|| "<anonymous>".to_string()),
                            );
                            work.push(Walk::Leave(node));
                            push_children(&mut work, node, depth);
                        }
                        NodeKind::MethodDef => {
                            let scope = methods.last_mut().unwrap_or(&mut main);
                            scope.nodes += 1;
                            // The defines-nested-method penalty applies to
                            // closures and inner defs, not to ordinary
                            // definitions sitting in a class body.
                            if scope.is_method {
                                scope.score += weight;
                            }
                            methods.push(ScopeAcc::new(
                                qualified_name(&namespace, node),
                                true,
                                node.span,
                            ));
                            work.push(Walk::Leave(node));
                            push_children(&mut work, node, depth);
                        }
                        kind if kind.is_control_flow() => {
                            let factor = self.nesting_factor;
                            let scope = methods.last_mut().unwrap_or(&mut main);
                            scope.nodes += 1;
                            scope.score += weight * (1.0 + f64::from(scope.depth) * factor);
                            scope.depth += 1;
                            scope.peak = scope.peak.max(scope.depth);
                            work.push(Walk::Leave(node));
                            push_children(&mut work, node, depth);
                        }
                        _ => {
                            let scope = methods.last_mut().unwrap_or(&mut main);
                            scope.nodes += 1;
                            scope.score += weight;
                            push_children(&mut work, node, depth);
                        }
                    }
                }
                Walk::Leave(node) => match node.kind {
                    NodeKind::ClassDef | NodeKind::ModuleDef => {
                        namespace.pop();
                    }
                    NodeKind::MethodDef => {
                        if let Some(scope) = methods.pop() {
                            entries.push(scope.finish());
                        }
                    }
                    kind if kind.is_control_flow() => {
                        let scope = methods.last_mut().unwrap_or(&mut main);
                        scope.depth = scope.depth.saturating_sub(1);
                    }
                    _ => {}
                },
            }
        }

        if main.score > 0.0 {
            entries.push(main.finish());
        }

        tracing::debug!(root = %root.name, entries = entries.len(), "scored root");
        Ok(entries)
    }
}

/// Push children onto the work stack in reverse so they pop in source order.
fn push_children<'a>(work: &mut Vec<Walk<'a>>, node: &'a SyntaxNode, depth: usize) {
    for child in node.children.iter().rev() {
        work.push(Walk::Enter(child, depth + 1));
    }
}

/// Qualify a method name against the enclosing namespace. Singleton
/// definitions (payload prefixed `self.`) join with `::`, instance
/// definitions with `#`; top-level definitions belong to `main`.
fn qualified_name(namespace: &[String], node: &SyntaxNode) -> String {
    let raw = node.payload.as_deref().unwrap_or("<anonymous>");
    let (name, singleton) = match raw.strip_prefix("self.") {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    let owner = if namespace.is_empty() {
        "main".to_string()
    } else {
        namespace.join("::")
    };
    let separator = if singleton { "::" } else { "#" };
    format!("{owner}{separator}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(kind)
    }

    fn method(name: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(NodeKind::MethodDef)
            .with_payload(name)
            .with_children(children)
    }

    fn root(children: Vec<SyntaxNode>) -> ScopeRoot {
        ScopeRoot::new(
            "test.rb",
            SyntaxNode::new(NodeKind::Other).with_children(children),
        )
    }

    fn score(scope_root: &ScopeRoot) -> Vec<ScoreEntry> {
        Scorer::default()
            .score_root(scope_root)
            .expect("tree is well-formed")
    }

    #[test]
    fn test_empty_method_scores_zero() {
        let entries = score(&root(vec![method("noop", vec![])]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope_name, "main#noop");
        assert_eq!(entries[0].raw_score, 0.0);
        assert_eq!(entries[0].node_count, 0);
        assert_eq!(entries[0].max_nesting_depth, 0);
    }

    #[test]
    fn test_flat_branches_cost_base_weight() {
        let entries = score(&root(vec![method(
            "flat",
            vec![
                node(NodeKind::Branch),
                node(NodeKind::Branch),
                node(NodeKind::Branch),
            ],
        )]));
        assert_eq!(entries[0].raw_score, 3.0);
        assert_eq!(entries[0].max_nesting_depth, 1);
        assert_eq!(entries[0].node_count, 3);
    }

    #[test]
    fn test_nested_branches_cost_super_linearly() {
        let nested = node(NodeKind::Branch).with_children(vec![
            node(NodeKind::Branch).with_children(vec![node(NodeKind::Branch)]),
        ]);
        let entries = score(&root(vec![method("nested", vec![nested])]));
        // 1.0 + 1.5 + 2.0 with the default factor of 0.5.
        assert_eq!(entries[0].raw_score, 4.5);
        assert_eq!(entries[0].max_nesting_depth, 3);
        assert_eq!(entries[0].node_count, 3);
    }

    #[test]
    fn test_non_control_flow_ignores_nesting() {
        let tree = node(NodeKind::Branch).with_children(vec![
            node(NodeKind::Assignment),
            SyntaxNode::new(NodeKind::Call).with_payload("save"),
        ]);
        let entries = score(&root(vec![method("m", vec![tree])]));
        // branch 1.0 + assignment 1.0 + call 1.0: flat weights inside the
        // branch do not take the multiplier.
        assert_eq!(entries[0].raw_score, 3.0);
    }

    #[test]
    fn test_class_namespace_qualifies_scope_names() {
        let class = SyntaxNode::new(NodeKind::ClassDef)
            .with_payload("Shop")
            .with_children(vec![
                method("buy", vec![node(NodeKind::Assignment)]),
                method("self.open", vec![node(NodeKind::Assignment)]),
            ]);
        let mut names: Vec<String> = score(&root(vec![class]))
            .into_iter()
            .map(|e| e.scope_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Shop#buy", "Shop::open"]);
    }

    #[test]
    fn test_nested_namespace_joins_with_double_colon() {
        let tree = SyntaxNode::new(NodeKind::ModuleDef)
            .with_payload("Billing")
            .with_children(vec![SyntaxNode::new(NodeKind::ClassDef)
                .with_payload("Invoice")
                .with_children(vec![method("total", vec![node(NodeKind::Call)])])]);
        let entries = score(&root(vec![tree]));
        assert_eq!(entries[0].scope_name, "Billing::Invoice#total");
    }

    #[test]
    fn test_nested_method_scored_independently() {
        let inner = method("inner", vec![node(NodeKind::Branch)]);
        let outer = method("outer", vec![node(NodeKind::Assignment), inner]);
        let entries = score(&root(vec![outer]));
        assert_eq!(entries.len(), 2);
        // Inner scopes finish first.
        assert_eq!(entries[0].scope_name, "main#inner");
        assert_eq!(entries[0].raw_score, 1.0);
        // Outer pays the assignment plus the defines-nested-method penalty,
        // but nothing from the inner body.
        assert_eq!(entries[1].scope_name, "main#outer");
        assert_eq!(entries[1].raw_score, 2.0);
        assert_eq!(entries[1].node_count, 2);
    }

    #[test]
    fn test_inner_method_nesting_starts_fresh() {
        let inner = method("inner", vec![node(NodeKind::Branch)]);
        let outer = method(
            "outer",
            vec![node(NodeKind::Branch).with_children(vec![inner])],
        );
        let entries = score(&root(vec![outer]));
        // The inner branch sits under a branch in the outer method, but its
        // own scope starts at depth zero: base weight only.
        assert_eq!(entries[0].scope_name, "main#inner");
        assert_eq!(entries[0].raw_score, 1.0);
        assert_eq!(entries[0].max_nesting_depth, 1);
        assert_eq!(entries[1].raw_score, 2.0);
    }

    #[test]
    fn test_loose_code_collects_into_main() {
        let entries = score(&root(vec![
            SyntaxNode::new(NodeKind::Call).with_payload("require"),
            node(NodeKind::Assignment),
        ]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope_name, "main");
        assert_eq!(entries[0].raw_score, 2.0);
        // The program root node is attributed too.
        assert_eq!(entries[0].node_count, 3);
    }

    #[test]
    fn test_class_without_loose_code_emits_no_main_entry() {
        let class = SyntaxNode::new(NodeKind::ClassDef)
            .with_payload("Quiet")
            .with_children(vec![method("noop", vec![])]);
        let entries = score(&root(vec![class]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope_name, "Quiet#noop");
    }

    #[test]
    fn test_top_level_method_def_charges_no_penalty() {
        // A plain `def` at top level is not a closure; main stays silent.
        let entries = score(&root(vec![method("lonely", vec![])]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scope_name, "main#lonely");
    }

    #[test]
    fn test_depth_bound_reports_structural_error() {
        let deep = (0..600).fold(node(NodeKind::Literal), |acc, _| {
            node(NodeKind::Branch).with_children(vec![acc])
        });
        let err = Scorer::default()
            .score_root(&root(vec![deep]))
            .expect_err("depth bound exceeded");
        match err {
            Error::Structural { scope, message } => {
                assert_eq!(scope, "test.rb");
                assert!(message.contains("depth"));
            }
            other => panic!("expected structural error, got {other}"),
        }
    }

    #[test]
    fn test_depth_within_bound_is_accepted() {
        let deep = (0..100).fold(node(NodeKind::Literal), |acc, _| {
            node(NodeKind::Other).with_children(vec![acc])
        });
        let entries = score(&root(vec![method("deep", vec![deep])]));
        assert_eq!(entries[0].raw_score, 0.25);
    }

    #[test]
    fn test_identical_input_identical_output() {
        let scope_root = root(vec![method(
            "stable",
            vec![
                node(NodeKind::Branch).with_children(vec![node(NodeKind::Assignment)]),
                SyntaxNode::new(NodeKind::Call).with_payload("send"),
            ],
        )]);
        let first = score(&scope_root);
        let second = score(&scope_root);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_nesting_factor() {
        let scorer = Scorer::new(WeightTable::new(), 1.0, Scorer::DEFAULT_MAX_DEPTH);
        let nested =
            node(NodeKind::Branch).with_children(vec![node(NodeKind::Branch)]);
        let entries = scorer
            .score_root(&root(vec![method("m", vec![nested])]))
            .expect("tree is well-formed");
        // 1.0 + (1.0 × (1 + 1 × 1.0)) = 3.0 with a factor of 1.0.
        assert_eq!(entries[0].raw_score, 3.0);
    }
}
