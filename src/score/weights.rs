//! Weight table mapping node kinds and call patterns to penalties.
//!
//! The table is pure data, injected into the scorer at construction so that
//! concurrent runs with different policies cannot interfere. Overrides are
//! validated up front: a bad weight would silently corrupt every score, so it
//! must fail before any traversal begins.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::core::{Error, NodeKind, Result, SyntaxNode};

/// Calls that correlate with hidden complexity, and their penalties.
///
/// Magnitudes follow the flog tradition: dynamic evaluation is worst, dynamic
/// dispatch next, metaprogramming helpers after that.
static CALL_PENALTIES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("eval", 5.0),
        ("instance_eval", 5.0),
        ("class_eval", 5.0),
        ("module_eval", 5.0),
        ("define_method", 5.0),
        ("send", 3.0),
        ("public_send", 3.0),
        ("__send__", 3.0),
        ("method_missing", 2.0),
        ("instance_variable_get", 2.0),
        ("instance_variable_set", 2.0),
        ("const_get", 2.0),
        ("const_set", 2.0),
        ("alias_method", 2.0),
        ("extend", 2.0),
        ("include", 2.0),
        ("inject", 2.0),
    ])
});

/// Default base penalty for a node kind.
///
/// `MethodDef` carries the defines-nested-method penalty; the scorer charges
/// it only when the definition appears inside another method body.
fn default_weight(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::MethodDef
        | NodeKind::Call
        | NodeKind::Block
        | NodeKind::Branch
        | NodeKind::Loop
        | NodeKind::Rescue
        | NodeKind::Assignment => 1.0,
        NodeKind::Literal => 0.25,
        NodeKind::ClassDef | NodeKind::ModuleDef | NodeKind::Identifier | NodeKind::Other => 0.0,
    }
}

/// Fixed mapping from node kind (and call-name patterns) to penalties.
#[derive(Debug, Clone)]
pub struct WeightTable {
    kind_weights: HashMap<NodeKind, f64>,
    call_penalties: &'static HashMap<&'static str, f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightTable {
    /// Build the default table.
    pub fn new() -> Self {
        let kind_weights = NodeKind::ALL
            .into_iter()
            .map(|kind| (kind, default_weight(kind)))
            .collect();
        Self {
            kind_weights,
            call_penalties: &CALL_PENALTIES,
        }
    }

    /// Build a table with per-kind overrides, keyed by kind name.
    ///
    /// An unknown kind name or a negative/non-finite weight is a
    /// configuration error. Keys are checked in sorted order so the first
    /// reported problem is stable across runs.
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Result<Self> {
        let mut table = Self::new();
        let mut names: Vec<&String> = overrides.keys().collect();
        names.sort();
        for name in names {
            let kind = NodeKind::from_name(name).ok_or_else(|| {
                Error::config(format!("unknown node kind in weight override: {name}"))
            })?;
            let weight = overrides[name];
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::config(format!(
                    "invalid weight {weight} for node kind {name}: weights must be finite and non-negative"
                )));
            }
            table.kind_weights.insert(kind, weight);
        }
        Ok(table)
    }

    /// Base penalty for a node. Total over every kind; a [`NodeKind::Other`]
    /// node resolves to its default of 0.0 rather than failing.
    ///
    /// Calls naming a volatile operation take the call penalty instead of the
    /// plain call weight.
    pub fn weight_for(&self, node: &SyntaxNode) -> f64 {
        if node.kind == NodeKind::Call {
            if let Some(name) = node.payload.as_deref() {
                if let Some(&penalty) = self.call_penalties.get(name) {
                    return penalty;
                }
            }
        }
        self.kind_weights.get(&node.kind).copied().unwrap_or(0.0)
    }
}
