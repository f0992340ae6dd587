//! JSON syntax-tree ingestion.
//!
//! External parsers hand trees over as a JSON document: a list of roots,
//! each `{"name": ..., "root": {"kind": ..., "payload"?, "span"?,
//! "children"?}}`. Unknown `kind` strings deserialize to `other` rather than
//! failing, keeping the input contract total.

use std::io::Read;

use crate::core::{Result, ScopeRoot};

/// Parse a JSON document holding a list of scope roots.
pub fn roots_from_json(data: &str) -> Result<Vec<ScopeRoot>> {
    Ok(serde_json::from_str(data)?)
}

/// Parse scope roots from a reader.
pub fn roots_from_reader<R: Read>(reader: R) -> Result<Vec<ScopeRoot>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeKind;

    #[test]
    fn test_parses_minimal_document() {
        let roots = roots_from_json(
            r#"[
                {
                    "name": "shop.rb",
                    "root": {
                        "kind": "method_def",
                        "payload": "buy",
                        "span": {"start_line": 2, "end_line": 5},
                        "children": [{"kind": "assignment"}]
                    }
                }
            ]"#,
        )
        .expect("valid document");

        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "shop.rb");
        assert_eq!(roots[0].root.kind, NodeKind::MethodDef);
        assert_eq!(roots[0].root.children.len(), 1);
    }

    #[test]
    fn test_unknown_kind_degrades_to_other() {
        let roots = roots_from_json(
            r#"[{"name": "x.rb", "root": {"kind": "heredoc_body"}}]"#,
        )
        .expect("valid document");
        assert_eq!(roots[0].root.kind, NodeKind::Other);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(roots_from_json("not json").is_err());
        assert!(roots_from_json(r#"{"name": "missing list"}"#).is_err());
    }

    #[test]
    fn test_empty_list_is_valid() {
        let roots = roots_from_json("[]").expect("empty list");
        assert!(roots.is_empty());
    }
}
