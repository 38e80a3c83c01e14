//! Tools for looking at the structure of encoded buffers without knowing their type.
//! Useful for debugging key layouts and forward-compatibility issues.

use serde::Serialize;

use crate::token::Token;

/// How the inspector interpreted a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// The span parsed as a sequence of `[key][value]` pairs.
    NamedObject,
    /// The span is opaque: a scalar, a tuple, a collection, or the depth limit was hit.
    Leaf,
}

/// Structure of one span.
#[derive(Debug, Serialize)]
pub struct TokenReport {
    /// Bytes covered by the span.
    pub length: usize,
    /// Interpretation of the span.
    pub kind: NodeKind,
    /// Child spans keyed by member name, sorted by key. Empty for leaves.
    pub children: Vec<(String, TokenReport)>,
}

/// The tagwire inspector.
#[derive(Debug)]
pub struct TokenInspector;

impl TokenInspector {
    /// Walks `token` down to `max_depth` levels of nesting.
    ///
    /// Any span that splits cleanly into at least one key/value pair is reported as a
    /// named object. Opaque values can look like named objects by accident; the report
    /// is a heuristic view and never fails.
    pub fn inspect(token: &Token<'_>, max_depth: usize) -> TokenReport {
        let leaf = || TokenReport {
            length: token.len(),
            kind: NodeKind::Leaf,
            children: Vec::new(),
        };
        if max_depth == 0 {
            return leaf();
        }
        match token.children() {
            Ok(children) if !children.is_empty() => {
                let mut reports: Vec<(String, TokenReport)> = children
                    .iter()
                    .map(|(key, child)| (key.clone(), Self::inspect(child, max_depth - 1)))
                    .collect();
                reports.sort_by(|a, b| a.0.cmp(&b.0));
                TokenReport {
                    length: token.len(),
                    kind: NodeKind::NamedObject,
                    children: reports,
                }
            }
            _ => leaf(),
        }
    }
}

impl std::fmt::Display for TokenReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== TAGWIRE INSPECTOR REPORT ===")?;
        writeln!(f, "[{:?}] Size: {}b", self.kind, self.length)?;
        for (i, (key, child)) in self.children.iter().enumerate() {
            child.fmt_recursive(f, key, "", i + 1 == self.children.len())?;
        }
        Ok(())
    }
}

impl TokenReport {
    fn fmt_recursive(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        key: &str,
        prefix: &str,
        is_last: bool,
    ) -> std::fmt::Result {
        let connector = if is_last { "└── " } else { "├── " };
        let child_prefix = if is_last { "    " } else { "│   " };
        writeln!(
            f,
            "{prefix}{connector}{key} [{:?}] Size: {}b",
            self.kind, self.length
        )?;
        for (i, (child_key, child)) in self.children.iter().enumerate() {
            let is_last_child = i + 1 == self.children.len();
            child.fmt_recursive(f, child_key, &format!("{prefix}{child_prefix}"), is_last_child)?;
        }
        Ok(())
    }
}
