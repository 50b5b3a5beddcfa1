//! Flattening of type and selector expressions into dotted names.
//!
//! Parameter types become the strings the handle whitelist matches against
//! (`*sqlx.DB`, `[]string`), and expressions the evaluator does not model
//! collapse to an opaque name that can still be looked up in the
//! environment or treated as a taint source (`req.Name`).

use crate::ast::Node;

/// Summarize `node` as a dotted name string.
///
/// Identifiers contribute their name, pointers a `*` prefix, slice types a
/// `[]` prefix, and selectors a `.`-joined pair. Any other shape contributes
/// the concatenated summaries of its children.
pub fn extract(node: &Node) -> String {
    match node {
        Node::Ident(name) => name.clone(),
        Node::Star(inner) => format!("*{}", extract(inner)),
        Node::ArrayType(element) => format!("[]{}", extract(element)),
        Node::Selector { base, field } => format!("{}.{field}", extract(base)),
        other => other.children().into_iter().map(extract).collect(),
    }
}
