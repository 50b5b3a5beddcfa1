//! Go source parsing.
//!
//! Parses Go with tree-sitter and converts the concrete tree into the
//! [`Node`] sum type. Only the shapes the analysis models get a dedicated
//! variant; every other node kind is folded into [`Node::Opaque`] with its
//! named children converted, so nested statements remain reachable by the
//! walk and name extraction.

use std::path::Path;

use tree_sitter::{Node as TsNode, Parser};

use crate::error::Error;

use super::node::{AssignOp, BinaryOp, Field, Node};

/// Parse one Go source file into a [`Node::File`].
///
/// Sources with syntax errors are rejected wholesale; the caller is expected
/// to skip the file and continue with the rest of the scan.
pub fn parse_source(source: &str, path: &Path) -> Result<Node, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| Error::Grammar(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::Grammar("tree-sitter produced no tree".to_string()))?;

    if tree.root_node().has_error() {
        return Err(Error::Parse {
            path: path.to_path_buf(),
        });
    }

    Ok(convert(tree.root_node(), source))
}

fn text(node: TsNode<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

fn field_text(node: TsNode<'_>, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| text(child, source))
        .unwrap_or_default()
}

fn convert_field(node: TsNode<'_>, field: &str, source: &str) -> Node {
    node.child_by_field_name(field)
        .map(|child| convert(child, source))
        .unwrap_or(Node::Opaque(Vec::new()))
}

fn convert_children(node: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| convert(child, source))
        .collect()
}

/// Expression lists on either side of an assignment flatten into their
/// member expressions.
fn convert_expression_list(node: TsNode<'_>, field: &str, source: &str) -> Vec<Node> {
    match node.child_by_field_name(field) {
        Some(list) if list.kind() == "expression_list" => convert_children(list, source),
        Some(single) => vec![convert(single, source)],
        None => Vec::new(),
    }
}

fn convert_parameters(list: TsNode<'_>, source: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        if !matches!(
            decl.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        ) {
            continue;
        }
        let ty = convert_field(decl, "type", source);
        let mut names = Vec::new();
        let mut decl_cursor = decl.walk();
        if decl_cursor.goto_first_child() {
            loop {
                if decl_cursor.field_name() == Some("name") {
                    names.push(text(decl_cursor.node(), source));
                }
                if !decl_cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        fields.push(Field { names, ty });
    }
    fields
}

fn convert(node: TsNode<'_>, source: &str) -> Node {
    match node.kind() {
        "source_file" => Node::File(convert_children(node, source)),
        "function_declaration" | "method_declaration" => Node::FuncDecl {
            name: field_text(node, "name", source),
            params: node
                .child_by_field_name("parameters")
                .map(|params| convert_parameters(params, source))
                .unwrap_or_default(),
            body: Box::new(
                node.child_by_field_name("body")
                    .map(|body| convert(body, source))
                    .unwrap_or(Node::Block(Vec::new())),
            ),
        },
        "block" => Node::Block(convert_children(node, source)),
        "short_var_declaration" => Node::Assign {
            op: AssignOp::Assign,
            lhs: convert_expression_list(node, "left", source),
            rhs: convert_expression_list(node, "right", source),
        },
        "assignment_statement" => Node::Assign {
            op: match field_text(node, "operator", source).as_str() {
                "+=" => AssignOp::AddAssign,
                _ => AssignOp::Assign,
            },
            lhs: convert_expression_list(node, "left", source),
            rhs: convert_expression_list(node, "right", source),
        },
        "call_expression" => Node::Call {
            fun: Box::new(convert_field(node, "function", source)),
            args: node
                .child_by_field_name("arguments")
                .map(|args| convert_children(args, source))
                .unwrap_or_default(),
        },
        "selector_expression" => Node::Selector {
            base: Box::new(convert_field(node, "operand", source)),
            field: field_text(node, "field", source),
        },
        "binary_expression" => Node::Binary {
            op: match field_text(node, "operator", source).as_str() {
                "+" => BinaryOp::Add,
                _ => BinaryOp::Other,
            },
            left: Box::new(convert_field(node, "left", source)),
            right: Box::new(convert_field(node, "right", source)),
        },
        "identifier" | "field_identifier" | "type_identifier" | "package_identifier" => {
            Node::Ident(text(node, source))
        }
        "interpreted_string_literal" | "raw_string_literal" => Node::BasicLit(text(node, source)),
        "composite_literal" => Node::Composite {
            ty: Box::new(convert_field(node, "type", source)),
            elems: node
                .child_by_field_name("body")
                .map(|body| convert_children(body, source))
                .unwrap_or_default(),
        },
        "slice_type" | "array_type" => Node::ArrayType(Box::new(convert_field(
            node,
            "element",
            source,
        ))),
        "pointer_type" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .next()
                .map(|child| convert(child, source))
                .unwrap_or(Node::Opaque(Vec::new()));
            Node::Star(Box::new(inner))
        }
        "qualified_type" => Node::Selector {
            base: Box::new(Node::Ident(field_text(node, "package", source))),
            field: field_text(node, "name", source),
        },
        // `[]interface{}{}` needs the element type's spelling to survive, so
        // an interface type folds to its source text rather than to Opaque.
        "interface_type" => Node::Ident(text(node, source)),
        _ => Node::Opaque(convert_children(node, source)),
    }
}
