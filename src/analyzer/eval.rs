//! Expression evaluation into symbolic fragments.
//!
//! `eval` maps an expression to the [`Fragment`] over-approximating the
//! strings it can produce. Variables resolve through the per-function
//! [`Env`]; a variable the environment does not know becomes a taint
//! source (a lone `%s` fed by the variable's own name), which is what lets
//! function parameters surface in query positions later.
//!
//! Modelled string producers: literals, `fmt.Sprintf`, `strings.Join`,
//! `append`, `+` concatenation, and empty `[]string{}` /
//! `[]interface{}{}` literals. Everything else collapses through the name
//! extractor to an environment lookup.

use std::collections::HashMap;

use crate::ast::{BinaryOp, Node};
use crate::error::Error;
use crate::fragment::{Chain, Fragment, PlaceholderMode};

use super::names;

/// Per-function variable bindings.
#[derive(Debug, Default)]
pub struct Env {
    bindings: HashMap<String, Fragment>,
}

impl Env {
    /// An empty environment.
    pub fn new() -> Self {
        Env::default()
    }

    /// Bind (or rebind) a variable.
    pub fn insert(&mut self, name: impl Into<String>, fragment: Fragment) {
        self.bindings.insert(name.into(), fragment);
    }

    /// The fragment bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.bindings.get(name)
    }

    /// Resolve `name` to its bound fragment, or to the taint-source
    /// fragment when the environment does not know it.
    pub fn resolve(&self, name: &str) -> Fragment {
        self.bindings
            .get(name)
            .cloned()
            .unwrap_or_else(|| Fragment::tainted(name))
    }

    /// Drop every binding. Fragments stored elsewhere are unaffected.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// Strip a literal's delimiters: the first and last byte of the source
/// spelling (quotes or backticks).
fn strip_delimiters(literal: &str) -> &str {
    if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        ""
    }
}

/// Evaluate `expr` into a fragment under `env`.
pub fn eval(expr: &Node, env: &Env) -> Result<Fragment, Error> {
    match expr {
        Node::BasicLit(text) => Ok(Fragment::literal(strip_delimiters(text))),
        Node::Ident(name) => Ok(env.resolve(name)),
        Node::Call { fun, args } => eval_call(fun, args, env),
        Node::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } => {
            let left = eval(left, env)?;
            let right = eval(right, env)?;
            Ok(left.add(&right))
        }
        Node::Composite { ty, .. } => Ok(eval_composite(ty)),
        other => {
            let name = names::extract(other);
            if name.is_empty() {
                Ok(Fragment::default())
            } else {
                Ok(env.resolve(&name))
            }
        }
    }
}

fn eval_call(fun: &Node, args: &[Node], env: &Env) -> Result<Fragment, Error> {
    match fun {
        Node::Selector { base, field } => {
            if let Node::Ident(package) = base.as_ref() {
                if package == "fmt" && field == "Sprintf" {
                    return eval_sprintf(args, env);
                }
                if package == "strings" && field == "Join" {
                    return eval_join(args, env);
                }
            }
            Ok(Fragment::default())
        }
        Node::Ident(name) if name == "append" => eval_append(args, env),
        _ => Ok(Fragment::default()),
    }
}

/// `fmt.Sprintf(template, a1, a2, …)`: normalize the template, bind each
/// argument to a successive placeholder slot, then commit.
fn eval_sprintf(args: &[Node], env: &Env) -> Result<Fragment, Error> {
    let mut chain = Chain::default();
    for (index, arg) in args.iter().enumerate() {
        if index == 0 {
            chain = eval(arg, env)?.format_chain(PlaceholderMode::Format);
        } else {
            chain.bind(&eval(arg, env)?)?;
        }
    }
    chain.commit_pending(PlaceholderMode::Format);
    Ok(Fragment::Value(chain))
}

/// `strings.Join(list, sep)`: promote the list to a collection, interleave
/// the separator, and collapse to a single value.
fn eval_join(args: &[Node], env: &Env) -> Result<Fragment, Error> {
    let [list, separator] = args else {
        return Err(Error::UnsupportedSyntax(
            "strings.Join with unexpected arity".to_string(),
        ));
    };
    let list = eval(list, env)?.into_collection();
    let separator = eval(separator, env)?;
    let joined = list.join_separated(&separator)?;
    Ok(Fragment::Value(joined.merged()))
}

/// `append(base, x1, x2, …)`: promote the base to a collection and append
/// each further argument as an element.
fn eval_append(args: &[Node], env: &Env) -> Result<Fragment, Error> {
    let mut collection = Fragment::empty_collection();
    for (index, arg) in args.iter().enumerate() {
        if index == 0 {
            collection = eval(arg, env)?.into_collection();
        } else {
            collection.push_element(eval(arg, env)?)?;
        }
    }
    Ok(collection)
}

/// Empty `[]string{}` and `[]interface{}{}` literals start a collection;
/// every other composite literal is outside the model.
fn eval_composite(ty: &Node) -> Fragment {
    if let Node::ArrayType(element) = ty {
        if let Node::Ident(name) = element.as_ref() {
            if name == "string" || name.starts_with("interface") {
                return Fragment::empty_collection();
            }
        }
    }
    Fragment::default()
}
