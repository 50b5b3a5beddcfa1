//! The per-function syntax-tree analyzer.
//!
//! A depth-first walk over one file with a three-state machine per
//! function: `Start` outside any function, `Function` between the
//! declaration and its body, `FunctionBody` inside the body (nested blocks
//! tracked by depth). Assignments update the symbolic environment;
//! recognized database calls materialize their query fragment and run the
//! checks. All per-function state resets when the declaration is left.
//!
//! An evaluator error poisons the current function: the error is traced,
//! no finding is emitted from that function, and analysis resumes at the
//! next declaration.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{walk, AssignOp, Control, Node, Visitor};
use crate::error::Error;
use crate::fragment::{Chain, Param, PlaceholderMode};
use crate::report::checks;
use crate::report::Finding;

use super::eval::{eval, Env};
use super::names;
use super::registry::CallRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Function,
    FunctionBody,
}

/// Analyzes one file's syntax tree function by function.
pub struct Analyzer<'r> {
    registry: &'r CallRegistry,
    state: State,
    block_depth: usize,
    function: String,
    parameters: Vec<Param>,
    handles: HashMap<String, String>,
    env: Env,
    poisoned: bool,
    findings: Vec<Finding>,
}

impl<'r> Analyzer<'r> {
    /// A fresh analyzer using `registry` as the call dispatch table.
    pub fn new(registry: &'r CallRegistry) -> Self {
        Analyzer {
            registry,
            state: State::Start,
            block_depth: 0,
            function: String::new(),
            parameters: Vec::new(),
            handles: HashMap::new(),
            env: Env::new(),
            poisoned: false,
            findings: Vec::new(),
        }
    }

    /// Walk `root` and return the findings in discovery order.
    pub fn analyze(mut self, root: &Node) -> Vec<Finding> {
        walk(&mut self, root);
        self.findings
    }

    fn enter_function(&mut self, name: &str, params: &[crate::ast::Field]) {
        self.function = name.to_string();
        self.poisoned = false;
        debug!("check {name}");
        self.state = State::Function;

        for field in params {
            let ty = names::extract(&field.ty);
            for param_name in &field.names {
                self.parameters.push(Param::typed(param_name, &ty));
                if self.registry.is_handle_type(&ty) {
                    self.handles
                        .entry(param_name.clone())
                        .or_insert_with(|| ty.clone());
                }
            }
        }
    }

    fn leave_function(&mut self) {
        self.function.clear();
        self.parameters.clear();
        self.handles.clear();
        self.env.clear();
        self.state = State::Start;
    }

    fn poison(&mut self, err: &Error) {
        debug!("{}: suppressing further checks: {err}", self.function);
        self.poisoned = true;
    }

    fn record_assignment(
        &mut self,
        op: AssignOp,
        lhs: &[Node],
        rhs: &[Node],
    ) -> Result<(), Error> {
        let (Some(target), Some(value)) = (lhs.first(), rhs.first()) else {
            return Ok(());
        };
        let value = eval(value, &self.env)?;
        if value.is_empty() {
            return Ok(());
        }
        let Node::Ident(name) = target else {
            return Ok(());
        };

        let bound = match op {
            AssignOp::Assign => value,
            AssignOp::AddAssign => {
                let current = eval(target, &self.env)?;
                if current.is_empty() {
                    return Ok(());
                }
                current.add(&value)
            }
        };
        self.env.insert(name.clone(), bound);
        Ok(())
    }

    /// `receiver.Method(...)` where the receiver is a whitelisted handle.
    fn database_call(&self, fun: &Node) -> Option<(String, String)> {
        let Node::Selector { base, field } = fun else {
            return None;
        };
        let Node::Ident(receiver) = base.as_ref() else {
            return None;
        };
        let handle_type = self.handles.get(receiver)?;
        Some((handle_type.clone(), field.clone()))
    }

    /// Materialize the effective query fragment for a dispatched call: the
    /// format argument becomes the template, every later argument binds a
    /// placeholder slot, then pending bindings commit in query mode.
    fn build_query(&self, args: &[Node], format_index: usize) -> Result<Chain, Error> {
        let mut query = Chain::default();
        for (index, arg) in args.iter().enumerate() {
            if index == format_index {
                query = eval(arg, &self.env)?.format_chain(PlaceholderMode::Query);
            } else if index > format_index {
                query.bind(&eval(arg, &self.env)?)?;
            }
        }
        query.commit_pending(PlaceholderMode::Query);
        Ok(query)
    }

    fn check_query(&mut self, query: &Chain) {
        debug!("final query fragment for {}: {query}", self.function);
        if let Some(finding) = checks::sql_injection(query, &self.function, &self.parameters) {
            self.findings.push(finding);
        }
        if let Some(finding) = checks::select_asterisk(query, &self.function) {
            self.findings.push(finding);
        }
    }

    fn handle_call(&mut self, fun: &Node, args: &[Node]) {
        let Some((handle_type, method)) = self.database_call(fun) else {
            return;
        };
        let Some(format_index) = self.registry.format_arg_index(&handle_type, &method) else {
            return;
        };
        match self.build_query(args, format_index) {
            Ok(query) => self.check_query(&query),
            Err(err) => self.poison(&err),
        }
    }
}

impl Visitor for Analyzer<'_> {
    fn enter(&mut self, node: &Node) -> Control {
        match node {
            Node::FuncDecl { name, params, .. } => {
                if self.state == State::Start {
                    self.enter_function(name, params);
                }
            }
            Node::Block(_) => match self.state {
                State::Function => {
                    self.state = State::FunctionBody;
                    self.block_depth = 0;
                }
                State::FunctionBody => self.block_depth += 1,
                State::Start => {}
            },
            Node::Assign { op, lhs, rhs } => {
                if self.state == State::FunctionBody && !self.poisoned {
                    if let Err(err) = self.record_assignment(*op, lhs, rhs) {
                        self.poison(&err);
                    }
                }
            }
            Node::Call { fun, args } => {
                if self.state == State::FunctionBody && !self.poisoned {
                    self.handle_call(fun, args);
                }
            }
            _ => {}
        }
        Control::Descend
    }

    fn leave(&mut self, node: &Node) {
        match node {
            Node::Block(_) if self.state == State::FunctionBody => {
                if self.block_depth == 0 {
                    self.state = State::Function;
                } else {
                    self.block_depth -= 1;
                }
            }
            Node::FuncDecl { .. } if self.state == State::Function => {
                self.leave_function();
            }
            _ => {}
        }
    }
}
