//! The syntax-node sum type the analysis consumes, and its tree walk.
//!
//! The analysis models a fixed set of Go shapes; everything else is folded
//! into [`Node::Opaque`] with its children preserved, so the walk still
//! reaches nested statements and the name extractor can still summarize the
//! subtree. This keeps dispatch free of runtime type queries: one `match`
//! per consumer.

/// Assignment operator of an assignment statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=` and `:=`.
    Assign,
    /// `+=`.
    AddAssign,
}

/// Binary operator of a binary expression. Only string concatenation is
/// modelled; every other operator is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`.
    Add,
    /// Any operator the analysis does not model.
    Other,
}

/// A formal parameter group: one type shared by one or more names.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declared parameter names; empty for an unnamed parameter.
    pub names: Vec<String>,
    /// The parameter's type expression.
    pub ty: Node,
}

/// A syntax-tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A source file: its top-level declarations.
    File(Vec<Node>),
    /// A function or method declaration.
    FuncDecl {
        /// Function name.
        name: String,
        /// Formal parameters (receivers are not included).
        params: Vec<Field>,
        /// The function body block.
        body: Box<Node>,
    },
    /// A `{ … }` statement block.
    Block(Vec<Node>),
    /// An assignment statement (`=`, `:=`, `+=`).
    Assign {
        /// Which assignment operator was used.
        op: AssignOp,
        /// Left-hand targets.
        lhs: Vec<Node>,
        /// Right-hand values.
        rhs: Vec<Node>,
    },
    /// A call expression.
    Call {
        /// The callee expression.
        fun: Box<Node>,
        /// Call arguments in order.
        args: Vec<Node>,
    },
    /// A selector expression `base.field`.
    Selector {
        /// The expression being selected from.
        base: Box<Node>,
        /// The selected field or method name.
        field: String,
    },
    /// A binary expression.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Node>,
        /// Right operand.
        right: Box<Node>,
    },
    /// An identifier.
    Ident(String),
    /// A basic literal; string literals keep their delimiters.
    BasicLit(String),
    /// A pointer type or dereference `*X`.
    Star(Box<Node>),
    /// A slice or array type `[]X`.
    ArrayType(Box<Node>),
    /// A composite literal `T{…}`.
    Composite {
        /// The literal's type expression.
        ty: Box<Node>,
        /// The literal's element expressions.
        elems: Vec<Node>,
    },
    /// Any shape the analysis does not model, with children preserved.
    Opaque(Vec<Node>),
}

impl Node {
    /// The node's children in source order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::File(items) | Node::Block(items) | Node::Opaque(items) => items.iter().collect(),
            Node::FuncDecl { body, .. } => vec![body.as_ref()],
            Node::Assign { lhs, rhs, .. } => lhs.iter().chain(rhs.iter()).collect(),
            Node::Call { fun, args } => std::iter::once(fun.as_ref()).chain(args.iter()).collect(),
            Node::Selector { base, .. } => vec![base.as_ref()],
            Node::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::Star(inner) | Node::ArrayType(inner) => vec![inner.as_ref()],
            Node::Composite { ty, elems } => {
                std::iter::once(ty.as_ref()).chain(elems.iter()).collect()
            }
            Node::Ident(_) | Node::BasicLit(_) => Vec::new(),
        }
    }
}

/// Whether the walk descends into a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Visit the children, then call `leave`.
    Descend,
    /// Skip the children; `leave` is not called either.
    Skip,
}

/// A depth-first tree visitor. `enter` runs pre-order; `leave` runs after
/// all children have been visited.
pub trait Visitor {
    /// Called when the walk reaches `node`.
    fn enter(&mut self, node: &Node) -> Control;

    /// Called after all of `node`'s children have been visited. Not called
    /// when `enter` returned [`Control::Skip`].
    fn leave(&mut self, _node: &Node) {}
}

/// Depth-first pre-order traversal of `node`.
pub fn walk<V: Visitor>(visitor: &mut V, node: &Node) {
    if visitor.enter(node) == Control::Skip {
        return;
    }
    for child in node.children() {
        walk(visitor, child);
    }
    visitor.leave(node);
}
