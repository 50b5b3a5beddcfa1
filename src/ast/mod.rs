/// Source-file discovery under a root directory.
pub mod discover;
/// Go source parsing into the [`Node`] sum type.
pub mod go_loader;
/// The closed syntax-node sum type and the tree walk.
pub mod node;

pub use node::{walk, AssignOp, BinaryOp, Control, Field, Node, Visitor};
