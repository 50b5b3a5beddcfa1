//! Scan Go sources for SQL-injection-prone query construction and
//! `SELECT *` usage.
//!
//! Every function is analyzed independently with a path-insensitive forward
//! symbolic-string analysis: string-typed locals are approximated by a
//! [`fragment::Fragment`] recording which pieces of the eventual query are
//! constants, which are format placeholders, and which are fed by function
//! parameters. When a whitelisted database-handle method is called, the
//! query argument's fragment is materialized and checked.
#![warn(missing_docs)]

/// Per-function syntax-tree analysis: name extraction, expression
/// evaluation, call dispatch, and the function walker.
pub mod analyzer;
/// Syntax-node sum type, tree walk, Go loader, and source discovery.
pub mod ast;
/// Crate-wide error type.
pub mod error;
/// The symbolic SQL fragment algebra.
pub mod fragment;
/// Finding types and the query checks.
pub mod report;

pub use error::Error;
