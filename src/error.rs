use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading Go sources or evaluating expressions.
///
/// Evaluator errors (`NoUnboundSlot`, `NotACollection`, `UnsupportedSyntax`)
/// are recovered by the function analyzer: the enclosing function is marked
/// poisoned and produces no findings. Loader errors cause the file to be
/// skipped; the run continues.
#[derive(Debug, Error)]
pub enum Error {
    /// The source contained syntax errors and cannot be analyzed.
    #[error("syntax errors in {}", .path.display())]
    Parse {
        /// File the parser rejected.
        path: PathBuf,
    },

    /// The Go grammar could not be loaded into the parser.
    #[error("failed to load Go grammar: {0}")]
    Grammar(String),

    /// A parameter was bound but the query template has no unresolved
    /// placeholder slot left to receive it.
    #[error("no unresolved placeholder slot left for parameter binding")]
    NoUnboundSlot,

    /// A list operator was applied to a fragment that is not a collection.
    #[error("expected a collection fragment")]
    NotACollection,

    /// An expression shape the evaluator does not model.
    #[error("unsupported expression: {0}")]
    UnsupportedSyntax(String),

    /// Reading a source file or directory failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
