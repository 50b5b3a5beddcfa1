/// Parameter binding and pending-binding commit.
pub mod bind;
/// Placeholder scanning and format-template normalization.
pub mod format;
/// The fragment value types and their structural operators.
pub mod value;

pub use format::{placeholder_at, placeholder_count, PlaceholderMode};
pub use value::{Chain, Fragment, Param, Unit};
