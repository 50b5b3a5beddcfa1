/// The SQL-injection and `SELECT *` checks over materialized queries.
pub mod checks;
/// Finding data types and their diagnostic rendering.
pub mod findings;

pub use findings::{Finding, FindingKind};
