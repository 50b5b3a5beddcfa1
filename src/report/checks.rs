//! The two checks run over a materialized query fragment.

use crate::fragment::{placeholder_at, Chain, Param, PlaceholderMode};

use super::findings::{Finding, FindingKind};

/// True when `bound` names `formal` itself or a field access on it
/// (`formal.Field`). Deeper matching is deliberately not attempted.
fn names_parameter(bound: &Param, formal: &Param) -> bool {
    bound.name == formal.name || bound.name.starts_with(&format!("{}.", formal.name))
}

/// Report SQL injection when any bound parameter position whose specifier
/// is `s` is fed by one of the function's formal parameters. The first hit
/// wins; `?`-bound positions never match.
pub fn sql_injection(query: &Chain, function: &str, parameters: &[Param]) -> Option<Finding> {
    if query.is_empty() {
        return None;
    }
    for unit in &query.units {
        for (position, bound) in unit.params.iter().enumerate() {
            let Some((_, specifier)) =
                placeholder_at(&unit.format, position, PlaceholderMode::Query)
            else {
                continue;
            };
            if specifier != 's' {
                continue;
            }
            if parameters.iter().any(|formal| names_parameter(bound, formal)) {
                return Some(Finding::new(function, FindingKind::SqlInjection));
            }
        }
    }
    None
}

/// Report `SELECT *` when the query's first token is `SELECT` and any token
/// before the closing `FROM` ends in `*` (bare `*` or `alias.*`). Queries
/// that never reach a `FROM` report nothing.
pub fn select_asterisk(query: &Chain, function: &str) -> Option<Finding> {
    let text: String = query.units.iter().map(|unit| unit.format.as_str()).collect();
    let mut tokens = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty());

    if !tokens.next()?.eq_ignore_ascii_case("SELECT") {
        return None;
    }

    let mut saw_asterisk = false;
    for token in tokens {
        if token.eq_ignore_ascii_case("FROM") {
            return saw_asterisk.then(|| Finding::new(function, FindingKind::SelectAsterisk));
        }
        if token.ends_with('*') {
            saw_asterisk = true;
        }
    }
    None
}
