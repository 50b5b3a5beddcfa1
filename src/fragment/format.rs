//! Placeholder scanning and format-template normalization.
//!
//! A placeholder is a `%X` sequence whose conversion specifier `X` is an
//! ASCII letter. `%%` is the escaped percent literal and contributes no
//! placeholder. In query mode a bare `?` (outside any `%…` sequence) is a
//! placeholder too: it marks a driver-bound parameter slot.

use super::value::{Chain, Unit};

/// Which placeholder syntax a scan recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderMode {
    /// Only `%X` conversion specifiers (`fmt.Sprintf` templates).
    Format,
    /// `%X` specifiers plus bare `?` marks (database query text).
    Query,
}

#[derive(Clone, Copy, PartialEq)]
enum ScanState {
    Start,
    Percent,
}

fn positions(format: &str, mode: PlaceholderMode) -> Vec<(usize, char)> {
    let mut found = Vec::new();
    let mut state = ScanState::Start;
    for (offset, ch) in format.char_indices() {
        match state {
            ScanState::Start => {
                if ch == '%' {
                    state = ScanState::Percent;
                } else if ch == '?' && mode == PlaceholderMode::Query {
                    found.push((offset, ch));
                }
            }
            ScanState::Percent => {
                if ch == '%' {
                    state = ScanState::Start;
                } else if ch.is_ascii_alphabetic() {
                    found.push((offset, ch));
                    state = ScanState::Start;
                } else {
                    state = ScanState::Start;
                }
            }
        }
    }
    found
}

/// Byte offset and specifier character of the `index`-th placeholder in
/// `format`, or `None` when fewer placeholders exist.
pub fn placeholder_at(format: &str, index: usize, mode: PlaceholderMode) -> Option<(usize, char)> {
    positions(format, mode).get(index).copied()
}

/// Number of placeholders in `format`.
pub fn placeholder_count(format: &str, mode: PlaceholderMode) -> usize {
    positions(format, mode).len()
}

impl Chain {
    /// Coalesce adjacent units that both carry no parameters into single
    /// literal units. Idempotent; pending bindings are dropped.
    pub fn coalesce_literals(&self) -> Chain {
        let mut units: Vec<Unit> = Vec::new();
        for unit in &self.units {
            match units.last_mut() {
                Some(last) if last.params.is_empty() && unit.params.is_empty() => {
                    last.format.push_str(&unit.format);
                }
                _ => units.push(unit.detached()),
            }
        }
        Chain { units }
    }

    /// Re-split every parameterless unit at each placeholder boundary so
    /// later resolution sees one placeholder per unit, each at the end of
    /// its template. Units that already carry parameters are left whole.
    /// Idempotent under the same mode.
    pub fn split_placeholders(&self, mode: PlaceholderMode) -> Chain {
        let mut units = Vec::new();
        for unit in &self.units {
            if !unit.params.is_empty() {
                units.push(unit.detached());
                continue;
            }
            let mut rest = unit.format.as_str();
            loop {
                match placeholder_at(rest, 0, mode) {
                    // The specifier is always one byte, so the cut lands on
                    // a character boundary.
                    Some((offset, _)) if offset + 1 < rest.len() => {
                        let (piece, tail) = rest.split_at(offset + 1);
                        units.push(Unit::new(piece, Vec::new()));
                        rest = tail;
                    }
                    _ => {
                        units.push(Unit::new(rest, Vec::new()));
                        break;
                    }
                }
            }
        }
        Chain { units }
    }

    /// Total placeholder count across the chain's units.
    pub fn placeholder_count(&self, mode: PlaceholderMode) -> usize {
        self.units
            .iter()
            .map(|unit| placeholder_count(&unit.format, mode))
            .sum()
    }
}
