use std::fmt;

use serde::{Deserialize, Serialize};

/// Which defect class a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A function parameter reaches a raw `%s` position of the query text.
    SqlInjection,
    /// The query's select list contains a `*` token.
    SelectAsterisk,
}

/// One defect reported for one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The function the defect was found in.
    pub function: String,
    /// The defect class.
    pub kind: FindingKind,
}

impl Finding {
    /// Build a finding for `function`.
    pub fn new(function: impl Into<String>, kind: FindingKind) -> Self {
        Finding {
            function: function.into(),
            kind,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FindingKind::SqlInjection => write!(f, "{} exist sql injection", self.function),
            FindingKind::SelectAsterisk => {
                write!(f, "{} exist select * or select (x).*", self.function)
            }
        }
    }
}
