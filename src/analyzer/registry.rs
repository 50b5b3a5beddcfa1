//! Database-handle whitelist and call dispatch table.
//!
//! A handle type is the stringified type of a formal parameter that carries
//! a SQL-executing receiver (`*sqlx.DB`, a transaction, an in-house
//! `DbInterface`). For each handle type the registry records which methods
//! execute query text and which argument position holds that text. Methods
//! not in the table produce no analysis.

use std::collections::HashMap;

/// Maps handle types to their query-executing methods and the index of the
/// query-text argument.
#[derive(Debug, Clone)]
pub struct CallRegistry {
    handles: HashMap<String, HashMap<String, usize>>,
}

impl CallRegistry {
    /// A registry with no handle types. Useful as a base for custom tables.
    pub fn empty() -> Self {
        CallRegistry {
            handles: HashMap::new(),
        }
    }

    /// Record that `method` on `handle_type` takes its query text at
    /// argument position `format_index`. Registering a method also
    /// whitelists its handle type.
    pub fn register(
        &mut self,
        handle_type: impl Into<String>,
        method: impl Into<String>,
        format_index: usize,
    ) {
        self.handles
            .entry(handle_type.into())
            .or_default()
            .insert(method.into(), format_index);
    }

    /// True when `ty` is a whitelisted database-handle type.
    pub fn is_handle_type(&self, ty: &str) -> bool {
        self.handles.contains_key(ty)
    }

    /// The query-text argument index for `method` on `handle_type`, or
    /// `None` when the call is not modelled.
    pub fn format_arg_index(&self, handle_type: &str, method: &str) -> Option<usize> {
        self.handles.get(handle_type)?.get(method).copied()
    }
}

impl Default for CallRegistry {
    /// The built-in table covering `sqlx` handles and the in-house
    /// `DbInterface` wrappers.
    fn default() -> Self {
        let mut registry = CallRegistry::empty();
        registry.register("*sqlx.DB", "Get", 1);
        registry.register("*sqlx.DB", "Select", 1);
        registry.register("*sqlx.DB", "Queryx", 0);
        registry.register("*sqlx.Tx", "Exec", 0);
        registry.register("*sqlx.Tx", "Get", 1);
        registry.register("sql.DbInterface", "Get", 1);
        registry.register("kitSql.DbInterface", "Get", 1);
        registry.register("kitSql.DbInterface", "Exec", 0);
        registry
    }
}
