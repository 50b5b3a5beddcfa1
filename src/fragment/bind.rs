//! Parameter binding and pending-binding commit.
//!
//! Binding a parameter stores its fragment as the *pending* value of the
//! first unresolved unit; the unit's template is rewritten only when the
//! binding is committed. Committing a `%s` splices the pending chain into
//! the query in place of the placeholder, so the parameters it carries stay
//! addressable; any other specifier (including `?`) cannot receive SQL text
//! and discards the binding along with the unit's parameters.

use crate::error::Error;

use super::format::{placeholder_at, PlaceholderMode};
use super::value::{Chain, Fragment, Unit};

impl Fragment {
    /// Normalize a freshly evaluated format-string argument into a query
    /// template chain: coalesce adjacent literal units, then re-split at
    /// every placeholder boundary. A collection contributes only its empty
    /// head sentinel.
    pub fn format_chain(&self, mode: PlaceholderMode) -> Chain {
        self.head_chain()
            .coalesce_literals()
            .split_placeholders(mode)
    }
}

impl Chain {
    fn first_unbound_mut(&mut self) -> Option<&mut Unit> {
        self.units
            .iter_mut()
            .find(|unit| unit.params.is_empty() && unit.prepare.is_none())
    }

    fn bind_chain(&mut self, value: &Chain) -> Result<(), Error> {
        let slot = self.first_unbound_mut().ok_or(Error::NoUnboundSlot)?;
        slot.prepare = Some(value.detached());
        Ok(())
    }

    /// Bind `value` to the first unresolved placeholder slot. A collection
    /// binds each element to a successive slot in order.
    pub fn bind(&mut self, value: &Fragment) -> Result<(), Error> {
        match value {
            Fragment::Collection(elements) => {
                for element in elements {
                    self.bind_chain(element)?;
                }
                Ok(())
            }
            Fragment::Value(chain) => self.bind_chain(chain),
        }
    }

    /// Commit every pending binding along the chain, left to right. Units
    /// spliced in by a commit carry no pending bindings of their own.
    pub fn commit_pending(&mut self, mode: PlaceholderMode) {
        let mut index = 0;
        while index < self.units.len() {
            self.commit_unit_at(index, mode);
            index += 1;
        }
    }

    fn commit_unit_at(&mut self, index: usize, mode: PlaceholderMode) {
        let Some(pending) = self.units[index].prepare.take() else {
            return;
        };
        let Some((offset, 's')) = placeholder_at(&self.units[index].format, 0, mode) else {
            // The slot is not string-typed (or the template is malformed):
            // the incoming parameter cannot carry SQL text.
            self.units[index].params.clear();
            return;
        };

        let template = std::mem::take(&mut self.units[index].format);
        let prefix = &template[..offset - 1];
        let suffix = &template[offset + 1..];

        let mut incoming = pending.units;
        let head = if incoming.is_empty() {
            Unit::default()
        } else {
            incoming.remove(0)
        };

        self.units[index] = Unit::new(format!("{prefix}{}", head.format), head.params);
        let mut insert_at = index + 1;
        for unit in incoming {
            self.units.insert(insert_at, unit.detached());
            insert_at += 1;
        }
        if !suffix.is_empty() {
            self.units.insert(insert_at, Unit::new(suffix, Vec::new()));
        }
    }
}
