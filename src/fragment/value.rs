use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A formal parameter of the function under analysis.
///
/// `conflation` records other parameters whose values flowed into the same
/// slot of an opaque composite. It exists purely for diagnostics and never
/// participates in equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name as written in the function signature.
    pub name: String,
    /// Stringified parameter type, e.g. `*sqlx.DB` or `[]string`.
    pub ty: String,
    /// Other parameters conflated into this slot (diagnostics only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflation: Vec<Param>,
}

impl Param {
    /// A parameter known only by name (taint source for an unbound variable).
    pub fn named(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            ty: String::new(),
            conflation: Vec::new(),
        }
    }

    /// A parameter with both a name and a stringified type.
    pub fn typed(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            ty: ty.into(),
            conflation: Vec::new(),
        }
    }

    /// Record that `other`'s value flowed into the same slot as this one.
    pub fn conflate(&mut self, other: Param) {
        self.conflation.push(other);
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Eq for Param {}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = self.name.clone();
        for conflated in &self.conflation {
            rendered.push('#');
            rendered.push_str(&conflated.to_string());
        }
        if rendered.is_empty() {
            rendered.push('∅');
        }
        write!(f, "{rendered}")
    }
}

/// One node of a [`Chain`]: a format template plus the parameters bound, in
/// order, to its placeholders.
///
/// `count_placeholders(format) >= params.len()`; surplus placeholder
/// positions are unbound. A pending binding (`prepare`) records a fragment
/// about to replace the unit's leading placeholder; it takes effect only
/// when committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unit {
    /// Literal template text, possibly containing `%X` placeholders and,
    /// in query position, `?` marks.
    pub format: String,
    /// Parameters aligned with the template's placeholders.
    pub params: Vec<Param>,
    pub(crate) prepare: Option<Chain>,
}

impl Unit {
    /// Build a unit from a template and its bound parameters.
    pub fn new(format: impl Into<String>, params: Vec<Param>) -> Self {
        Unit {
            format: format.into(),
            params,
            prepare: None,
        }
    }

    /// Append `other`'s template and parameters to this unit in place.
    pub fn absorb(&mut self, other: &Unit) {
        self.format.push_str(&other.format);
        self.params.extend(other.params.iter().cloned());
    }

    /// A copy of this unit without any pending binding.
    pub(crate) fn detached(&self) -> Unit {
        Unit {
            format: self.format.clone(),
            params: self.params.clone(),
            prepare: None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format.is_empty() {
            write!(f, "(blank)[")?;
        } else {
            write!(f, "{}:{}[", self.format.len(), self.format)?;
        }
        for param in &self.params {
            write!(f, "{param},")?;
        }
        write!(f, "]")
    }
}

/// One concrete string value, kept split into [`Unit`]s so later placeholder
/// resolution can tell which characters came from which source.
///
/// The in-order concatenation of the units' templates (and, pairwise, their
/// parameters) is the chain's linearized value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    /// Units in linearization order.
    pub units: Vec<Unit>,
}

impl Chain {
    /// A chain holding a single unit.
    pub fn from_unit(unit: Unit) -> Self {
        Chain { units: vec![unit] }
    }

    /// A chain holding one literal unit with no parameters.
    pub fn literal(text: impl Into<String>) -> Self {
        Chain::from_unit(Unit::new(text, Vec::new()))
    }

    /// True when the chain linearizes to the empty string with no
    /// parameters.
    pub fn is_empty(&self) -> bool {
        self.units
            .iter()
            .all(|unit| unit.format.is_empty() && unit.params.is_empty())
    }

    /// Linearize the chain into a single unit.
    pub fn collapse(&self) -> Unit {
        let mut collapsed = Unit::default();
        for unit in &self.units {
            collapsed.absorb(unit);
        }
        collapsed
    }

    /// A copy with every pending binding dropped.
    pub(crate) fn detached(&self) -> Chain {
        Chain {
            units: self.units.iter().map(Unit::detached).collect(),
        }
    }

    /// String concatenation: a fresh chain linearizing to `self` followed by
    /// `other`. Pending bindings are not carried over.
    pub fn append(&self, other: &Chain) -> Chain {
        let mut units = self.detached().units;
        units.extend(other.detached().units);
        Chain { units }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_empty() {
            return write!(f, "{}", Unit::default());
        }
        for (index, unit) in self.units.iter().enumerate() {
            if index > 0 {
                write!(f, "-->")?;
            }
            write!(f, "{unit}")?;
        }
        Ok(())
    }
}

/// The symbolic value of a string-typed expression: either one concrete
/// string ([`Chain`]) or an ordered list of strings whose length is
/// data-dependent (a collection, modelling a slice).
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A single string value.
    Value(Chain),
    /// An ordered list of string values.
    Collection(Vec<Chain>),
}

impl Default for Fragment {
    fn default() -> Self {
        Fragment::Value(Chain::default())
    }
}

impl Fragment {
    /// A literal string fragment.
    pub fn literal(text: impl Into<String>) -> Self {
        Fragment::Value(Chain::literal(text))
    }

    /// The taint-source fragment for a variable the analysis knows nothing
    /// about: a lone `%s` fed by the variable itself.
    pub fn tainted(name: impl Into<String>) -> Self {
        Fragment::Value(Chain::from_unit(Unit::new("%s", vec![Param::named(name)])))
    }

    /// A collection with no elements.
    pub fn empty_collection() -> Self {
        Fragment::Collection(Vec::new())
    }

    /// True for collections of any length.
    pub fn is_collection(&self) -> bool {
        matches!(self, Fragment::Collection(_))
    }

    /// True when the fragment is a single empty string value. Collections
    /// are never empty in this sense: an empty slice is still a slice.
    pub fn is_empty(&self) -> bool {
        match self {
            Fragment::Value(chain) => chain.is_empty(),
            Fragment::Collection(_) => false,
        }
    }

    /// The fragment's value chain. A collection contributes only its empty
    /// head sentinel.
    pub fn head_chain(&self) -> Chain {
        match self {
            Fragment::Value(chain) => chain.clone(),
            Fragment::Collection(_) => Chain::default(),
        }
    }

    /// String concatenation of two fragments (`a + b` at the syntax level).
    pub fn add(&self, other: &Fragment) -> Fragment {
        Fragment::Value(self.head_chain().append(&other.head_chain()))
    }

    /// Promote a scalar into a collection. A non-empty value becomes the
    /// collection's sole element; an empty value becomes the empty
    /// collection. Collections pass through unchanged.
    pub fn into_collection(self) -> Fragment {
        match self {
            Fragment::Collection(_) => self,
            Fragment::Value(chain) if chain.is_empty() => Fragment::empty_collection(),
            Fragment::Value(chain) => Fragment::Collection(vec![chain]),
        }
    }

    /// Append `element` to a collection.
    pub fn push_element(&mut self, element: Fragment) -> Result<(), Error> {
        let Fragment::Collection(elements) = self else {
            return Err(Error::NotACollection);
        };
        match element {
            Fragment::Value(chain) => elements.push(chain),
            collection @ Fragment::Collection(_) => elements.push(collection.merged()),
        }
        Ok(())
    }

    /// Insert a copy of `separator` between every two adjacent elements,
    /// modelling `strings.Join`.
    pub fn join_separated(&self, separator: &Fragment) -> Result<Fragment, Error> {
        let Fragment::Collection(elements) = self else {
            return Err(Error::NotACollection);
        };
        let separator_unit = separator.head_chain().collapse();
        let mut joined = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                joined.push(Chain::from_unit(separator_unit.clone()));
            }
            joined.push(element.clone());
        }
        Ok(Fragment::Collection(joined))
    }

    /// Collapse a collection into one chain linearizing to the in-order
    /// concatenation of every element. Non-collections merge to the empty
    /// chain.
    pub fn merged(&self) -> Chain {
        match self {
            Fragment::Collection(elements) => {
                let mut collapsed = Unit::default();
                for element in elements {
                    collapsed.absorb(&element.collapse());
                }
                Chain::from_unit(collapsed)
            }
            Fragment::Value(_) => Chain::default(),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Value(chain) => write!(f, "{chain}"),
            Fragment::Collection(elements) => {
                write!(f, "{}", Unit::default())?;
                for element in elements {
                    write!(f, "==>{element}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_equality_ignores_conflation() {
        let plain = Param::typed("u", "string");
        let mut conflated = Param::typed("u", "string");
        conflated.conflate(Param::named("v"));

        assert_eq!(plain, conflated);
        assert_eq!(conflated.to_string(), "u#v");
    }

    #[test]
    fn anonymous_param_displays_as_empty_set() {
        assert_eq!(Param::named("").to_string(), "∅");
    }

    #[test]
    fn add_linearizes_to_concatenation() {
        let left = Fragment::literal("SELECT id FROM t WHERE n=");
        let right = Fragment::tainted("u");

        let sum = left.add(&right);
        let Fragment::Value(chain) = &sum else {
            panic!("add should produce a value, got {sum:?}");
        };
        let collapsed = chain.collapse();
        assert_eq!(collapsed.format, "SELECT id FROM t WHERE n=%s");
        assert_eq!(collapsed.params, vec![Param::named("u")]);
    }

    #[test]
    fn empty_value_is_empty_but_empty_collection_is_not() {
        assert!(Fragment::default().is_empty());
        assert!(!Fragment::empty_collection().is_empty());
    }

    #[test]
    fn into_collection_wraps_non_empty_scalars() {
        let promoted = Fragment::tainted("cols").into_collection();
        let Fragment::Collection(elements) = &promoted else {
            panic!("promotion should produce a collection, got {promoted:?}");
        };
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].collapse().format, "%s");

        assert_eq!(
            Fragment::default().into_collection(),
            Fragment::empty_collection()
        );
    }

    #[test]
    fn join_separated_and_merged_model_strings_join() {
        let mut list = Fragment::empty_collection();
        list.push_element(Fragment::literal("a")).unwrap();
        list.push_element(Fragment::tainted("col")).unwrap();
        list.push_element(Fragment::literal("c")).unwrap();

        let joined = list.join_separated(&Fragment::literal(", ")).unwrap();
        let merged = joined.merged().collapse();

        assert_eq!(merged.format, "a, %s, c");
        assert_eq!(merged.params, vec![Param::named("col")]);
    }

    #[test]
    fn push_element_rejects_scalars() {
        let mut scalar = Fragment::literal("x");
        let err = scalar.push_element(Fragment::literal("y")).unwrap_err();
        assert!(matches!(err, Error::NotACollection));
    }

    #[test]
    fn display_matches_debug_dump_shapes() {
        let chain = Chain {
            units: vec![
                Unit::new("SELECT ", Vec::new()),
                Unit::new("%s", vec![Param::named("u")]),
            ],
        };
        assert_eq!(chain.to_string(), "7:SELECT []-->2:%s[u,]");

        let collection = Fragment::Collection(vec![Chain::literal("a")]);
        assert_eq!(collection.to_string(), "(blank)[]==>1:a[]");
    }
}
