//! Concepts, roles, features, and literals.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A named role (object property) used in existential restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named feature (datatype property) used in datatype restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feature(String);

impl Feature {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison operator of a datatype restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An `f64` with total equality and ordering, so literals can live in sets.
///
/// Equality and hashing use the bit pattern; ordering uses `f64::total_cmp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Double(pub f64);

impl PartialEq for Double {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Double {}

impl Hash for Double {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Double {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Double {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A literal value inside a datatype restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    Double(Double),
    String(String),
    Boolean(bool),
}

impl Literal {
    /// Numeric value for comparisons across integer and floating literals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Double(v) => Some(v.0),
            Self::String(_) | Self::Boolean(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{:?}", v.0),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// A description-logic concept in the EL fragment with datatypes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    /// A named concept, identified by its canonical identity string.
    Atomic(String),
    /// A conjunction. Built through [`Concept::conjunction`], members are
    /// flattened, sorted, and free of duplicates.
    Conjunction(Vec<Concept>),
    /// `∃role.filler`
    Existential { role: Role, filler: Box<Concept> },
    /// `feature operator literal`
    Datatype {
        feature: Feature,
        operator: Operator,
        literal: Literal,
    },
}

impl Concept {
    pub fn atomic(id: impl Into<String>) -> Self {
        Self::Atomic(id.into())
    }

    pub fn existential(role: Role, filler: Concept) -> Self {
        Self::Existential {
            role,
            filler: Box::new(filler),
        }
    }

    pub fn datatype(feature: Feature, operator: Operator, literal: Literal) -> Self {
        Self::Datatype {
            feature,
            operator,
            literal,
        }
    }

    /// Conjoin concepts into canonical form.
    ///
    /// Nested conjunctions are flattened and members sorted and deduplicated,
    /// so set-equal inputs produce equal concepts regardless of order. A single
    /// member is returned as itself. An empty input yields the empty
    /// conjunction, which stands for the top concept.
    pub fn conjunction(members: impl IntoIterator<Item = Concept>) -> Self {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Self::Conjunction(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        Self::Conjunction(flat)
    }

    /// The identity of an atomic concept.
    pub fn as_atomic(&self) -> Option<&str> {
        match self {
            Self::Atomic(id) => Some(id),
            _ => None,
        }
    }

    /// The conjuncts of this concept: its members if it is a conjunction,
    /// otherwise the concept itself.
    pub fn conjuncts(&self) -> &[Concept] {
        match self {
            Self::Conjunction(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    /// Visit every atomic concept identity mentioned anywhere in this concept.
    pub fn for_each_atomic<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Self::Atomic(id) => visit(id),
            Self::Conjunction(members) => {
                for m in members {
                    m.for_each_atomic(visit);
                }
            }
            Self::Existential { filler, .. } => filler.for_each_atomic(visit),
            Self::Datatype { .. } => {}
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic(id) => f.write_str(id),
            Self::Conjunction(members) => {
                f.write_str("and(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{m}")?;
                }
                f.write_str(")")
            }
            Self::Existential { role, filler } => write!(f, "some({role}, {filler})"),
            Self::Datatype {
                feature,
                operator,
                literal,
            } => write!(f, "data({feature} {operator} {literal})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunction_is_order_insensitive() {
        let a = Concept::conjunction([Concept::atomic("B"), Concept::atomic("A")]);
        let b = Concept::conjunction([Concept::atomic("A"), Concept::atomic("B")]);
        assert_eq!(a, b);
    }

    #[test]
    fn conjunction_flattens_and_dedups() {
        let inner = Concept::conjunction([Concept::atomic("A"), Concept::atomic("B")]);
        let outer = Concept::conjunction([inner, Concept::atomic("A"), Concept::atomic("C")]);
        assert_eq!(
            outer,
            Concept::Conjunction(vec![
                Concept::atomic("A"),
                Concept::atomic("B"),
                Concept::atomic("C"),
            ])
        );
    }

    #[test]
    fn single_member_conjunction_collapses() {
        assert_eq!(Concept::conjunction([Concept::atomic("A")]), Concept::atomic("A"));
        assert_eq!(Concept::conjunction(Vec::new()), Concept::Conjunction(vec![]));
    }

    #[test]
    fn display_uses_functional_syntax() {
        let c = Concept::conjunction([
            Concept::atomic("C3"),
            Concept::existential(Role::new("r"), Concept::atomic("C4")),
            Concept::datatype(
                Feature::new("f"),
                Operator::GreaterThanEquals,
                Literal::Integer(5),
            ),
        ]);
        let text = c.to_string();
        assert!(text.starts_with("and("));
        assert!(text.contains("some(r, C4)"));
        assert!(text.contains("data(f >= 5)"));
    }

    #[test]
    fn doubles_have_total_order() {
        assert!(Double(1.0) < Double(2.0));
        assert_eq!(Double(0.5), Double(0.5));
        assert_eq!(Literal::Double(Double(2.5)).as_f64(), Some(2.5));
        assert_eq!(Literal::Boolean(true).as_f64(), None);
    }

    #[test]
    fn collects_atomic_identities() {
        let c = Concept::conjunction([
            Concept::atomic("A"),
            Concept::existential(Role::new("r"), Concept::atomic("B")),
        ]);
        let mut seen = Vec::new();
        c.for_each_atomic(&mut |id| seen.push(id.to_string()));
        assert_eq!(seen, vec!["A", "B"]);
    }
}
