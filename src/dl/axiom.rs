//! Concept-inclusion axioms and the set that accumulates them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::concept::Concept;

/// An axiom submitted to the classification engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axiom {
    /// `lhs ⊑ rhs`
    ConceptInclusion { lhs: Concept, rhs: Concept },
}

impl Axiom {
    pub fn inclusion(lhs: Concept, rhs: Concept) -> Self {
        Self::ConceptInclusion { lhs, rhs }
    }

    /// The pair of inclusions that makes `name` a defined concept equivalent
    /// to `expansion`.
    pub fn equivalence(name: Concept, expansion: Concept) -> [Self; 2] {
        [
            Self::inclusion(name.clone(), expansion.clone()),
            Self::inclusion(expansion, name),
        ]
    }

    pub fn lhs(&self) -> &Concept {
        match self {
            Self::ConceptInclusion { lhs, .. } => lhs,
        }
    }

    pub fn rhs(&self) -> &Concept {
        match self {
            Self::ConceptInclusion { rhs, .. } => rhs,
        }
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConceptInclusion { lhs, rhs } => write!(f, "SubClassOf({lhs}, {rhs})"),
        }
    }
}

/// An ordered, duplicate-free set of axioms.
///
/// Ordered so that two compilations of the same input iterate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxiomSet {
    axioms: BTreeSet<Axiom>,
}

impl AxiomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an axiom. Returns `false` if it was already present.
    pub fn insert(&mut self, axiom: Axiom) -> bool {
        self.axioms.insert(axiom)
    }

    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.axioms.contains(axiom)
    }

    /// Move every axiom of `other` into this set.
    pub fn merge(&mut self, other: AxiomSet) {
        self.axioms.extend(other.axioms);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axiom> {
        self.axioms.iter()
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }
}

impl Extend<Axiom> for AxiomSet {
    fn extend<I: IntoIterator<Item = Axiom>>(&mut self, iter: I) {
        self.axioms.extend(iter);
    }
}

impl FromIterator<Axiom> for AxiomSet {
    fn from_iter<I: IntoIterator<Item = Axiom>>(iter: I) -> Self {
        Self {
            axioms: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AxiomSet {
    type Item = Axiom;
    type IntoIter = std::collections::btree_set::IntoIter<Axiom>;

    fn into_iter(self) -> Self::IntoIter {
        self.axioms.into_iter()
    }
}

impl<'a> IntoIterator for &'a AxiomSet {
    type Item = &'a Axiom;
    type IntoIter = std::collections::btree_set::Iter<'a, Axiom>;

    fn into_iter(self) -> Self::IntoIter {
        self.axioms.iter()
    }
}
