//! Description-logic terms and axioms emitted by the compiler.
//!
//! Concepts are immutable values. A composite concept has no name until the
//! compiler binds it to a synthetic atomic concept with an equivalence pair of
//! inclusion axioms.

pub mod axiom;
pub mod concept;

pub use axiom::{Axiom, AxiomSet};
pub use concept::{Concept, Double, Feature, Literal, Operator, Role};
