//! Classification engine seam.
//!
//! The compiler only produces axioms; computing subsumption is the job of an
//! external engine. [`Reasoner`] is the boundary: submit an axiom set, then
//! read back the classified [`Taxonomy`]. [`structural::StructuralReasoner`]
//! is a small in-process engine for the EL fragment this crate emits.

pub mod structural;
pub mod taxonomy;

use std::collections::BTreeSet;

use crate::dl::AxiomSet;
use crate::error::ReasonerError;

pub use structural::StructuralReasoner;
pub use taxonomy::{Node, Taxonomy};

/// A classification engine.
///
/// `classify` may be called repeatedly; each call adds to the axioms already
/// classified, and the taxonomy reflects everything submitted so far.
pub trait Reasoner {
    /// Add identities to the engine's signature. Each declared identity gets a
    /// node on the next `classify`, even when no axiom mentions it.
    fn declare(&mut self, identities: &BTreeSet<String>) -> Result<(), ReasonerError>;

    fn classify(&mut self, axioms: &AxiomSet) -> Result<(), ReasonerError>;

    fn classified_ontology(&self) -> &Taxonomy;
}
