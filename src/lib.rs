// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # lego-classifier
//!
//! Compiles Lego clinical assertions into EL description-logic axioms and
//! submits them to a classification engine.
//!
//! ## Architecture
//!
//! - **Document model** (`lego`): assertions, focus expressions, relations, measurements
//! - **Logical forms** (`dl`): concepts, roles, features, inclusion axioms
//! - **Compiler** (`compile`): identity resolution, measurement canonicalization,
//!   relation lowering, role-group aggregation, content identities
//! - **Batch driver** (`batch`): error policy, all-or-nothing assertions, submission
//! - **Reasoner seam** (`reasoner`): engine trait, petgraph taxonomy, structural engine
//!
//! ## Library usage
//!
//! ```no_run
//! use lego_classifier::batch::AxiomBatch;
//! use lego_classifier::config::CompilerConfig;
//! use lego_classifier::lego::LegoList;
//! use lego_classifier::reasoner::StructuralReasoner;
//!
//! let legos = LegoList::from_path(std::path::Path::new("legos.json")).unwrap();
//! let mut batch = AxiomBatch::new(CompilerConfig::default()).unwrap();
//! batch.compile_legos(&legos.legos).unwrap();
//! let report = batch.submit(&mut StructuralReasoner::new()).unwrap();
//! println!("{} nodes", report.nodes.len());
//! ```

pub mod batch;
pub mod compile;
pub mod config;
pub mod dl;
pub mod error;
pub mod export;
pub mod lego;
pub mod reasoner;
pub mod registry;
