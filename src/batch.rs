//! Axiom batch driver.
//!
//! Owns the axioms and identities accumulated by one compilation pass, applies
//! the configured error policy to failing assertions, and submits the batch to
//! a classification engine. Each assertion compiles into its own scratch
//! context and is merged only on success, so a failing assertion never leaves
//! partial output behind.

use std::collections::BTreeSet;

use miette::Diagnostic;
use rayon::prelude::*;

use crate::compile::{CompileContext, CompiledAssertion, ExpressionCompiler};
use crate::config::{CompilerConfig, ErrorPolicy};
use crate::dl::AxiomSet;
use crate::error::{BatchError, CompileError, CompileResult, LegoResult};
use crate::export::{ClassificationReport, FailureExport, NodeExport};
use crate::lego::{Assertion, Lego};
use crate::reasoner::{Reasoner, Taxonomy};
use crate::registry::{IdentifierRegistry, Origin};

/// An assertion that failed to compile and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    pub lego: String,
    pub assertion: Option<String>,
    pub index: usize,
    pub error: CompileError,
}

impl AssertionFailure {
    pub fn to_export(&self) -> FailureExport {
        FailureExport {
            lego: self.lego.clone(),
            assertion: self.assertion.clone(),
            index: self.index,
            code: self.error.code().map(|c| c.to_string()).unwrap_or_default(),
            message: self.error.to_string(),
        }
    }
}

/// One compilation pass: pending axioms, their registry, and skipped failures.
#[derive(Debug)]
pub struct AxiomBatch {
    compiler: ExpressionCompiler,
    pending: CompileContext,
    failures: Vec<AssertionFailure>,
}

impl AxiomBatch {
    /// Create a batch after validating `config`.
    pub fn new(config: CompilerConfig) -> LegoResult<Self> {
        config.validate()?;
        Ok(Self {
            compiler: ExpressionCompiler::new(config),
            pending: CompileContext::default(),
            failures: Vec::new(),
        })
    }

    /// Axioms waiting to be submitted.
    pub fn axioms(&self) -> &AxiomSet {
        self.pending.axioms()
    }

    /// Identities produced since the last submission.
    pub fn registry(&self) -> &IdentifierRegistry {
        self.pending.registry()
    }

    /// Assertions skipped since the last submission.
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything pending without submitting it.
    pub fn discard(&mut self) {
        self.pending = CompileContext::default();
        self.failures.clear();
    }

    // -----------------------------------------------------------------------
    // Compilation
    // -----------------------------------------------------------------------

    /// Compile one assertion of the lego labelled `lego`.
    ///
    /// Returns `None` when the assertion failed and the policy is to skip it.
    pub fn compile_assertion(
        &mut self,
        lego: &str,
        index: usize,
        assertion: &Assertion,
    ) -> LegoResult<Option<CompiledAssertion>> {
        let outcome = compile_isolated(&self.compiler, assertion);
        self.absorb(lego, index, assertion, outcome)
    }

    /// Compile every assertion of a lego.
    pub fn compile_lego(&mut self, lego: &Lego) -> LegoResult<Vec<CompiledAssertion>> {
        tracing::info!(
            lego = lego.label(),
            assertions = lego.assertions.len(),
            "converting lego to axioms"
        );
        let mut compiled = Vec::with_capacity(lego.assertions.len());
        for (index, assertion) in lego.assertions.iter().enumerate() {
            if let Some(result) = self.compile_assertion(lego.label(), index, assertion)? {
                compiled.push(result);
            }
        }
        Ok(compiled)
    }

    /// Compile a sequence of legos in order.
    pub fn compile_legos(&mut self, legos: &[Lego]) -> LegoResult<Vec<CompiledAssertion>> {
        let mut compiled = Vec::new();
        for lego in legos {
            compiled.extend(self.compile_lego(lego)?);
        }
        Ok(compiled)
    }

    /// Compile legos on the rayon pool.
    ///
    /// Every assertion compiles into its own context; contexts are merged in
    /// input order afterwards, so the result is the same as [`compile_legos`].
    ///
    /// [`compile_legos`]: Self::compile_legos
    pub fn compile_legos_parallel(&mut self, legos: &[Lego]) -> LegoResult<Vec<CompiledAssertion>> {
        let work: Vec<(&Lego, usize, &Assertion)> = legos
            .iter()
            .flat_map(|lego| lego.assertions.iter().enumerate().map(move |(i, a)| (lego, i, a)))
            .collect();
        tracing::info!(
            legos = legos.len(),
            assertions = work.len(),
            "converting legos to axioms in parallel"
        );

        let compiler = &self.compiler;
        let outcomes: Vec<_> = work
            .par_iter()
            .map(|(_, _, assertion)| compile_isolated(compiler, assertion))
            .collect();

        let mut compiled = Vec::with_capacity(work.len());
        for ((lego, index, assertion), outcome) in work.into_iter().zip(outcomes) {
            if let Some(result) = self.absorb(lego.label(), index, assertion, outcome)? {
                compiled.push(result);
            }
        }
        Ok(compiled)
    }

    /// Merge a successful outcome, or apply the error policy to a failure.
    fn absorb(
        &mut self,
        lego: &str,
        index: usize,
        assertion: &Assertion,
        outcome: CompileResult<(CompiledAssertion, CompileContext)>,
    ) -> LegoResult<Option<CompiledAssertion>> {
        let error = match outcome {
            Ok((compiled, ctx)) => {
                self.pending.merge(ctx);
                return Ok(Some(compiled));
            }
            Err(error) => error,
        };

        match self.compiler.config().error_policy {
            ErrorPolicy::Skip => {
                tracing::warn!(
                    lego,
                    index,
                    assertion = assertion.id.as_deref().unwrap_or_default(),
                    error = %error,
                    "skipping assertion that failed to compile"
                );
                self.failures.push(AssertionFailure {
                    lego: lego.to_string(),
                    assertion: assertion.id.clone(),
                    index,
                    error,
                });
                Ok(None)
            }
            ErrorPolicy::Abort => {
                tracing::warn!(lego, index, error = %error, "aborting compilation pass");
                self.discard();
                Err(BatchError::Aborted {
                    lego: lego.to_string(),
                    index,
                    source: error,
                }
                .into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Declare every pending concept identity, classify the pending axioms,
    /// and report on each identity. The batch is emptied on success and kept
    /// on failure.
    pub fn submit<R: Reasoner + ?Sized>(
        &mut self,
        reasoner: &mut R,
    ) -> LegoResult<ClassificationReport> {
        tracing::info!(axioms = self.pending.axioms().len(), "classifying axioms");
        let signature: BTreeSet<String> = self
            .pending
            .registry()
            .concept_identities()
            .map(str::to_string)
            .collect();
        reasoner.declare(&signature)?;
        reasoner.classify(self.pending.axioms())?;

        let report = self.report(reasoner.classified_ontology());
        tracing::info!(
            nodes = report.nodes.len(),
            missing = report.missing.len(),
            skipped = report.failures.len(),
            "classification complete"
        );
        self.discard();
        Ok(report)
    }

    /// Resolve every pending concept identity against `taxonomy`.
    pub fn report(&self, taxonomy: &Taxonomy) -> ClassificationReport {
        let mut report = ClassificationReport {
            axiom_count: self.pending.axioms().len(),
            failures: self.failures.iter().map(AssertionFailure::to_export).collect(),
            ..Default::default()
        };
        for (identity, origin) in self.pending.registry().iter() {
            if !origin.is_concept() {
                continue;
            }
            let description = match origin {
                Origin::Concept { description } => description.clone(),
                _ => None,
            };
            match taxonomy.node(identity) {
                Some(node) => {
                    report.nodes.push(NodeExport::from_node(identity, description, &node))
                }
                None => report.missing.push(identity.to_string()),
            }
        }
        report
    }
}

/// Compile one assertion into a fresh context.
fn compile_isolated(
    compiler: &ExpressionCompiler,
    assertion: &Assertion,
) -> CompileResult<(CompiledAssertion, CompileContext)> {
    let mut ctx = CompileContext::default();
    let compiled = compiler.compile_assertion(assertion, &mut ctx)?;
    Ok((compiled, ctx))
}
