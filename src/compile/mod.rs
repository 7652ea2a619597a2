//! Expression compiler: lowers Lego assertions into EL concepts and axioms.
//!
//! One expression node is compiled in three steps. The focus is resolved to an
//! atomic concept (or the conjunction of its compiled children), the node's
//! relations and relation groups are aggregated into conjuncts, and the two
//! are combined. A combined conjunction that must be referenced later is
//! given a content identity and bound to it with an equivalence pair.
//!
//! All output goes into a caller-owned [`CompileContext`]; the compiler itself
//! holds only configuration and can be shared freely between threads.

pub mod content_id;
pub mod group;
pub mod identity;
pub mod measurement;
pub mod relation;

use serde::{Deserialize, Serialize};

use crate::config::CompilerConfig;
use crate::dl::{Axiom, AxiomSet, Concept, Feature};
use crate::error::{CompileError, CompileResult};
use crate::lego::{Assertion, AssertionValue, Expression, Focus, Measurement};
use crate::registry::{IdentifierRegistry, Origin};

pub use content_id::{ContentId, canonical_encoding};
pub use identity::{IdentityResolver, coded_identity, name_uuid_from_bytes};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Accumulated output of one compilation pass: axioms and registered identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileContext {
    pub(crate) axioms: AxiomSet,
    pub(crate) registry: IdentifierRegistry,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axioms(&self) -> &AxiomSet {
        &self.axioms
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    /// Fold another context's output into this one.
    pub fn merge(&mut self, other: CompileContext) {
        self.axioms.merge(other.axioms);
        self.registry.merge(other.registry);
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty() && self.registry.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A compiled expression and, when it was named, its content identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledExpression {
    pub concept: Concept,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ContentId>,
}

impl CompiledExpression {
    /// The identity to look up in a taxonomy: the content identity when
    /// named, otherwise the atomic focus itself.
    pub fn identity(&self) -> Option<String> {
        match &self.name {
            Some(id) => Some(id.to_string()),
            None => self.concept.as_atomic().map(str::to_string),
        }
    }
}

/// The classifiable parts of one compiled assertion.
///
/// `value` is `None` when the value was a bare measurement, text, or boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledAssertion {
    pub discernible: CompiledExpression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<CompiledExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CompiledExpression>,
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Compiles Lego expressions and assertions under one configuration.
#[derive(Debug, Clone, Default)]
pub struct ExpressionCompiler {
    config: CompilerConfig,
}

impl ExpressionCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a nested expression (a relation destination or a child of a
    /// composite focus). It is named only when its focus is itself a
    /// composite of several children.
    pub fn compile_expression(
        &self,
        expression: &Expression,
        ctx: &mut CompileContext,
    ) -> CompileResult<Concept> {
        self.compile_node(expression, ctx, false).map(|compiled| compiled.concept)
    }

    /// Compile an assertion-level expression. Named whenever it has at least
    /// one relation conjunct.
    pub fn compile_top_level(
        &self,
        expression: &Expression,
        ctx: &mut CompileContext,
    ) -> CompileResult<CompiledExpression> {
        self.compile_node(expression, ctx, true)
    }

    fn compile_node(
        &self,
        expression: &Expression,
        ctx: &mut CompileContext,
        top_level: bool,
    ) -> CompileResult<CompiledExpression> {
        let (focus, composite) = match expression.focus()? {
            Focus::Concept(concept) => (self.atomic_concept(concept, ctx)?, false),
            Focus::Conjunction(children) => {
                let members = children
                    .iter()
                    .map(|child| self.compile_expression(child, ctx))
                    .collect::<CompileResult<Vec<_>>>()?;
                (Concept::conjunction(members), children.len() > 1)
            }
        };

        let conjuncts = self.aggregate_relations(expression, ctx)?;
        if conjuncts.is_empty() {
            return Ok(CompiledExpression {
                concept: focus,
                name: None,
            });
        }

        let concept = Concept::conjunction(std::iter::once(focus).chain(conjuncts));
        let name = if top_level || composite {
            Some(self.name_expression(expression, &concept, ctx)?)
        } else {
            None
        };
        Ok(CompiledExpression { concept, name })
    }

    /// Bind a compiled conjunction to its content identity.
    fn name_expression(
        &self,
        expression: &Expression,
        concept: &Concept,
        ctx: &mut CompileContext,
    ) -> CompileResult<ContentId> {
        let encoding = canonical_encoding(&self.resolver(), expression)?;
        let id = ContentId::from_encoding(&encoding);
        tracing::debug!(%id, %encoding, "derived content identity for composite expression");

        ctx.registry.register(
            id.to_string(),
            Origin::Composite {
                encoding,
                concept: concept.clone(),
            },
        );
        ctx.axioms
            .extend(Axiom::equivalence(Concept::atomic(id.to_string()), concept.clone()));
        Ok(id)
    }

    /// Compile one assertion's discernible, qualifier, and value.
    ///
    /// Bare scalar values and timing are validated but contribute nothing to
    /// `ctx`; they do not take part in subsumption.
    pub fn compile_assertion(
        &self,
        assertion: &Assertion,
        ctx: &mut CompileContext,
    ) -> CompileResult<CompiledAssertion> {
        let value = match &assertion.value {
            None => return Err(CompileError::MissingValue),
            Some(AssertionValue::Text(text)) if text.is_empty() => {
                return Err(CompileError::MissingValue);
            }
            Some(value) => value,
        };

        let discernible = self.compile_top_level(&assertion.discernible, ctx)?;
        let qualifier = assertion
            .qualifier
            .as_ref()
            .map(|q| self.compile_top_level(q, ctx))
            .transpose()?;
        let value = match value {
            AssertionValue::Expression(expression) => {
                Some(self.compile_top_level(expression, ctx)?)
            }
            AssertionValue::Measurement(measurement) => {
                self.validate_unclassified(&self.config.value_feature, measurement)?;
                tracing::debug!("measurement value outside an expression is not classified");
                None
            }
            AssertionValue::Text(_) | AssertionValue::Boolean(_) => {
                tracing::debug!("text or boolean value outside an expression is not classified");
                None
            }
        };
        if let Some(timing) = &assertion.timing {
            self.validate_unclassified(&self.config.timing_feature, timing)?;
            tracing::debug!("timing information is not classified");
        }

        Ok(CompiledAssertion {
            discernible,
            qualifier,
            value,
        })
    }

    /// Lower a measurement into a throwaway context so malformed values are
    /// still reported.
    fn validate_unclassified(&self, feature: &str, measurement: &Measurement) -> CompileResult<()> {
        let mut scratch = CompileContext::default();
        self.lower_measurement(&Feature::new(feature), measurement, &mut scratch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dl::Role;
    use crate::lego::{Bound, ConceptRef, Point, Relation, RelationGroup};

    fn rel(ty: &str, dest: &str) -> Relation {
        Relation::to_concept(ConceptRef::uuid(ty), ConceptRef::uuid(dest))
    }

    fn concept(id: &str) -> Expression {
        Expression::concept(ConceptRef::uuid(id))
    }

    #[test]
    fn bare_concept_is_not_named() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let compiled = compiler.compile_top_level(&concept("c1"), &mut ctx).unwrap();
        assert_eq!(compiled.concept, Concept::atomic("c1"));
        assert_eq!(compiled.name, None);
        assert_eq!(compiled.identity().as_deref(), Some("c1"));
        assert!(ctx.axioms().is_empty());
    }

    #[test]
    fn top_level_with_relation_is_named() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let compiled = compiler
            .compile_top_level(&concept("c3").with_relation(rel("r", "c4")), &mut ctx)
            .unwrap();
        let expected = Concept::conjunction([
            Concept::atomic("c3"),
            Concept::existential(Role::new("r"), Concept::atomic("c4")),
        ]);
        assert_eq!(compiled.concept, expected);

        let id = compiled.name.unwrap().to_string();
        assert_eq!(ctx.axioms().len(), 2);
        for axiom in Axiom::equivalence(Concept::atomic(id.clone()), expected.clone()) {
            assert!(ctx.axioms().contains(&axiom));
        }
        assert!(matches!(
            ctx.registry().get(&id),
            Some(Origin::Composite { concept, .. }) if *concept == expected
        ));
    }

    #[test]
    fn nested_destination_is_not_named() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let nested = concept("c4").with_relation(rel("r2", "c5"));
        compiler.compile_expression(&nested, &mut ctx).unwrap();
        assert!(ctx.axioms().is_empty());
    }

    #[test]
    fn nested_composite_focus_with_relations_is_named() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let nested =
            Expression::conjunction([concept("a"), concept("b")]).with_relation(rel("r", "c"));
        let compiled = compiler.compile_expression(&nested, &mut ctx).unwrap();
        assert_eq!(
            compiled,
            Concept::conjunction([
                Concept::atomic("a"),
                Concept::atomic("b"),
                Concept::existential(Role::new("r"), Concept::atomic("c")),
            ])
        );
        assert_eq!(ctx.axioms().len(), 2);
    }

    #[test]
    fn composite_focus_without_relations_is_a_plain_conjunction() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let compiled = compiler
            .compile_top_level(&Expression::conjunction([concept("b"), concept("a")]), &mut ctx)
            .unwrap();
        assert_eq!(
            compiled.concept,
            Concept::conjunction([Concept::atomic("a"), Concept::atomic("b")])
        );
        assert_eq!(compiled.name, None);
        assert!(ctx.axioms().is_empty());
    }

    #[test]
    fn missing_value_is_rejected() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let mut assertion = Assertion::new(concept("c1"), AssertionValue::Boolean(true));
        assertion.value = None;
        assert_eq!(
            compiler.compile_assertion(&assertion, &mut ctx).unwrap_err(),
            CompileError::MissingValue
        );

        assertion.value = Some(AssertionValue::Text(String::new()));
        assert_eq!(
            compiler.compile_assertion(&assertion, &mut ctx).unwrap_err(),
            CompileError::MissingValue
        );
    }

    #[test]
    fn scalar_value_and_timing_emit_nothing() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let assertion = Assertion::new(
            concept("c1"),
            AssertionValue::Measurement(Measurement::Point(Point::new(5))),
        )
        .with_timing(Measurement::Bound(Bound::at_least(Point::new(1), true)));
        let compiled = compiler.compile_assertion(&assertion, &mut ctx).unwrap();
        assert_eq!(compiled.value, None);
        assert!(ctx.axioms().is_empty());
        assert!(!ctx.registry().contains("Value"));
        assert!(!ctx.registry().contains("Timing"));
    }

    #[test]
    fn malformed_timing_fails_the_assertion() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let assertion = Assertion::new(concept("c1"), AssertionValue::Boolean(true))
            .with_timing(Measurement::Bound(Bound::default()));
        assert!(matches!(
            compiler.compile_assertion(&assertion, &mut ctx),
            Err(CompileError::InvalidMeasurement { .. })
        ));
    }

    #[test]
    fn grouped_and_ungrouped_relations_combine() {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::new();
        let expr = concept("f")
            .with_relation(rel("r1", "a"))
            .with_group(RelationGroup::new(vec![rel("r2", "b"), rel("r3", "c")]));
        let compiled = compiler.compile_top_level(&expr, &mut ctx).unwrap();
        assert_eq!(compiled.concept.conjuncts().len(), 3);
        assert!(compiled.name.is_some());
    }
}
