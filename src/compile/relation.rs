//! Lowering of a single relation.
//!
//! The destination decides what the relation type becomes: a role when the
//! destination is an expression, a feature when it is a measurement, text,
//! or boolean.

use crate::dl::{Concept, Literal, Operator};
use crate::error::{CompileError, CompileResult};
use crate::lego::{Destination, Relation};

use super::{CompileContext, ExpressionCompiler};

impl ExpressionCompiler {
    /// Lower one relation to a concept.
    pub fn lower_relation(
        &self,
        relation: &Relation,
        ctx: &mut CompileContext,
    ) -> CompileResult<Concept> {
        let relation_type = &relation.relation_type;
        match &relation.destination {
            Destination::Expression(expression) => {
                let role = self.role_for(relation_type, ctx)?;
                let filler = self.compile_expression(expression, ctx)?;
                Ok(Concept::existential(role, filler))
            }
            Destination::Measurement(measurement) => {
                let feature = self.feature_for(relation_type, ctx)?;
                let value = self.lower_measurement(&feature, measurement, ctx)?;
                if self.config().wrap_measurement_relations {
                    let role = self.role_for(relation_type, ctx)?;
                    Ok(Concept::existential(role, value))
                } else {
                    Ok(value)
                }
            }
            Destination::Text(text) if text.is_empty() => Err(CompileError::InvalidRelation {
                relation_type: relation_type.description(),
                reason: "text destination is empty".into(),
            }),
            Destination::Text(text) => {
                let feature = self.feature_for(relation_type, ctx)?;
                Ok(Concept::datatype(feature, Operator::Equals, Literal::String(text.clone())))
            }
            Destination::Boolean(value) => {
                let feature = self.feature_for(relation_type, ctx)?;
                Ok(Concept::datatype(feature, Operator::Equals, Literal::Boolean(*value)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::dl::{Feature, Role};
    use crate::lego::{ConceptRef, Expression, Measurement, Point};
    use crate::registry::Origin;

    fn lower(relation: &Relation) -> (CompileResult<Concept>, CompileContext) {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::default();
        let result = compiler.lower_relation(relation, &mut ctx);
        (result, ctx)
    }

    #[test]
    fn expression_destination_is_an_existential() {
        let relation =
            Relation::to_concept(ConceptRef::uuid("finding-site"), ConceptRef::uuid("heel"));
        let (result, ctx) = lower(&relation);
        assert_eq!(
            result.unwrap(),
            Concept::existential(Role::new("finding-site"), Concept::atomic("heel"))
        );
        assert_eq!(ctx.registry().get("finding-site"), Some(&Origin::Role));
    }

    #[test]
    fn nested_expression_destination_recurses() {
        let nested = Expression::concept(ConceptRef::uuid("ulcer"))
            .with_relation(Relation::to_concept(
                ConceptRef::uuid("site"),
                ConceptRef::uuid("heel"),
            ));
        let relation = Relation::to_expression(ConceptRef::uuid("due-to"), nested);
        let (result, ctx) = lower(&relation);
        assert_eq!(
            result.unwrap(),
            Concept::existential(
                Role::new("due-to"),
                Concept::conjunction([
                    Concept::atomic("ulcer"),
                    Concept::existential(Role::new("site"), Concept::atomic("heel")),
                ]),
            )
        );
        assert!(ctx.axioms().is_empty(), "nested expressions are not named");
    }

    #[test]
    fn measurement_destination_is_wrapped_in_the_type_role() {
        let relation =
            Relation::to_measurement(ConceptRef::uuid("stage"), Measurement::Point(Point::new(2)));
        let (result, _) = lower(&relation);
        assert_eq!(
            result.unwrap(),
            Concept::existential(
                Role::new("stage"),
                Concept::datatype(Feature::new("stage"), Operator::Equals, Literal::Integer(2)),
            )
        );
    }

    #[test]
    fn measurement_destination_unwrapped_when_configured() {
        let compiler = ExpressionCompiler::new(CompilerConfig {
            wrap_measurement_relations: false,
            ..Default::default()
        });
        let mut ctx = CompileContext::default();
        let relation =
            Relation::to_measurement(ConceptRef::uuid("stage"), Measurement::Point(Point::new(2)));
        assert_eq!(
            compiler.lower_relation(&relation, &mut ctx).unwrap(),
            Concept::datatype(Feature::new("stage"), Operator::Equals, Literal::Integer(2))
        );
    }

    #[test]
    fn text_and_boolean_destinations_are_features() {
        let text = Relation::new(ConceptRef::uuid("note"), Destination::Text("left heel".into()));
        let (result, ctx) = lower(&text);
        assert_eq!(
            result.unwrap(),
            Concept::datatype(
                Feature::new("note"),
                Operator::Equals,
                Literal::String("left heel".into()),
            )
        );
        assert_eq!(ctx.registry().get("note"), Some(&Origin::Feature));

        let flag = Relation::new(ConceptRef::uuid("present"), Destination::Boolean(false));
        let (result, _) = lower(&flag);
        assert_eq!(
            result.unwrap(),
            Concept::datatype(Feature::new("present"), Operator::Equals, Literal::Boolean(false))
        );
    }

    #[test]
    fn empty_text_is_an_invalid_relation() {
        let relation = Relation::new(
            ConceptRef::uuid("note").with_desc("Note"),
            Destination::Text(String::new()),
        );
        let (result, _) = lower(&relation);
        assert_eq!(
            result.unwrap_err(),
            CompileError::InvalidRelation {
                relation_type: "Note".into(),
                reason: "text destination is empty".into(),
            }
        );
    }

    #[test]
    fn untyped_relation_is_missing_identity() {
        let relation = Relation::to_concept(ConceptRef::default(), ConceptRef::uuid("heel"));
        let (result, _) = lower(&relation);
        assert!(matches!(result, Err(CompileError::MissingIdentity { .. })));
    }
}
