//! Lowering of measurements into datatype restrictions.
//!
//! A point becomes `feature = value`. A bound becomes up to two restrictions,
//! `>=`/`>` for the lower limit and `<=`/`<` for the upper limit. An interval
//! keeps only its outermost limits: `{[5] to (8)} <= X <= {(20) to [30]}`
//! becomes `X >= 5 AND X <= 30`. The classifier cannot tell "definitely
//! within" from "possibly within", so only containment of a point in the
//! widest range is queryable afterwards.
//!
//! Units, when present, travel with the value inside one role group.

use crate::dl::{Concept, Double, Feature, Literal, Operator};
use crate::error::{CompileError, CompileResult};
use crate::lego::{ConceptRef, Measurement, Point, PointValue};
use crate::registry::Origin;

use super::identity::IdentityResolver;
use super::{CompileContext, ExpressionCompiler};

/// Literal for a point value. Constants become the string of their name.
pub fn point_literal(value: &PointValue) -> Literal {
    match value {
        PointValue::Integer(v) => Literal::Integer(*v),
        PointValue::Float(v) => Literal::Double(Double(*v)),
        PointValue::Constant(c) => Literal::String(c.name().to_string()),
    }
}

/// `feature operator point`
pub fn point_restriction(feature: &Feature, point: &Point, operator: Operator) -> Concept {
    Concept::datatype(feature.clone(), operator, point_literal(&point.value))
}

/// Restrictions for a lower and/or upper limit, conjoined when both exist.
///
/// Each limit is given with its inclusivity. Returns `None` when neither
/// limit is present.
pub fn limit_restrictions(
    feature: &Feature,
    lower: Option<(&Point, bool)>,
    upper: Option<(&Point, bool)>,
) -> Option<Concept> {
    let lower = lower.map(|(point, inclusive)| {
        let op = if inclusive {
            Operator::GreaterThanEquals
        } else {
            Operator::GreaterThan
        };
        point_restriction(feature, point, op)
    });
    let upper = upper.map(|(point, inclusive)| {
        let op = if inclusive {
            Operator::LessThanEquals
        } else {
            Operator::LessThan
        };
        point_restriction(feature, point, op)
    });
    match (lower, upper) {
        (Some(l), Some(u)) => Some(Concept::conjunction([l, u])),
        (l, u) => l.or(u),
    }
}

/// The single units concept of a measurement, with its resolved identity.
///
/// Units may be given on any point; all that are given must resolve to the
/// same identity.
pub fn measurement_units<'m>(
    resolver: &IdentityResolver<'_>,
    measurement: &'m Measurement,
) -> CompileResult<Option<(String, &'m ConceptRef)>> {
    let mut found: Option<(String, &ConceptRef)> = None;
    for units in measurement.points().into_iter().filter_map(|p| p.units.as_ref()) {
        let identity = resolver.resolve(units)?;
        let Some((existing, first)) = &found else {
            found = Some((identity, units));
            continue;
        };
        if *existing != identity {
            return Err(CompileError::InvalidMeasurement {
                reason: format!(
                    "units must be the same throughout a measurement, found \"{}\" and \"{}\"",
                    first.description(),
                    units.description()
                ),
            });
        }
    }
    Ok(found)
}

/// The datatype restrictions of a measurement, without units.
pub fn value_restrictions(feature: &Feature, measurement: &Measurement) -> CompileResult<Concept> {
    let data = match measurement {
        Measurement::Point(p) => Some(point_restriction(feature, p, Operator::Equals)),
        Measurement::Bound(b) => limit_restrictions(
            feature,
            b.lower.as_ref().map(|p| (p, b.is_lower_inclusive())),
            b.upper.as_ref().map(|p| (p, b.is_upper_inclusive())),
        ),
        Measurement::Interval(i) => limit_restrictions(
            feature,
            i.lower
                .as_ref()
                .and_then(|b| b.lower.as_ref().map(|p| (p, b.is_lower_inclusive()))),
            i.upper
                .as_ref()
                .and_then(|b| b.upper.as_ref().map(|p| (p, b.is_upper_inclusive()))),
        ),
    };
    data.ok_or_else(|| CompileError::InvalidMeasurement {
        reason: match measurement {
            Measurement::Interval(_) => {
                "interval has neither an outer lower nor an outer upper limit".into()
            }
            _ => "bound has neither a lower nor an upper limit".into(),
        },
    })
}

impl ExpressionCompiler {
    /// Lower a measurement governed by `feature` into a concept.
    ///
    /// With units the result is `∃RoleGroup.(units ⊓ restrictions)`,
    /// otherwise the restrictions alone.
    pub fn lower_measurement(
        &self,
        feature: &Feature,
        measurement: &Measurement,
        ctx: &mut CompileContext,
    ) -> CompileResult<Concept> {
        let units = measurement_units(&self.resolver(), measurement)?;
        let data = value_restrictions(feature, measurement)?;
        match units {
            Some((identity, units)) => {
                ctx.registry.register(
                    identity.clone(),
                    Origin::Concept {
                        description: units.desc.clone(),
                    },
                );
                let grouped = Concept::conjunction([Concept::Atomic(identity), data]);
                Ok(Concept::existential(self.role_group(ctx), grouped))
            }
            None => Ok(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dl::Role;
    use crate::lego::{Bound, Interval, MeasurementConstant};

    fn feature() -> Feature {
        Feature::new("f")
    }

    fn restriction(op: Operator, literal: Literal) -> Concept {
        Concept::datatype(feature(), op, literal)
    }

    fn lower(m: &Measurement) -> CompileResult<Concept> {
        let compiler = ExpressionCompiler::default();
        let mut ctx = CompileContext::default();
        compiler.lower_measurement(&feature(), m, &mut ctx)
    }

    #[test]
    fn point_is_equality() {
        let c = lower(&Measurement::Point(Point::new(5))).unwrap();
        assert_eq!(c, restriction(Operator::Equals, Literal::Integer(5)));
    }

    #[test]
    fn literal_kind_follows_point_kind() {
        let float = lower(&Measurement::Point(Point::new(2.5))).unwrap();
        assert_eq!(float, restriction(Operator::Equals, Literal::Double(Double(2.5))));

        let constant = lower(&Measurement::Point(Point::new(MeasurementConstant::Now))).unwrap();
        assert_eq!(constant, restriction(Operator::Equals, Literal::String("NOW".into())));
    }

    #[test]
    fn bound_operator_selection() {
        let bound = Bound::between(Point::new(5), true, Point::new(10), false);
        let c = lower(&Measurement::Bound(bound)).unwrap();
        assert_eq!(
            c,
            Concept::conjunction([
                restriction(Operator::GreaterThanEquals, Literal::Integer(5)),
                restriction(Operator::LessThan, Literal::Integer(10)),
            ])
        );
    }

    #[test]
    fn exclusive_lower_and_inclusive_upper() {
        let bound = Bound::between(Point::new(1), false, Point::new(3), true);
        let c = lower(&Measurement::Bound(bound)).unwrap();
        assert_eq!(
            c,
            Concept::conjunction([
                restriction(Operator::GreaterThan, Literal::Integer(1)),
                restriction(Operator::LessThanEquals, Literal::Integer(3)),
            ])
        );
    }

    #[test]
    fn single_limit_is_returned_alone() {
        let c = lower(&Measurement::Bound(Bound::at_least(Point::new(7), true))).unwrap();
        assert_eq!(c, restriction(Operator::GreaterThanEquals, Literal::Integer(7)));

        let c = lower(&Measurement::Bound(Bound::at_most(Point::new(7), false))).unwrap();
        assert_eq!(c, restriction(Operator::LessThan, Literal::Integer(7)));
    }

    #[test]
    fn interval_keeps_only_outer_limits() {
        let interval = Interval::new(
            Bound::between(Point::new(5), true, Point::new(8), false),
            Bound::between(Point::new(20), false, Point::new(30), true),
        );
        let c = lower(&Measurement::Interval(interval)).unwrap();
        assert_eq!(
            c,
            Concept::conjunction([
                restriction(Operator::GreaterThanEquals, Literal::Integer(5)),
                restriction(Operator::LessThanEquals, Literal::Integer(30)),
            ])
        );
    }

    #[test]
    fn interval_with_one_open_end() {
        let interval = Interval {
            lower: Some(Bound::at_most(Point::new(8), true)),
            upper: Some(Bound::between(Point::new(20), true, Point::new(30), false)),
        };
        let c = lower(&Measurement::Interval(interval)).unwrap();
        assert_eq!(c, restriction(Operator::LessThan, Literal::Integer(30)));
    }

    #[test]
    fn empty_bound_and_interval_are_invalid() {
        let err = lower(&Measurement::Bound(Bound::default())).unwrap_err();
        assert!(matches!(err, CompileError::InvalidMeasurement { .. }));

        let err = lower(&Measurement::Interval(Interval::default())).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidMeasurement { reason } if reason.contains("interval")
        ));
    }

    #[test]
    fn units_are_grouped_with_the_value() {
        let mg = ConceptRef::uuid("mg").with_desc("milligram");
        let c = lower(&Measurement::Point(Point::new(5).with_units(mg))).unwrap();
        assert_eq!(
            c,
            Concept::existential(
                Role::new("RoleGroup"),
                Concept::conjunction([
                    Concept::atomic("mg"),
                    restriction(Operator::Equals, Literal::Integer(5)),
                ]),
            )
        );
    }

    #[test]
    fn matching_units_on_both_limits_are_accepted() {
        let bound = Bound::between(
            Point::new(5).with_units(ConceptRef::uuid("mg")),
            true,
            Point::new(10).with_units(ConceptRef::uuid("mg")),
            true,
        );
        let c = lower(&Measurement::Bound(bound)).unwrap();
        assert!(matches!(c, Concept::Existential { ref role, .. } if role.as_str() == "RoleGroup"));
    }

    #[test]
    fn inconsistent_units_are_rejected() {
        let bound = Bound::between(
            Point::new(5).with_units(ConceptRef::uuid("mg").with_desc("milligram")),
            true,
            Point::new(10).with_units(ConceptRef::uuid("g").with_desc("gram")),
            true,
        );
        let err = lower(&Measurement::Bound(bound)).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidMeasurement { reason }
                if reason.contains("milligram") && reason.contains("gram")
        ));
    }

    #[test]
    fn inconsistent_units_on_inner_interval_limits_are_rejected() {
        let interval = Interval::new(
            Bound::between(
                Point::new(5).with_units(ConceptRef::uuid("mg")),
                true,
                Point::new(8).with_units(ConceptRef::uuid("g")),
                true,
            ),
            Bound::at_most(Point::new(30), true),
        );
        assert!(lower(&Measurement::Interval(interval)).is_err());
    }

    #[test]
    fn units_without_identity_fail() {
        let point = Point::new(5).with_units(ConceptRef::default().with_desc("mystery unit"));
        let err = lower(&Measurement::Point(point)).unwrap_err();
        assert!(matches!(err, CompileError::MissingIdentity { .. }));
    }
}
