//! Point, bound, and interval measurements.

use serde::{Deserialize, Serialize};

use super::expression::ConceptRef;

/// Well-known temporal reference points that a measurement may name instead
/// of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementConstant {
    Dob,
    Now,
    StartActiveService,
    EndActiveService,
}

impl MeasurementConstant {
    /// The constant's canonical name, used as its literal value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dob => "DOB",
            Self::Now => "NOW",
            Self::StartActiveService => "START_ACTIVE_SERVICE",
            Self::EndActiveService => "END_ACTIVE_SERVICE",
        }
    }
}

/// The value held by a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Integer(i64),
    Float(f64),
    Constant(MeasurementConstant),
}

impl From<i64> for PointValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PointValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for PointValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<MeasurementConstant> for PointValue {
    fn from(value: MeasurementConstant) -> Self {
        Self::Constant(value)
    }
}

/// A single value with optional units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub value: PointValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<ConceptRef>,
}

impl Point {
    pub fn new(value: impl Into<PointValue>) -> Self {
        Self {
            value: value.into(),
            units: None,
        }
    }

    pub fn with_units(mut self, units: ConceptRef) -> Self {
        self.units = Some(units);
        self
    }
}

/// A range with optional lower and upper limits.
///
/// A missing inclusivity flag means inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_inclusive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_inclusive: Option<bool>,
}

impl Bound {
    /// A bound between two limits.
    pub fn between(
        lower: Point,
        lower_inclusive: bool,
        upper: Point,
        upper_inclusive: bool,
    ) -> Self {
        Self {
            lower: Some(lower),
            lower_inclusive: Some(lower_inclusive),
            upper: Some(upper),
            upper_inclusive: Some(upper_inclusive),
        }
    }

    /// A bound with only a lower limit.
    pub fn at_least(lower: Point, inclusive: bool) -> Self {
        Self {
            lower: Some(lower),
            lower_inclusive: Some(inclusive),
            ..Default::default()
        }
    }

    /// A bound with only an upper limit.
    pub fn at_most(upper: Point, inclusive: bool) -> Self {
        Self {
            upper: Some(upper),
            upper_inclusive: Some(inclusive),
            ..Default::default()
        }
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inclusive.unwrap_or(true)
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inclusive.unwrap_or(true)
    }

    /// Points present in this bound, lower first.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.lower.iter().chain(self.upper.iter())
    }
}

/// An interval whose ends are themselves uncertain bounds:
/// `{[5] to (8)} <= X <= {(20) to [30]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Bound>,
}

impl Interval {
    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// A measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Point(Point),
    Bound(Bound),
    Interval(Interval),
}

impl Measurement {
    /// Every point in the measurement, including the inner limits of an interval.
    pub fn points(&self) -> Vec<&Point> {
        match self {
            Self::Point(p) => vec![p],
            Self::Bound(b) => b.points().collect(),
            Self::Interval(i) => i
                .lower
                .iter()
                .chain(i.upper.iter())
                .flat_map(|b| b.points())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusivity_defaults_to_inclusive() {
        let bound = Bound {
            lower: Some(Point::new(5)),
            upper: Some(Point::new(10)),
            ..Default::default()
        };
        assert!(bound.is_lower_inclusive());
        assert!(bound.is_upper_inclusive());
        assert!(!Bound::at_least(Point::new(5), false).is_lower_inclusive());
    }

    #[test]
    fn interval_points_include_inner_limits() {
        let interval = Interval::new(
            Bound::between(Point::new(5), true, Point::new(8), false),
            Bound::between(Point::new(20), false, Point::new(30), true),
        );
        assert_eq!(Measurement::Interval(interval).points().len(), 4);
    }

    #[test]
    fn point_values_deserialize_by_shape() {
        let int: Point = serde_json::from_str(r#"{ "value": 5 }"#).unwrap();
        let float: Point = serde_json::from_str(r#"{ "value": 5.5 }"#).unwrap();
        let constant: Point =
            serde_json::from_str(r#"{ "value": "START_ACTIVE_SERVICE" }"#).unwrap();
        assert_eq!(int.value, PointValue::Integer(5));
        assert_eq!(float.value, PointValue::Float(5.5));
        assert_eq!(
            constant.value,
            PointValue::Constant(MeasurementConstant::StartActiveService)
        );
    }

    #[test]
    fn constant_names() {
        assert_eq!(MeasurementConstant::Dob.name(), "DOB");
        assert_eq!(MeasurementConstant::EndActiveService.name(), "END_ACTIVE_SERVICE");
    }
}
