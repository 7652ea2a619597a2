//! Source document model: legos, assertions, expressions, and measurements.
//!
//! These types mirror the parsed Lego document tree. They are read-only input
//! to the compiler: a compilation pass never mutates them. Validation of the
//! document against its schema happens before this layer; what remains here
//! are the structural checks the compiler needs (see [`crate::error::CompileError`]).

pub mod expression;
pub mod measurement;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

pub use expression::{ConceptRef, Destination, Expression, Focus, Relation, RelationGroup};
pub use measurement::{Bound, Interval, Measurement, MeasurementConstant, Point, PointValue};

/// The value slot of an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionValue {
    /// A focus expression, compiled and named like the discernible.
    Expression(Expression),
    /// A bare measurement, validated but not classified.
    Measurement(Measurement),
    /// Free text, not classified.
    Text(String),
    /// A boolean, not classified.
    Boolean(bool),
}

/// One clinical statement: discernible, qualifier, value, and optional timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Document-assigned identifier, used only for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// What is being observed.
    pub discernible: Expression,
    /// How the observation is qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Expression>,
    /// The observed value. `None` is rejected with `MissingValue`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AssertionValue>,
    /// When the observation holds. Never participates in subsumption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Measurement>,
}

impl Assertion {
    /// Create an assertion with an expression-valued value and no qualifier.
    pub fn new(discernible: Expression, value: AssertionValue) -> Self {
        Self {
            id: None,
            discernible,
            qualifier: None,
            value: Some(value),
            timing: None,
        }
    }

    /// Attach a document identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a qualifier expression.
    pub fn with_qualifier(mut self, qualifier: Expression) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    /// Attach a timing measurement.
    pub fn with_timing(mut self, timing: Measurement) -> Self {
        self.timing = Some(timing);
        self
    }
}

/// A Lego: a set of assertions authored together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lego {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl Lego {
    pub fn new(id: impl Into<String>, assertions: Vec<Assertion>) -> Self {
        Self {
            id: Some(id.into()),
            assertions,
        }
    }

    /// Label used in logs and diagnostics.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unnamed>")
    }
}

/// A document holding any number of legos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegoList {
    #[serde(default)]
    pub legos: Vec<Lego>,
}

impl LegoList {
    /// Parse a lego list from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::Parse {
            message: e.to_string(),
        })
    }

    /// Read and parse a lego list from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Total number of assertions across all legos.
    pub fn assertion_count(&self) -> usize {
        self.legos.iter().map(|l| l.assertions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "legos": [{
            "id": "pressure-ulcer",
            "assertions": [{
                "discernible": { "concept": { "sctid": 420324007, "desc": "Pressure ulcer" } },
                "qualifier": { "concept": { "uuid": "d7c2a9a4-0000-3000-8000-000000000001" } },
                "value": {
                    "expression": {
                        "concept": { "sctid": 24484000, "desc": "Severe" },
                        "relations": [{
                            "type": { "sctid": 363698007 },
                            "destination": { "expression": { "concept": { "sctid": 29445007 } } }
                        }]
                    }
                },
                "timing": { "point": { "value": 3 } }
            }]
        }]
    }"#;

    #[test]
    fn parses_json_document() {
        let list = LegoList::from_json_str(DOCUMENT).unwrap();
        assert_eq!(list.legos.len(), 1);
        assert_eq!(list.assertion_count(), 1);
        let assertion = &list.legos[0].assertions[0];
        assert_eq!(
            assertion.discernible.concept.as_ref().and_then(|c| c.sctid),
            Some(420324007)
        );
        match assertion.value.as_ref() {
            Some(AssertionValue::Expression(e)) => assert_eq!(e.relations.len(), 1),
            other => panic!("unexpected value: {other:?}"),
        }
        assert!(matches!(assertion.timing, Some(Measurement::Point(_))));
    }

    #[test]
    fn missing_value_parses_as_none() {
        let json = r#"{ "legos": [{ "assertions": [
            { "discernible": { "concept": { "sctid": 1 } } }
        ] }] }"#;
        let list = LegoList::from_json_str(json).unwrap();
        assert!(list.legos[0].assertions[0].value.is_none());
        assert_eq!(list.legos[0].label(), "<unnamed>");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LegoList::from_json_str("{ \"legos\": [").unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn reads_document_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("legos.json");
        std::fs::write(&path, DOCUMENT).unwrap();
        let list = LegoList::from_path(&path).unwrap();
        assert_eq!(list.legos[0].label(), "pressure-ulcer");

        let missing = LegoList::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, DocumentError::Io { .. }));
    }
}
