//! Focus expressions, relations, and relation groups.

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

use super::measurement::Measurement;

/// A reference to an atomic concept in the source document.
///
/// A reference is identified either by an explicit opaque `uuid` or by a
/// coded terminology identifier (`sctid`); the description is for humans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sctid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl ConceptRef {
    /// Reference a concept by its terminology code.
    pub fn sctid(code: u64) -> Self {
        Self {
            sctid: Some(code),
            ..Default::default()
        }
    }

    /// Reference a concept by an opaque identifier.
    pub fn uuid(id: impl Into<String>) -> Self {
        Self {
            uuid: Some(id.into()),
            ..Default::default()
        }
    }

    /// Attach a human-readable description.
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Description for diagnostics, falling back to whatever identifier exists.
    pub fn description(&self) -> String {
        if let Some(desc) = &self.desc {
            return desc.clone();
        }
        match (&self.uuid, self.sctid) {
            (Some(uuid), _) if !uuid.is_empty() => uuid.clone(),
            (_, Some(code)) => code.to_string(),
            _ => "<unidentified concept>".into(),
        }
    }
}

/// Where a relation points.
///
/// The kind of destination decides whether the relation type acts as a role
/// (expression) or as a feature (measurement, text, boolean).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Expression(Expression),
    Measurement(Measurement),
    Text(String),
    Boolean(bool),
}

/// A typed edge from a focus expression to a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub relation_type: ConceptRef,
    pub destination: Destination,
}

impl Relation {
    pub fn new(relation_type: ConceptRef, destination: Destination) -> Self {
        Self {
            relation_type,
            destination,
        }
    }

    /// Relation to a bare concept.
    pub fn to_concept(relation_type: ConceptRef, concept: ConceptRef) -> Self {
        Self::new(relation_type, Destination::Expression(Expression::concept(concept)))
    }

    /// Relation to a nested expression.
    pub fn to_expression(relation_type: ConceptRef, expression: Expression) -> Self {
        Self::new(relation_type, Destination::Expression(expression))
    }

    /// Relation to a measurement.
    pub fn to_measurement(relation_type: ConceptRef, measurement: Measurement) -> Self {
        Self::new(relation_type, Destination::Measurement(measurement))
    }
}

/// Relations that must be satisfied by the same related individual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationGroup {
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl RelationGroup {
    pub fn new(relations: Vec<Relation>) -> Self {
        Self { relations }
    }
}

/// A focus expression node.
///
/// Carries exactly one of a focus concept or a non-empty list of child
/// expressions, plus any ungrouped relations and relation groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<ConceptRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relation_groups: Vec<RelationGroup>,
}

/// The resolved focus of an [`Expression`].
#[derive(Debug, Clone, Copy)]
pub enum Focus<'a> {
    Concept(&'a ConceptRef),
    Conjunction(&'a [Expression]),
}

impl Expression {
    /// An expression focused on a single concept.
    pub fn concept(concept: ConceptRef) -> Self {
        Self {
            concept: Some(concept),
            ..Default::default()
        }
    }

    /// An expression whose focus is the conjunction of its children.
    pub fn conjunction(children: impl IntoIterator<Item = Expression>) -> Self {
        Self {
            expressions: children.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Add an ungrouped relation.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Add a relation group.
    pub fn with_group(mut self, group: RelationGroup) -> Self {
        self.relation_groups.push(group);
        self
    }

    /// The focus of this node, or `MalformedExpression` when the node has
    /// neither (or both) a concept and child expressions.
    pub fn focus(&self) -> CompileResult<Focus<'_>> {
        match (&self.concept, self.expressions.is_empty()) {
            (Some(concept), true) => Ok(Focus::Concept(concept)),
            (None, false) => Ok(Focus::Conjunction(&self.expressions)),
            (None, true) => Err(CompileError::MalformedExpression {
                reason: "expression has neither a focus concept nor child expressions".into(),
            }),
            (Some(concept), false) => Err(CompileError::MalformedExpression {
                reason: format!(
                    "expression has both focus concept \"{}\" and {} child expressions",
                    concept.description(),
                    self.expressions.len()
                ),
            }),
        }
    }
}
