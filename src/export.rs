//! Export types for serializing classification results.
//!
//! These types provide flat, identity-resolved representations of taxonomy
//! nodes and compilation failures suitable for JSON export.

use serde::{Deserialize, Serialize};

use crate::reasoner::Node;

/// Exported taxonomy node for one compiled identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExport {
    /// The identity that was looked up.
    pub identity: String,
    /// Human-readable description, when the source document gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// All identities equivalent to this one, including itself.
    pub equivalents: Vec<String>,
    /// Labels of the direct parents.
    pub parents: Vec<String>,
    /// Labels of the direct children.
    pub children: Vec<String>,
}

impl NodeExport {
    pub fn from_node(
        identity: impl Into<String>,
        description: Option<String>,
        node: &Node<'_>,
    ) -> Self {
        Self {
            identity: identity.into(),
            description,
            equivalents: node.equivalent_concepts().iter().cloned().collect(),
            parents: node.parents().iter().map(|p| p.label().to_string()).collect(),
            children: node.children().iter().map(|c| c.label().to_string()).collect(),
        }
    }
}

/// Exported record of an assertion that failed to compile and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureExport {
    /// Label of the lego holding the assertion.
    pub lego: String,
    /// Document identifier of the assertion, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<String>,
    /// Position of the assertion within its lego.
    pub index: usize,
    /// Diagnostic code of the failure.
    pub code: String,
    /// Failure message.
    pub message: String,
}

/// Exported summary of one submitted batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Number of axioms submitted.
    pub axiom_count: usize,
    /// Nodes for every concept identity compiled in the batch.
    pub nodes: Vec<NodeExport>,
    /// Concept identities the engine returned no node for.
    pub missing: Vec<String>,
    /// Assertions skipped during compilation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureExport>,
}

impl ClassificationReport {
    /// The exported node for `identity`, if it was classified.
    pub fn node(&self, identity: &str) -> Option<&NodeExport> {
        self.nodes.iter().find(|n| n.identity == identity)
    }
}
