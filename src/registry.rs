//! Identifier registry: identity → originating logical form.
//!
//! Every identity the compiler produces is recorded here together with what
//! produced it, so classification results can be traced back to the concepts
//! and expressions they came from. The registry is owned by one compilation
//! pass; workers compile into their own registry and are merged afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dl::Concept;

/// What an identity was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Origin {
    /// An atomic concept from the source document.
    Concept { description: Option<String> },
    /// A relation type used as a role.
    Role,
    /// A relation type used as a feature.
    Feature,
    /// A named composite expression.
    Composite { encoding: String, concept: Concept },
}

impl Origin {
    /// Whether the identity names a concept, and so should have a taxonomy
    /// node after classification.
    pub fn is_concept(&self) -> bool {
        matches!(self, Self::Concept { .. } | Self::Composite { .. })
    }
}

/// Ordered mapping from identity to [`Origin`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRegistry {
    entries: BTreeMap<String, Origin>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity. The first origin recorded for an identity wins,
    /// except that a concept origin replaces a role or feature origin.
    pub fn register(&mut self, identity: impl Into<String>, origin: Origin) {
        let identity = identity.into();
        match self.entries.get(&identity) {
            Some(existing) if existing.is_concept() || !origin.is_concept() => {}
            _ => {
                self.entries.insert(identity, origin);
            }
        }
    }

    pub fn get(&self, identity: &str) -> Option<&Origin> {
        self.entries.get(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Origin)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Identities that name concepts.
    pub fn concept_identities(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, origin)| origin.is_concept())
            .map(|(id, _)| id)
    }

    /// Identities of named composite expressions.
    pub fn composite_identities(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, origin)| matches!(origin, Origin::Composite { .. }))
            .map(|(id, _)| id)
    }

    /// Fold another registry into this one.
    pub fn merge(&mut self, other: IdentifierRegistry) {
        for (identity, origin) in other.entries {
            self.register(identity, origin);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
