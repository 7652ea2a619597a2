//! Classified taxonomy: equivalence classes of concept identities linked to
//! their most specific subsumers.
//!
//! Stored as a petgraph `DiGraph` with one node per equivalence class and an
//! edge from each class to each of its direct parents.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

/// The result of classification.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    graph: DiGraph<BTreeSet<String>, ()>,
    index: HashMap<String, NodeIndex>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equivalence class. Every member maps to the new node.
    pub(crate) fn add_class(&mut self, equivalents: BTreeSet<String>) -> NodeIndex {
        let members: Vec<String> = equivalents.iter().cloned().collect();
        let idx = self.graph.add_node(equivalents);
        for member in members {
            self.index.insert(member, idx);
        }
        idx
    }

    /// Record that `parent` directly subsumes `child`.
    pub(crate) fn add_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        self.graph.update_edge(child, parent, ());
    }

    /// The node holding `identity`, if it was classified.
    pub fn node(&self, identity: &str) -> Option<Node<'_>> {
        self.index.get(identity).map(|&index| Node {
            taxonomy: self,
            index,
        })
    }

    /// Whether `sup` subsumes `sub`, directly or transitively. Equivalent
    /// identities subsume each other.
    pub fn subsumes(&self, sup: &str, sub: &str) -> bool {
        match (self.index.get(sup), self.index.get(sub)) {
            (Some(&sup), Some(&sub)) => has_path_connecting(&self.graph, sub, sup, None),
            _ => false,
        }
    }

    /// Number of equivalence classes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// One equivalence class in a [`Taxonomy`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    taxonomy: &'a Taxonomy,
    index: NodeIndex,
}

impl<'a> Node<'a> {
    /// The identities in this class.
    pub fn equivalent_concepts(&self) -> &'a BTreeSet<String> {
        &self.taxonomy.graph[self.index]
    }

    /// A stable label: the smallest identity in the class.
    pub fn label(&self) -> &'a str {
        self.equivalent_concepts()
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Direct subsumers, ordered by label.
    pub fn parents(&self) -> Vec<Node<'a>> {
        self.neighbors(Direction::Outgoing)
    }

    /// Direct subsumees, ordered by label.
    pub fn children(&self) -> Vec<Node<'a>> {
        self.neighbors(Direction::Incoming)
    }

    fn neighbors(&self, direction: Direction) -> Vec<Node<'a>> {
        let mut nodes: Vec<Node<'a>> = self
            .taxonomy
            .graph
            .neighbors_directed(self.index, direction)
            .map(|index| Node {
                taxonomy: self.taxonomy,
                index,
            })
            .collect();
        nodes.sort_by(|a, b| a.label().cmp(b.label()));
        nodes
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.taxonomy, other.taxonomy) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("equivalents", self.equivalent_concepts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parents_children_and_transitive_subsumption() {
        let mut taxonomy = Taxonomy::new();
        let animal = taxonomy.add_class(class(&["animal"]));
        let dog = taxonomy.add_class(class(&["dog", "canine"]));
        let puppy = taxonomy.add_class(class(&["puppy"]));
        taxonomy.add_parent(dog, animal);
        taxonomy.add_parent(puppy, dog);

        let node = taxonomy.node("dog").unwrap();
        assert_eq!(node, taxonomy.node("canine").unwrap());
        assert_eq!(node.label(), "canine");
        assert_eq!(node.parents(), vec![taxonomy.node("animal").unwrap()]);
        assert_eq!(node.children(), vec![taxonomy.node("puppy").unwrap()]);

        assert!(taxonomy.subsumes("animal", "puppy"));
        assert!(taxonomy.subsumes("dog", "canine"));
        assert!(!taxonomy.subsumes("puppy", "animal"));
        assert!(!taxonomy.subsumes("animal", "cat"));
        assert_eq!(taxonomy.len(), 3);
    }

    #[test]
    fn unknown_identity_has_no_node() {
        assert!(Taxonomy::new().node("missing").is_none());
    }
}
