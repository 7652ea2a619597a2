//! Structural subsumption over the EL fragment with datatype restrictions.
//!
//! Each axiom with an atomic left-hand side contributes told conjuncts to
//! that name; every other axiom is a general inclusion applied whenever its
//! left-hand side is entailed. A name's closure is the fixpoint of both, and
//! `A ⊑ B` holds when `B` appears in the closure of `A`. Existentials are
//! compared role by role with subsumption between fillers, and datatype
//! restrictions by operator entailment (`f = 3` entails `f >= 2`).
//!
//! This is enough to classify what the compiler emits. It is not a complete
//! EL reasoner: cyclic definitions are cut off rather than fully saturated.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::dl::{Axiom, AxiomSet, Concept, Literal, Operator};
use crate::error::ReasonerError;

use super::Reasoner;
use super::taxonomy::Taxonomy;

/// Nesting limit for filler comparisons.
const MAX_DEPTH: usize = 32;

/// In-process classifier. Cumulative: each `classify` call adds to the axioms
/// already held and rebuilds the taxonomy.
#[derive(Debug, Default)]
pub struct StructuralReasoner {
    axioms: AxiomSet,
    signature: BTreeSet<String>,
    taxonomy: Taxonomy,
}

impl StructuralReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every axiom classified so far.
    pub fn axioms(&self) -> &AxiomSet {
        &self.axioms
    }
}

impl Reasoner for StructuralReasoner {
    fn declare(&mut self, identities: &BTreeSet<String>) -> Result<(), ReasonerError> {
        self.signature.extend(identities.iter().cloned());
        Ok(())
    }

    fn classify(&mut self, axioms: &AxiomSet) -> Result<(), ReasonerError> {
        for axiom in axioms {
            if let Some(message) = unsupported(axiom) {
                return Err(ReasonerError::Classification { message });
            }
        }
        self.axioms.merge(axioms.clone());

        let kb = KnowledgeBase::new(&self.axioms, &self.signature);
        self.taxonomy = kb.taxonomy();
        tracing::debug!(
            axioms = self.axioms.len(),
            names = kb.names.len(),
            nodes = self.taxonomy.len(),
            "structural classification complete"
        );
        Ok(())
    }

    fn classified_ontology(&self) -> &Taxonomy {
        &self.taxonomy
    }
}

/// Reject inclusions with nothing on the left: `⊤ ⊑ C` would make every name
/// a subsumee of `C`, which this engine does not model.
fn unsupported(axiom: &Axiom) -> Option<String> {
    match axiom.lhs() {
        Concept::Conjunction(members) if members.is_empty() => {
            Some(format!("top-level inclusion {axiom} is not supported"))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

struct KnowledgeBase {
    names: BTreeSet<String>,
    told: HashMap<String, Vec<Concept>>,
    general: Vec<(Concept, Concept)>,
}

impl KnowledgeBase {
    fn new(axioms: &AxiomSet, signature: &BTreeSet<String>) -> Self {
        let mut names = signature.clone();
        let mut told: HashMap<String, Vec<Concept>> = HashMap::new();
        let mut general = Vec::new();
        for axiom in axioms {
            let (lhs, rhs) = (axiom.lhs(), axiom.rhs());
            lhs.for_each_atomic(&mut |id| {
                names.insert(id.to_string());
            });
            rhs.for_each_atomic(&mut |id| {
                names.insert(id.to_string());
            });
            match lhs.as_atomic() {
                Some(name) => told.entry(name.to_string()).or_default().push(rhs.clone()),
                None => general.push((lhs.clone(), rhs.clone())),
            }
        }
        Self {
            names,
            told,
            general,
        }
    }

    fn taxonomy(&self) -> Taxonomy {
        let mut closures = Closures::new(self);
        let supers: BTreeMap<&str, BTreeSet<String>> = self
            .names
            .iter()
            .map(|name| {
                let closure = closures.atomic(name, 0);
                let named = closure
                    .iter()
                    .filter_map(Concept::as_atomic)
                    .map(str::to_string)
                    .collect();
                (name.as_str(), named)
            })
            .collect();
        let subsumed_by = |sub: &str, sup: &str| supers.get(sub).is_some_and(|s| s.contains(sup));

        // Equivalence classes by mutual subsumption.
        let mut class_of: HashMap<&str, usize> = HashMap::new();
        let mut classes: Vec<BTreeSet<String>> = Vec::new();
        for name in &self.names {
            if class_of.contains_key(name.as_str()) {
                continue;
            }
            let members: BTreeSet<String> = supers[name.as_str()]
                .iter()
                .filter(|other| subsumed_by(other.as_str(), name.as_str()))
                .cloned()
                .chain(std::iter::once(name.clone()))
                .collect();
            for member in &members {
                if let Some(member) = self.names.get(member) {
                    class_of.insert(member.as_str(), classes.len());
                }
            }
            classes.push(members);
        }

        let mut taxonomy = Taxonomy::new();
        let nodes: Vec<_> = classes.iter().map(|c| taxonomy.add_class(c.clone())).collect();

        for (index, members) in classes.iter().enumerate() {
            let Some(rep) = members.first() else { continue };
            let strict: BTreeSet<usize> = supers[rep.as_str()]
                .iter()
                .filter_map(|s| class_of.get(s.as_str()).copied())
                .filter(|&c| c != index)
                .collect();
            for &parent in &strict {
                let has_closer = strict.iter().any(|&other| {
                    other != parent
                        && classes[other]
                            .first()
                            .zip(classes[parent].first())
                            .is_some_and(|(o, p)| subsumed_by(o.as_str(), p.as_str()))
                });
                if !has_closer {
                    taxonomy.add_parent(nodes[index], nodes[parent]);
                }
            }
        }
        taxonomy
    }
}

// ---------------------------------------------------------------------------
// Closure computation
// ---------------------------------------------------------------------------

struct Closures<'k> {
    kb: &'k KnowledgeBase,
    cache: HashMap<String, BTreeSet<Concept>>,
    in_progress: HashSet<String>,
}

impl<'k> Closures<'k> {
    fn new(kb: &'k KnowledgeBase) -> Self {
        Self {
            kb,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Closure of a single name. Only results computed outside any other
    /// closure are cached, since nested ones may have been cut short.
    fn atomic(&mut self, name: &str, depth: usize) -> BTreeSet<Concept> {
        if let Some(cached) = self.cache.get(name) {
            return cached.clone();
        }
        let start = [Concept::atomic(name)];
        if !self.in_progress.insert(name.to_string()) {
            return start.into_iter().collect();
        }
        let closure = self.closure(&start, depth);
        self.in_progress.remove(name);
        if depth == 0 {
            self.cache.insert(name.to_string(), closure.clone());
        }
        closure
    }

    /// Every conjunct entailed by the conjunction of `start`.
    fn closure(&mut self, start: &[Concept], depth: usize) -> BTreeSet<Concept> {
        let kb = self.kb;
        let mut set = BTreeSet::new();
        let mut queue: Vec<Concept> = start.to_vec();
        loop {
            let before = set.len();
            while let Some(concept) = queue.pop() {
                if let Concept::Conjunction(members) = concept {
                    queue.extend(members);
                    continue;
                }
                if !set.insert(concept.clone()) {
                    continue;
                }
                if let Concept::Atomic(name) = &concept {
                    for rhs in kb.told.get(name).into_iter().flatten() {
                        queue.extend(rhs.conjuncts().iter().cloned());
                    }
                }
            }
            if depth >= MAX_DEPTH || (before > 0 && set.len() == before) {
                break;
            }
            for (lhs, rhs) in &kb.general {
                if rhs.conjuncts().iter().all(|c| set.contains(c)) {
                    continue;
                }
                if self.entails(&set, lhs, depth + 1) {
                    queue.extend(rhs.conjuncts().iter().cloned());
                }
            }
            if queue.is_empty() {
                break;
            }
        }
        set
    }

    /// Whether the conjuncts in `set` entail `concept`.
    fn entails(&mut self, set: &BTreeSet<Concept>, concept: &Concept, depth: usize) -> bool {
        match concept {
            Concept::Atomic(_) => set.contains(concept),
            Concept::Conjunction(members) => members.iter().all(|m| self.entails(set, m, depth)),
            Concept::Existential { role, filler } => set.iter().any(|have| match have {
                Concept::Existential {
                    role: have_role,
                    filler: have_filler,
                } if have_role == role => self.subsumed(have_filler, filler, depth),
                _ => false,
            }),
            Concept::Datatype {
                feature,
                operator,
                literal,
            } => set.iter().any(|have| match have {
                Concept::Datatype {
                    feature: have_feature,
                    operator: have_operator,
                    literal: have_literal,
                } if have_feature == feature => {
                    literal_entails(*have_operator, have_literal, *operator, literal)
                }
                _ => false,
            }),
        }
    }

    /// Whether `sub ⊑ sup`.
    fn subsumed(&mut self, sub: &Concept, sup: &Concept, depth: usize) -> bool {
        if sub == sup {
            return true;
        }
        if depth >= MAX_DEPTH {
            return false;
        }
        let closure = match sub {
            Concept::Atomic(name) => self.atomic(name, depth + 1),
            other => self.closure(other.conjuncts(), depth + 1),
        };
        self.entails(&closure, sup, depth + 1)
    }
}

/// Whether `feature have_op have` entails `feature want_op want`.
pub fn literal_entails(
    have_op: Operator,
    have: &Literal,
    want_op: Operator,
    want: &Literal,
) -> bool {
    use Operator::*;

    let numbers = have.as_f64().zip(want.as_f64());
    if want_op == Equals {
        return have_op == Equals && (have == want || numbers.is_some_and(|(h, w)| h == w));
    }
    let Some((h, w)) = numbers else {
        return false;
    };
    match (want_op, have_op) {
        (GreaterThanEquals, Equals | GreaterThanEquals | GreaterThan) => h >= w,
        (GreaterThan, Equals | GreaterThanEquals) => h > w,
        (GreaterThan, GreaterThan) => h >= w,
        (LessThanEquals, Equals | LessThanEquals | LessThan) => h <= w,
        (LessThan, Equals | LessThanEquals) => h < w,
        (LessThan, LessThan) => h <= w,
        _ => false,
    }
}
