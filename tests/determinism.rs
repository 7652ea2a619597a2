//! Determinism tests: identities and axiom sets depend only on the structure
//! of the input, never on member order or on which run produced them.

use lego_classifier::batch::AxiomBatch;
use lego_classifier::compile::{CompileContext, ExpressionCompiler, coded_identity};
use lego_classifier::config::CompilerConfig;
use lego_classifier::lego::{
    Assertion, AssertionValue, Bound, ConceptRef, Expression, Interval, Lego, Measurement, Point,
    Relation, RelationGroup,
};

fn sct(code: u64) -> ConceptRef {
    ConceptRef::sctid(code)
}

fn rel(ty: u64, dest: u64) -> Relation {
    Relation::to_concept(sct(ty), sct(dest))
}

fn both(a: u64, b: u64) -> Expression {
    Expression::conjunction([Expression::concept(sct(a)), Expression::concept(sct(b))])
}

fn dose() -> Relation {
    Relation::to_measurement(
        sct(30),
        Measurement::Interval(Interval::new(
            Bound::between(Point::new(5), true, Point::new(8), false),
            Bound::between(Point::new(20.0), false, Point::new(30.0), true),
        )),
    )
}

/// The same expression written in two member orders.
fn permutations() -> (Expression, Expression) {
    let forward = both(1, 2)
        .with_relation(rel(10, 100))
        .with_relation(dose())
        .with_group(RelationGroup::new(vec![rel(11, 101), rel(12, 102)]))
        .with_group(RelationGroup::new(vec![rel(13, 103)]));
    let backward = both(2, 1)
        .with_group(RelationGroup::new(vec![rel(13, 103)]))
        .with_group(RelationGroup::new(vec![rel(12, 102), rel(11, 101)]))
        .with_relation(dose())
        .with_relation(rel(10, 100));
    (forward, backward)
}

#[test]
fn coded_identity_matches_terminology_uuid() {
    assert_eq!(
        coded_identity("org.snomed.", 138875005),
        "ee9ac5d2-a07c-3981-a57a-f7f26baf38d8"
    );
    assert_eq!(
        coded_identity("org.snomed.", 22298006),
        "955e4689-f42f-3387-93b5-883246d1380f"
    );
}

#[test]
fn permuted_expressions_share_identity_and_axioms() {
    let (forward, backward) = permutations();
    let compiler = ExpressionCompiler::default();

    let mut a = CompileContext::new();
    let mut b = CompileContext::new();
    let named_a = compiler.compile_top_level(&forward, &mut a).unwrap();
    let named_b = compiler.compile_top_level(&backward, &mut b).unwrap();

    assert!(named_a.name.is_some());
    assert_eq!(named_a, named_b);
    assert_eq!(a.axioms(), b.axioms());
    assert_eq!(a.registry(), b.registry());
}

#[test]
fn repeated_runs_are_identical() {
    let (forward, _) = permutations();
    let lego = Lego::new(
        "repeat",
        vec![Assertion::new(
            Expression::concept(sct(1)),
            AssertionValue::Expression(forward),
        )],
    );
    let run = || {
        let mut batch = AxiomBatch::new(CompilerConfig::default()).unwrap();
        let compiled = batch.compile_lego(&lego).unwrap();
        (compiled, batch.axioms().clone(), batch.registry().clone())
    };
    assert_eq!(run(), run());
}

#[test]
fn different_structure_gets_a_different_identity() {
    let (forward, _) = permutations();
    let regrouped = both(1, 2)
        .with_relation(rel(10, 100))
        .with_relation(dose())
        .with_group(RelationGroup::new(vec![rel(11, 101)]))
        .with_group(RelationGroup::new(vec![rel(12, 102), rel(13, 103)]));
    let compiler = ExpressionCompiler::default();
    let a = compiler.compile_top_level(&forward, &mut CompileContext::new()).unwrap();
    let b = compiler.compile_top_level(&regrouped, &mut CompileContext::new()).unwrap();
    assert_ne!(a.name, b.name);
}

#[test]
fn namespace_changes_coded_identities() {
    let config = CompilerConfig {
        snomed_namespace: "org.example.".into(),
        ..Default::default()
    };
    let compiler = ExpressionCompiler::new(config);
    let compiled = compiler
        .compile_top_level(&Expression::concept(sct(22298006)), &mut CompileContext::new())
        .unwrap();
    assert_eq!(compiled.identity(), Some(coded_identity("org.example.", 22298006)));
}
