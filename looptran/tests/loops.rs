extern crate looptran;

use looptran::family;
use looptran::ir;
use looptran::ir::same_node;
use looptran::loops;
use looptran::loops::Eligibility;
use looptran::loops::IneligibleReason;
use looptran::predicates;
use looptran::shared::Shared;
use looptran::shared::SharedExt;
use looptran::tester;

fn outer_loop(root: &Shared<ir::Node>) -> Shared<ir::Node> {
    family::descendants(root, predicates::is_loop, false)[0].clone()
}

#[test]
fn single_loop_classification() {
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    assert!(loops::is_outer_loop(&outer).unwrap());
    assert_eq!(loops::nest_depth(&outer).unwrap(), 1);
    assert!(loops::is_perfectly_nested(&outer).unwrap());
    assert!(loops::is_simple_loop(&outer).unwrap());
    assert!(loops::is_independent(&outer).unwrap());
}

#[test]
fn double_loop_classification() {
    let root = tester::double_loop();
    let outer = outer_loop(&root);
    assert_eq!(loops::nest_depth(&outer).unwrap(), 2);
    assert!(loops::is_perfectly_nested(&outer).unwrap());
    assert!(loops::is_independent(&outer).unwrap());
    assert_eq!(
        loops::loop_variable_names(&outer).unwrap(),
        vec!["j".to_string(), "i".to_string()]
    );
    assert_eq!(
        loops::collapse_eligibility(&outer, 2).unwrap(),
        Eligibility::Eligible
    );
    assert_eq!(
        loops::collapse_eligibility(&outer, 3).unwrap(),
        Eligibility::Ineligible(IneligibleReason::InsufficientDepth)
    );
}

#[test]
fn inner_loop_is_not_outer() {
    let root = tester::double_loop();
    let inner = family::descendants(&root, predicates::is_loop, false)[1].clone();
    assert!(!loops::is_outer_loop(&inner).unwrap());
    assert_eq!(loops::nest_depth(&inner).unwrap(), 1);
}

#[test]
fn imperfect_nest_is_reported_as_such() {
    let root = tester::imperfect_loop();
    let outer = outer_loop(&root);
    assert!(!loops::is_perfectly_nested(&outer).unwrap());
    assert_eq!(loops::nest_depth(&outer).unwrap(), 1);
    assert_eq!(
        loops::collapse_eligibility(&outer, 2).unwrap(),
        Eligibility::Ineligible(IneligibleReason::NonPerfectNest)
    );
}

#[test]
fn triangular_nest_has_dependent_bounds() {
    let root = tester::triangular_loop();
    let outer = outer_loop(&root);
    assert!(loops::is_perfectly_nested(&outer).unwrap());
    assert!(!loops::is_independent(&outer).unwrap());
    assert_eq!(
        loops::collapse_eligibility(&outer, 2).unwrap(),
        Eligibility::Ineligible(IneligibleReason::DependentBounds)
    );
}

#[test]
fn classification_is_idempotent() {
    let root = tester::triple_loop();
    let outer = outer_loop(&root);
    let first = loops::collapse_eligibility(&outer, 3).unwrap();
    let second = loops::collapse_eligibility(&outer, 3).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        loops::nest_depth(&outer).unwrap(),
        loops::nest_depth(&outer).unwrap()
    );
}

#[test]
fn triple_loop_accepts_any_depth_up_to_three() {
    let root = tester::triple_loop();
    let outer = outer_loop(&root);
    for depth in 2..=3 {
        assert_eq!(
            loops::collapse_eligibility(&outer, depth).unwrap(),
            Eligibility::Eligible
        );
    }
    assert!(!loops::collapse_eligibility(&outer, 4).unwrap().is_eligible());
}

#[test]
fn non_literal_body_is_not_simple() {
    let body = ir::assignment(
        ir::array_reference("a", vec![ir::reference("i")]),
        ir::reference("b"),
    );
    let root = ir::schedule(vec![ir::do_loop(
        "i",
        ir::literal("1"),
        ir::reference("n"),
        ir::literal("1"),
        vec![body],
    )]);
    let outer = outer_loop(&root);
    assert!(loops::is_perfectly_nested(&outer).unwrap());
    assert!(!loops::is_simple_loop(&outer).unwrap());
}

#[test]
fn perfectly_nested_heads() {
    let root = tester::imperfect_loop();
    let heads = loops::perfectly_nested_loops(&root).unwrap();
    // The outer loop is imperfect; only the inner loop heads a perfect
    // structure.
    assert_eq!(heads.len(), 1);
    assert_eq!(heads[0].rd().loop_variable().as_deref(), Some("i"));

    let root = tester::triple_loop();
    let heads = loops::perfectly_nested_loops(&root).unwrap();
    assert_eq!(heads.len(), 1);
    assert!(same_node(&heads[0], &outer_loop(&root)));
}

#[test]
fn nest_to_loop_validates_membership() {
    let root = tester::double_loop();
    let members = family::descendants(&root, predicates::is_loop, false);
    let outer = loops::nest_to_loop(&members).unwrap();
    assert!(same_node(&outer, &members[0]));

    let reversed = vec![members[1].clone(), members[0].clone()];
    assert!(loops::nest_to_loop(&reversed).is_err());
}

#[test]
fn non_loop_arguments_are_usage_errors() {
    let assignment = ir::assignment(ir::reference("a"), ir::literal("0.0"));
    let error = loops::nest_depth(&assignment).unwrap_err();
    assert!(error.to_string().contains("Expected a Loop"));
}
