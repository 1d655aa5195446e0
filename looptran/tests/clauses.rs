extern crate looptran;

use indoc::indoc;
use looptran::clauses;
use looptran::directives;
use looptran::family;
use looptran::ir::Clause;
use looptran::ir::DirectiveKind;
use looptran::ir::Node;
use looptran::predicates;
use looptran::shared::Shared;
use looptran::shared::SharedExt;
use looptran::tester;
use looptran::tester::Tester;
use std::panic::Location;

fn nest_loops(root: &Shared<Node>) -> Vec<Shared<Node>> {
    family::descendants(root, predicates::is_loop, false)
}

#[test]
fn collapse_requires_a_kernels_region() {
    let root = tester::double_loop();
    let outer = nest_loops(&root)[0].clone();
    let error = clauses::apply_loop_collapse(&outer, 2).unwrap_err();
    assert!(error.to_string().contains("kernels"));
}

#[test]
fn collapse_reaches_every_collapsed_level() {
    Tester::init_tracing();
    let root = tester::double_loop();
    let loops = nest_loops(&root);
    let outer = loops[0].clone();
    let inner = loops[1].clone();

    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    clauses::apply_loop_collapse(&outer, 2).unwrap();

    assert!(clauses::has_collapse_clause(&outer).unwrap());
    assert!(clauses::has_collapse_clause(&inner).unwrap());
    let expected = indoc! {"
    !$acc kernels
    !$acc loop collapse(2)
    DO j = 1, n, 1
      DO i = 1, n, 1
        arr(i, j) = 0.0
      END DO
    END DO
    !$acc end kernels
    "};
    Tester::check_lines_exact(&root, expected, Location::caller());
}

#[test]
fn collapse_stops_short_of_uncollapsed_levels() {
    let root = tester::triple_loop();
    let loops = nest_loops(&root);
    let outer = loops[0].clone();
    let middle = loops[1].clone();
    let innermost = loops[2].clone();

    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    clauses::apply_loop_collapse(&outer, 2).unwrap();

    assert!(clauses::has_collapse_clause(&outer).unwrap());
    assert!(clauses::has_collapse_clause(&middle).unwrap());
    assert!(!clauses::has_collapse_clause(&innermost).unwrap());
}

#[test]
fn collapse_replaces_the_clause_on_an_annotated_loop() {
    let root = tester::triple_loop();
    let outer = nest_loops(&root)[0].clone();
    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    directives::apply_loop_directive(&outer, DirectiveKind::AccLoop, &[Clause::Collapse(2)])
        .unwrap();

    clauses::apply_loop_collapse(&outer, 3).unwrap();

    let directive = directives::loop_directive(&outer).unwrap();
    let collapse = directive.rd().directive().unwrap().collapse();
    assert_eq!(collapse, Some(3));
    // Replaced, not duplicated.
    Tester::check_lines_contain(&root, "!$acc loop collapse(3)", Location::caller());
}

#[test]
fn seq_gang_vector_queries() {
    let root = tester::single_loop();
    let outer = nest_loops(&root)[0].clone();
    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    directives::apply_loop_directive(
        &outer,
        DirectiveKind::AccLoop,
        &[Clause::Gang, Clause::Vector],
    )
    .unwrap();

    assert!(clauses::has_gang_clause(&outer).unwrap());
    assert!(clauses::has_vector_clause(&outer).unwrap());
    assert!(!clauses::has_seq_clause(&outer).unwrap());
}

#[test]
fn collapse_of_one_is_rejected() {
    let root = tester::double_loop();
    let outer = nest_loops(&root)[0].clone();
    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    let error = clauses::apply_loop_collapse(&outer, 1).unwrap_err();
    assert!(error.to_string().contains("at least two"));
}

#[test]
fn clause_must_suit_the_directive_kind() {
    let root = tester::single_loop();
    let outer = nest_loops(&root)[0].clone();
    let error =
        directives::apply_loop_directive(&outer, DirectiveKind::OmpDo, &[Clause::Gang])
            .unwrap_err();
    assert!(error.to_string().contains("does not accept"));
}

#[test]
fn unannotated_loops_carry_no_clauses() {
    let root = tester::single_loop();
    let outer = nest_loops(&root)[0].clone();
    assert!(!clauses::has_collapse_clause(&outer).unwrap());
    assert!(!clauses::has_seq_clause(&outer).unwrap());
}
