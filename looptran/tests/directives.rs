extern crate looptran;

use indoc::indoc;
use looptran::directives;
use looptran::family;
use looptran::ir;
use looptran::ir::Clause;
use looptran::ir::DirectiveKind;
use looptran::predicates;
use looptran::shared::Shared;
use looptran::shared::SharedExt;
use looptran::tester;
use looptran::tester::Tester;
use std::panic::Location;

fn outer_loop(root: &Shared<ir::Node>) -> Shared<ir::Node> {
    family::descendants(root, predicates::is_loop, false)[0].clone()
}

#[test]
fn loop_directive_becomes_the_loops_parent() {
    Tester::init_tracing();
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    assert!(!directives::has_loop_directive(&outer).unwrap());

    directives::apply_loop_directive(&outer, DirectiveKind::OmpParallelDo, &[]).unwrap();

    assert!(directives::has_loop_directive(&outer).unwrap());
    let expected = indoc! {"
    !$omp parallel do
    DO i = 1, n, 1
      a(i) = 0.0
    END DO
    "};
    Tester::check_lines_exact(&root, expected, Location::caller());
}

#[test]
fn kernels_region_then_acc_loop() {
    Tester::init_tracing();
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    assert!(!directives::has_kernels_directive(&outer));

    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    assert!(directives::has_kernels_directive(&outer));
    directives::apply_loop_directive(&outer, DirectiveKind::AccLoop, &[]).unwrap();

    let expected = indoc! {"
    !$acc kernels
    !$acc loop
    DO i = 1, n, 1
      a(i) = 0.0
    END DO
    !$acc end kernels
    "};
    Tester::check_lines_exact(&root, expected, Location::caller());
}

#[test]
fn acc_loop_requires_a_kernels_region() {
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    let error =
        directives::apply_loop_directive(&outer, DirectiveKind::AccLoop, &[]).unwrap_err();
    assert!(error.to_string().contains("kernels"));
}

#[test]
fn omp_inside_kernels_is_rejected() {
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    directives::apply_kernels_directive(&[outer.clone()]).unwrap();
    let error =
        directives::apply_loop_directive(&outer, DirectiveKind::OmpDo, &[]).unwrap_err();
    assert!(error.to_string().contains("ACC kernels"));
}

#[test]
fn collapse_two_on_a_two_level_nest() {
    Tester::init_tracing();
    let root = tester::double_loop();
    let outer = outer_loop(&root);
    directives::apply_loop_directive(&outer, DirectiveKind::OmpParallelDo, &[Clause::Collapse(2)])
        .unwrap();
    let expected = indoc! {"
    !$omp parallel do collapse(2)
    DO j = 1, n, 1
      DO i = 1, n, 1
        arr(i, j) = 0.0
      END DO
    END DO
    "};
    Tester::check_lines_exact(&root, expected, Location::caller());
}

#[test]
fn excessive_collapse_leaves_the_tree_untouched() {
    let root = tester::double_loop();
    let outer = outer_loop(&root);
    let before = format!("{}", root.rd());
    let error = directives::apply_loop_directive(
        &outer,
        DirectiveKind::OmpParallelDo,
        &[Clause::Collapse(3)],
    )
    .unwrap_err();
    assert!(error.to_string().contains("Cannot collapse 3 loops"));
    assert_eq!(before, format!("{}", root.rd()));
    assert!(!directives::has_loop_directive(&outer).unwrap());
}

#[test]
fn non_loop_targets_are_rejected() {
    let root = tester::single_loop();
    let assignment = family::descendants(&root, predicates::is_assignment, false)[0].clone();
    let error =
        directives::apply_loop_directive(&assignment, DirectiveKind::OmpDo, &[]).unwrap_err();
    assert!(error.to_string().contains("Expected a Loop, not 'Assignment'"));
}

#[test]
fn region_kinds_are_not_loop_directives() {
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    let error =
        directives::apply_loop_directive(&outer, DirectiveKind::AccKernels, &[]).unwrap_err();
    assert!(error.to_string().contains("not a loop directive"));
}

#[test]
fn double_annotation_is_rejected() {
    let root = tester::single_loop();
    let outer = outer_loop(&root);
    directives::apply_loop_directive(&outer, DirectiveKind::OmpParallelDo, &[]).unwrap();
    let error =
        directives::apply_loop_directive(&outer, DirectiveKind::OmpDo, &[]).unwrap_err();
    assert!(error.to_string().contains("already has a loop directive"));
}

#[test]
fn parallel_region_spans_consecutive_loops() {
    Tester::init_tracing();
    let root = tester::serial_loops();
    let loops = family::descendants(&root, predicates::is_loop, false);
    directives::apply_parallel_region(&loops).unwrap();
    let expected = indoc! {"
    !$omp parallel
    DO i = 1, n, 1
      a(i) = 0.0
    END DO
    DO i = 1, n, 1
      b(i) = 1.0
    END DO
    !$omp end parallel
    "};
    Tester::check_lines_exact(&root, expected, Location::caller());
}

#[test]
fn regions_require_consecutive_siblings() {
    let gap = ir::assignment(ir::reference("x"), ir::literal("1"));
    let first = ir::do_loop(
        "i",
        ir::literal("1"),
        ir::reference("n"),
        ir::literal("1"),
        vec![],
    );
    let second = ir::do_loop(
        "j",
        ir::literal("1"),
        ir::reference("n"),
        ir::literal("1"),
        vec![],
    );
    let _root = ir::schedule(vec![first.clone(), gap, second.clone()]);
    let error = directives::apply_parallel_region(&[first, second]).unwrap_err();
    assert!(error.to_string().contains("consecutive"));
}
