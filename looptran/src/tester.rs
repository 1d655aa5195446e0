//! Utilities for testing transformation helpers.
//!
//! The external compiler is not available inside the test suite, so the
//! fixtures here build the trees it would hand to a script. Output checks
//! compare the pseudo-Fortran rendering line by line.

use crate::init_subscriber;
use crate::ir;
use crate::ir::Node;
use crate::shared::Shared;
use crate::shared::SharedExt;
use std::panic::Location;
use tracing::info;

pub struct Tester;

impl Tester {
    /// Initialize the subscriber for the tests.
    ///
    /// Cannot pass options, since the tests run concurrently.
    pub fn init_tracing() {
        let level = tracing::Level::INFO;
        match init_subscriber(level) {
            Ok(_) => (),
            Err(_e) => (),
        }
    }
    /// Render a tree and log it, so failures show what was checked.
    pub fn render(root: &Shared<Node>) -> String {
        let actual = format!("{}", root.rd());
        info!("Tree:\n```\n{actual}```\n");
        actual
    }
    /// Check that the rendering of `root` matches `expected` exactly.
    pub fn check_lines_exact(root: &Shared<Node>, expected: &str, caller: &Location<'_>) {
        let actual = Self::render(root);
        let actual = actual.trim();
        let expected = expected.trim();
        let count = actual.lines().count().max(expected.lines().count());
        for i in 0..count {
            let actual_line = actual.lines().nth(i).unwrap_or("<missing>");
            let expected_line = expected.lines().nth(i).unwrap_or("<missing>");
            assert_eq!(actual_line, expected_line, "line {i}, called from {caller}");
        }
    }
    /// Check that every expected line occurs, in order, somewhere in the
    /// rendering of `root`.
    pub fn check_lines_contain(root: &Shared<Node>, expected: &str, caller: &Location<'_>) {
        let actual = Self::render(root);
        let mut lines = actual.lines();
        for expected_line in expected.trim().lines() {
            let expected_line = expected_line.trim();
            if expected_line.is_empty() {
                continue;
            }
            let found = lines.any(|line| line.contains(expected_line));
            assert!(
                found,
                "line '{expected_line}' missing from output, called from {caller}"
            );
        }
    }
}

fn one_to(stop: &str) -> (Shared<Node>, Shared<Node>, Shared<Node>) {
    (ir::literal("1"), ir::reference(stop), ir::literal("1"))
}

/// `DO i = 1, n` over a trivial literal assignment.
pub fn single_loop() -> Shared<Node> {
    let (start, stop, step) = one_to("n");
    let body = ir::assignment(
        ir::array_reference("a", vec![ir::reference("i")]),
        ir::literal("0.0"),
    );
    ir::schedule(vec![ir::do_loop("i", start, stop, step, vec![body])])
}

/// `DO j ... DO i ... arr(i,j) = 0.0`, perfectly nested, no cross-loop
/// bound dependence.
pub fn double_loop() -> Shared<Node> {
    let (start, stop, step) = one_to("n");
    let body = ir::assignment(
        ir::array_reference("arr", vec![ir::reference("i"), ir::reference("j")]),
        ir::literal("0.0"),
    );
    let inner = ir::do_loop("i", start, stop, step, vec![body]);
    let (start, stop, step) = one_to("n");
    ir::schedule(vec![ir::do_loop("j", start, stop, step, vec![inner])])
}

/// A three-level perfect nest over `arr(i,j,k)`.
pub fn triple_loop() -> Shared<Node> {
    let (start, stop, step) = one_to("n");
    let body = ir::assignment(
        ir::array_reference(
            "arr",
            vec![
                ir::reference("i"),
                ir::reference("j"),
                ir::reference("k"),
            ],
        ),
        ir::literal("0.0"),
    );
    let inner = ir::do_loop("i", start, stop, step, vec![body]);
    let (start, stop, step) = one_to("n");
    let middle = ir::do_loop("j", start, stop, step, vec![inner]);
    let (start, stop, step) = one_to("n");
    ir::schedule(vec![ir::do_loop("k", start, stop, step, vec![middle])])
}

/// An outer loop whose body holds an assignment next to the inner loop, so
/// the nest is not perfect.
pub fn imperfect_loop() -> Shared<Node> {
    let (start, stop, step) = one_to("n");
    let inner_body = ir::assignment(
        ir::array_reference("arr", vec![ir::reference("i"), ir::reference("j")]),
        ir::literal("0.0"),
    );
    let inner = ir::do_loop("i", start, stop, step, vec![inner_body]);
    let extra = ir::assignment(
        ir::array_reference("a", vec![ir::reference("j")]),
        ir::literal("0.0"),
    );
    let (start, stop, step) = one_to("n");
    ir::schedule(vec![ir::do_loop("j", start, stop, step, vec![extra, inner])])
}

/// A triangular nest: the inner stop bound references the outer variable.
pub fn triangular_loop() -> Shared<Node> {
    let body = ir::assignment(
        ir::array_reference("arr", vec![ir::reference("i"), ir::reference("j")]),
        ir::literal("0.0"),
    );
    let inner = ir::do_loop(
        "i",
        ir::literal("1"),
        ir::reference("j"),
        ir::literal("1"),
        vec![body],
    );
    let (start, stop, step) = one_to("n");
    ir::schedule(vec![ir::do_loop("j", start, stop, step, vec![inner])])
}

/// Two consecutive outer loops under one schedule.
pub fn serial_loops() -> Shared<Node> {
    let (start, stop, step) = one_to("n");
    let first_body = ir::assignment(
        ir::array_reference("a", vec![ir::reference("i")]),
        ir::literal("0.0"),
    );
    let first = ir::do_loop("i", start, stop, step, vec![first_body]);
    let (start, stop, step) = one_to("n");
    let second_body = ir::assignment(
        ir::array_reference("b", vec![ir::reference("i")]),
        ir::literal("1.0"),
    );
    let second = ir::do_loop("i", start, stop, step, vec![second_body]);
    ir::schedule(vec![first, second])
}
