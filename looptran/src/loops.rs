//! Structural analysis of loop nests: depth, perfect-nesting status, bound
//! independence and eligibility for collapse-style annotation.
//!
//! Everything here is a pure query; "not eligible" is an expected outcome
//! and is reported as a classification, never raised. Faults are reserved
//! for usage errors such as passing a non-loop node.

use crate::family;
use crate::ir::body_statements;
use crate::ir::same_node;
use crate::ir::Node;
use crate::ir::NodeKind;
use crate::predicates;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use std::fmt::Display;
use std::fmt::Formatter;

/// Why a nest cannot take the requested collapse depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IneligibleReason {
    /// A level up to the requested depth holds more than the next loop.
    NonPerfectNest,
    /// The nest is perfect but shallower than requested.
    InsufficientDepth,
    /// A loop bound or step references a variable mutated in the nest.
    DependentBounds,
}

impl Display for IneligibleReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            IneligibleReason::NonPerfectNest => "non-perfect nest",
            IneligibleReason::InsufficientDepth => "insufficient nest depth",
            IneligibleReason::DependentBounds => "loop bounds depend on nest variables",
        };
        write!(f, "{reason}")
    }
}

/// Outcome of a collapse-eligibility query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

fn check_loop(node: &Shared<Node>) -> Result<()> {
    if !predicates::is_loop(&node.rd()) {
        return Err(anyhow::anyhow!(
            "Expected a Loop, not '{}'.",
            node.rd().kind_name()
        ));
    }
    Ok(())
}

/// Whether no enclosing loop exists.
pub fn is_outer_loop(loop_node: &Shared<Node>) -> Result<bool> {
    check_loop(loop_node)?;
    Ok(!family::has_ancestor(loop_node, predicates::is_loop, false))
}

/// Peel transparent wrappers (loop-level directives) off a statement, so a
/// nest reads the same before and after annotation.
fn peel(statement: &Shared<Node>) -> Shared<Node> {
    let mut current = statement.clone();
    loop {
        if !predicates::is_loop_directive_node(&current.rd()) {
            return current;
        }
        let inner = body_statements(&current);
        if inner.len() != 1 {
            return current;
        }
        current = inner[0].clone();
    }
}

/// The sole nested loop of `loop_node`, if its body is exactly one loop
/// (possibly behind transparent wrappers).
fn sole_nested_loop(loop_node: &Shared<Node>) -> Option<Shared<Node>> {
    let statements = body_statements(loop_node);
    if statements.len() != 1 {
        return None;
    }
    let statement = peel(&statements[0]);
    if predicates::is_loop(&statement.rd()) {
        Some(statement)
    } else {
        None
    }
}

/// The strict chain of loops starting at `loop_node`: each level's body is
/// exactly the next loop. Where deeper structure is ambiguous this is the
/// shallower, conservative reading.
pub fn loop_nest(loop_node: &Shared<Node>) -> Result<Vec<Shared<Node>>> {
    check_loop(loop_node)?;
    let mut nest = vec![loop_node.clone()];
    let mut current = loop_node.clone();
    while let Some(next) = sole_nested_loop(&current) {
        nest.push(next.clone());
        current = next;
    }
    Ok(nest)
}

/// The strict-chain depth of the nest rooted at `loop_node`.
pub fn nest_depth(loop_node: &Shared<Node>) -> Result<usize> {
    Ok(loop_nest(loop_node)?.len())
}

/// All descendant loops of `loop_node`, itself included, in pre-order.
pub fn descendant_loops(loop_node: &Shared<Node>) -> Result<Vec<Shared<Node>>> {
    check_loop(loop_node)?;
    Ok(family::descendants(loop_node, predicates::is_loop, true))
}

/// Validate a nest slice and return its outer-most loop.
pub fn nest_to_loop(nest: &[Shared<Node>]) -> Result<Shared<Node>> {
    let outer = nest
        .first()
        .ok_or_else(|| anyhow::anyhow!("Expected a non-empty loop nest."))?;
    let members = descendant_loops(outer)?;
    for loop_node in nest {
        check_loop(loop_node)?;
        if !members.iter().any(|member| same_node(member, loop_node)) {
            return Err(anyhow::anyhow!(
                "Loop nest member is not a descendant of the outer loop."
            ));
        }
    }
    Ok(outer.clone())
}

/// Whether each nest level except the deepest holds only the next loop.
///
/// The innermost level may hold arbitrary statements, provided none of them
/// contains a loop of its own.
pub fn is_perfectly_nested(loop_node: &Shared<Node>) -> Result<bool> {
    check_loop(loop_node)?;
    let mut current = loop_node.clone();
    loop {
        let statements: Vec<Shared<Node>> = body_statements(&current)
            .iter()
            .map(peel)
            .filter(|statement| !predicates::is_expression(&statement.rd()))
            .collect();
        let (loops, non_loops): (Vec<_>, Vec<_>) = statements
            .into_iter()
            .partition(|statement| predicates::is_loop(&statement.rd()));
        match loops.len() {
            1 if non_loops.is_empty() => current = loops[0].clone(),
            0 => {
                // Innermost level: fine as long as no statement hides a loop.
                let hidden = non_loops.iter().any(|statement| {
                    family::has_descendant(statement, predicates::is_loop, false)
                });
                return Ok(!hidden);
            }
            _ => return Ok(false),
        }
    }
}

/// Whether the nest is perfect and its innermost body is only assignments
/// of literal values.
pub fn is_simple_loop(loop_node: &Shared<Node>) -> Result<bool> {
    if !is_perfectly_nested(loop_node)? {
        return Ok(false);
    }
    let nest = loop_nest(loop_node)?;
    let innermost = nest.last().unwrap();
    let simple = body_statements(innermost)
        .iter()
        .all(|statement| predicates::is_literal_assignment(&statement.rd()));
    Ok(simple)
}

/// The loop variables of the nest, outer-most first.
pub fn loop_variable_names(loop_node: &Shared<Node>) -> Result<Vec<String>> {
    let nest = loop_nest(loop_node)?;
    Ok(nest
        .iter()
        .filter_map(|member| member.rd().loop_variable())
        .collect())
}

/// Symbols mutated within the nest: loop variables plus assignment targets.
fn mutated_symbols(loop_node: &Shared<Node>) -> Vec<String> {
    let mut symbols: Vec<String> = vec![];
    for member in family::descendants(loop_node, predicates::is_loop, true) {
        if let Some(variable) = member.rd().loop_variable() {
            symbols.push(variable);
        }
    }
    for target in family::descendants(loop_node, predicates::is_assignment, true) {
        let lhs = target.rd().child(0);
        if let Some(lhs) = lhs {
            if let NodeKind::Reference { symbol } = lhs.rd().kind() {
                symbols.push(symbol.clone());
            }
        }
    }
    symbols
}

/// The start, stop and step expressions of a loop.
fn bound_expressions(loop_node: &Shared<Node>) -> Vec<Shared<Node>> {
    let children = loop_node.rd().children();
    children.into_iter().take(3).collect()
}

fn independent_to_depth(nest: &[Shared<Node>], depth: usize, mutated: &[String]) -> bool {
    for member in nest.iter().take(depth) {
        for bound in bound_expressions(member) {
            for reference in family::descendants(&bound, predicates::is_reference, true) {
                if let NodeKind::Reference { symbol } = reference.rd().kind() {
                    if mutated.contains(symbol) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Whether no loop bound or step in the nest references a variable mutated
/// within the nest. A simplified data-dependence check; the external
/// compiler has the final word during codegen.
pub fn is_independent(loop_node: &Shared<Node>) -> Result<bool> {
    let nest = loop_nest(loop_node)?;
    let mutated = mutated_symbols(loop_node);
    Ok(independent_to_depth(&nest, nest.len(), &mutated))
}

/// Classify the nest for a collapse over `depth` levels.
pub fn collapse_eligibility(loop_node: &Shared<Node>, depth: u64) -> Result<Eligibility> {
    let nest = loop_nest(loop_node)?;
    let depth = depth as usize;
    if depth > nest.len() {
        // More loops may exist below, just not in a clean chain.
        let reason = if descendant_loops(loop_node)?.len() > nest.len() {
            IneligibleReason::NonPerfectNest
        } else {
            IneligibleReason::InsufficientDepth
        };
        return Ok(Eligibility::Ineligible(reason));
    }
    let mutated = mutated_symbols(loop_node);
    if !independent_to_depth(&nest, depth, &mutated) {
        return Ok(Eligibility::Ineligible(IneligibleReason::DependentBounds));
    }
    Ok(Eligibility::Eligible)
}

/// The outer-most heads of perfectly nested structures in a schedule.
///
/// The returned loops are not necessarily outer loops of the whole
/// schedule, only the topmost loops of perfect structures.
pub fn perfectly_nested_loops(schedule: &Shared<Node>) -> Result<Vec<Shared<Node>>> {
    let mut heads = vec![];
    for loop_node in family::descendants(schedule, predicates::is_loop, true) {
        if is_perfectly_nested(&loop_node)? {
            heads.push(loop_node);
        }
    }
    // Keep only heads that are not inside an earlier head.
    let mut result: Vec<Shared<Node>> = vec![];
    for head in heads {
        let enclosed = result.iter().any(|kept| {
            family::descendants(kept, predicates::is_loop, false)
                .iter()
                .any(|inner| same_node(inner, &head))
        });
        if !enclosed {
            result.push(head);
        }
    }
    Ok(result)
}
