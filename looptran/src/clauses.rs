//! Clause validation and clause queries on loop directives.

use crate::directives::has_kernels_directive;
use crate::directives::has_loop_directive;
use crate::directives::loop_directive;
use crate::family;
use crate::ir::Clause;
use crate::ir::DirectiveKind;
use crate::ir::Node;
use crate::loops;
use crate::loops::Eligibility;
use crate::predicates;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use tracing::debug;

/// Validate a clause list against a directive kind and its target loop.
///
/// Runs before any mutation; collapse arguments are checked against the
/// nest the analyzer validates. Deeper correctness is adjudicated by the
/// external compiler during codegen.
pub fn check_clauses(
    loop_node: &Shared<Node>,
    kind: DirectiveKind,
    clauses: &[Clause],
) -> Result<()> {
    for clause in clauses {
        if !kind.accepts(clause) {
            return Err(anyhow::anyhow!(
                "'{}' does not accept a '{}' clause.",
                kind.sentinel(),
                clause.name()
            ));
        }
        if let Clause::Collapse(n) = clause {
            check_collapse(loop_node, *n)?;
        }
    }
    Ok(())
}

fn check_collapse(loop_node: &Shared<Node>, collapse: u64) -> Result<()> {
    if collapse <= 1 {
        return Err(anyhow::anyhow!(
            "Expected a collapse of at least two loops, not {collapse}."
        ));
    }
    match loops::collapse_eligibility(loop_node, collapse)? {
        Eligibility::Eligible => Ok(()),
        Eligibility::Ineligible(reason) => Err(anyhow::anyhow!(
            "Cannot collapse {collapse} loops here: {reason}."
        )),
    }
}

/// Apply a collapse clause to a loop, annotating the loop first if needed.
///
/// Mirrors the ACC workflow: a kernels region must already be in place.
/// All validation happens before the tree is touched.
pub fn apply_loop_collapse(loop_node: &Shared<Node>, collapse: u64) -> Result<()> {
    if !predicates::is_loop(&loop_node.rd()) {
        return Err(anyhow::anyhow!(
            "Expected a Loop, not '{}'.",
            loop_node.rd().kind_name()
        ));
    }
    if !has_kernels_directive(loop_node) {
        return Err(anyhow::anyhow!(
            "Cannot apply loop collapse without a kernels directive."
        ));
    }
    check_collapse(loop_node, collapse)?;
    if !has_loop_directive(loop_node)? {
        return crate::directives::apply_loop_directive(
            loop_node,
            DirectiveKind::AccLoop,
            &[Clause::Collapse(collapse)],
        );
    }
    let directive = loop_directive(loop_node).unwrap();
    debug!("attaching collapse({collapse}) to an existing loop directive");
    directive
        .wr()
        .directive_mut()
        .unwrap()
        .set_clause(Clause::Collapse(collapse));
    Ok(())
}

fn has_named_clause(loop_node: &Shared<Node>, name: &str) -> Result<bool> {
    if !has_loop_directive(loop_node)? {
        return Ok(false);
    }
    let directive = loop_directive(loop_node).unwrap();
    let has = directive.rd().directive().unwrap().has_clause(name);
    Ok(has)
}

/// Whether the loop's directive carries a `seq` clause.
pub fn has_seq_clause(loop_node: &Shared<Node>) -> Result<bool> {
    has_named_clause(loop_node, "seq")
}

/// Whether the loop's directive carries a `gang` clause.
pub fn has_gang_clause(loop_node: &Shared<Node>) -> Result<bool> {
    has_named_clause(loop_node, "gang")
}

/// Whether the loop's directive carries a `vector` clause.
pub fn has_vector_clause(loop_node: &Shared<Node>) -> Result<bool> {
    has_named_clause(loop_node, "vector")
}

/// Whether the loop lies within a collapsed nest.
///
/// A collapse on an enclosing loop's directive reaches this loop if the
/// collapse count exceeds the number of loop levels in between.
pub fn has_collapse_clause(loop_node: &Shared<Node>) -> Result<bool> {
    if !predicates::is_loop(&loop_node.rd()) {
        return Err(anyhow::anyhow!(
            "Expected a Loop, not '{}'.",
            loop_node.rd().kind_name()
        ));
    }
    let enclosing = family::ancestors(loop_node, predicates::is_loop, true);
    for (levels_between, current) in enclosing.iter().enumerate() {
        let directive = match loop_directive(current) {
            Some(directive) => directive,
            None => continue,
        };
        let collapse = directive.rd().directive().unwrap().collapse();
        match collapse {
            Some(collapse) => return Ok(collapse > levels_between as u64),
            None => continue,
        }
    }
    Ok(false)
}
