//! Attaching parallel-annotation directives to the tree, and querying which
//! annotations a node already sits under.
//!
//! Application is validate-then-mutate: every clause and target check runs
//! before the first mutation call, so a failed application leaves the tree
//! untouched.

use crate::clauses::check_clauses;
use crate::family;
use crate::ir;
use crate::ir::Clause;
use crate::ir::DirectiveKind;
use crate::ir::Node;
use crate::predicates;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use tracing::debug;

fn check_loop(node: &Shared<Node>) -> Result<()> {
    if !predicates::is_loop(&node.rd()) {
        return Err(anyhow::anyhow!(
            "Expected a Loop, not '{}'.",
            node.rd().kind_name()
        ));
    }
    Ok(())
}

/// Whether `node` sits inside an OpenACC `kernels` region.
pub fn has_kernels_directive(node: &Shared<Node>) -> bool {
    family::has_ancestor(node, predicates::is_kernels_directive, false)
}

/// Whether `node` sits inside an OpenMP `parallel` region.
pub fn has_parallel_region(node: &Shared<Node>) -> bool {
    family::has_ancestor(
        node,
        |candidate| match candidate.directive() {
            Some(directive) => directive.kind() == DirectiveKind::OmpParallel,
            None => false,
        },
        false,
    )
}

/// The loop-level directive annotating `loop_node`, if one exists.
///
/// The directive sits two levels up: directive, body schedule, loop.
pub fn loop_directive(loop_node: &Shared<Node>) -> Option<Shared<Node>> {
    let schedule = loop_node.rd().parent()?;
    let candidate = schedule.rd().parent()?;
    if predicates::is_loop_directive_node(&candidate.rd()) {
        Some(candidate)
    } else {
        None
    }
}

/// Whether a loop-level directive annotates `loop_node`.
pub fn has_loop_directive(loop_node: &Shared<Node>) -> Result<bool> {
    check_loop(loop_node)?;
    Ok(loop_directive(loop_node).is_some())
}

fn check_backend_ancestry(loop_node: &Shared<Node>, kind: DirectiveKind) -> Result<()> {
    if kind == DirectiveKind::AccLoop && !has_kernels_directive(loop_node) {
        return Err(anyhow::anyhow!(
            "Cannot apply an ACC loop directive without a kernels directive."
        ));
    }
    if kind.is_omp() && has_kernels_directive(loop_node) {
        return Err(anyhow::anyhow!(
            "Cannot apply an OMP loop directive inside an ACC kernels directive."
        ));
    }
    Ok(())
}

/// Annotate `loop_node` with a loop-level directive carrying `clauses`.
///
/// The new directive node becomes the loop's parent wrapper, keeping the
/// loop's position among its former siblings.
pub fn apply_loop_directive(
    loop_node: &Shared<Node>,
    kind: DirectiveKind,
    clauses: &[Clause],
) -> Result<()> {
    check_loop(loop_node)?;
    if !kind.is_loop_level() {
        return Err(anyhow::anyhow!(
            "'{}' is not a loop directive.",
            kind.sentinel()
        ));
    }
    check_backend_ancestry(loop_node, kind)?;
    if has_loop_directive(loop_node)? {
        return Err(anyhow::anyhow!("Loop already has a loop directive."));
    }
    check_clauses(loop_node, kind, clauses)?;
    debug!(
        "applying '{}' to loop over '{}'",
        kind.sentinel(),
        loop_node.rd().loop_variable().unwrap_or_default()
    );
    let directive = ir::directive_node(kind, clauses.to_vec());
    ir::insert_above(loop_node, directive)
}

fn check_block(block: &[Shared<Node>]) -> Result<()> {
    if block.is_empty() {
        return Err(anyhow::anyhow!("Expected a non-empty block."));
    }
    if block.len() > 1 {
        if !family::are_siblings(block) {
            return Err(anyhow::anyhow!("Expected the block to be siblings."));
        }
        for pair in block.windows(2) {
            if !family::is_next_sibling(&pair[0], &pair[1]) {
                return Err(anyhow::anyhow!(
                    "Expected the block to be consecutive statements."
                ));
            }
        }
    }
    Ok(())
}

fn apply_region_directive(block: &[Shared<Node>], kind: DirectiveKind) -> Result<()> {
    check_block(block)?;
    debug!("spanning '{}' over {} statement(s)", kind.sentinel(), block.len());
    let directive = ir::directive_node(kind, vec![]);
    ir::wrap_block(block, directive)
}

/// Span an ACC `kernels` region over a run of consecutive statements.
pub fn apply_kernels_directive(block: &[Shared<Node>]) -> Result<()> {
    for node in block {
        if has_kernels_directive(node) {
            return Err(anyhow::anyhow!(
                "Block already sits inside a kernels directive."
            ));
        }
    }
    apply_region_directive(block, DirectiveKind::AccKernels)
}

/// Span an OMP `parallel` region over a run of consecutive statements.
pub fn apply_parallel_region(block: &[Shared<Node>]) -> Result<()> {
    for node in block {
        if has_parallel_region(node) {
            return Err(anyhow::anyhow!(
                "Block already sits inside a parallel region."
            ));
        }
    }
    apply_region_directive(block, DirectiveKind::OmpParallel)
}
