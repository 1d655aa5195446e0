//! Boolean classifiers over node kinds.
//!
//! Every other module routes its kind checks through these functions, so
//! there is exactly one answer to "is this a loop" across the library.
//! Absence of a match is `false`, never a fault.

use crate::ir::Node;
use crate::ir::NodeKind;
use crate::shared::SharedExt;

pub fn is_schedule(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Schedule)
}

pub fn is_loop(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Loop { .. })
}

pub fn is_assignment(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Assignment)
}

pub fn is_reference(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Reference { .. })
}

pub fn is_literal(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Literal { .. })
}

/// Calls and intrinsic calls alike.
pub fn is_call(node: &Node) -> bool {
    matches!(
        node.kind(),
        NodeKind::Call { .. } | NodeKind::IntrinsicCall { .. }
    )
}

pub fn is_directive(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Directive(_))
}

/// A directive wrapping a block of statements (kernels/parallel region).
pub fn is_region_directive(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Directive(directive) => directive.kind().is_region(),
        _ => false,
    }
}

/// A directive annotating a single loop.
pub fn is_loop_directive_node(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Directive(directive) => directive.kind().is_loop_level(),
        _ => false,
    }
}

pub fn is_kernels_directive(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Directive(directive) => {
            directive.kind() == crate::ir::DirectiveKind::AccKernels
        }
        _ => false,
    }
}

/// Wrapper kinds the loop-nest analyzer sees through.
pub fn is_transparent(node: &Node) -> bool {
    is_schedule(node) || is_loop_directive_node(node)
}

/// An assignment whose right-hand side is a literal value.
pub fn is_literal_assignment(node: &Node) -> bool {
    if !is_assignment(node) {
        return false;
    }
    match node.child(1) {
        Some(rhs) => is_literal(&rhs.rd()),
        None => false,
    }
}

/// Expression leaves that never count as statements of a loop body.
pub fn is_expression(node: &Node) -> bool {
    matches!(
        node.kind(),
        NodeKind::Reference { .. } | NodeKind::Literal { .. } | NodeKind::BinaryOp { .. }
    )
}
