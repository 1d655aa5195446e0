//! Relationship queries over the shared tree: descendants, ancestors,
//! children and siblings of a node.
//!
//! Traversals are recomputed on every call, so re-invoking a query on an
//! unmutated tree yields the same sequence. Children are always visited in
//! their stored order.

use crate::ir::body_statements;
use crate::ir::position_in_parent;
use crate::ir::same_node;
use crate::ir::Node;
use crate::shared::Shared;
use crate::shared::SharedExt;

/// Predicate that matches every node.
pub fn any_node(_: &Node) -> bool {
    true
}

/// Depth-first pre-order iterator over a subtree, starting node included.
///
/// The sequence is finite (bounded by tree size) and lazy; dropping the
/// iterator early does not visit the rest of the tree.
pub struct Walk {
    stack: Vec<Shared<Node>>,
}

impl Iterator for Walk {
    type Item = Shared<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut children = node.rd().children();
        children.reverse();
        self.stack.extend(children);
        Some(node)
    }
}

pub fn walk(node: &Shared<Node>) -> Walk {
    Walk {
        stack: vec![node.clone()],
    }
}

/// All nodes below `node` in pre-order that satisfy `matches`.
///
/// The starting node itself is excluded unless `include_self` is set.
pub fn descendants<F>(node: &Shared<Node>, matches: F, include_self: bool) -> Vec<Shared<Node>>
where
    F: Fn(&Node) -> bool,
{
    walk(node)
        .filter(|candidate| include_self || !same_node(candidate, node))
        .filter(|candidate| matches(&candidate.rd()))
        .collect()
}

/// All nodes above `node`, nearest first, that satisfy `matches`.
pub fn ancestors<F>(node: &Shared<Node>, matches: F, include_self: bool) -> Vec<Shared<Node>>
where
    F: Fn(&Node) -> bool,
{
    let mut result = vec![];
    if include_self && matches(&node.rd()) {
        result.push(node.clone());
    }
    let mut current = node.rd().parent();
    while let Some(ancestor) = current {
        if matches(&ancestor.rd()) {
            result.push(ancestor.clone());
        }
        current = ancestor.rd().parent();
    }
    result
}

/// The statements a node immediately encloses (transparent through body
/// `Schedule` wrappers) that satisfy `matches`.
pub fn children<F>(node: &Shared<Node>, matches: F) -> Vec<Shared<Node>>
where
    F: Fn(&Node) -> bool,
{
    body_statements(node)
        .into_iter()
        .filter(|child| matches(&child.rd()))
        .collect()
}

/// Nodes sharing `node`'s parent, in stored order.
pub fn siblings<F>(node: &Shared<Node>, matches: F, include_self: bool) -> Vec<Shared<Node>>
where
    F: Fn(&Node) -> bool,
{
    let parent = match node.rd().parent() {
        Some(parent) => parent,
        None => return vec![],
    };
    let children = parent.rd().children();
    children
        .into_iter()
        .filter(|sibling| include_self || !same_node(sibling, node))
        .filter(|sibling| matches(&sibling.rd()))
        .collect()
}

/// The siblings after `node`, in stored order.
pub fn following_siblings(node: &Shared<Node>) -> Vec<Shared<Node>> {
    match position_in_parent(node) {
        Some((parent, index)) => parent.rd().children().split_off(index + 1),
        None => vec![],
    }
}

pub fn has_descendant<F>(node: &Shared<Node>, matches: F, include_self: bool) -> bool
where
    F: Fn(&Node) -> bool,
{
    walk(node)
        .filter(|candidate| include_self || !same_node(candidate, node))
        .any(|candidate| matches(&candidate.rd()))
}

pub fn has_ancestor<F>(node: &Shared<Node>, matches: F, include_self: bool) -> bool
where
    F: Fn(&Node) -> bool,
{
    !ancestors(node, matches, include_self).is_empty()
}

/// Whether an enclosing loop iterates over the variable `name`.
pub fn has_ancestor_loop_named(node: &Shared<Node>, name: &str) -> bool {
    ancestors(node, crate::predicates::is_loop, false)
        .iter()
        .any(|ancestor| ancestor.rd().loop_variable().as_deref() == Some(name))
}

/// Whether all given nodes share one parent.
///
/// A single attached node is trivially a sibling set; an empty slice or a
/// detached node is not.
pub fn are_siblings(nodes: &[Shared<Node>]) -> bool {
    let first = match nodes.first() {
        Some(first) => first,
        None => return false,
    };
    let first_parent = first.rd().parent();
    let first_parent = match first_parent {
        Some(parent) => parent,
        None => return false,
    };
    nodes[1..].iter().all(|node| match node.rd().parent() {
        Some(parent) => same_node(&parent, &first_parent),
        None => false,
    })
}

/// Whether `second` immediately follows `first` under their shared parent.
pub fn is_next_sibling(first: &Shared<Node>, second: &Shared<Node>) -> bool {
    let (first_parent, first_index) = match position_in_parent(first) {
        Some(position) => position,
        None => return false,
    };
    let (second_parent, second_index) = match position_in_parent(second) {
        Some(position) => position,
        None => return false,
    };
    same_node(&first_parent, &second_parent) && second_index == first_index + 1
}

/// Partition nodes into runs of immediately-adjacent siblings, preserving
/// the given order. Used to find the blocks a region directive can span.
pub fn split_consecutive(nodes: &[Shared<Node>]) -> Vec<Vec<Shared<Node>>> {
    let mut runs: Vec<Vec<Shared<Node>>> = vec![];
    for node in nodes {
        match runs.last_mut() {
            Some(run) if is_next_sibling(run.last().unwrap(), node) => {
                run.push(node.clone());
            }
            _ => runs.push(vec![node.clone()]),
        }
    }
    runs
}
