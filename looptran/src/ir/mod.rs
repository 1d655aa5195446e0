//! The view this library holds over the external compiler's tree.
//!
//! The compiler owns parsing and codegen; scripts receive a root [Node] and
//! hand it back. This module models that object boundary: typed nodes with
//! ordered children and parent back-references, the directive/clause
//! vocabulary the code generator recognises, and the few mutation entry
//! points ([insert_above], [wrap_block]) a script is allowed to call.
//! Builder functions stand in for the compiler-side tree construction in
//! demos and tests.

mod directive;
mod node;

pub use directive::Clause;
pub use directive::Directive;
pub use directive::DirectiveKind;
pub use node::add_child;
pub use node::array_reference;
pub use node::assignment;
pub use node::binary_operation;
pub use node::body_statements;
pub use node::call;
pub use node::code_block;
pub use node::directive_node;
pub use node::do_loop;
pub use node::insert_above;
pub use node::intrinsic_call;
pub use node::literal;
pub use node::position_in_parent;
pub use node::reference;
pub use node::same_node;
pub use node::schedule;
pub use node::wrap_block;
pub use node::Node;
pub use node::NodeKind;

pub fn spaces(indent: i32) -> String {
    "  ".repeat(indent as usize)
}
