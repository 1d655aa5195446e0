//! Helpers for writing transformation scripts for a Fortran source-to-source
//! compiler.
//!
//! The compiler owns the heavy machinery: it parses Fortran, builds a tree
//! of typed nodes, and regenerates source after a script has mutated that
//! tree. What a script author actually spends time on is the glue in
//! between: finding the loop nests worth annotating, checking that a nest
//! really can take a `collapse(2)`, and inserting the directive node in the
//! exact position the compiler's tree expects. Those few lines are easy to
//! get subtly wrong, and this crate packages them.
//!
//! The pieces:
//!
//! - [ir] models the compiler's object boundary: shared nodes with kind
//!   tags, ordered children and parent back-references, plus the directive
//!   and clause vocabulary the code generator recognises.
//! - [predicates] is the single source of truth for node-kind checks.
//! - [family] answers relationship queries: descendants in pre-order,
//!   ancestors, children, siblings.
//! - [loops] classifies loop nests: depth, perfect nesting, bound
//!   independence, collapse eligibility. "Not eligible" is a result, not an
//!   error.
//! - [directives] and [clauses] attach annotations, validating everything
//!   before the first mutation.
//! - [config] loads the target-specific settings once at script start.
//! - [autopar] is the common whole-script shape in one call.
//!
//! A script receives a tree root from the compiler, queries and mutates it
//! through these helpers, and hands it back; the compiler then regenerates
//! the annotated source.

pub mod autopar;
pub mod clauses;
pub mod config;
pub mod directives;
pub mod family;
pub mod ir;
pub mod loops;
pub mod predicates;
mod script;
pub mod shared;
#[cfg(feature = "test-utils")]
pub mod tester;

pub use config::Backend;
pub use config::Config;
pub use script::init_subscriber;
pub use script::script_arguments;
