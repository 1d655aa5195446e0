use crate::ir::spaces;
use crate::ir::Directive;
use crate::ir::DirectiveKind;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;

/// The closed set of node kinds the external compiler builds.
///
/// The compiler's node hierarchy is polymorphic; on this side it maps to a
/// kind tag plus a kind-specific payload, with exhaustive-match dispatch in
/// [crate::predicates].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Transparent wrapper holding an ordered list of statements. Loop and
    /// directive bodies are always a `Schedule`.
    Schedule,
    /// A `DO` loop. Children are the start, stop and step expressions
    /// followed by the body `Schedule`.
    Loop { variable: String },
    /// Children are the lhs and rhs expressions.
    Assignment,
    /// A variable or array reference. Children, if any, are index
    /// expressions.
    Reference { symbol: String },
    Literal { value: String },
    /// Children are the two operand expressions.
    BinaryOp { operator: String },
    /// A `CALL` statement. Children are argument expressions.
    Call { name: String },
    /// An intrinsic such as `MIN` or `SIZE`. Children are arguments.
    IntrinsicCall { name: String },
    /// Source the compiler could not represent structurally.
    CodeBlock { text: String },
    /// A parallel-annotation node. The single child is the `Schedule`
    /// holding the annotated region.
    Directive(Directive),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Schedule => "Schedule",
            NodeKind::Loop { .. } => "Loop",
            NodeKind::Assignment => "Assignment",
            NodeKind::Reference { .. } => "Reference",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::BinaryOp { .. } => "BinaryOp",
            NodeKind::Call { .. } => "Call",
            NodeKind::IntrinsicCall { .. } => "IntrinsicCall",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::Directive(_) => "Directive",
        }
    }
}

/// One element of the tree the external compiler hands to a script.
///
/// Children are ordered and are never reordered by this library. The parent
/// link is a [Weak] reference so child-to-parent edges never own; the
/// compiler (or, in tests, the fixture) owns the root.
pub struct Node {
    kind: NodeKind,
    attributes: HashMap<String, String>,
    children: Vec<Shared<Node>>,
    parent: Option<Weak<RwLock<Node>>>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: HashMap::new(),
            children: vec![],
            parent: None,
        }
    }
    pub fn shared(kind: NodeKind) -> Shared<Node> {
        Arc::new(RwLock::new(Self::new(kind)))
    }
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).cloned()
    }
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }
    pub fn children(&self) -> Vec<Shared<Node>> {
        self.children.clone()
    }
    pub fn child(&self, index: usize) -> Option<Shared<Node>> {
        self.children.get(index).cloned()
    }
    pub fn parent(&self) -> Option<Shared<Node>> {
        self.parent.as_ref()?.upgrade()
    }
    pub fn set_parent(&mut self, parent: Option<&Shared<Node>>) {
        self.parent = parent.map(Arc::downgrade);
    }
    pub fn directive(&self) -> Option<&Directive> {
        match &self.kind {
            NodeKind::Directive(directive) => Some(directive),
            _ => None,
        }
    }
    pub fn directive_mut(&mut self) -> Option<&mut Directive> {
        match &mut self.kind {
            NodeKind::Directive(directive) => Some(directive),
            _ => None,
        }
    }
    pub fn loop_variable(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Loop { variable } => Some(variable.clone()),
            _ => None,
        }
    }
    /// The `Schedule` holding this node's executable children, if the kind
    /// has one (loop bodies and directive regions).
    pub fn body(&self) -> Option<Shared<Node>> {
        match &self.kind {
            NodeKind::Loop { .. } => self.children.get(3).cloned(),
            NodeKind::Directive(_) => self.children.first().cloned(),
            _ => None,
        }
    }
    /// Render an expression node to source text.
    fn expression(&self) -> String {
        let arguments = || {
            self.children
                .iter()
                .map(|child| child.rd().expression())
                .collect::<Vec<String>>()
                .join(", ")
        };
        match &self.kind {
            NodeKind::Reference { symbol } => {
                if self.children.is_empty() {
                    symbol.clone()
                } else {
                    format!("{symbol}({})", arguments())
                }
            }
            NodeKind::Literal { value } => value.clone(),
            NodeKind::BinaryOp { operator } => {
                let lhs = self.children[0].rd().expression();
                let rhs = self.children[1].rd().expression();
                format!("{lhs} {operator} {rhs}")
            }
            NodeKind::Call { name } | NodeKind::IntrinsicCall { name } => {
                format!("{name}({})", arguments())
            }
            other => other.name().to_string(),
        }
    }
    /// Render this subtree as annotated pseudo-Fortran.
    ///
    /// This is a debugging aid; source regeneration proper belongs to the
    /// external compiler.
    pub fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        let pad = spaces(indent);
        match &self.kind {
            NodeKind::Schedule => {
                for child in &self.children {
                    child.rd().display(f, indent)?;
                }
                Ok(())
            }
            NodeKind::Loop { variable } => {
                let start = self.children[0].rd().expression();
                let stop = self.children[1].rd().expression();
                let step = self.children[2].rd().expression();
                writeln!(f, "{pad}DO {variable} = {start}, {stop}, {step}")?;
                if let Some(body) = self.body() {
                    body.rd().display(f, indent + 1)?;
                }
                writeln!(f, "{pad}END DO")
            }
            NodeKind::Assignment => {
                let lhs = self.children[0].rd().expression();
                let rhs = self.children[1].rd().expression();
                writeln!(f, "{pad}{lhs} = {rhs}")
            }
            NodeKind::Call { .. } => {
                writeln!(f, "{pad}CALL {}", self.expression())
            }
            NodeKind::CodeBlock { text } => {
                for line in text.lines() {
                    writeln!(f, "{pad}{line}")?;
                }
                Ok(())
            }
            NodeKind::Directive(directive) => {
                // Directive sentinels sit at the indent of the annotated
                // statements, as the compiler regenerates them.
                writeln!(f, "{pad}{directive}")?;
                if let Some(body) = self.body() {
                    body.rd().display(f, indent)?;
                }
                match directive.kind().end_sentinel() {
                    Some(end) => writeln!(f, "{pad}{end}"),
                    None => Ok(()),
                }
            }
            _ => writeln!(f, "{pad}{}", self.expression()),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

/// Whether two references point at the same tree node.
///
/// Nodes are compared by identity, never by structure.
pub fn same_node(a: &Shared<Node>, b: &Shared<Node>) -> bool {
    Arc::ptr_eq(a, b)
}

/// Append `child` to `parent`'s child list, fixing the back-reference.
pub fn add_child(parent: &Shared<Node>, child: Shared<Node>) {
    child.wr().set_parent(Some(parent));
    parent.wr().children.push(child);
}

/// The parent of `node` together with `node`'s index in its child list.
pub fn position_in_parent(node: &Shared<Node>) -> Option<(Shared<Node>, usize)> {
    let parent = node.rd().parent()?;
    let index = parent
        .rd()
        .children
        .iter()
        .position(|child| Arc::ptr_eq(child, node))?;
    Some((parent, index))
}

/// Insert `wrapper` as the new parent of `target`, keeping `target`'s
/// position among its former siblings.
///
/// `wrapper` must expose a body `Schedule` to receive the target. This is
/// the mutation entry point the directive applicator goes through.
pub fn insert_above(target: &Shared<Node>, wrapper: Shared<Node>) -> Result<()> {
    let (parent, index) = position_in_parent(target)
        .ok_or_else(|| anyhow::anyhow!("Cannot insert above the tree root."))?;
    let body = wrapper
        .rd()
        .body()
        .ok_or_else(|| anyhow::anyhow!("Wrapper node has no body to receive the target."))?;
    parent.wr().children[index] = wrapper.clone();
    wrapper.wr().set_parent(Some(&parent));
    target.wr().set_parent(Some(&body));
    body.wr().children.push(target.clone());
    Ok(())
}

/// Move a run of consecutive siblings under `wrapper`, which takes the run's
/// place in the shared parent.
pub fn wrap_block(block: &[Shared<Node>], wrapper: Shared<Node>) -> Result<()> {
    let first = block
        .first()
        .ok_or_else(|| anyhow::anyhow!("Cannot wrap an empty block."))?;
    let (parent, index) = position_in_parent(first)
        .ok_or_else(|| anyhow::anyhow!("Cannot wrap the tree root."))?;
    for (offset, node) in block.iter().enumerate() {
        let sibling = parent.rd().child(index + offset);
        match sibling {
            Some(sibling) if Arc::ptr_eq(&sibling, node) => (),
            _ => {
                return Err(anyhow::anyhow!(
                    "Expected a run of consecutive siblings under one parent."
                ))
            }
        }
    }
    let body = wrapper
        .rd()
        .body()
        .ok_or_else(|| anyhow::anyhow!("Wrapper node has no body to receive the block."))?;
    parent.wr().children.drain(index..index + block.len());
    parent.wr().children.insert(index, wrapper.clone());
    wrapper.wr().set_parent(Some(&parent));
    for node in block {
        node.wr().set_parent(Some(&body));
        body.wr().children.push(node.clone());
    }
    Ok(())
}

/// The statements a node encloses: its body `Schedule`'s children when it
/// has a body, its own children otherwise.
pub fn body_statements(node: &Shared<Node>) -> Vec<Shared<Node>> {
    let body = node.rd().body();
    match body {
        Some(schedule) => schedule.rd().children(),
        None => node.rd().children(),
    }
}

pub fn schedule(statements: Vec<Shared<Node>>) -> Shared<Node> {
    let node = Node::shared(NodeKind::Schedule);
    for statement in statements {
        add_child(&node, statement);
    }
    node
}

/// Build a `DO variable = start, stop, step` loop over the given body.
pub fn do_loop(
    variable: &str,
    start: Shared<Node>,
    stop: Shared<Node>,
    step: Shared<Node>,
    body: Vec<Shared<Node>>,
) -> Shared<Node> {
    let node = Node::shared(NodeKind::Loop {
        variable: variable.to_string(),
    });
    add_child(&node, start);
    add_child(&node, stop);
    add_child(&node, step);
    add_child(&node, schedule(body));
    node
}

pub fn assignment(lhs: Shared<Node>, rhs: Shared<Node>) -> Shared<Node> {
    let node = Node::shared(NodeKind::Assignment);
    add_child(&node, lhs);
    add_child(&node, rhs);
    node
}

pub fn reference(symbol: &str) -> Shared<Node> {
    Node::shared(NodeKind::Reference {
        symbol: symbol.to_string(),
    })
}

pub fn array_reference(symbol: &str, indices: Vec<Shared<Node>>) -> Shared<Node> {
    let node = reference(symbol);
    for index in indices {
        add_child(&node, index);
    }
    node
}

pub fn literal(value: &str) -> Shared<Node> {
    Node::shared(NodeKind::Literal {
        value: value.to_string(),
    })
}

pub fn binary_operation(operator: &str, lhs: Shared<Node>, rhs: Shared<Node>) -> Shared<Node> {
    let node = Node::shared(NodeKind::BinaryOp {
        operator: operator.to_string(),
    });
    add_child(&node, lhs);
    add_child(&node, rhs);
    node
}

pub fn call(name: &str, arguments: Vec<Shared<Node>>) -> Shared<Node> {
    let node = Node::shared(NodeKind::Call {
        name: name.to_string(),
    });
    for argument in arguments {
        add_child(&node, argument);
    }
    node
}

pub fn intrinsic_call(name: &str, arguments: Vec<Shared<Node>>) -> Shared<Node> {
    let node = Node::shared(NodeKind::IntrinsicCall {
        name: name.to_string(),
    });
    for argument in arguments {
        add_child(&node, argument);
    }
    node
}

pub fn code_block(text: &str) -> Shared<Node> {
    Node::shared(NodeKind::CodeBlock {
        text: text.to_string(),
    })
}

/// Build a directive node with an empty body `Schedule`, ready for
/// [insert_above] or [wrap_block].
pub fn directive_node(kind: DirectiveKind, clauses: Vec<crate::ir::Clause>) -> Shared<Node> {
    let node = Node::shared(NodeKind::Directive(Directive::new(kind, clauses)));
    add_child(&node, Node::shared(NodeKind::Schedule));
    node
}
