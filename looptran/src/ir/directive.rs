use std::fmt::Display;
use std::fmt::Formatter;

/// The directive vocabulary recognised by the external compiler's code
/// generator.
///
/// Region directives wrap a block of statements and carry begin/end
/// sentinels in the regenerated source. Loop-level directives annotate
/// exactly one loop and have no end sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    /// OpenACC `kernels` region.
    AccKernels,
    /// OpenACC `loop` directive.
    AccLoop,
    /// OpenMP `parallel` region.
    OmpParallel,
    /// OpenMP `do` directive.
    OmpDo,
    /// OpenMP combined `parallel do` directive.
    OmpParallelDo,
}

impl DirectiveKind {
    pub fn is_region(&self) -> bool {
        matches!(self, DirectiveKind::AccKernels | DirectiveKind::OmpParallel)
    }
    pub fn is_loop_level(&self) -> bool {
        !self.is_region()
    }
    pub fn is_acc(&self) -> bool {
        matches!(self, DirectiveKind::AccKernels | DirectiveKind::AccLoop)
    }
    pub fn is_omp(&self) -> bool {
        !self.is_acc()
    }
    /// The sentinel line emitted before the annotated region or loop.
    pub fn sentinel(&self) -> &'static str {
        match self {
            DirectiveKind::AccKernels => "!$acc kernels",
            DirectiveKind::AccLoop => "!$acc loop",
            DirectiveKind::OmpParallel => "!$omp parallel",
            DirectiveKind::OmpDo => "!$omp do",
            DirectiveKind::OmpParallelDo => "!$omp parallel do",
        }
    }
    /// The sentinel line emitted after a region, if any.
    pub fn end_sentinel(&self) -> Option<&'static str> {
        match self {
            DirectiveKind::AccKernels => Some("!$acc end kernels"),
            DirectiveKind::OmpParallel => Some("!$omp end parallel"),
            _ => None,
        }
    }
    /// Whether the code generator accepts `clause` on this directive kind.
    pub fn accepts(&self, clause: &Clause) -> bool {
        match self {
            DirectiveKind::AccKernels | DirectiveKind::OmpParallel => false,
            DirectiveKind::AccLoop => !matches!(clause, Clause::Schedule(_)),
            DirectiveKind::OmpDo | DirectiveKind::OmpParallelDo => {
                matches!(clause, Clause::Collapse(_) | Clause::Schedule(_))
            }
        }
    }
}

impl Display for DirectiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sentinel())
    }
}

/// A named parameter refining a directive.
///
/// Uniqueness of clause names per directive is expected but not enforced
/// here; the external compiler is the final authority on legality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Clause {
    /// Treat this many nested loop levels as a single iteration space.
    Collapse(u64),
    Seq,
    Gang,
    Vector,
    Independent,
    /// OpenMP iteration schedule, e.g. `static`.
    Schedule(String),
}

impl Clause {
    pub fn name(&self) -> &'static str {
        match self {
            Clause::Collapse(_) => "collapse",
            Clause::Seq => "seq",
            Clause::Gang => "gang",
            Clause::Vector => "vector",
            Clause::Independent => "independent",
            Clause::Schedule(_) => "schedule",
        }
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Clause::Collapse(n) => write!(f, "collapse({n})"),
            Clause::Schedule(kind) => write!(f, "schedule({kind})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// A parallel-annotation instruction attached to the tree as a node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    kind: DirectiveKind,
    clauses: Vec<Clause>,
}

impl Directive {
    pub fn new(kind: DirectiveKind, clauses: Vec<Clause>) -> Self {
        Self { kind, clauses }
    }
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
    pub fn clause(&self, name: &str) -> Option<&Clause> {
        self.clauses.iter().find(|clause| clause.name() == name)
    }
    pub fn has_clause(&self, name: &str) -> bool {
        self.clause(name).is_some()
    }
    /// The collapse count, if a collapse clause is attached.
    pub fn collapse(&self) -> Option<u64> {
        match self.clause("collapse") {
            Some(Clause::Collapse(n)) => Some(*n),
            _ => None,
        }
    }
    /// Attach a clause, replacing any existing clause with the same name.
    pub fn set_clause(&mut self, clause: Clause) {
        self.clauses.retain(|existing| existing.name() != clause.name());
        self.clauses.push(clause);
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind.sentinel())?;
        for clause in &self.clauses {
            write!(f, " {clause}")?;
        }
        Ok(())
    }
}
