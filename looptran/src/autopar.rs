//! A whole transformation script in a box: annotate every outer loop in a
//! schedule with the directives the configured backend expects.
//!
//! Scripts that need finer control call [crate::directives] and
//! [crate::clauses] directly; this module packages the common shape:
//! span regions, pick the directive kind, work out a collapse depth, apply
//! per-loop overrides.

use crate::clauses::apply_loop_collapse;
use crate::config::Backend;
use crate::config::Config;
use crate::directives;
use crate::family;
use crate::ir::Clause;
use crate::ir::DirectiveKind;
use crate::ir::Node;
use crate::loops;
use crate::predicates;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use tracing::debug;
use tracing::warn;

/// Node attribute carrying a script-assigned loop tag.
pub const TAG_ATTRIBUTE: &str = "tag";

/// Clause overrides for loops carrying a particular tag.
pub struct LoopOverride {
    tag: String,
    clauses: Vec<Clause>,
}

impl LoopOverride {
    pub fn new(tag: &str, clauses: Vec<Clause>) -> Self {
        Self {
            tag: tag.to_string(),
            clauses,
        }
    }
    pub fn tag(&self) -> &str {
        &self.tag
    }
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

/// Script-level adjustments to the automatic annotation pass.
#[derive(Default)]
pub struct Overrides {
    span_limit: Option<usize>,
    tag_overrides: Vec<LoopOverride>,
}

impl Overrides {
    pub fn new(span_limit: Option<usize>, tag_overrides: Vec<LoopOverride>) -> Self {
        Self {
            span_limit,
            tag_overrides,
        }
    }
    pub fn span_limit(&self, config: &Config) -> usize {
        self.span_limit.unwrap_or(config.loop_span_limit)
    }
    pub fn for_tag(&self, tag: &str) -> Option<&LoopOverride> {
        self.tag_overrides
            .iter()
            .find(|override_| override_.tag() == tag)
    }
}

/// The deepest collapse the analyzer accepts, if any depth from the nest
/// depth down to `min_collapse` is eligible.
fn work_out_collapse(loop_node: &Shared<Node>, min_collapse: u64) -> Result<Option<u64>> {
    let depth = loops::nest_depth(loop_node)? as u64;
    let mut candidate = depth;
    while candidate >= min_collapse.max(2) {
        if loops::collapse_eligibility(loop_node, candidate)?.is_eligible() {
            return Ok(Some(candidate));
        }
        candidate -= 1;
    }
    Ok(None)
}

/// The outer loops of a schedule, in pre-order.
fn outer_loops(schedule: &Shared<Node>) -> Result<Vec<Shared<Node>>> {
    let mut result = vec![];
    for loop_node in family::descendants(schedule, predicates::is_loop, false) {
        if loops::is_outer_loop(&loop_node)? {
            result.push(loop_node);
        }
    }
    Ok(result)
}

/// Span parallel/kernels regions over runs of consecutive outer loops,
/// capped at the configured span limit.
fn span_regions(targets: &[Shared<Node>], config: &Config, limit: usize) -> Result<()> {
    for run in family::split_consecutive(targets) {
        for block in run.chunks(limit.max(1)) {
            match config.backend {
                // Every ACC loop directive needs an enclosing kernels
                // region, single loops included.
                Backend::Acc => {
                    if !directives::has_kernels_directive(&block[0]) {
                        directives::apply_kernels_directive(block)?;
                    }
                }
                // A lone OMP loop takes the combined `parallel do` instead
                // of a one-loop region.
                Backend::Omp => {
                    if block.len() > 1 && !directives::has_parallel_region(&block[0]) {
                        directives::apply_parallel_region(block)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn annotate(loop_node: &Shared<Node>, overrides: &Overrides, config: &Config) -> Result<bool> {
    if directives::has_loop_directive(loop_node)? {
        warn!("skipping a loop that already carries a directive");
        return Ok(false);
    }
    let kind = match config.backend {
        Backend::Acc => DirectiveKind::AccLoop,
        // Inside a spanned parallel region a plain `do` is the right form;
        // the combined `parallel do` would nest regions.
        Backend::Omp => {
            if directives::has_parallel_region(loop_node) {
                DirectiveKind::OmpDo
            } else {
                DirectiveKind::OmpParallelDo
            }
        }
    };
    let tag = loop_node.rd().attribute(TAG_ATTRIBUTE);
    let overridden = tag.as_deref().and_then(|tag| overrides.for_tag(tag));
    if let Some(override_) = overridden {
        debug!("using tag override '{}' for a loop", override_.tag());
        directives::apply_loop_directive(loop_node, kind, override_.clauses())?;
        return Ok(true);
    }
    let collapse = if config.apply_collapse {
        work_out_collapse(loop_node, config.min_collapse)?
    } else {
        None
    };
    match (config.backend, collapse) {
        (Backend::Acc, Some(collapse)) => apply_loop_collapse(loop_node, collapse)?,
        (_, Some(collapse)) => {
            directives::apply_loop_directive(loop_node, kind, &[Clause::Collapse(collapse)])?
        }
        (_, None) => directives::apply_loop_directive(loop_node, kind, &[])?,
    }
    Ok(true)
}

/// Annotate every outer loop of `schedule` for the configured backend.
///
/// Returns the number of loops annotated. Loops that already carry a
/// directive are skipped, not rewritten.
pub fn auto_parallelise(
    schedule: &Shared<Node>,
    overrides: &Overrides,
    config: &Config,
) -> Result<usize> {
    let targets = outer_loops(schedule)?;
    if targets.is_empty() {
        return Ok(0);
    }
    span_regions(&targets, config, overrides.span_limit(config))?;
    let mut annotated = 0;
    for loop_node in &targets {
        if annotate(loop_node, overrides, config)? {
            annotated += 1;
        }
    }
    debug!("annotated {annotated} of {} outer loop(s)", targets.len());
    Ok(annotated)
}
