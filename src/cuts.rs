//! Violation detection and subtour elimination cuts.
//!
//! [`generate_cuts`] is the pure function registered with the search: it
//! maps one candidate assignment to the list of cuts that exclude it. No
//! state is shared between invocations; the only thing that accumulates
//! is the constraint set held by the solver.

use crate::decompose::{Candidate, Cycle, Decomposition, decompose};
use crate::Error;

/// The structural rule a decomposition must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralRule {
    /// Every cycle may have at most this many edges. Singletons are
    /// always acceptable.
    MaxLoopLen(usize),
    /// The only acceptable decomposition is a single cycle spanning all
    /// nodes.
    SingleTour,
}

impl StructuralRule {
    /// Returns the cycles violating the rule, in discovery order.
    ///
    /// Under [`StructuralRule::SingleTour`], a multi-cycle decomposition
    /// gets every one of its cycles reported, not just the long ones:
    /// the goal is to forbid that particular partition entirely.
    pub fn violations<'a>(&self, decomposition: &'a Decomposition) -> Vec<&'a Cycle> {
        match *self {
            StructuralRule::MaxLoopLen(max_len) => decomposition
                .cycles()
                .iter()
                .filter(|cycle| cycle.len() > max_len)
                .collect(),
            StructuralRule::SingleTour => {
                let spanning = decomposition.cycles().len() == 1
                    && decomposition.singletons().is_empty();
                if spanning {
                    Vec::new()
                } else {
                    decomposition.cycles().iter().collect()
                }
            }
        }
    }
}

/// One subtour elimination inequality: the sum of the listed edge
/// variables must stay at or below `rhs`.
///
/// For a violating cycle of length `k` the right-hand side is `k - 1`,
/// which excludes exactly the assignments selecting all `k` edges while
/// leaving every assignment that omits at least one of them feasible.
/// Once added to the solver a cut is never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    /// The edges of the violating cycle, closing edge included.
    pub edges: Vec<(usize, usize)>,
    /// Upper bound on the number of those edges selected together.
    pub rhs: f64,
}

impl Cut {
    /// Value of the cut's left-hand side under a candidate.
    pub fn lhs_value(&self, candidate: &Candidate) -> f64 {
        self.edges
            .iter()
            .filter(|&&(i, j)| candidate.is_edge_selected(i, j))
            .count() as f64
    }

    /// Whether the candidate violates the cut.
    pub fn is_violated_by(&self, candidate: &Candidate) -> bool {
        self.lhs_value(candidate) > self.rhs
    }
}

/// Emits the subtour elimination cut for one violating cycle.
pub fn subtour_cut(cycle: &Cycle) -> Cut {
    Cut {
        edges: cycle.edges().collect(),
        rhs: cycle.len() as f64 - 1.0,
    }
}

/// Decomposes a candidate and derives one cut per violating cycle.
///
/// An empty result means the candidate satisfies the structural rule and
/// may be accepted as an incumbent.
pub fn generate_cuts(candidate: &Candidate, rule: StructuralRule) -> Result<Vec<Cut>, Error> {
    let decomposition = decompose(candidate)?;
    Ok(rule
        .violations(&decomposition)
        .into_iter()
        .map(subtour_cut)
        .collect())
}
