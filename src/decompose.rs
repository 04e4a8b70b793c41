//! Cycle decomposition of integer-feasible candidate assignments.
//!
//! The base models guarantee that every node of an integer-feasible point
//! has at most one selected outgoing edge and balanced in/out degrees, so
//! the selected edges form vertex-disjoint directed cycles plus isolated
//! nodes. [`decompose`] recovers that structure by walking the unique
//! successor chain from every unvisited node.

use crate::Error;

/// Solver values at or above this threshold count as a selected edge.
///
/// Applied when snapshotting a candidate and when extracting the final
/// solution, and nowhere else, so numerical noise around the 0/1 boundary
/// is resolved the same way everywhere.
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// Rounds a relaxation value to the selected/not-selected decision.
pub fn is_selected(val: f64) -> bool {
    val >= SELECTION_THRESHOLD
}

/// An immutable 0/1 snapshot of the edge variables at one
/// integer-feasible point. Lives only for the duration of one callback
/// invocation or one final extraction.
#[derive(Debug, Clone)]
pub struct Candidate {
    n: usize,
    selected: Vec<bool>,
}

impl Candidate {
    /// Snapshots a candidate by thresholding raw solver values. The
    /// dimension is part of the snapshot itself; nothing downstream needs
    /// to capture it from an enclosing scope.
    pub fn from_values<F>(n: usize, mut value: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut selected = vec![false; n * n];
        for i in 0..n {
            for j in 0..n {
                if i != j && is_selected(value(i, j)) {
                    selected[i * n + j] = true;
                }
            }
        }
        Candidate { n, selected }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Whether edge `i -> j` is selected.
    pub fn is_edge_selected(&self, i: usize, j: usize) -> bool {
        self.selected[i * self.n + j]
    }

    /// The unique selected outgoing edge of `i`, if any. A second
    /// selected edge means the solver ignored the out-degree constraint.
    fn successor(&self, i: usize) -> Result<Option<usize>, Error> {
        let mut successor = None;
        for j in 0..self.n {
            if self.selected[i * self.n + j] {
                if successor.is_some() {
                    return Err(Error::DegreeContract { node: i });
                }
                successor = Some(j);
            }
        }
        Ok(successor)
    }
}

/// A directed cycle as the ordered list of its nodes. The closing edge
/// from the last node back to the first is implied, so the number of
/// edges equals the number of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    nodes: Vec<usize>,
}

impl Cycle {
    /// The nodes in traversal order, starting at the walk origin.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Number of edges (and nodes) on the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only for the degenerate empty cycle, which [`decompose`]
    /// never produces.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The edges along the cycle, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let len = self.nodes.len();
        (0..len).map(move |k| (self.nodes[k], self.nodes[(k + 1) % len]))
    }
}

/// A partition of all nodes into cycles and unused singleton nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    cycles: Vec<Cycle>,
    singletons: Vec<usize>,
}

impl Decomposition {
    /// The discovered cycles, in order of their smallest walk origin.
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Nodes with no selected outgoing edge.
    pub fn singletons(&self) -> &[usize] {
        &self.singletons
    }

    /// Total number of nodes across cycles and singletons.
    pub fn node_count(&self) -> usize {
        self.cycles.iter().map(Cycle::len).sum::<usize>() + self.singletons.len()
    }
}

/// Decomposes a candidate into vertex-disjoint cycles and singletons.
///
/// Works through an explicit worklist of unvisited nodes: each walk
/// follows the unique successor until it either returns to its origin
/// (closing a cycle) or finds no outgoing edge (a singleton). Every node
/// is visited exactly once, so the candidate's degree guarantees make the
/// output a partition of all nodes.
///
/// Returns [`Error::DegreeContract`] if the candidate has a node with two
/// selected outgoing edges, or a walk that closes on a node other than
/// its origin — both are impossible under the base model's constraints.
pub fn decompose(candidate: &Candidate) -> Result<Decomposition, Error> {
    let n = candidate.node_count();
    let mut visited = vec![false; n];
    let mut worklist: Vec<usize> = (0..n).rev().collect();
    let mut cycles = Vec::new();
    let mut singletons = Vec::new();

    while let Some(start) = worklist.pop() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut walk = vec![start];
        loop {
            let here = *walk.last().expect("walk starts non-empty");
            let Some(next) = candidate.successor(here)? else {
                // A stalled walk longer than its origin would mean some
                // node has an incoming edge without an outgoing one.
                if walk.len() > 1 {
                    return Err(Error::DegreeContract { node: here });
                }
                singletons.push(start);
                break;
            };
            if visited[next] {
                // Balanced degrees force the walk to close on its origin.
                if next != start {
                    return Err(Error::DegreeContract { node: next });
                }
                cycles.push(Cycle { nodes: walk });
                break;
            }
            visited[next] = true;
            walk.push(next);
        }
    }

    Ok(Decomposition { cycles, singletons })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn candidate_from_edges(n: usize, edges: &[(usize, usize)]) -> Candidate {
        Candidate::from_values(n, |i, j| {
            if edges.contains(&(i, j)) { 1.0 } else { 0.0 }
        })
    }

    #[test]
    fn two_short_cycles_and_a_singleton() {
        let candidate = candidate_from_edges(5, &[(0, 1), (1, 0), (2, 3), (3, 2)]);
        let d = decompose(&candidate).unwrap();
        assert_eq!(d.cycles().len(), 2);
        assert_eq!(d.cycles()[0].nodes(), &[0, 1]);
        assert_eq!(d.cycles()[1].nodes(), &[2, 3]);
        assert_eq!(d.singletons(), &[4]);
        assert_eq!(d.node_count(), 5);
    }

    #[test]
    fn spanning_cycle_is_a_single_walk() {
        let candidate = candidate_from_edges(4, &[(0, 2), (2, 1), (1, 3), (3, 0)]);
        let d = decompose(&candidate).unwrap();
        assert_eq!(d.cycles().len(), 1);
        assert_eq!(d.cycles()[0].nodes(), &[0, 2, 1, 3]);
        assert!(d.singletons().is_empty());
    }

    #[test]
    fn cycle_edges_include_the_closing_edge() {
        let candidate = candidate_from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        let d = decompose(&candidate).unwrap();
        let edges: Vec<_> = d.cycles()[0].edges().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn empty_candidate_yields_only_singletons() {
        let candidate = candidate_from_edges(3, &[]);
        let d = decompose(&candidate).unwrap();
        assert!(d.cycles().is_empty());
        assert_eq!(d.singletons(), &[0, 1, 2]);
    }

    #[test]
    fn out_degree_two_is_a_contract_violation() {
        let candidate = candidate_from_edges(3, &[(0, 1), (0, 2)]);
        let err = decompose(&candidate).unwrap_err();
        assert!(matches!(err, crate::Error::DegreeContract { node: 0 }));
    }

    #[test]
    fn dangling_chain_is_a_contract_violation() {
        // 0 -> 1 with no way back: node 1 has in-degree 1, out-degree 0.
        let candidate = candidate_from_edges(3, &[(0, 1)]);
        assert!(decompose(&candidate).is_err());
    }

    #[test]
    fn threshold_is_inclusive_at_one_half() {
        let candidate = Candidate::from_values(2, |i, j| {
            if (i, j) == (0, 1) { 0.5 } else { 0.4999 }
        });
        assert!(candidate.is_edge_selected(0, 1));
        assert!(!candidate.is_edge_selected(1, 0));
    }

    proptest! {
        /// Any permutation candidate decomposes into a partition of the
        /// nodes; fixed points drop their self-loop and become singletons.
        #[test]
        fn decomposition_partitions_all_nodes(seed in any::<u64>(), n in 1usize..40) {
            let mut successor: Vec<usize> = (0..n).collect();
            successor.shuffle(&mut StdRng::seed_from_u64(seed));
            let candidate = Candidate::from_values(n, |i, j| {
                if successor[i] == j { 1.0 } else { 0.0 }
            });
            let d = decompose(&candidate).unwrap();

            let mut seen = vec![0usize; n];
            for cycle in d.cycles() {
                for &v in cycle.nodes() {
                    seen[v] += 1;
                }
            }
            for &v in d.singletons() {
                seen[v] += 1;
            }
            prop_assert!(seen.iter().all(|&count| count == 1));

            let fixed_points = (0..n).filter(|&i| successor[i] == i).count();
            prop_assert_eq!(d.singletons().len(), fixed_points);
        }
    }
}
