//! Base ILP construction for the two problem variants.
//!
//! Only degree constraints live here; the structural rules (loop length,
//! single spanning tour) are enforced lazily by the constraint handler in
//! [`crate::solve`]. Construction registers variables and constraints
//! with SCIP but performs no search.

use russcip::prelude::*;
use russcip::{Model, ProblemCreated, Variable, minimal_model};
use tracing::debug;

use crate::matrix::WeightMatrix;

/// Search configuration forwarded to SCIP.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Wall-clock limit for one optimize run, in seconds.
    pub time_limit: Option<usize>,
    /// Show SCIP's log instead of suppressing it.
    pub verbose: bool,
}

/// The edge-variable table of one model instance.
///
/// Shared between the model builder, the constraint handler, and final
/// extraction. Its lifetime is scoped to one optimize run; solving several
/// instances in one process never shares a table.
#[derive(Clone)]
pub struct EdgeVars {
    n: usize,
    vars: Vec<Option<Variable>>,
}

impl EdgeVars {
    fn new(n: usize) -> Self {
        EdgeVars {
            n,
            vars: vec![None; n * n],
        }
    }

    /// Number of nodes the table was built for.
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// The variable of edge `i -> j`. Diagonal entries have none: a
    /// self-loop can never be selected.
    pub fn get(&self, i: usize, j: usize) -> Option<&Variable> {
        self.vars[i * self.n + j].as_ref()
    }

    fn set(&mut self, i: usize, j: usize, var: Variable) {
        self.vars[i * self.n + j] = Some(var);
    }
}

/// Separators and presolving stay off: lazily generated constraints mean
/// the usual global reductions are not valid up front.
fn base_model(params: &Params) -> Model<ProblemCreated> {
    let mut model = minimal_model();
    if !params.verbose {
        model = model.hide_output();
    }
    if let Some(limit) = params.time_limit {
        model = model.set_time_limit(limit);
    }
    model
}

fn add_edge_vars(
    model: &mut Model<ProblemCreated>,
    weights: &WeightMatrix,
    objective: impl Fn(usize, usize) -> f64,
) -> EdgeVars {
    let n = weights.dim();
    let mut vars = EdgeVars::new(n);
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let name = format!("x_{i}_{j}");
            let v = model.add(var().bin().obj(objective(i, j)).name(&name));
            vars.set(i, j, v);
        }
    }
    // Forbidden edges keep their variable but are pinned to zero.
    for i in 0..n {
        for j in 0..n {
            if i != j && weights.weight(i, j).is_none() {
                let v = vars.get(i, j).expect("off-diagonal variable exists");
                model.add(cons().eq(0.0).coef(v, 1.0));
            }
        }
    }
    vars
}

/// Builds the bounded-cycle-cover base model: out-degree at most one,
/// balanced in/out degree per node, forbidden edges pinned to zero.
///
/// Weights enter the objective negated so SCIP's minimizing objective
/// yields the maximum-weight cover; the driver flips the sign back when
/// reporting.
pub(crate) fn build_cover_model(
    weights: &WeightMatrix,
    params: &Params,
) -> (Model<ProblemCreated>, EdgeVars) {
    let n = weights.dim();
    let mut model = base_model(params);
    let vars = add_edge_vars(&mut model, weights, |i, j| {
        -weights.weight(i, j).unwrap_or(0.0)
    });

    for i in 0..n {
        let mut out_degree = cons().le(1.0);
        for j in 0..n {
            if let Some(v) = vars.get(i, j) {
                out_degree = out_degree.coef(v, 1.0);
            }
        }
        model.add(out_degree);

        // Incoming minus outgoing edges sum to zero.
        let mut balance = cons().eq(0.0);
        for j in 0..n {
            if let Some(v) = vars.get(j, i) {
                balance = balance.coef(v, 1.0);
            }
            if let Some(v) = vars.get(i, j) {
                balance = balance.coef(v, -1.0);
            }
        }
        model.add(balance);
    }

    debug!(nodes = n, "built cycle cover model");
    (model, vars)
}

/// Builds the tour base model: every node has exactly one outgoing and
/// one incoming selected edge, objective minimizes total cost.
pub(crate) fn build_tour_model(
    costs: &WeightMatrix,
    params: &Params,
) -> (Model<ProblemCreated>, EdgeVars) {
    let n = costs.dim();
    let mut model = base_model(params);
    let vars = add_edge_vars(&mut model, costs, |i, j| {
        costs.weight(i, j).unwrap_or(0.0)
    });

    for i in 0..n {
        let mut out_degree = cons().eq(1.0);
        let mut in_degree = cons().eq(1.0);
        for j in 0..n {
            if let Some(v) = vars.get(i, j) {
                out_degree = out_degree.coef(v, 1.0);
            }
            if let Some(v) = vars.get(j, i) {
                in_degree = in_degree.coef(v, 1.0);
            }
        }
        model.add(out_degree);
        model.add(in_degree);
    }

    debug!(nodes = n, "built tour model");
    (model, vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::is_selected;

    #[test]
    fn cover_model_minimizes_negated_weights() {
        // Two nodes, both edges allowed: the 2-cycle is optimal and the
        // raw objective carries the negated weight sum.
        let weights =
            WeightMatrix::from_edges(2, &[(0, 1, 1.0), (1, 0, 1.0)]).unwrap();
        let (model, vars) = build_cover_model(&weights, &Params::default());
        let solved = model.solve();
        assert_eq!(solved.status(), Status::Optimal);
        assert_eq!(solved.obj_val(), -2.0);

        let solution = solved.best_sol().unwrap();
        assert!(is_selected(solution.val(vars.get(0, 1).unwrap())));
        assert!(is_selected(solution.val(vars.get(1, 0).unwrap())));
    }

    #[test]
    fn cover_model_pins_forbidden_edges_to_zero() {
        // Only 0 -> 1 is compatible; alone it cannot close a cycle, so
        // the balance constraint forces the empty cover.
        let weights = WeightMatrix::from_edges(2, &[(0, 1, 5.0)]).unwrap();
        let (model, vars) = build_cover_model(&weights, &Params::default());
        let solved = model.solve();
        assert_eq!(solved.status(), Status::Optimal);
        assert_eq!(solved.obj_val(), 0.0);

        let solution = solved.best_sol().unwrap();
        assert!(!is_selected(solution.val(vars.get(0, 1).unwrap())));
        assert!(!is_selected(solution.val(vars.get(1, 0).unwrap())));
    }

    #[test]
    fn tour_model_selects_both_edges_of_a_two_node_instance() {
        let costs =
            WeightMatrix::from_rows(&[vec![0.0, 3.0], vec![4.0, 0.0]]).unwrap();
        let (model, vars) = build_tour_model(&costs, &Params::default());
        let solved = model.solve();
        assert_eq!(solved.status(), Status::Optimal);
        assert_eq!(solved.obj_val(), 7.0);

        let solution = solved.best_sol().unwrap();
        assert!(is_selected(solution.val(vars.get(0, 1).unwrap())));
        assert!(is_selected(solution.val(vars.get(1, 0).unwrap())));
    }

    #[test]
    fn edge_vars_have_no_diagonal() {
        let weights = WeightMatrix::from_edges(3, &[(0, 1, 1.0)]).unwrap();
        let (_model, vars) = build_cover_model(&weights, &Params::default());
        for i in 0..3 {
            assert!(vars.get(i, i).is_none());
        }
        assert!(vars.get(0, 1).is_some());
    }
}
