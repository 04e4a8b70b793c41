//! Branch-and-cut drivers for both problem variants.
//!
//! The driver registers a constraint handler with SCIP and hands over
//! control: every time the search reaches an integer-feasible point the
//! handler snapshots the candidate, decomposes it into cycles, and adds
//! one subtour elimination inequality per violating cycle. The search
//! continues under the grown constraint set until SCIP proves optimality
//! over it; at that point the incumbent satisfies the structural rule.

use russcip::prelude::*;
use russcip::{Conshdlr, ConshdlrResult, SCIPConshdlr, Solution, Solving};
use tracing::{debug, info};

use crate::Error;
use crate::cuts::{StructuralRule, generate_cuts};
use crate::decompose::{Candidate, decompose, is_selected};
use crate::matrix::WeightMatrix;
use crate::model::{EdgeVars, build_cover_model, build_tour_model};

pub use crate::model::Params;

/// A solved bounded cycle cover.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverSolution {
    /// Total weight of the selected edges. The model minimizes negated
    /// weights, so this is the sign-corrected true maximum.
    pub objective: f64,
    /// The selected edges, in row-major order.
    pub edges: Vec<(usize, usize)>,
}

/// A minimum-cost directed Hamiltonian cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TourSolution {
    /// Total cost of the tour edges.
    pub cost: f64,
    /// The nodes in tour order, starting at node 0; the closing edge back
    /// to the first node is implied.
    pub order: Vec<usize>,
}

/// A minimum-cost Hamiltonian path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSolution {
    /// Total cost of the path edges.
    pub cost: f64,
    /// The nodes in path order, endpoints first and last.
    pub order: Vec<usize>,
}

/// Enforces the structural rule by lazily cutting off violating cycles.
///
/// Each invocation works on one immutable candidate snapshot; the only
/// state reaching across invocations is the constraint set owned by SCIP
/// (and a cut counter for logging).
struct CycleConshdlr {
    vars: EdgeVars,
    rule: StructuralRule,
    cuts_added: usize,
}

impl CycleConshdlr {
    fn new(vars: EdgeVars, rule: StructuralRule) -> Self {
        CycleConshdlr {
            vars,
            rule,
            cuts_added: 0,
        }
    }

    fn candidate_of_solution(&self, solution: &Solution) -> Candidate {
        Candidate::from_values(self.vars.node_count(), |i, j| {
            self.vars.get(i, j).map_or(0.0, |v| solution.val(v))
        })
    }

    fn candidate_of_lp(&self, model: &Model<Solving>) -> Candidate {
        Candidate::from_values(self.vars.node_count(), |i, j| {
            self.vars.get(i, j).map_or(0.0, |v| model.current_val(v))
        })
    }
}

impl Conshdlr for CycleConshdlr {
    fn check(
        &mut self,
        _model: Model<Solving>,
        _conshdlr: SCIPConshdlr,
        solution: &Solution,
    ) -> bool {
        let candidate = self.candidate_of_solution(solution);
        // Check may run before the linear degree rows are checked, so a
        // heuristic point can still break the degree invariant; such a
        // point is infeasible for the base model and is simply rejected.
        match generate_cuts(&candidate, self.rule) {
            Ok(cuts) => cuts.is_empty(),
            Err(_) => false,
        }
    }

    fn enforce(&mut self, mut model: Model<Solving>, _conshdlr: SCIPConshdlr) -> ConshdlrResult {
        let candidate = self.candidate_of_lp(&model);
        let cuts = generate_cuts(&candidate, self.rule)
            .unwrap_or_else(|err| panic!("solver broke the model contract: {err}"));
        if cuts.is_empty() {
            return ConshdlrResult::Feasible;
        }
        for cut in &cuts {
            let mut builder = cons().le(cut.rhs);
            for &(i, j) in &cut.edges {
                // A missing variable would mean the cut was derived from
                // a cycle outside the model, which is an internal bug.
                let v = self.vars.get(i, j).expect("cut references a modeled edge");
                builder = builder.coef(v, 1.0);
            }
            model.add(builder);
        }
        self.cuts_added += cuts.len();
        debug!(
            new = cuts.len(),
            total = self.cuts_added,
            "added subtour elimination cuts"
        );
        ConshdlrResult::ConsAdded
    }
}

/// Solves the maximum-weight cycle cover with every cycle bounded by
/// `max_loop_len` edges.
///
/// A bound below two admits no cycle at all, so the empty cover is
/// returned without invoking the solver.
pub fn solve_cycle_cover(
    weights: &WeightMatrix,
    max_loop_len: usize,
    params: &Params,
) -> Result<CoverSolution, Error> {
    let n = weights.dim();
    if n == 0 {
        return Err(Error::EmptyInstance);
    }
    if max_loop_len < 2 {
        return Ok(CoverSolution {
            objective: 0.0,
            edges: Vec::new(),
        });
    }

    let (mut model, vars) = build_cover_model(weights, params);
    model.include_conshdlr(
        "loop_len",
        "cuts off cycles longer than the allowed loop length",
        -1,
        -1,
        Box::new(CycleConshdlr::new(
            vars.clone(),
            StructuralRule::MaxLoopLen(max_loop_len),
        )),
    );

    let solved = model.solve();
    if solved.status() != Status::Optimal {
        return Err(Error::SolverStatus(solved.status()));
    }
    let solution = solved.best_sol().ok_or(Error::NoSolution)?;

    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if let Some(v) = vars.get(i, j) {
                if is_selected(solution.val(v)) {
                    edges.push((i, j));
                }
            }
        }
    }
    // Weights entered the model negated; flip the sign back to report
    // the true maximum. An empty cover reports exactly 0.0.
    let objective = 0.0 - solution.obj_val();
    info!(objective, n_edges = edges.len(), "cycle cover solved");
    Ok(CoverSolution { objective, edges })
}

/// Solves the minimum-cost directed Hamiltonian cycle over all nodes.
pub fn solve_tsp(costs: &WeightMatrix, params: &Params) -> Result<TourSolution, Error> {
    let n = costs.dim();
    if n == 0 {
        return Err(Error::EmptyInstance);
    }
    if n == 1 {
        // A single node is trivially toured without edges.
        return Ok(TourSolution {
            cost: 0.0,
            order: vec![0],
        });
    }

    let (mut model, vars) = build_tour_model(costs, params);
    model.include_conshdlr(
        "single_tour",
        "cuts off candidates splitting into more than one cycle",
        -1,
        -1,
        Box::new(CycleConshdlr::new(vars.clone(), StructuralRule::SingleTour)),
    );

    let solved = model.solve();
    if solved.status() != Status::Optimal {
        return Err(Error::SolverStatus(solved.status()));
    }
    let solution = solved.best_sol().ok_or(Error::NoSolution)?;

    // Recover the tour order by decomposing the accepted solution; the
    // walk starts at node 0, so the order does too.
    let candidate = Candidate::from_values(vars.node_count(), |i, j| {
        vars.get(i, j).map_or(0.0, |v| solution.val(v))
    });
    let decomposition = decompose(&candidate)?;
    let cycle = match decomposition.cycles() {
        [cycle] if decomposition.singletons().is_empty() => cycle,
        _ => return Err(Error::StructuralViolation),
    };

    let cost = solution.obj_val();
    info!(cost, nodes = n, "tour solved");
    Ok(TourSolution {
        cost,
        order: cycle.nodes().to_vec(),
    })
}

/// Solves the shortest Hamiltonian path by reduction to a TSP with one
/// zero-cost dummy node.
///
/// The dummy's two tour edges cost nothing and are discarded from the
/// reported path; its tour neighbors become the path endpoints.
pub fn solve_shortest_hamiltonian_path(
    costs: &WeightMatrix,
    params: &Params,
) -> Result<PathSolution, Error> {
    let n = costs.dim();
    if n == 0 {
        return Err(Error::EmptyInstance);
    }
    if n == 1 {
        return Ok(PathSolution {
            cost: 0.0,
            order: vec![0],
        });
    }

    let tour = solve_tsp(&costs.with_dummy_node(), params)?;

    // The dummy sits at index n; the tour is cyclic, so split it there.
    let dummy = tour
        .order
        .iter()
        .position(|&v| v == n)
        .ok_or(Error::StructuralViolation)?;
    let order: Vec<usize> = tour.order[dummy + 1..]
        .iter()
        .chain(tour.order[..dummy].iter())
        .copied()
        .collect();

    // Both dummy edges cost zero, so the tour cost is the path cost.
    Ok(PathSolution {
        cost: tour.cost,
        order,
    })
}
