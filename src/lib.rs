//! Branch-and-cut solvers for two asymmetric cycle problems, built on the
//! SCIP interface of [`russcip`]:
//!
//! * [`solve_cycle_cover`] — a maximum-weight cycle cover where every
//!   selected cycle has at most a given number of edges,
//! * [`solve_tsp`] — a minimum-cost directed Hamiltonian cycle,
//! * [`solve_shortest_hamiltonian_path`] — the path variant, reduced to a
//!   TSP by adding a zero-cost dummy node.
//!
//! Both variants share one mechanism: the base model only enforces degree
//! constraints, so every integer-feasible candidate decomposes into
//! vertex-disjoint cycles. A constraint handler inspects each candidate,
//! detects the cycles that break the structural rule (too long, or not
//! spanning all nodes), and adds one subtour elimination inequality per
//! violating cycle without restarting the search.
//!
//! ```no_run
//! use cyclecut::{Params, WeightMatrix, solve_cycle_cover};
//!
//! let weights = WeightMatrix::from_edges(
//!     4,
//!     &[(0, 1, 3.0), (1, 0, 3.0), (2, 3, 5.0), (3, 2, 5.0)],
//! )?;
//! let cover = solve_cycle_cover(&weights, 2, &Params::default())?;
//! assert_eq!(cover.objective, 16.0);
//! # Ok::<(), cyclecut::Error>(())
//! ```

pub mod cuts;
pub mod decompose;
mod error;
pub mod matrix;
pub mod model;
pub mod solve;

pub use cuts::{Cut, StructuralRule};
pub use decompose::{Candidate, Cycle, Decomposition, decompose};
pub use error::Error;
pub use matrix::WeightMatrix;
pub use solve::{
    CoverSolution, Params, PathSolution, TourSolution, solve_cycle_cover,
    solve_shortest_hamiltonian_path, solve_tsp,
};
