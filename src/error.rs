use russcip::Status;
use thiserror::Error;

/// Errors surfaced by instance validation, model construction, and the
/// branch-and-cut drivers.
#[derive(Debug, Error)]
pub enum Error {
    /// An edge referenced a node outside `[0, n)`.
    #[error("node {node} is out of range for an instance with {n} nodes")]
    NodeOutOfRange { node: usize, n: usize },

    /// A dense matrix was not square.
    #[error("expected a square matrix with {expected} columns per row, got a row of length {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The instance has no nodes.
    #[error("the instance has no nodes")]
    EmptyInstance,

    /// A candidate assignment gave some node more than one selected
    /// outgoing edge, or unbalanced degrees. The base model makes this
    /// impossible, so it means the solver did not honor its constraints.
    #[error("candidate assignment breaks the degree contract at node {node}")]
    DegreeContract { node: usize },

    /// The accepted solution does not satisfy the structural rule. The
    /// constraint handler checks every incumbent, so this points at an
    /// incorrectly derived cut, not at the input.
    #[error("accepted solution violates the structural rule")]
    StructuralViolation,

    /// The search stopped before proving optimality.
    #[error("solver stopped with status {0:?}")]
    SolverStatus(Status),

    /// The solver reported optimality but returned no solution.
    #[error("no solution available after optimization")]
    NoSolution,
}
