//! protocol — the four-agent envy-free division procedure.
//!
//! Flow: equipartition by agent 1 → direct allocation attempt → α bisection
//! alternating the two structural conditions → deterministic terminal
//! allocation. Everything is a pure function of its inputs; the only state
//! is the numeric configuration threaded by reference.

pub mod allocation;
pub mod condition_a;
pub mod condition_b;
pub mod driver;
pub mod equipartition;

use serde::Serialize;
use thiserror::Error;

use crate::core::slice::AssignedSlice;
use crate::core::valuation::ValuationError;

pub use driver::divide;

/// Three ordered cut positions partitioning the cake into four pieces.
pub type Cuts = [f64; 3];

/// Raw bounds of piece `k` under a cut triple.
pub fn piece_range(cuts: &Cuts, k: usize, cake_size: f64) -> (f64, f64) {
    match k {
        0 => (0.0, cuts[0]),
        1 => (cuts[0], cuts[1]),
        2 => (cuts[1], cuts[2]),
        3 => (cuts[2], cake_size),
        _ => unreachable!("piece index {k} out of range"),
    }
}

/// One protocol decision, kept for the caller's trace.
#[derive(Clone, Debug, Serialize)]
pub struct Step {
    pub actor: usize,
    pub action: String,
}

/// A completed division: four owned slices plus the decision trace.
#[derive(Clone, Debug, Serialize)]
pub struct Division {
    pub slices: Vec<AssignedSlice>,
    pub steps: Vec<Step>,
}

/// Typed outcome of a failed division. `Exhausted` (the α loop never met a
/// condition) is distinguishable from numeric faults, which the reference
/// implementation collapsed into a bare `None`.
#[derive(Debug, Error)]
pub enum DivisionError {
    #[error("the protocol requires exactly 4 agents, got {got}")]
    WrongAgentCount { got: usize },
    #[error("invalid preference for agent {agent}: {reason}")]
    InvalidInput { agent: usize, reason: String },
    #[error("alpha search exhausted without meeting either condition")]
    Exhausted,
    #[error("a condition held at alpha {alpha} but no assignment is envy-free")]
    AllocationFailed { alpha: f64 },
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}
