//! Value iteration over a deterministic grid-world Markov Decision Process.
//!
//! A [`GridWorld`] describes the grid, its terminal goal and fire cells and its
//! obstacles. A [`ValueIterationSolver`] runs Bellman sweeps over it until the
//! value function settles, then extracts a greedy policy. Every pre-sweep
//! value function is kept so callers can look back at any iteration.

pub mod error;
pub mod mdp;

pub use error::{Error, Result};
pub use mdp::{
    Action, GridConfig, GridWorld, Rewards, SolveReport, SolverConfig, State, Sweep,
    ValueIterationSolver,
};
