use thiserror::Error;

use crate::mdp::grid_world::State;

/// Errors produced while configuring or querying a grid-world solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("grid must be between 2x2 and 20x20, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("{role} state {state} is out of bounds")]
    OutOfBounds { role: &'static str, state: State },

    #[error("{role} state {state} collides with the {other} state")]
    Collision {
        role: &'static str,
        other: &'static str,
        state: State,
    },

    #[error("obstacle {0} was added more than once")]
    DuplicateObstacle(State),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("iteration {requested} is out of range, history holds {available} snapshots")]
    IterationOutOfRange { requested: usize, available: usize },
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
