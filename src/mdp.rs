pub mod config;
pub mod grid_world;
pub mod render;
pub mod value_iteration;


// Re-export the grid-world model and solver with descriptive names
pub use config::{GridConfig, Rewards, SolverConfig};
pub use grid_world::{Action, GridWorld, State};
pub use render::{render_policy, render_values};
pub use value_iteration::{SolveReport, Sweep, ValueIterationSolver};
