//! Configuration values for the grid world and the value iteration solver.
//!
//! Both structs default to the reference setup: a 4x4 grid with the goal in
//! the top-right corner, fire directly below it and a single obstacle.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::mdp::grid_world::State;

/// Smallest supported grid side.
pub const MIN_GRID_DIM: usize = 2;
/// Largest supported grid side.
pub const MAX_GRID_DIM: usize = 20;

/// Reward constants attached to the special cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    /// Reward for stepping into the goal
    pub goal: f64,
    /// Reward for stepping into the fire
    pub fire: f64,
    /// Reward carried by every ordinary cell
    pub step: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            goal: 1.0,
            fire: -1.0,
            step: 0.0,
        }
    }
}

/// Layout of the grid world.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub goal: State,
    pub fire: Option<State>,
    pub obstacles: Vec<State>,
    /// Informational only; the solver covers every state.
    pub start: Option<State>,
    pub rewards: Rewards,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            goal: State::new(0, 3),
            fire: Some(State::new(1, 3)),
            obstacles: vec![State::new(1, 1)],
            start: Some(State::new(3, 0)),
            rewards: Rewards::default(),
        }
    }
}

impl GridConfig {
    /// Creates a configuration with the given layout and default rewards.
    pub fn new(rows: usize, cols: usize, goal: State) -> Self {
        Self {
            rows,
            cols,
            goal,
            fire: None,
            obstacles: Vec::new(),
            start: None,
            rewards: Rewards::default(),
        }
    }

    pub fn with_fire(mut self, fire: State) -> Self {
        self.fire = Some(fire);
        self
    }

    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = State>) -> Self {
        self.obstacles = obstacles.into_iter().collect();
        self
    }

    pub fn with_start(mut self, start: State) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_rewards(mut self, rewards: Rewards) -> Self {
        self.rewards = rewards;
        self
    }

    fn in_bounds(&self, state: State) -> bool {
        state.row < self.rows && state.col < self.cols
    }

    fn check_bounds(&self, role: &'static str, state: State) -> Result<()> {
        if self.in_bounds(state) {
            Ok(())
        } else {
            Err(Error::OutOfBounds { role, state })
        }
    }

    /// Checks dimensions, placement of the special cells and reward values.
    ///
    /// # Errors
    /// Returns the first violation found: dimensions outside
    /// `MIN_GRID_DIM..=MAX_GRID_DIM`, a special cell outside the grid, fire on
    /// the goal, an obstacle on the goal or fire, a repeated obstacle, a start
    /// cell that is not an ordinary cell, or a non-finite reward.
    pub fn validate(&self) -> Result<()> {
        let dims = MIN_GRID_DIM..=MAX_GRID_DIM;
        if !dims.contains(&self.rows) || !dims.contains(&self.cols) {
            return Err(Error::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        self.check_bounds("goal", self.goal)?;

        if let Some(fire) = self.fire {
            self.check_bounds("fire", fire)?;
            if fire == self.goal {
                return Err(Error::Collision {
                    role: "fire",
                    other: "goal",
                    state: fire,
                });
            }
        }

        let mut seen = HashSet::with_capacity(self.obstacles.len());
        for &obstacle in &self.obstacles {
            self.check_bounds("obstacle", obstacle)?;
            if obstacle == self.goal {
                return Err(Error::Collision {
                    role: "obstacle",
                    other: "goal",
                    state: obstacle,
                });
            }
            if self.fire == Some(obstacle) {
                return Err(Error::Collision {
                    role: "obstacle",
                    other: "fire",
                    state: obstacle,
                });
            }
            if !seen.insert(obstacle) {
                return Err(Error::DuplicateObstacle(obstacle));
            }
        }

        if let Some(start) = self.start {
            self.check_bounds("start", start)?;
            let other = if start == self.goal {
                Some("goal")
            } else if self.fire == Some(start) {
                Some("fire")
            } else if seen.contains(&start) {
                Some("obstacle")
            } else {
                None
            };
            if let Some(other) = other {
                return Err(Error::Collision {
                    role: "start",
                    other,
                    state: start,
                });
            }
        }

        let Rewards { goal, fire, step } = self.rewards;
        if !(goal.is_finite() && fire.is_finite() && step.is_finite()) {
            return Err(Error::invalid_input("rewards must be finite"));
        }

        Ok(())
    }
}

/// Parameters of the value iteration loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Discount factor (0 <= gamma <= 1)
    pub gamma: f64,
    /// Convergence threshold on the largest per-sweep change
    pub theta: f64,
    /// Iteration cap used when `run` is given no explicit limit
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            theta: 0.001,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    pub fn new(gamma: f64, theta: f64, max_iterations: usize) -> Self {
        Self {
            gamma,
            theta,
            max_iterations,
        }
    }

    /// # Errors
    /// Returns `Error::InvalidInput` if gamma is outside `[0, 1]`, theta is not
    /// a positive finite number, or `max_iterations` is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::invalid_input(format!(
                "discount factor gamma must be between 0 and 1, got {}",
                self.gamma
            )));
        }
        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(Error::invalid_input(format!(
                "convergence threshold theta must be positive, got {}",
                self.theta
            )));
        }
        if self.max_iterations < 1 {
            return Err(Error::invalid_input(
                "max_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_is_valid() {
        assert!(GridConfig::default().validate().is_ok());
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_dimensions() {
        let config = GridConfig::new(1, 4, State::new(0, 0));
        assert_eq!(
            config.validate(),
            Err(Error::InvalidDimensions { rows: 1, cols: 4 })
        );

        let config = GridConfig::new(21, 4, State::new(0, 0));
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidDimensions { .. })
        ));

        assert!(GridConfig::new(20, 2, State::new(19, 1)).validate().is_ok());
    }

    #[test]
    fn test_out_of_bounds_special_cells() {
        let config = GridConfig::new(3, 3, State::new(3, 0));
        assert_eq!(
            config.validate(),
            Err(Error::OutOfBounds {
                role: "goal",
                state: State::new(3, 0)
            })
        );

        let config = GridConfig::new(3, 3, State::new(0, 0)).with_fire(State::new(0, 3));
        assert!(matches!(
            config.validate(),
            Err(Error::OutOfBounds { role: "fire", .. })
        ));

        let config =
            GridConfig::new(3, 3, State::new(0, 0)).with_obstacles([State::new(5, 5)]);
        assert!(matches!(
            config.validate(),
            Err(Error::OutOfBounds {
                role: "obstacle",
                ..
            })
        ));
    }

    #[test]
    fn test_collisions() {
        let config = GridConfig::new(3, 3, State::new(0, 0)).with_fire(State::new(0, 0));
        assert_eq!(
            config.validate(),
            Err(Error::Collision {
                role: "fire",
                other: "goal",
                state: State::new(0, 0)
            })
        );

        let config = GridConfig::new(3, 3, State::new(0, 0))
            .with_fire(State::new(1, 1))
            .with_obstacles([State::new(1, 1)]);
        assert!(matches!(
            config.validate(),
            Err(Error::Collision {
                role: "obstacle",
                other: "fire",
                ..
            })
        ));

        let config =
            GridConfig::new(3, 3, State::new(0, 0)).with_obstacles([State::new(0, 0)]);
        assert!(matches!(
            config.validate(),
            Err(Error::Collision {
                role: "obstacle",
                other: "goal",
                ..
            })
        ));

        let config = GridConfig::new(3, 3, State::new(0, 0))
            .with_obstacles([State::new(2, 2)])
            .with_start(State::new(2, 2));
        assert!(matches!(
            config.validate(),
            Err(Error::Collision {
                role: "start",
                other: "obstacle",
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_obstacle() {
        let config = GridConfig::new(3, 3, State::new(0, 0))
            .with_obstacles([State::new(1, 1), State::new(2, 1), State::new(1, 1)]);
        assert_eq!(
            config.validate(),
            Err(Error::DuplicateObstacle(State::new(1, 1)))
        );
    }

    #[test]
    fn test_non_finite_reward() {
        let rewards = Rewards {
            step: f64::NAN,
            ..Rewards::default()
        };
        let config = GridConfig::new(3, 3, State::new(0, 0)).with_rewards(rewards);
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_solver_parameters() {
        assert!(SolverConfig::new(1.0, 0.5, 1).validate().is_ok());
        assert!(SolverConfig::new(0.0, 0.5, 1).validate().is_ok());
        assert!(SolverConfig::new(1.1, 0.001, 100).validate().is_err());
        assert!(SolverConfig::new(-0.1, 0.001, 100).validate().is_err());
        assert!(SolverConfig::new(f64::NAN, 0.001, 100).validate().is_err());
        assert!(SolverConfig::new(0.9, 0.0, 100).validate().is_err());
        assert!(SolverConfig::new(0.9, f64::INFINITY, 100).validate().is_err());
        assert!(SolverConfig::new(0.9, 0.001, 0).validate().is_err());
    }
}
