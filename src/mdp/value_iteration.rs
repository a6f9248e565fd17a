//! Value iteration over a [`GridWorld`].
//!
//! Each sweep computes a fresh value array from the previous one, so the
//! order in which states are visited never affects the result. The solver
//! keeps every pre-sweep value array as an owned snapshot for later lookback.

use log::{debug, info, warn};
use ndarray::Array2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::mdp::config::SolverConfig;
use crate::mdp::grid_world::{Action, GridWorld, State};

/// Marker for ordinary cells with no policy action.
pub const NEUTRAL_MARKER: char = '·';
/// Marker written over every obstacle cell.
pub const OBSTACLE_MARKER: char = 'X';
pub const GOAL_MARKER: char = 'G';
pub const FIRE_MARKER: char = 'F';

/// Outcome of one Bellman sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    /// Values after the sweep
    pub values: Array2<f64>,
    /// Largest absolute change of any state's value
    pub max_change: f64,
}

/// Summary returned by [`ValueIterationSolver::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Number of sweeps executed
    pub iterations: usize,
    /// Whether `max_change` fell below theta before the cap was reached
    pub converged: bool,
    /// `max_change` of the last sweep
    pub max_change: f64,
}

/// Value iteration solver borrowing a read-only environment.
#[derive(Debug)]
pub struct ValueIterationSolver<'a> {
    env: &'a GridWorld,
    gamma: f64,
    theta: f64,
    max_iterations: usize,
    values: Array2<f64>,
    policy: Array2<Option<Action>>,
    history: Vec<Array2<f64>>,
}

impl<'a> ValueIterationSolver<'a> {
    /// Creates a solver with every value at 0.0 and records that initial
    /// value function as `history[0]`.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if the solver parameters are invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridworld_vi::mdp::{GridConfig, GridWorld, SolverConfig, State, ValueIterationSolver};
    ///
    /// let env = GridWorld::new(&GridConfig::default()).unwrap();
    /// let mut solver = ValueIterationSolver::new(&env, SolverConfig::default()).unwrap();
    /// let report = solver.run(None);
    ///
    /// assert!(report.converged);
    /// assert_eq!(solver.history_len(), report.iterations + 1);
    /// assert!(solver.policy_at(State::new(0, 0)).is_some());
    /// ```
    pub fn new(env: &'a GridWorld, config: SolverConfig) -> Result<Self> {
        config.validate()?;

        let shape = (env.rows(), env.cols());
        let values = Array2::zeros(shape);
        let history = vec![values.clone()];

        info!(
            "value iteration over {}x{} grid: {} states, gamma={}, theta={}",
            env.rows(),
            env.cols(),
            env.get_all_states().len(),
            config.gamma,
            config.theta
        );

        Ok(Self {
            env,
            gamma: config.gamma,
            theta: config.theta,
            max_iterations: config.max_iterations,
            values,
            policy: Array2::from_elem(shape, None),
            history,
        })
    }

    pub fn env(&self) -> &'a GridWorld {
        self.env
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Current value function.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn value(&self, state: State) -> f64 {
        self.values[state.index()]
    }

    /// Current policy, `None` where no action applies.
    pub fn policy(&self) -> &Array2<Option<Action>> {
        &self.policy
    }

    pub fn policy_at(&self, state: State) -> Option<Action> {
        self.policy[state.index()]
    }

    pub fn history(&self) -> &[Array2<f64>] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Q(s, a) against the given value array.
    ///
    /// Stepping into a terminal cell pays that cell's reward with no future
    /// term. Any other step pays the reward of the source cell plus the
    /// discounted value of the destination.
    fn q_from(&self, values: &Array2<f64>, state: State, action: Action) -> f64 {
        let next = self.env.get_next_state(state, action);
        if self.env.is_terminal(next) {
            self.env.get_reward(next)
        } else {
            self.env.get_reward(state) + self.gamma * values[next.index()]
        }
    }

    /// Q(s, a) against the current value function.
    ///
    /// # Panics
    /// Panics if `action` is not legal in `state`.
    pub fn q_value(&self, state: State, action: Action) -> f64 {
        self.q_from(&self.values, state, action)
    }

    /// Best Q-value over the legal actions, or `None` for terminal and
    /// enclosed states.
    fn backup(&self, values: &Array2<f64>, state: State) -> Option<f64> {
        if self.env.is_terminal(state) {
            return None;
        }
        let actions = self.env.get_possible_actions(state);
        if actions.is_empty() {
            return None;
        }
        Some(
            actions
                .into_iter()
                .map(|action| self.q_from(values, state, action))
                .fold(f64::NEG_INFINITY, f64::max),
        )
    }

    /// Sweeps `states` against `values`. Updates only read `values`, so the
    /// result does not depend on the order of `states`.
    pub(crate) fn sweep_states(&self, values: &Array2<f64>, states: &[State]) -> Sweep {
        #[cfg(feature = "parallel")]
        let updates: Vec<(State, f64)> = states
            .par_iter()
            .filter_map(|&state| self.backup(values, state).map(|v| (state, v)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let updates: Vec<(State, f64)> = states
            .iter()
            .filter_map(|&state| self.backup(values, state).map(|v| (state, v)))
            .collect();

        let mut next = values.clone();
        let mut max_change = 0.0_f64;
        for (state, value) in updates {
            max_change = max_change.max((value - values[state.index()]).abs());
            next[state.index()] = value;
        }

        Sweep {
            values: next,
            max_change,
        }
    }

    /// One Bellman sweep from the current value function. Does not modify
    /// the solver.
    pub fn bellman_sweep(&self) -> Sweep {
        self.sweep_states(&self.values, &self.env.get_all_states())
    }

    /// Runs value iteration until the largest change in a sweep drops below
    /// theta, or until `max_iterations` sweeps have run (the configured cap
    /// when `None`). Extracts the greedy policy before returning. At least one
    /// sweep always runs, so `Some(0)` behaves like `Some(1)`.
    ///
    /// Hitting the cap is not an error; the report has `converged == false`
    /// and the values and policy are still usable.
    pub fn run(&mut self, max_iterations: Option<usize>) -> SolveReport {
        let max_iterations = max_iterations.unwrap_or(self.max_iterations).max(1);
        let states = self.env.get_all_states();

        let mut iterations = 0;
        let mut max_change = 0.0;
        let mut converged = false;

        while iterations < max_iterations {
            iterations += 1;
            let sweep = self.sweep_states(&self.values, &states);
            max_change = sweep.max_change;

            let previous = std::mem::replace(&mut self.values, sweep.values);
            self.history.push(previous);

            debug!("iteration {}: max_change = {:.6}", iterations, max_change);

            if max_change < self.theta {
                converged = true;
                break;
            }
        }

        if converged {
            info!(
                "converged after {} iterations (theta = {})",
                iterations, self.theta
            );
        } else {
            warn!(
                "reached maximum iterations ({}) without convergence: max_change = {:.6}, theta = {}",
                max_iterations, max_change, self.theta
            );
        }

        self.extract_policy();

        SolveReport {
            iterations,
            converged,
            max_change,
        }
    }

    /// Greedy policy against the current value function. Actions are scanned
    /// in canonical order and only a strictly better Q-value replaces the
    /// current best, so ties go to the earliest action.
    pub fn extract_policy(&mut self) {
        let mut policy = Array2::from_elem(self.policy.raw_dim(), None);

        for state in self.env.get_all_states() {
            if self.env.is_terminal(state) {
                continue;
            }

            let mut best_action = None;
            let mut best_value = f64::NEG_INFINITY;
            for action in self.env.get_possible_actions(state) {
                let q = self.q_value(state, action);
                if q > best_value {
                    best_value = q;
                    best_action = Some(action);
                }
            }
            policy[state.index()] = best_action;
        }

        self.policy = policy;
    }

    /// Value function as a grid, taken from `history[iteration]` when an
    /// iteration is given and from the current values otherwise. Obstacle
    /// cells are 0.0.
    ///
    /// # Errors
    /// Returns `Error::IterationOutOfRange` if `iteration` is not an index
    /// into the history.
    pub fn get_value_grid(&self, iteration: Option<usize>) -> Result<Array2<f64>> {
        match iteration {
            None => Ok(self.values.clone()),
            Some(i) => self
                .history
                .get(i)
                .cloned()
                .ok_or(Error::IterationOutOfRange {
                    requested: i,
                    available: self.history.len(),
                }),
        }
    }

    /// Policy as a grid of markers: an arrow for each policy action, `G` and
    /// `F` for the terminal cells, `·` for cells with no action, and `X` on
    /// every obstacle regardless of the rest.
    pub fn get_policy_grid(&self) -> Array2<char> {
        let mut grid = Array2::from_elem((self.env.rows(), self.env.cols()), ' ');

        for state in self.env.get_all_states() {
            grid[state.index()] = match self.policy_at(state) {
                Some(action) => action.arrow(),
                None if state == self.env.goal() => GOAL_MARKER,
                None if self.env.fire() == Some(state) => FIRE_MARKER,
                None => NEUTRAL_MARKER,
            };
        }

        for obstacle in self.env.obstacles() {
            grid[obstacle.index()] = OBSTACLE_MARKER;
        }

        grid
    }
}
