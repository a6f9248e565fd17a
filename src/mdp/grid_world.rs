//! A deterministic grid-world Markov Decision Process.
//!
//! The agent moves one cell at a time in one of four directions. The goal and
//! the optional fire cell are terminal, obstacles are impassable, and moves
//! off the grid or into an obstacle are simply not offered as actions.

use std::fmt;

use ndarray::Array2;

use crate::error::Result;
use crate::mdp::config::{GridConfig, Rewards};

/// A grid cell, addressed by 0-indexed row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    pub row: usize,
    pub col: usize,
}

impl State {
    pub const fn new(row: usize, col: usize) -> Self {
        State { row, col }
    }

    /// Index into a `rows x cols` array.
    pub fn index(&self) -> [usize; 2] {
        [self.row, self.col]
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for State {
    fn from((row, col): (usize, usize)) -> Self {
        State::new(row, col)
    }
}

/// One of the four unit moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Canonical action order. Ties in policy extraction go to the earliest.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Row and column offset of the move.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    pub fn arrow(&self) -> char {
        match self {
            Action::Up => '↑',
            Action::Down => '↓',
            Action::Left => '←',
            Action::Right => '→',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

/// The grid-world environment. Immutable once built.
#[derive(Debug, Clone)]
pub struct GridWorld {
    rows: usize,
    cols: usize,
    goal: State,
    fire: Option<State>,
    obstacles: Vec<State>,
    start: Option<State>,
    rewards: Rewards,
    blocked: Array2<bool>,
}

impl GridWorld {
    /// Builds the environment from a configuration.
    ///
    /// # Errors
    /// Returns the configuration error reported by [`GridConfig::validate`];
    /// nothing is constructed in that case.
    pub fn new(config: &GridConfig) -> Result<Self> {
        config.validate()?;

        let mut blocked = Array2::from_elem((config.rows, config.cols), false);
        for obstacle in &config.obstacles {
            blocked[obstacle.index()] = true;
        }

        Ok(GridWorld {
            rows: config.rows,
            cols: config.cols,
            goal: config.goal,
            fire: config.fire,
            obstacles: config.obstacles.clone(),
            start: config.start,
            rewards: config.rewards,
            blocked,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn goal(&self) -> State {
        self.goal
    }

    pub fn fire(&self) -> Option<State> {
        self.fire
    }

    pub fn obstacles(&self) -> &[State] {
        &self.obstacles
    }

    pub fn start(&self) -> Option<State> {
        self.start
    }

    pub fn rewards(&self) -> Rewards {
        self.rewards
    }

    pub fn is_obstacle(&self, state: State) -> bool {
        self.blocked.get(state.index()).copied().unwrap_or(false)
    }

    /// True if the cell is inside the grid and not an obstacle. Takes signed
    /// coordinates so that neighbours of edge cells can be probed directly.
    pub fn is_valid_state(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        row < self.rows && col < self.cols && !self.blocked[[row, col]]
    }

    pub fn is_terminal(&self, state: State) -> bool {
        state == self.goal || self.fire == Some(state)
    }

    fn neighbor(&self, state: State, action: Action) -> (isize, isize) {
        let (dr, dc) = action.delta();
        (state.row as isize + dr, state.col as isize + dc)
    }

    /// Legal actions from `state` in canonical order. Terminal states have none.
    pub fn get_possible_actions(&self, state: State) -> Vec<Action> {
        if self.is_terminal(state) {
            return Vec::new();
        }
        Action::ALL
            .into_iter()
            .filter(|&action| {
                let (row, col) = self.neighbor(state, action);
                self.is_valid_state(row, col)
            })
            .collect()
    }

    /// The cell reached by taking `action` from `state`.
    ///
    /// # Panics
    /// Panics if the move leaves the grid or enters an obstacle. Callers must
    /// only pass actions returned by [`GridWorld::get_possible_actions`].
    pub fn get_next_state(&self, state: State, action: Action) -> State {
        let (row, col) = self.neighbor(state, action);
        assert!(
            self.is_valid_state(row, col),
            "action {} is not available from state {}",
            action,
            state
        );
        State::new(row as usize, col as usize)
    }

    pub fn get_reward(&self, state: State) -> f64 {
        if state == self.goal {
            self.rewards.goal
        } else if self.fire == Some(state) {
            self.rewards.fire
        } else {
            self.rewards.step
        }
    }

    /// Every valid state in row-major order.
    pub fn get_all_states(&self) -> Vec<State> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| State::new(row, col)))
            .filter(|state| !self.blocked[state.index()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn reference_world() -> GridWorld {
        GridWorld::new(&GridConfig::default()).unwrap()
    }

    #[test]
    fn test_valid_states() {
        let env = reference_world();
        assert!(env.is_valid_state(0, 0));
        assert!(env.is_valid_state(3, 3));
        assert!(!env.is_valid_state(-1, 0));
        assert!(!env.is_valid_state(0, -1));
        assert!(!env.is_valid_state(4, 0));
        assert!(!env.is_valid_state(0, 4));
        assert!(!env.is_valid_state(1, 1));
        // Terminal cells are still valid states
        assert!(env.is_valid_state(0, 3));
        assert!(env.is_valid_state(1, 3));
    }

    #[test]
    fn test_terminal_states() {
        let env = reference_world();
        assert!(env.is_terminal(State::new(0, 3)));
        assert!(env.is_terminal(State::new(1, 3)));
        assert!(!env.is_terminal(State::new(0, 0)));

        let no_fire = GridWorld::new(&GridConfig::new(3, 3, State::new(0, 0))).unwrap();
        assert!(no_fire.is_terminal(State::new(0, 0)));
        assert!(!no_fire.is_terminal(State::new(1, 1)));
    }

    #[test]
    fn test_possible_actions() {
        let env = reference_world();
        assert_eq!(
            env.get_possible_actions(State::new(0, 0)),
            vec![Action::Down, Action::Right]
        );
        // (0, 1) sits above the obstacle
        assert_eq!(
            env.get_possible_actions(State::new(0, 1)),
            vec![Action::Left, Action::Right]
        );
        assert_eq!(
            env.get_possible_actions(State::new(2, 2)),
            vec![Action::Up, Action::Down, Action::Left, Action::Right]
        );
        assert!(env.get_possible_actions(State::new(0, 3)).is_empty());
        assert!(env.get_possible_actions(State::new(1, 3)).is_empty());
    }

    #[test]
    fn test_next_state() {
        let env = reference_world();
        let s = State::new(2, 2);
        assert_eq!(env.get_next_state(s, Action::Up), State::new(1, 2));
        assert_eq!(env.get_next_state(s, Action::Down), State::new(3, 2));
        assert_eq!(env.get_next_state(s, Action::Left), State::new(2, 1));
        assert_eq!(env.get_next_state(s, Action::Right), State::new(2, 3));
    }

    #[test]
    #[should_panic(expected = "not available")]
    fn test_next_state_off_grid_panics() {
        let env = reference_world();
        env.get_next_state(State::new(0, 0), Action::Up);
    }

    #[test]
    #[should_panic(expected = "not available")]
    fn test_next_state_into_obstacle_panics() {
        let env = reference_world();
        env.get_next_state(State::new(0, 1), Action::Down);
    }

    #[test]
    fn test_rewards() {
        let rewards = Rewards {
            goal: 10.0,
            fire: -5.0,
            step: -0.04,
        };
        let env = GridWorld::new(&GridConfig::default().with_rewards(rewards)).unwrap();
        assert_eq!(env.get_reward(State::new(0, 3)), 10.0);
        assert_eq!(env.get_reward(State::new(1, 3)), -5.0);
        assert_eq!(env.get_reward(State::new(2, 2)), -0.04);
    }

    #[test]
    fn test_all_states_row_major() {
        let env = reference_world();
        let states = env.get_all_states();
        assert_eq!(states.len(), 15);
        assert!(!states.contains(&State::new(1, 1)));
        assert_eq!(states[0], State::new(0, 0));
        assert_eq!(states[4], State::new(1, 0));
        assert_eq!(states[5], State::new(1, 2));
        let mut sorted = states.clone();
        sorted.sort();
        assert_eq!(states, sorted);
    }

    #[test]
    fn test_invalid_config_builds_nothing() {
        let config = GridConfig::new(3, 3, State::new(0, 0)).with_fire(State::new(0, 0));
        assert!(matches!(
            GridWorld::new(&config),
            Err(Error::Collision { .. })
        ));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Up.to_string(), "UP");
        assert_eq!(Action::Right.arrow(), '→');
        assert_eq!(State::new(2, 3).to_string(), "(2, 3)");
    }
}
