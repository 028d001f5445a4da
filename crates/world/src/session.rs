// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A single agent on a single [`Grid`](crate::grid::Grid). `LocalSession` is
//! deliberately synchronous and side-effect free beyond its own fields: the
//! `ActionQueue` actor (see `queue.rs`) is what serializes access to it and
//! turns its [`SessionEvent`]s into world-visible notifications.

use crate::grid::{Cell, Grid};
use gridrunner_common::{Tile, Vector};
use std::sync::Arc;

/// Why a session died. Each variant's `message()` is the exact string carried
/// on the wire / in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathReason {
    WanderedOutOfMap,
    SteppedOnTrap,
    InactiveTooLong,
}

impl DeathReason {
    pub fn message(&self) -> &'static str {
        match self {
            DeathReason::WanderedOutOfMap => "Wandered out of the map",
            DeathReason::SteppedOnTrap => "Stepped on a trap",
            DeathReason::InactiveTooLong => "Inactive for too long",
        }
    }
}

/// An observation a `LocalSession` produces as a side effect of a move. The
/// actor that drives the session forwards these onto the world's event
/// stream; `LocalSession` itself holds no subscriber list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Moved { prev: Vector, curr: Vector },
    Died { reason: DeathReason },
}

/// The result of a single `Move` call, mirroring the wire-level
/// `{moved, alive, discovered}` triple plus whatever events it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    pub alive: bool,
    pub discovered: Option<Tile>,
    pub events: Vec<SessionEvent>,
}

impl MoveOutcome {
    fn rejected_dead() -> Self {
        Self {
            moved: false,
            alive: false,
            discovered: None,
            events: Vec::new(),
        }
    }

    fn rejected_inadmissible() -> Self {
        Self {
            moved: false,
            alive: true,
            discovered: None,
            events: Vec::new(),
        }
    }
}

pub struct LocalSession {
    grid: Arc<Grid>,
    alive: bool,
    location: Vector,
    discovered_tile: Option<Tile>,
}

impl LocalSession {
    pub fn new(grid: Arc<Grid>) -> Self {
        Self {
            grid,
            alive: true,
            location: Vector::ZERO,
            discovered_tile: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn location(&self) -> Vector {
        self.location
    }

    pub fn discovered_tile(&self) -> Option<Tile> {
        self.discovered_tile
    }

    /// Apply one admissible-move attempt. See §4.2: rejects immediately if
    /// already dead or if `v` is outside the nine-vector admissible set;
    /// otherwise translates the agent and checks the destination cell.
    pub fn move_agent(&mut self, v: Vector) -> MoveOutcome {
        if !self.alive {
            return MoveOutcome::rejected_dead();
        }
        if !gridrunner_common::is_admissible(v) {
            return MoveOutcome::rejected_inadmissible();
        }

        let prev = self.location;
        let curr = prev + v;
        self.location = curr;

        let mut events = vec![SessionEvent::Moved { prev, curr }];

        if !self.grid.in_bounds(curr.x, curr.y) {
            let reason = DeathReason::WanderedOutOfMap;
            self.alive = false;
            events.push(SessionEvent::Died { reason });
            return MoveOutcome {
                moved: true,
                alive: false,
                discovered: None,
                events,
            };
        }

        match self.grid.cell_at(curr.x, curr.y) {
            Some(Cell::Trap(tile)) => {
                self.discovered_tile = Some(tile);
                self.alive = false;
                events.push(SessionEvent::Died {
                    reason: DeathReason::SteppedOnTrap,
                });
                MoveOutcome {
                    moved: true,
                    alive: false,
                    discovered: Some(tile),
                    events,
                }
            }
            _ => MoveOutcome {
                moved: true,
                alive: true,
                discovered: None,
                events,
            },
        }
    }

    /// Forcibly kill the session (the idle-sweeper path). Idempotent at the
    /// state level: returns `Some(event)` only on the alive -> dead
    /// transition, never on a session already dead, so `Died` fires exactly
    /// once regardless of how many times `kill` is called.
    pub fn kill(&mut self, reason: DeathReason) -> Option<SessionEvent> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        Some(SessionEvent::Died { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use gridrunner_common::Tile;

    fn grid_3x3_with_trap_at_1_0() -> Arc<Grid> {
        let mut cells = vec![Cell::Empty; 9];
        cells[1] = Cell::Trap(Tile::trap());
        Arc::new(Grid::from_cells(3, 3, cells))
    }

    #[test]
    fn zero_move_on_safe_cell_leaves_state_unchanged_but_emits_moved() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        let outcome = session.move_agent(Vector::ZERO);
        assert!(outcome.moved);
        assert!(outcome.alive);
        assert_eq!(outcome.discovered, None);
        assert_eq!(session.location(), Vector::ZERO);
        assert_eq!(
            outcome.events,
            vec![SessionEvent::Moved {
                prev: Vector::ZERO,
                curr: Vector::ZERO
            }]
        );
    }

    #[test]
    fn inadmissible_vector_is_rejected_without_side_effects() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        let outcome = session.move_agent(Vector::new(3, 0));
        assert_eq!(
            outcome,
            MoveOutcome {
                moved: false,
                alive: true,
                discovered: None,
                events: vec![]
            }
        );
        assert_eq!(session.location(), Vector::ZERO);

        let outcome = session.move_agent(Vector::new(1, 1));
        assert!(!outcome.moved);
        assert!(outcome.alive);
    }

    #[test]
    fn stepping_out_of_bounds_kills_with_wandered_reason() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        let outcome = session.move_agent(Vector::new(-1, 0));
        assert!(outcome.moved);
        assert!(!outcome.alive);
        assert_eq!(outcome.discovered, None);
        assert!(!session.is_alive());
        assert_eq!(
            outcome.events.last(),
            Some(&SessionEvent::Died {
                reason: DeathReason::WanderedOutOfMap
            })
        );
    }

    #[test]
    fn stepping_on_a_trap_kills_and_reports_the_tile() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        let outcome = session.move_agent(Vector::new(1, 0));
        assert!(outcome.moved);
        assert!(!outcome.alive);
        assert_eq!(outcome.discovered, Some(Tile::trap()));
        assert_eq!(session.discovered_tile(), Some(Tile::trap()));
    }

    #[test]
    fn dead_session_rejects_further_moves_without_side_effects() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        session.move_agent(Vector::new(1, 0));
        assert!(!session.is_alive());
        let outcome = session.move_agent(Vector::new(0, 1));
        assert_eq!(outcome, MoveOutcome::rejected_dead());
    }

    #[test]
    fn kill_is_idempotent_and_fires_died_exactly_once() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        let first = session.kill(DeathReason::InactiveTooLong);
        assert_eq!(
            first,
            Some(SessionEvent::Died {
                reason: DeathReason::InactiveTooLong
            })
        );
        let second = session.kill(DeathReason::InactiveTooLong);
        assert_eq!(second, None);
    }

    #[test]
    fn safe_step_reports_no_discovered_tile() {
        let mut session = LocalSession::new(grid_3x3_with_trap_at_1_0());
        let outcome = session.move_agent(Vector::new(0, 1));
        assert!(outcome.alive);
        assert_eq!(outcome.discovered, None);
    }
}
