//! The day transition engine.
//!
//! One simulated day is a synchronous cellular-automaton step over the von Neumann
//! (four-neighbor) neighborhood, split into two parallel phases:
//!
//! 1. **Compute**: every cell's next-day state is derived from the *pre-day* `current` grid
//!    and written into the scratch `next` grid. The cell's own recovery countdown is updated
//!    in the same pass; neighbor reads only ever touch `current`, which is not written during
//!    this phase.
//! 2. **Commit**: `next` is copied into `current` and any cell that is not infected in `next`
//!    has its countdown forced to zero.
//!
//! Each phase is a parallel-for over rows, and the phase boundary is a barrier: the commit
//! cannot start until every row of `next` has been computed. Rows are handed out as disjoint
//! mutable slices, so each cell is written by exactly one task per phase.
//!
//! The rule itself, for a cell with `n` infected orthogonal neighbors:
//!
//! | Current state | Countdown | Next state | Next countdown |
//! |---|---|---|---|
//! | Infected | `> 1` | Infected | countdown - 1 |
//! | Infected | `<= 1` | Susceptible | 0 |
//! | Susceptible | `n > 1` | Infected | `omega` |
//! | Susceptible | `n <= 1` | Susceptible | unchanged |
use rayon::prelude::*;
use serde_derive::Serialize;

use crate::grid::{CellState, Grid};

/// A susceptible cell is infected when strictly more than this many orthogonal neighbors are
/// infected.
pub const INFECTION_NEIGHBOR_THRESHOLD: u8 = 1;

/// Counts of the state changes made by one day's transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayTransition {
    pub new_infections: u64,
    pub recoveries: u64,
}

impl DayTransition {
    fn merge(self, other: DayTransition) -> DayTransition {
        DayTransition {
            new_infections: self.new_infections + other.new_infections,
            recoveries: self.recoveries + other.recoveries,
        }
    }
}

/// Number of infected cells among the up, down, left and right neighbors of `(i, j)`.
/// Neighbors outside the grid are not counted; there is no wraparound, so corner cells have
/// two candidate neighbors and edge cells three.
#[must_use]
pub fn count_sick_neighbors(grid: &Grid<CellState>, i: usize, j: usize) -> u8 {
    let is_sick =
        |ni: usize, nj: usize| u8::from(grid.get(ni, nj).is_some_and(|s| s.is_infected()));

    let mut sick = 0;
    if i > 0 {
        sick += is_sick(i - 1, j);
    }
    sick += is_sick(i + 1, j);
    if j > 0 {
        sick += is_sick(i, j - 1);
    }
    sick += is_sick(i, j + 1);
    sick
}

/// Applies the transition rule to a single cell, returning its next state and countdown.
#[must_use]
pub fn next_cell(
    state: CellState,
    countdown: u32,
    sick_neighbors: u8,
    omega: u32,
) -> (CellState, u32) {
    match state {
        CellState::Infected if countdown > 1 => (CellState::Infected, countdown - 1),
        CellState::Infected => (CellState::Susceptible, 0),
        CellState::Susceptible if sick_neighbors > INFECTION_NEIGHBOR_THRESHOLD => {
            (CellState::Infected, omega)
        }
        CellState::Susceptible => (CellState::Susceptible, countdown),
    }
}

/// Advances the population by one day. `next` is scratch space; its contents on entry are
/// ignored. Runs on the rayon pool of the calling context, so callers that want a bounded
/// number of workers should invoke it inside `ThreadPool::install`.
///
/// # Panics
/// Panics if the three grids differ in shape.
pub fn advance_day(
    current: &mut Grid<CellState>,
    next: &mut Grid<CellState>,
    recovery: &mut Grid<u32>,
    omega: u32,
) -> DayTransition {
    let shape = (current.height(), current.width());
    assert_eq!(
        shape,
        (next.height(), next.width()),
        "scratch grid shape differs"
    );
    assert_eq!(
        shape,
        (recovery.height(), recovery.width()),
        "recovery grid shape differs"
    );

    let transition = compute_next(current, next, recovery, omega);
    commit(current, next, recovery);
    transition
}

fn compute_next(
    current: &Grid<CellState>,
    next: &mut Grid<CellState>,
    recovery: &mut Grid<u32>,
    omega: u32,
) -> DayTransition {
    next.par_rows_mut()
        .zip(recovery.par_rows_mut())
        .enumerate()
        .map(|(i, (next_row, recovery_row))| {
            let mut counts = DayTransition::default();
            for (j, (next_state, countdown)) in
                next_row.iter_mut().zip(recovery_row.iter_mut()).enumerate()
            {
                let state = current.row(i)[j];
                let sick_neighbors = count_sick_neighbors(current, i, j);
                let (new_state, new_countdown) =
                    next_cell(state, *countdown, sick_neighbors, omega);
                match (state, new_state) {
                    (CellState::Susceptible, CellState::Infected) => counts.new_infections += 1,
                    (CellState::Infected, CellState::Susceptible) => counts.recoveries += 1,
                    _ => {}
                }
                *next_state = new_state;
                *countdown = new_countdown;
            }
            counts
        })
        .reduce(DayTransition::default, DayTransition::merge)
}

fn commit(current: &mut Grid<CellState>, next: &Grid<CellState>, recovery: &mut Grid<u32>) {
    current
        .par_rows_mut()
        .zip(next.par_rows())
        .zip(recovery.par_rows_mut())
        .for_each(|((current_row, next_row), recovery_row)| {
            current_row.copy_from_slice(next_row);
            for (state, countdown) in next_row.iter().zip(recovery_row.iter_mut()) {
                if !state.is_infected() {
                    *countdown = 0;
                }
            }
        });
}
