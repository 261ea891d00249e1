//! Population-wide counts over a state grid.
use rayon::prelude::*;
use serde_derive::Serialize;

use crate::grid::{CellState, Grid};
use crate::transition::DayTransition;

/// Number of infected cells. Cells are 0 or 1, so this is the sum of the grid.
#[must_use]
pub fn count_infected(grid: &Grid<CellState>) -> u64 {
    grid.par_rows()
        .map(|row| row.iter().map(|state| u64::from(state.as_u8())).sum::<u64>())
        .sum()
}

/// One row of the daily summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: usize,
    pub infected: u64,
    pub susceptible: u64,
    pub new_infections: u64,
    pub recoveries: u64,
}

impl DaySummary {
    /// Summary of the seeded population before any transition has run.
    #[must_use]
    pub fn initial(grid: &Grid<CellState>) -> Self {
        let infected = count_infected(grid);
        DaySummary {
            day: 0,
            infected,
            susceptible: grid.area() as u64 - infected,
            new_infections: infected,
            recoveries: 0,
        }
    }

    #[must_use]
    pub fn after_transition(day: usize, grid: &Grid<CellState>, transition: DayTransition) -> Self {
        let infected = count_infected(grid);
        DaySummary {
            day,
            infected,
            susceptible: grid.area() as u64 - infected,
            new_infections: transition.new_infections,
            recoveries: transition.recoveries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_infected_cells() {
        let grid = Grid::from_rows(&[
            vec![CellState::Infected, CellState::Susceptible, CellState::Infected],
            vec![CellState::Susceptible, CellState::Susceptible, CellState::Infected],
        ])
        .unwrap();
        assert_eq!(count_infected(&grid), 3);
    }

    #[test]
    fn empty_population_counts_zero() {
        let grid: Grid<CellState> = Grid::new(100, 100).unwrap();
        assert_eq!(count_infected(&grid), 0);
    }

    #[test]
    fn initial_summary() {
        let grid = Grid::from_rows(&[
            vec![CellState::Infected, CellState::Susceptible],
            vec![CellState::Susceptible, CellState::Susceptible],
        ])
        .unwrap();
        let summary = DaySummary::initial(&grid);
        assert_eq!(
            summary,
            DaySummary {
                day: 0,
                infected: 1,
                susceptible: 3,
                new_infections: 1,
                recoveries: 0,
            }
        );
    }
}
