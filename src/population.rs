//! Deterministic seeding of the initially infected population.
//!
//! Seeds are spread along diagonals rather than clustered: walking the grid in row-major
//! order, cell `(i, j)` is seeded when `(i + j) % stride == 0`, where
//! `stride = area / target_count`. Seeding stops as soon as `target_count` cells are infected.
use log::{debug, trace};

use crate::grid::{CellState, Grid};

/// Number of cells that should start infected, `floor(alpha * area)`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn target_infected_count(alpha: f64, area: usize) -> usize {
    let target = (alpha * area as f64).floor();
    if target <= 0.0 {
        0
    } else {
        (target as usize).min(area)
    }
}

/// Marks the initial infected cells in `current` and sets their countdown in `recovery` to
/// `omega`. Both grids are expected to be all-susceptible / all-zero. Returns the number of
/// cells seeded, which can fall short of the target only if the stride pattern runs out of
/// eligible cells.
///
/// # Panics
/// Panics if `current` and `recovery` differ in shape.
pub fn seed_population(
    current: &mut Grid<CellState>,
    recovery: &mut Grid<u32>,
    alpha: f64,
    omega: u32,
) -> usize {
    assert_eq!(
        (current.height(), current.width()),
        (recovery.height(), recovery.width()),
        "state and recovery grids differ in shape"
    );

    let area = current.area();
    let target = target_infected_count(alpha, area);
    if target == 0 {
        debug!("alpha {alpha} seeds no infections on a grid of {area} cells");
        return 0;
    }
    let stride = area / target;
    trace!("seeding {target} infections with stride {stride}");

    let width = current.width();
    let mut seeded = 0;
    for (i, (state_row, recovery_row)) in current.rows_mut().zip(recovery.rows_mut()).enumerate()
    {
        for j in 0..width {
            if seeded == target {
                break;
            }
            if (i + j) % stride == 0 {
                state_row[j] = CellState::Infected;
                recovery_row[j] = omega;
                seeded += 1;
            }
        }
    }

    debug!("seeded {seeded} of {target} initial infections");
    seeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::count_infected;

    fn grids(height: usize, width: usize) -> (Grid<CellState>, Grid<u32>) {
        (
            Grid::new(height, width).unwrap(),
            Grid::new(height, width).unwrap(),
        )
    }

    fn infected_positions(grid: &Grid<CellState>) -> Vec<(usize, usize)> {
        let mut positions = Vec::new();
        for (i, row) in grid.rows().enumerate() {
            for (j, state) in row.iter().enumerate() {
                if state.is_infected() {
                    positions.push((i, j));
                }
            }
        }
        positions
    }

    #[test]
    fn target_count_floors() {
        assert_eq!(target_infected_count(0.25, 16), 4);
        assert_eq!(target_infected_count(0.3, 10), 3);
        assert_eq!(target_infected_count(0.29, 10), 2);
        assert_eq!(target_infected_count(0.0, 250_000), 0);
        assert_eq!(target_infected_count(1.0, 250_000), 250_000);
        assert_eq!(target_infected_count(0.000_001, 250_000), 0);
    }

    #[test]
    fn quarter_of_four_by_four_lies_on_diagonals() {
        let (mut current, mut recovery) = grids(4, 4);
        let seeded = seed_population(&mut current, &mut recovery, 0.25, 2);
        assert_eq!(seeded, 4);
        assert_eq!(
            infected_positions(&current),
            vec![(0, 0), (1, 3), (2, 2), (3, 1)]
        );
        for (i, j) in infected_positions(&current) {
            assert_eq!(recovery.get(i, j), Some(&2));
        }
    }

    #[test]
    fn stops_once_target_reached() {
        // stride 2 qualifies (2, 2) too, but the target of 4 is met first
        let (mut current, mut recovery) = grids(3, 3);
        let seeded = seed_population(&mut current, &mut recovery, 0.5, 3);
        assert_eq!(seeded, 4);
        assert_eq!(
            infected_positions(&current),
            vec![(0, 0), (0, 2), (1, 1), (2, 0)]
        );
        assert_eq!(current.get(2, 2), Some(&CellState::Susceptible));
    }

    #[test]
    fn zero_target_infects_nothing() {
        let (mut current, mut recovery) = grids(10, 10);
        assert_eq!(seed_population(&mut current, &mut recovery, 0.0, 5), 0);
        assert_eq!(seed_population(&mut current, &mut recovery, 0.009, 5), 0);
        assert_eq!(count_infected(&current), 0);
        assert!(recovery.as_slice().iter().all(|&r| r == 0));
    }

    #[test]
    fn full_alpha_infects_everything() {
        let (mut current, mut recovery) = grids(7, 9);
        assert_eq!(seed_population(&mut current, &mut recovery, 1.0, 4), 63);
        assert!(recovery.as_slice().iter().all(|&r| r == 4));
    }

    #[test]
    fn seeded_count_matches_target_or_eligible_cells() {
        for &alpha in &[0.01, 0.05, 0.1, 0.2, 0.33, 0.5, 0.75, 0.9] {
            let (mut current, mut recovery) = grids(50, 50);
            let target = target_infected_count(alpha, 2500);
            let stride = 2500 / target;
            let eligible = (0..50)
                .flat_map(|i| (0..50).map(move |j| (i, j)))
                .filter(|(i, j)| (i + j) % stride == 0)
                .count();

            let seeded = seed_population(&mut current, &mut recovery, alpha, 3);
            assert_eq!(seeded, target.min(eligible), "alpha {alpha}");
            assert_eq!(count_infected(&current), seeded as u64);
        }
    }

    #[test]
    fn recovery_positive_exactly_where_infected() {
        let (mut current, mut recovery) = grids(20, 30);
        seed_population(&mut current, &mut recovery, 0.4, 6);
        for (state, countdown) in current.as_slice().iter().zip(recovery.as_slice()) {
            assert_eq!(state.is_infected(), *countdown > 0);
        }
    }
}
