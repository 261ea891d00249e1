//! The simulation driver.
//!
//! A [`Simulation`] owns the three population grids and a bounded worker pool. It seeds the
//! population, reports day 0, and then advances and reports one day at a time:
//!
//! ```rust
//! use epigrid::allocation::AllocationTracker;
//! use epigrid::parameters::Parameters;
//! use epigrid::simulation::Simulation;
//! use epigrid::snapshot::NullSink;
//!
//! let tracker = AllocationTracker::new();
//! let parameters = Parameters::new(2, 0.25, 0.0, 2, 3).with_dimensions(4, 4);
//! let mut simulation = Simulation::new(parameters, &tracker).unwrap();
//! simulation.run(&mut NullSink, |_summary| Ok(())).unwrap();
//! println!("{} infected", simulation.infected_count());
//! simulation.release(&tracker);
//! ```
use log::{debug, info, trace};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::aggregate::{count_infected, DaySummary};
use crate::allocation::AllocationTracker;
use crate::error::EpigridError;
use crate::grid::{CellState, Grid};
use crate::parameters::Parameters;
use crate::population::seed_population;
use crate::snapshot::SnapshotSink;
use crate::transition::{advance_day, DayTransition};

pub struct Simulation {
    parameters: Parameters,
    pool: ThreadPool,
    current: Grid<CellState>,
    next: Grid<CellState>,
    recovery: Grid<u32>,
    day: usize,
}

impl Simulation {
    /// Validates `parameters`, builds the worker pool and allocates the grids through
    /// `tracker`. The population is not seeded until [`Simulation::initialize`] (or
    /// [`Simulation::run`]) is called.
    ///
    /// # Errors
    /// Returns an error if the parameters are invalid or the worker pool cannot be built.
    pub fn new(
        parameters: Parameters,
        tracker: &AllocationTracker,
    ) -> Result<Self, EpigridError> {
        parameters.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(parameters.threads)
            .thread_name(|index| format!("epigrid-worker-{index}"))
            .build()?;
        debug!("worker pool started with {} threads", pool.current_num_threads());

        let (height, width) = (parameters.height, parameters.width);
        let current = tracker.allocate_grid(height, width)?;
        let next = tracker.allocate_grid(height, width)?;
        let recovery = tracker.allocate_grid(height, width)?;
        debug!(
            "allocated three {height}x{width} grids, {} bytes",
            tracker.currently_held()
        );

        Ok(Simulation {
            parameters,
            pool,
            current,
            next,
            recovery,
            day: 0,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The last day that has been computed; 0 until the first step.
    #[must_use]
    pub fn day(&self) -> usize {
        self.day
    }

    #[must_use]
    pub fn current(&self) -> &Grid<CellState> {
        &self.current
    }

    #[must_use]
    pub fn recovery(&self) -> &Grid<u32> {
        &self.recovery
    }

    /// Seeds the initial infections. Returns the number of cells seeded.
    pub fn initialize(&mut self) -> usize {
        let seeded = seed_population(
            &mut self.current,
            &mut self.recovery,
            self.parameters.alpha,
            self.parameters.omega,
        );
        info!(
            "seeded {seeded} infections on a {}x{} grid",
            self.current.height(),
            self.current.width()
        );
        seeded
    }

    /// Advances one day on the worker pool.
    pub fn step(&mut self) -> DayTransition {
        let omega = self.parameters.omega;
        let Simulation {
            pool,
            current,
            next,
            recovery,
            ..
        } = self;
        let transition = pool.install(|| advance_day(current, next, recovery, omega));
        self.day += 1;
        trace!(
            "day {}: {} new infections, {} recoveries",
            self.day,
            transition.new_infections,
            transition.recoveries
        );
        transition
    }

    /// Infected cells in the current grid.
    #[must_use]
    pub fn infected_count(&self) -> u64 {
        self.pool.install(|| count_infected(&self.current))
    }

    /// Runs the simulation up to the configured number of days. On a fresh simulation the
    /// population is seeded and day 0 reported first; a simulation that has already been
    /// stepped continues from its current day without re-seeding. `snapshots` receives each
    /// day as it is reached and `on_day` the matching summary after the snapshot is recorded.
    ///
    /// # Errors
    /// Stops at and returns the first error from `snapshots` or `on_day`.
    pub fn run<F>(
        &mut self,
        snapshots: &mut dyn SnapshotSink,
        mut on_day: F,
    ) -> Result<(), EpigridError>
    where
        F: FnMut(&DaySummary) -> Result<(), EpigridError>,
    {
        if self.day == 0 {
            self.initialize();
            snapshots.record(0, &self.current)?;
            on_day(&self.pool.install(|| DaySummary::initial(&self.current)))?;
        }

        while self.day < self.parameters.days {
            let transition = self.step();
            let day = self.day;
            snapshots.record(day, &self.current)?;
            let summary = self
                .pool
                .install(|| DaySummary::after_transition(day, &self.current, transition));
            on_day(&summary)?;
        }
        snapshots.finish()?;
        info!("simulated {} days", self.parameters.days);
        Ok(())
    }

    /// Releases the grids, recording the release with `tracker`.
    pub fn release(self, tracker: &AllocationTracker) {
        tracker.release_grid(self.current);
        tracker.release_grid(self.next);
        tracker.release_grid(self.recovery);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{NullSink, TextSnapshotWriter};

    fn small(alpha: f64, omega: u32, days: usize) -> Parameters {
        Parameters::new(2, alpha, 0.0, omega, days).with_dimensions(4, 4)
    }

    #[test]
    fn allocation_is_tracked() {
        let tracker = AllocationTracker::new();
        let simulation = Simulation::new(small(0.25, 2, 1), &tracker).unwrap();
        // two 16-cell state grids of one byte and one 16-cell u32 grid
        assert_eq!(tracker.total_allocated(), 16 + 16 + 64);
        simulation.release(&tracker);
        assert_eq!(tracker.currently_held(), 0);
        assert_eq!(tracker.total_allocated(), 96);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let tracker = AllocationTracker::new();
        assert!(Simulation::new(small(0.25, 0, 1), &tracker).is_err());
        assert_eq!(tracker.total_allocated(), 0);
    }

    #[test]
    fn run_reports_every_day() {
        let tracker = AllocationTracker::new();
        let mut simulation = Simulation::new(small(0.25, 2, 3), &tracker).unwrap();
        let mut summaries = Vec::new();
        simulation
            .run(&mut NullSink, |summary| {
                summaries.push(*summary);
                Ok(())
            })
            .unwrap();

        assert_eq!(simulation.day(), 3);
        let days: Vec<usize> = summaries.iter().map(|s| s.day).collect();
        assert_eq!(days, vec![0, 1, 2, 3]);
        assert_eq!(summaries[0].infected, 4);
        assert_eq!(summaries[1].infected, 8);
        assert_eq!(summaries[1].new_infections, 4);
        assert_eq!(summaries[3].infected, simulation.infected_count());
        for summary in &summaries {
            assert_eq!(summary.infected + summary.susceptible, 16);
        }
    }

    #[test]
    fn zero_days_reports_only_the_seeded_state() {
        let tracker = AllocationTracker::new();
        let mut simulation = Simulation::new(small(0.25, 2, 0), &tracker).unwrap();
        let mut writer = TextSnapshotWriter::new(Vec::new());
        simulation.run(&mut writer, |_| Ok(())).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "Day 0:\n1 0 0 0 \n0 0 0 1 \n0 0 1 0 \n0 1 0 0 \n\n");
        assert_eq!(simulation.infected_count(), 4);
    }

    #[test]
    fn zero_alpha_stays_healthy() {
        let tracker = AllocationTracker::new();
        let parameters = Parameters::new(3, 0.0, 0.0, 3, 5).with_dimensions(20, 20);
        let mut simulation = Simulation::new(parameters, &tracker).unwrap();
        let mut infected = Vec::new();
        simulation
            .run(&mut NullSink, |summary| {
                infected.push(summary.infected);
                Ok(())
            })
            .unwrap();
        assert_eq!(infected, vec![0; 6]);
    }

    #[test]
    fn run_continues_a_stepped_simulation() {
        let tracker = AllocationTracker::new();
        let mut stepped = Simulation::new(small(0.25, 2, 4), &tracker).unwrap();
        stepped.initialize();
        stepped.step();
        stepped.step();

        let mut days = Vec::new();
        let mut writer = TextSnapshotWriter::new(Vec::new());
        stepped
            .run(&mut writer, |summary| {
                days.push(summary.day);
                Ok(())
            })
            .unwrap();
        assert_eq!(days, vec![3, 4]);
        assert_eq!(stepped.day(), 4);
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("Day 3:\n"));
        assert!(!text.contains("Day 0:"));

        // Same end state as an uninterrupted run
        let mut fresh = Simulation::new(small(0.25, 2, 4), &tracker).unwrap();
        fresh.run(&mut NullSink, |_| Ok(())).unwrap();
        assert_eq!(stepped.current(), fresh.current());
        assert_eq!(stepped.recovery(), fresh.recovery());
    }

    #[test]
    fn run_past_the_last_day_reports_nothing() {
        let tracker = AllocationTracker::new();
        let mut simulation = Simulation::new(small(0.25, 2, 1), &tracker).unwrap();
        simulation.run(&mut NullSink, |_| Ok(())).unwrap();
        let mut calls = 0;
        simulation
            .run(&mut NullSink, |_| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(simulation.day(), 1);
    }

    #[test]
    fn observer_error_stops_the_run() {
        let tracker = AllocationTracker::new();
        let mut simulation = Simulation::new(small(0.25, 2, 10), &tracker).unwrap();
        let result = simulation.run(&mut NullSink, |summary| {
            if summary.day == 2 {
                Err(EpigridError::ReportError("stop".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(simulation.day(), 2);
    }
}
