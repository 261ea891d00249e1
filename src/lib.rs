//! A grid-based epidemic simulator
//!
//! Epigrid models the spread of an infection through a population laid out on a
//! rectangular grid, one person per cell. Each person is either susceptible or
//! infected, and an infected person recovers (becomes susceptible again) after a
//! fixed number of days.
//!
//! A run consists of:
//! * Seeding an initial fraction of the population along a deterministic
//!   diagonal pattern (see [`population`]).
//! * Advancing the whole grid one day at a time. Each day is computed from the
//!   previous day's grid only, so the result is independent of the number of
//!   worker threads (see [`transition`]).
//! * Recording every day, including the seeded day 0, to a snapshot file and
//!   optionally to a daily CSV report.
//! * Reporting the elapsed time, the memory used by the grids and the final
//!   infected count.
//!
//! The [`runner`] module provides the command line entry point; [`simulation::Simulation`]
//! can also be driven directly from code.
pub mod aggregate;
pub mod allocation;
pub mod error;
pub mod execution_stats;
pub mod grid;
pub mod log;
pub mod parameters;
pub mod population;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod snapshot;
pub mod transition;

pub use error::EpigridError;
pub use grid::{CellState, Grid};
pub use parameters::Parameters;
pub use simulation::Simulation;
