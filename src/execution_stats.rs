// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::io::{self, Write};
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use humantime::format_duration;
use log::{debug, error, info};
use serde_derive::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::allocation::AllocationTracker;

/// A container struct for computed final statistics. Note that if the population is empty,
/// then the per cell statistics are also zero, as they are meaningless.
#[derive(Debug, Serialize)]
pub struct ExecutionStatistics {
    pub wall_time: Duration,
    pub cpu_time: Duration,
    /// Bytes allocated through the `AllocationTracker` over the whole run.
    pub total_allocated: u64,
    /// Largest number of tracked bytes held at once.
    pub peak_allocated: u64,
    pub final_infected: u64,

    // Per cell stats
    pub population: usize,
    pub wall_time_per_cell_day: Duration,
}

pub struct ExecutionProfilingCollector {
    start_time: Instant,
    /// Process CPU-milliseconds already used when the collector was created
    start_cpu_time: u64,
    system: System,
    /// `None` where `sysinfo` cannot identify the current process
    process_id: Option<Pid>,
}

impl Default for ExecutionProfilingCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionProfilingCollector {
    #[must_use]
    pub fn new() -> ExecutionProfilingCollector {
        let process_id = sysinfo::get_current_pid().ok();

        let mut collector = ExecutionProfilingCollector {
            start_time: Instant::now(),
            start_cpu_time: 0,
            system: System::new(),
            process_id,
        };
        if let Some(process_id) = process_id {
            debug!("profiling process {process_id}");
            collector.start_cpu_time = collector.accumulated_cpu_time().unwrap_or(0);
        }

        collector
    }

    /// Refreshes CPU statistics for this process and returns its accumulated CPU time in
    /// CPU-milliseconds, or `None` if the platform does not report it.
    fn accumulated_cpu_time(&mut self) -> Option<u64> {
        let pid = self.process_id?;
        if self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        ) < 1
        {
            error!("could not refresh process statistics");
        }
        self.system
            .process(pid)
            .map(sysinfo::Process::accumulated_cpu_time)
    }

    /// CPU-milliseconds used by the process since the collector was created, or 0 where the
    /// platform does not report CPU time.
    pub fn cpu_time(&mut self) -> u64 {
        self.accumulated_cpu_time()
            .map_or(0, |now| now.saturating_sub(self.start_cpu_time))
    }

    /// Collects the wall and CPU time elapsed so far together with the tracker's totals.
    pub fn compute_final_statistics(
        &mut self,
        tracker: &AllocationTracker,
        final_infected: u64,
        population: usize,
        days: usize,
    ) -> ExecutionStatistics {
        let cpu_time = Duration::from_millis(self.cpu_time());
        let wall_time = self.start_time.elapsed();

        // Day 0 is seeding only, so a run of `days` days performs `days` transitions.
        let cell_days = population.saturating_mul(days);
        let wall_time_per_cell_day = if cell_days > 0 {
            Duration::from_secs_f64(wall_time.as_secs_f64() / cell_days as f64)
        } else {
            Duration::ZERO
        };

        ExecutionStatistics {
            wall_time,
            cpu_time,
            total_allocated: tracker.total_allocated(),
            peak_allocated: tracker.peak_held(),
            final_infected,
            population,
            wall_time_per_cell_day,
        }
    }
}

/// Writes the three-line run summary printed at the end of every run.
///
/// # Errors
/// Returns any error from `writer`.
pub fn write_execution_statistics<W: Write>(
    writer: &mut W,
    summary: &ExecutionStatistics,
) -> io::Result<()> {
    writeln!(
        writer,
        "Execution time: {} seconds.",
        summary.wall_time.as_secs_f64()
    )?;
    writeln!(writer, "Total used memory: {} bytes", summary.total_allocated)?;
    writeln!(writer, "Final infected count: {}", summary.final_infected)
}

/// Logs a human readable version of the statistics at `info` level.
pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("Execution complete.");
    info!("Wall time: {}", format_duration(stats.wall_time));
    if stats.cpu_time.is_zero() {
        info!("CPU statistics are not available on your platform.");
    } else {
        info!("CPU time: {}", format_duration(stats.cpu_time));
    }
    info!(
        "Grid memory: {} allocated, {} peak",
        ByteSize::b(stats.total_allocated),
        ByteSize::b(stats.peak_allocated)
    );
    info!("Population: {}", stats.population);
    if !stats.wall_time_per_cell_day.is_zero() {
        info!(
            "Wall time per cell-day: {}",
            format_duration(stats.wall_time_per_cell_day)
        );
    }
    info!("Final infected count: {}", stats.final_infected);
}
