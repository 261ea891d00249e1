//! Allocation telemetry for the simulation's grid buffers.
//!
//! Instead of counting every allocation in the process through a global, the simulation
//! routes its grid allocations and releases through an [`AllocationTracker`] that lives for
//! the duration of the run. The running total is what the execution summary reports as
//! "Total used memory".
use std::sync::atomic::{AtomicU64, Ordering};

use log::trace;

use crate::error::EpigridError;
use crate::grid::Grid;

#[derive(Debug, Default)]
pub struct AllocationTracker {
    /// Bytes ever allocated through this tracker. Never decreases.
    total_allocated: AtomicU64,
    /// Bytes allocated and not yet released.
    currently_held: AtomicU64,
    /// High water mark of `currently_held`.
    peak_held: AtomicU64,
}

impl AllocationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_allocation(&self, bytes: u64) {
        self.total_allocated.fetch_add(bytes, Ordering::Relaxed);
        let held = self.currently_held.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak_held.fetch_max(held, Ordering::Relaxed);
        trace!("allocated {bytes} bytes, {held} bytes held");
    }

    pub fn record_release(&self, bytes: u64) {
        // Saturate so an unbalanced release cannot wrap the counter.
        let previous = self
            .currently_held
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |held| {
                Some(held.saturating_sub(bytes))
            })
            .unwrap_or_default();
        trace!(
            "released {bytes} bytes, {} bytes held",
            previous.saturating_sub(bytes)
        );
    }

    #[must_use]
    pub fn total_allocated(&self) -> u64 {
        self.total_allocated.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn currently_held(&self) -> u64 {
        self.currently_held.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn peak_held(&self) -> u64 {
        self.peak_held.load(Ordering::Relaxed)
    }

    /// Allocates a zeroed grid and records its size.
    ///
    /// # Errors
    /// Returns `EpigridError::InvalidDimensions` if either dimension is zero.
    pub fn allocate_grid<T: Copy + Default>(
        &self,
        height: usize,
        width: usize,
    ) -> Result<Grid<T>, EpigridError> {
        let grid = Grid::new(height, width)?;
        self.record_allocation(grid.byte_size() as u64);
        Ok(grid)
    }

    /// Records the release of `grid` and drops it.
    pub fn release_grid<T>(&self, grid: Grid<T>) {
        self.record_release(grid.byte_size() as u64);
    }
}
