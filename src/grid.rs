//! Dense, fixed-size two-dimensional grids.
//!
//! A [`Grid`] stores `height * width` cells contiguously in row-major order. The population
//! simulation keeps three of them alive at once: the current infection state, the scratch
//! buffer the next day is computed into, and the recovery countdown of every cell. Rows can be
//! handed out to the worker pool in parallel with [`Grid::par_rows_mut`]; each row is a
//! disjoint mutable slice, so no two tasks can write the same cell during a phase.
use std::fmt::{self, Display};

use rayon::prelude::*;
use rayon::slice::{ChunksExact, ChunksExactMut};
use serde_derive::{Deserialize, Serialize};

use crate::error::EpigridError;

/// The infection state of a single cell. There is no immune state: a recovered cell is
/// susceptible again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Susceptible = 0,
    Infected = 1,
}

impl CellState {
    #[must_use]
    pub fn is_infected(self) -> bool {
        self == CellState::Infected
    }

    /// The numeric value written to snapshots and summed by the aggregator.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Number of cells in a `height` x `width` grid of `T`.
///
/// # Errors
/// Returns `EpigridError::InvalidDimensions` if either dimension is zero or the storage size
/// in bytes would overflow `isize::MAX`, the largest allocation Rust permits.
pub fn checked_area<T>(height: usize, width: usize) -> Result<usize, EpigridError> {
    #[allow(clippy::cast_sign_loss)]
    let max_bytes = isize::MAX as usize;
    height
        .checked_mul(width)
        .filter(|&area| area > 0)
        .filter(|&area| {
            area.checked_mul(std::mem::size_of::<T>())
                .is_some_and(|bytes| bytes <= max_bytes)
        })
        .ok_or(EpigridError::InvalidDimensions { height, width })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    height: usize,
    width: usize,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Allocates a `height` x `width` grid with every cell set to `T::default()`.
    ///
    /// # Errors
    /// Returns `EpigridError::InvalidDimensions` if either dimension is zero or the grid is too
    /// large to address.
    pub fn new(height: usize, width: usize) -> Result<Self, EpigridError> {
        let area = checked_area::<T>(height, width)?;
        Ok(Grid {
            height,
            width,
            cells: vec![T::default(); area],
        })
    }

    /// Builds a grid from explicit rows. Every row must have the same, non-zero, length.
    ///
    /// # Errors
    /// Returns `EpigridError::InvalidDimensions` for an empty or ragged set of rows.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, EpigridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 || rows.iter().any(|row| row.len() != width) {
            return Err(EpigridError::InvalidDimensions { height, width });
        }
        Ok(Grid {
            height,
            width,
            cells: rows.concat(),
        })
    }

}

impl<T> Grid<T> {
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells, `height * width`.
    #[must_use]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Bytes held by the cell storage.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        std::mem::size_of_val(self.cells.as_slice())
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.height && j < self.width {
            self.cells.get(i * self.width + j)
        } else {
            None
        }
    }

    /// # Panics
    /// Panics if `(i, j)` lies outside the grid.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(
            i < self.height && j < self.width,
            "cell ({i}, {j}) is outside a {}x{} grid",
            self.height,
            self.width
        );
        self.cells[i * self.width + j] = value;
    }

    /// # Panics
    /// Panics if `i >= height`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.cells.chunks_exact(self.width)
    }

    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, T> {
        self.cells.chunks_exact_mut(self.width)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

impl<T: Sync> Grid<T> {
    pub fn par_rows(&self) -> ChunksExact<'_, T> {
        self.cells.par_chunks_exact(self.width)
    }
}

impl<T: Send> Grid<T> {
    pub fn par_rows_mut(&mut self) -> ChunksExactMut<'_, T> {
        self.cells.par_chunks_exact_mut(self.width)
    }
}

impl<T: Display> Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.rows() {
            for value in row {
                write!(f, "{value} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
