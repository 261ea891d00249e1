//! Per-day snapshots of the population grid.
//!
//! The simulation hands the state grid to a [`SnapshotSink`] after seeding (day 0) and after
//! every simulated day. [`TextSnapshotWriter`] produces the plain-text dump:
//!
//! ```text
//! Day 0:
//! 1 0 0 0
//! 0 0 0 1
//!
//! Day 1:
//! ...
//! ```
//!
//! Every value is followed by a single space and every section ends with a blank line.
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, trace};

use crate::error::EpigridError;
use crate::grid::{CellState, Grid};

pub trait SnapshotSink {
    /// Receives the state grid at the end of `day`.
    ///
    /// # Errors
    /// Returns an error if the snapshot could not be persisted.
    fn record(&mut self, day: usize, grid: &Grid<CellState>) -> Result<(), EpigridError>;

    /// Flushes anything still buffered. Called once after the last day.
    ///
    /// # Errors
    /// Returns an error if buffered output could not be written.
    fn finish(&mut self) -> Result<(), EpigridError> {
        Ok(())
    }
}

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn record(&mut self, _day: usize, _grid: &Grid<CellState>) -> Result<(), EpigridError> {
        Ok(())
    }
}

pub struct TextSnapshotWriter<W: Write> {
    writer: BufWriter<W>,
}

impl TextSnapshotWriter<File> {
    /// Creates (or truncates) the snapshot file at `path`, creating parent directories if
    /// they do not exist.
    ///
    /// # Errors
    /// Returns an `EpigridError::IoError` if the directories or file cannot be created.
    pub fn create(path: &Path) -> Result<Self, EpigridError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        debug!("writing snapshots to {}", path.display());
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> TextSnapshotWriter<W> {
    pub fn new(writer: W) -> Self {
        TextSnapshotWriter {
            writer: BufWriter::new(writer),
        }
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W, EpigridError> {
        self.writer
            .into_inner()
            .map_err(|error| EpigridError::IoError(error.into_error()))
    }
}

impl<W: Write> SnapshotSink for TextSnapshotWriter<W> {
    fn record(&mut self, day: usize, grid: &Grid<CellState>) -> Result<(), EpigridError> {
        trace!("writing snapshot for day {day}");
        writeln!(self.writer, "Day {day}:")?;
        // Cell values are single digits; build each row in one buffer.
        let mut line = String::with_capacity(grid.width() * 2 + 1);
        for row in grid.rows() {
            line.clear();
            for state in row {
                line.push(char::from(b'0' + state.as_u8()));
                line.push(' ');
            }
            line.push('\n');
            self.writer.write_all(line.as_bytes())?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EpigridError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Grid<CellState> {
        Grid::from_rows(&[
            vec![CellState::Infected, CellState::Susceptible, CellState::Susceptible],
            vec![CellState::Susceptible, CellState::Susceptible, CellState::Infected],
        ])
        .unwrap()
    }

    #[test]
    fn writes_day_sections() {
        let mut writer = TextSnapshotWriter::new(Vec::new());
        writer.record(0, &sample()).unwrap();
        writer.record(1, &sample()).unwrap();
        writer.finish().unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "Day 0:\n1 0 0 \n0 0 1 \n\nDay 1:\n1 0 0 \n0 0 1 \n\n"
        );
    }

    #[test]
    fn text_rows_match_grid_display() {
        let mut writer = TextSnapshotWriter::new(Vec::new());
        writer.record(7, &sample()).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, format!("Day 7:\n{}\n", sample()));
    }

    #[test]
    fn create_makes_parent_directories() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("simulation.txt");
        let mut writer = TextSnapshotWriter::create(&path).unwrap();
        writer.record(0, &sample()).unwrap();
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Day 0:\n1 0 0 \n"));
    }

    #[test]
    fn null_sink_accepts_everything() {
        let mut sink = NullSink;
        assert!(sink.record(3, &sample()).is_ok());
        assert!(sink.finish().is_ok());
    }
}
