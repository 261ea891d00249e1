//! Simulation parameters and their validation.
//!
//! Parameters come either from the interactive prompts (see [`crate::prompt`]) or from a JSON
//! config file:
//!
//! ```json
//! {
//!     "threads": 4,
//!     "alpha": 0.1,
//!     "beta": 0.0,
//!     "omega": 7,
//!     "days": 30
//! }
//! ```
//!
//! `beta` is accepted for compatibility but no transition uses it: infection is decided by
//! the neighbor-count threshold alone. `height` and `width` default to 500.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};

use crate::error::EpigridError;
use crate::grid::checked_area;

pub const DEFAULT_HEIGHT: usize = 500;
pub const DEFAULT_WIDTH: usize = 500;

fn default_height() -> usize {
    DEFAULT_HEIGHT
}

fn default_width() -> usize {
    DEFAULT_WIDTH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    /// Worker threads used for the parallel phases.
    pub threads: usize,
    /// Initial infected fraction, in `[0, 1]`.
    pub alpha: f64,
    /// Infection probability. Accepted but unused.
    #[serde(default)]
    pub beta: f64,
    /// Days an infected cell stays infected.
    pub omega: u32,
    /// Days to simulate after seeding.
    pub days: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_width")]
    pub width: usize,
}

impl Parameters {
    /// Parameters on the default 500 x 500 grid.
    #[must_use]
    pub fn new(threads: usize, alpha: f64, beta: f64, omega: u32, days: usize) -> Self {
        Parameters {
            threads,
            alpha,
            beta,
            omega,
            days,
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
        }
    }

    #[must_use]
    pub fn with_dimensions(mut self, height: usize, width: usize) -> Self {
        self.height = height;
        self.width = width;
        self
    }

    /// Checks that every value is in the range the simulation accepts. `alpha = 0` and
    /// `days = 0` are valid and produce a trivial run.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), EpigridError> {
        if self.threads == 0 {
            return Err(EpigridError::InvalidParameter(
                "thread count must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(EpigridError::InvalidParameter(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if self.omega < 1 {
            return Err(EpigridError::InvalidParameter(
                "omega must be at least 1".to_string(),
            ));
        }
        // The recovery countdowns are the widest grid
        checked_area::<u32>(self.height, self.width)?;
        if self.beta != 0.0 {
            warn!(
                "beta = {} is accepted but has no effect; infection follows the neighbor threshold",
                self.beta
            );
        }
        Ok(())
    }

    /// Reads and validates parameters from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, is not valid JSON for `Parameters`, or
    /// fails validation.
    pub fn from_json_file(path: &Path) -> Result<Self, EpigridError> {
        debug!("loading parameters from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let parameters: Parameters = serde_json::from_reader(reader)?;
        parameters.validate()?;
        Ok(parameters)
    }
}
