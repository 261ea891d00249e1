use crate::aggregate::DaySummary;
use crate::error::EpigridError;
use csv::Writer;
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful. Called by `DailyReport::create`
fn generate_validate_filepath(path: &Path) -> Result<File, EpigridError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(EpigridError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes one CSV row per simulated day with the columns of [`DaySummary`].
pub struct DailyReport {
    writer: Writer<File>,
}

impl DailyReport {
    /// # Errors
    ///
    /// Returns an `EpigridError` if `path` is not a `.csv` path or cannot be created.
    pub fn create(path: &Path) -> Result<Self, EpigridError> {
        let file = generate_validate_filepath(path)?;
        Ok(DailyReport {
            writer: Writer::from_writer(file),
        })
    }

    /// Write a new row and flush it so a partial run still leaves a readable report.
    ///
    /// # Errors
    ///
    /// Returns an `EpigridError` if serialization or the write fails.
    pub fn send(&mut self, summary: &DaySummary) -> Result<(), EpigridError> {
        self.writer.serialize(summary)?;
        self.writer.flush()?;
        Ok(())
    }
}
