//! Logging for the simulator itself: seeding, worker pool setup, per-day counts and the run
//! summary. Model output goes to the snapshot file and the daily report, never through here.
//!
//! The five `log` macros are re-exported, from `error!` (highest priority) to `trace!`
//! (lowest). Nothing is logged unless a level is set, either with `--log-level <levels>` /
//! `-v` on the command line or from code:
//!
//! ```rust
//! use epigrid::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! // Per-day counts from the simulation driver.
//! set_module_filter("epigrid::simulation", LevelFilter::Trace);
//! ```
//!
//! Output goes to stderr through `log4rs` when the `logging` feature is enabled. Without it
//! only the `log` crate's max level is updated.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

#[cfg(all(feature = "logging", feature = "progress_bar"))]
mod progress_bar_encoder;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::EpigridError;
#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

// Off until configured
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;
// Allocation bookkeeping is traced on every grid; keep it out of `-vvv` output.
const DEFAULT_MODULE_FILTERS: [(&str, LevelFilter); 1] =
    [("epigrid::allocation", LevelFilter::Debug)];

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The level filter applied to log records whose target starts with `module`.
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Process-wide logging state. The installed logger is rebuilt from it whenever it changes;
/// only the singleton behind [`LOG_CONFIGURATION`] is ever used.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Level for targets without a module filter. `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    /// Module filters keyed by module path.
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,
    /// Whether log lines must clear a progress bar drawn on the same terminal line.
    pub(in crate::log) clear_progress_line: bool,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        let module_configurations = DEFAULT_MODULE_FILTERS
            .into_iter()
            .map(|(module, level)| (module.to_string(), (module, level).into()))
            .collect();
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations,
            clear_progress_line: false,

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    /// Returns true if the filter was added or changed.
    fn upsert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        let previous = self
            .module_configurations
            .insert(module.to_string(), (module, level).into());
        previous.is_none_or(|previous| previous.level != level)
    }
}

/// A parsed `--log-level` value: an optional global level followed by any number of
/// `module=level` filters, separated by commas, e.g. `info,epigrid::transition=trace`.
#[derive(Debug, Default, PartialEq)]
pub struct LogSpec {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

impl FromStr for LogSpec {
    type Err = EpigridError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parse_level = |text: &str| {
            LevelFilter::from_str(text.trim())
                .map_err(|_| EpigridError::InvalidInput(format!("unknown log level {text:?}")))
        };

        let mut parsed = LogSpec::default();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((module, level)) => {
                    parsed
                        .modules
                        .push((module.trim().to_string(), parse_level(level)?));
                }
                None => parsed.global = Some(parse_level(part)?),
            }
        }
        Ok(parsed)
    }
}

impl LogSpec {
    /// Sets the global level, if one was given, and then every module filter.
    pub fn apply(&self) {
        if let Some(level) = self.global {
            set_log_level(level);
        }
        let filters: Vec<(&str, LevelFilter)> = self
            .modules
            .iter()
            .map(|(module, level)| (module.as_str(), *level))
            .collect();
        set_module_filters(&filters);
    }
}

/// Sets the level for targets without a module filter. `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    let mut configuration = log_configuration();
    configuration.global_log_level = level;
    configuration.set_config();
}

/// Sets the level filter for one module path.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    set_module_filters(&[(module_path, level)]);
}

/// Sets several module filters, rebuilding the logger at most once.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    let mut configuration = log_configuration();
    let mut changed = false;
    for (module, level) in module_filters {
        changed |= configuration.upsert_module_filter(module, *level);
    }
    if changed {
        configuration.set_config();
    }
}

/// Makes log lines clear the current terminal line first, so they do not interleave with a
/// progress bar.
pub fn clear_progress_line(enabled: bool) {
    let mut configuration = log_configuration();
    if configuration.clear_progress_line != enabled {
        configuration.clear_progress_line = enabled;
        configuration.set_config();
    }
}

fn log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
