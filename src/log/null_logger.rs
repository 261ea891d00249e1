//! Used when the `logging` feature is off: no logger is installed, so records are dropped,
//! but the `log` crate's max level still follows the configured global level.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
