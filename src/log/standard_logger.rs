use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::Encode;
use log4rs::Config;

#[cfg(feature = "progress_bar")]
use super::progress_bar_encoder::ClearLineEncoder;
use crate::log::{LogConfiguration, ModuleLogConfiguration};

// ISO 8601 timestamp, colored level, target module
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";
const APPENDER: &str = "stderr";

impl From<&ModuleLogConfiguration> for Logger {
    fn from(module_config: &ModuleLogConfiguration) -> Self {
        Logger::builder().build(module_config.module.clone(), module_config.level)
    }
}

impl LogConfiguration {
    fn encoder(&self) -> Box<dyn Encode> {
        let encoder = Box::new(PatternEncoder::new(LOG_PATTERN));
        #[cfg(feature = "progress_bar")]
        if self.clear_progress_line {
            return Box::new(ClearLineEncoder::new(encoder));
        }
        encoder
    }

    /// Builds a `log4rs` config from this configuration and installs it, initializing the
    /// global logger on first use.
    pub(in crate::log) fn set_config(&mut self) {
        // stdout carries the prompts and the run summary
        let console = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(self.encoder())
            .build();
        let config = Config::builder()
            .appender(Appender::builder().build(APPENDER, Box::new(console)))
            .loggers(self.module_configurations.values().map(Logger::from))
            .build(
                Root::builder()
                    .appender(APPENDER)
                    .build(self.global_log_level),
            );
        let config = match config {
            Ok(config) => config,
            Err(e) => panic!("failed to build log config: {e}"),
        };

        match self.root_handle.as_ref() {
            Some(handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.root_handle = Some(handle),
                Err(e) => eprintln!("failed to install logger: {e}"),
            },
        }
    }
}
