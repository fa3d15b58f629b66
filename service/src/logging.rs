use crate::config::Config;
use crate::event_log::EventLog;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use simplelog::{CombinedLogger, SharedLogger};

/// Modules to filter out from logging when not in Trace mode.
/// These are typically verbose dependencies that clutter normal log output.
const FILTERED_MODULES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "rustls",
    "tower",
    "axum",
    "mio",
];

pub struct Logger {}

impl Logger {
    /// Routes the global `log` facade into the event log file.
    ///
    /// The file logger is the only handler installed; nothing is written to the console
    /// once this returns. When the log level is set to Trace, dependency logs are kept.
    pub fn init_logger(config: &Config, event_log: &EventLog) -> Result<(), SetLoggerError> {
        CombinedLogger::init(Self::build_loggers(config.log_level_filter, event_log))
    }

    /// Builds the handler list installed by [`Logger::init_logger`].
    pub fn build_loggers(level: LevelFilter, event_log: &EventLog) -> Vec<Box<dyn SharedLogger>> {
        vec![Box::new(FileLogger::new(
            level,
            event_log.clone(),
            Self::should_filter_dependencies(level),
        ))]
    }

    /// Determines whether dependency logging should be filtered.
    ///
    /// Returns `false` for Trace level (show all logs), `true` for all other levels.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }
}

/// `log` handler that appends records to an [`EventLog`].
pub struct FileLogger {
    level: LevelFilter,
    event_log: EventLog,
    ignored: &'static [&'static str],
}

impl FileLogger {
    pub fn new(level: LevelFilter, event_log: EventLog, apply_filters: bool) -> Self {
        Self {
            level,
            event_log,
            ignored: if apply_filters { FILTERED_MODULES } else { &[] },
        }
    }

    fn is_ignored(&self, target: &str) -> bool {
        self.ignored.iter().any(|module| {
            target == *module
                || target
                    .strip_prefix(module)
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && !self.is_ignored(metadata.target())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A failing sink has nowhere else to report to.
            let _ = self
                .event_log
                .record(record.level(), &record.args().to_string());
        }
    }

    fn flush(&self) {}
}

impl SharedLogger for FileLogger {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn config(&self) -> Option<&simplelog::Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::fs;

    fn metadata(level: Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_filtered_modules_contains_expected_dependencies() {
        for module in ["hyper", "reqwest", "tower", "axum"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_should_filter_dependencies_trace_level_disables_filtering() {
        assert!(
            !Logger::should_filter_dependencies(LevelFilter::Trace),
            "Trace level should disable filtering"
        );
    }

    #[test]
    fn test_should_filter_dependencies_other_levels_enable_filtering() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(
                Logger::should_filter_dependencies(level),
                "{level} should enable filtering"
            );
        }
    }

    #[test]
    fn test_exactly_one_file_handler_is_installed() {
        let dir = tempfile::tempdir().unwrap();
        let event_log = EventLog::new(dir.path().join("watchdog.log"));

        let loggers = Logger::build_loggers(LevelFilter::Info, &event_log);

        assert_eq!(loggers.len(), 1);
        assert_eq!(loggers[0].level(), LevelFilter::Info);
        assert!(loggers[0].config().is_none());
    }

    #[test]
    fn test_file_logger_respects_level() {
        let dir = tempfile::tempdir().unwrap();
        let event_log = EventLog::new(dir.path().join("watchdog.log"));
        let logger = FileLogger::new(LevelFilter::Warn, event_log, true);

        assert!(logger.enabled(&metadata(Level::Error, "webhook_watchdog")));
        assert!(logger.enabled(&metadata(Level::Warn, "webhook_watchdog")));
        assert!(!logger.enabled(&metadata(Level::Info, "webhook_watchdog")));
    }

    #[test]
    fn test_file_logger_filters_dependency_targets() {
        let dir = tempfile::tempdir().unwrap();
        let event_log = EventLog::new(dir.path().join("watchdog.log"));
        let logger = FileLogger::new(LevelFilter::Trace, event_log.clone(), true);

        assert!(!logger.enabled(&metadata(Level::Info, "hyper")));
        assert!(!logger.enabled(&metadata(Level::Info, "hyper::proto::h1")));
        assert!(logger.enabled(&metadata(Level::Info, "hyperion")));

        let unfiltered = FileLogger::new(LevelFilter::Trace, event_log, false);
        assert!(unfiltered.enabled(&metadata(Level::Info, "hyper::proto::h1")));
    }

    #[test]
    fn test_file_logger_writes_through_event_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");
        let logger = FileLogger::new(LevelFilter::Info, EventLog::new(&path), true);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("webhook_watchdog")
                .args(format_args!("server started"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("webhook_watchdog")
                .args(format_args!("too chatty"))
                .build(),
        );

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains(" - INFO - server started"));
    }
}
