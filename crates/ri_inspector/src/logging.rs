//! Bridges between the `log` facade and the host's logger.
//!
//! Library code logs through [`log`] like any other crate. A plugin
//! bootstrap implements [`HostLog`] over the host's own logger and calls
//! [`install`] once; from then on every `log::warn!` lands in the host log.
//!
//! Messages that need the host's combined levels, e.g. a warning that is
//! also shown on screen, go through [`log`](fn@log), which hands the full
//! [`LogLevel`] to the installed host.

use core::fmt;

use bitflags::bitflags;
use ri_os::sync::{Arc, OnceLock};

bitflags! {
    /// The host's log levels.
    ///
    /// Several levels may be combined on a single message, the host decides
    /// how to show such a message. Converting to [`log::Level`] picks the
    /// most severe contained level.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LogLevel: u32 {
        const FATAL   = 1 << 0;
        const ERROR   = 1 << 1;
        const WARNING = 1 << 2;
        const MESSAGE = 1 << 3;
        const INFO    = 1 << 4;
        const DEBUG   = 1 << 5;
        const ALL     = Self::FATAL.bits()
            | Self::ERROR.bits()
            | Self::WARNING.bits()
            | Self::MESSAGE.bits()
            | Self::INFO.bits()
            | Self::DEBUG.bits();
    }
}

impl LogLevel {
    /// No level at all. Messages logged at `NONE` are dropped.
    pub const NONE: Self = Self::empty();

    /// Returns the most severe [`log::Level`] contained in `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ri_inspector::logging::LogLevel;
    ///
    /// let level = LogLevel::DEBUG | LogLevel::WARNING;
    /// assert_eq!(level.most_severe(), Some(log::Level::Warn));
    /// assert_eq!(LogLevel::NONE.most_severe(), None);
    /// ```
    pub fn most_severe(self) -> Option<log::Level> {
        if self.intersects(Self::FATAL | Self::ERROR) {
            Some(log::Level::Error)
        } else if self.contains(Self::WARNING) {
            Some(log::Level::Warn)
        } else if self.intersects(Self::MESSAGE | Self::INFO) {
            Some(log::Level::Info)
        } else if self.contains(Self::DEBUG) {
            Some(log::Level::Debug)
        } else {
            None
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::ERROR,
            log::Level::Warn => Self::WARNING,
            log::Level::Info => Self::INFO,
            log::Level::Debug | log::Level::Trace => Self::DEBUG,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        bitflags::parser::to_writer(self, f)
    }
}

// -----------------------------------------------------------------------------
// HostLog

/// The logging capability of the host.
pub trait HostLog: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

impl<L: HostLog + ?Sized> HostLog for Arc<L> {
    #[inline]
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message);
    }
}

/// Adapts a [`HostLog`] to the [`log::Log`] interface.
pub struct HostLogger<L> {
    host: L,
    max: log::LevelFilter,
}

impl<L: HostLog> HostLogger<L> {
    /// Forwards records up to and including `max` to `host`.
    pub const fn new(host: L, max: log::LevelFilter) -> Self {
        Self { host, max }
    }
}

impl<L: HostLog> log::Log for HostLogger<L> {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.max
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = LogLevel::from(record.level());
        match record.args().as_str() {
            Some(message) => self.host.log(level, message),
            None => self.host.log(level, &record.args().to_string()),
        }
    }

    fn flush(&self) {}
}

static HOST: OnceLock<Arc<dyn HostLog>> = OnceLock::new();

/// Installs `host` as the global logger.
///
/// Fails if a global logger was already set.
pub fn install<L: HostLog + 'static>(
    host: L,
    max: log::LevelFilter,
) -> Result<(), log::SetLoggerError> {
    let host: Arc<dyn HostLog> = Arc::new(host);
    log::set_boxed_logger(Box::new(HostLogger::new(host.clone(), max)))?;
    log::set_max_level(max);
    HOST.get_or_init(|| host);
    Ok(())
}

/// Logs `message` with host-style combined levels.
///
/// The installed host receives `level` unchanged. Without one, the message
/// goes through the `log` facade at the most severe level in `level`.
/// Either way it is dropped if that level is filtered out.
pub fn log(level: LogLevel, message: &str) {
    let Some(severity) = level.most_severe() else {
        return;
    };
    if severity > log::max_level() {
        return;
    }
    match HOST.get() {
        Some(host) => host.log(level, message),
        None => log::log!(severity, "{message}"),
    }
}

#[cfg(test)]
mod tests {
    use log::{Level, LevelFilter, Log, Record};
    use ri_os::sync::{Arc, Mutex};

    use super::{HostLog, HostLogger, LogLevel, install, log};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(LogLevel, String)>>);

    impl HostLog for Recorder {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_owned()));
        }
    }

    #[test]
    fn combined_levels_pick_most_severe() {
        assert_eq!(LogLevel::ALL.most_severe(), Some(Level::Error));
        assert_eq!((LogLevel::INFO | LogLevel::DEBUG).most_severe(), Some(Level::Info));
        assert_eq!(LogLevel::MESSAGE.most_severe(), Some(Level::Info));
        assert_eq!(LogLevel::FATAL.most_severe(), Some(Level::Error));
    }

    #[test]
    fn display() {
        assert_eq!(LogLevel::NONE.to_string(), "None");
        assert_eq!((LogLevel::ERROR | LogLevel::DEBUG).to_string(), "ERROR | DEBUG");
    }

    #[test]
    fn host_logger_filters_and_forwards() {
        let recorder = Arc::new(Recorder::default());
        let logger = HostLogger::new(recorder.clone(), LevelFilter::Info);

        logger.log(&Record::builder().args(format_args!("hidden")).level(Level::Debug).build());
        logger.log(
            &Record::builder()
                .args(format_args!("value {}", 3))
                .level(Level::Warn)
                .build(),
        );

        let lines = recorder.0.lock().unwrap();
        assert_eq!(&*lines, &[(LogLevel::WARNING, "value 3".to_owned())]);
    }

    #[test]
    fn installed_host_receives_combined_levels() {
        let recorder = Arc::new(Recorder::default());
        install(recorder.clone(), LevelFilter::Info).unwrap();

        log(LogLevel::MESSAGE | LogLevel::WARNING, "shown on screen");
        log(LogLevel::FATAL, "crashed");
        log(LogLevel::DEBUG, "too verbose");

        // Other tests may log through the facade meanwhile.
        let lines = recorder.0.lock().unwrap();
        let level_of = |message: &str| lines.iter().find(|(_, m)| m == message).map(|(level, _)| *level);
        assert_eq!(level_of("shown on screen"), Some(LogLevel::MESSAGE | LogLevel::WARNING));
        assert_eq!(level_of("crashed"), Some(LogLevel::FATAL));
        assert_eq!(level_of("too verbose"), None);
    }
}
