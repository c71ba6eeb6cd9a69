// A tiny stderr logger for the `log` crate. Records are written as
// `timestamp|LEVEL|file:line: message`, with the timestamp in local time
// once the system time zone is known.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use {
    jiff::{fmt::strtime, tz::TimeZone},
    log::Log,
};

use crate::{context::DEFAULT_DATETIME_FORMAT, style::Theme};

/// The simplest possible logger that logs to stderr.
///
/// This logger does no filtering. Instead, it relies on the `log` crates
/// filtering via its global max_level setting.
#[derive(Debug)]
pub struct Logger {
    tz: Mutex<Option<TimeZone>>,
}

impl Logger {
    /// Create a new logger that logs to stderr and initialize it as the
    /// global logger. If there was a problem setting the logger, then an
    /// error is returned.
    pub fn init() -> Result<&'static Logger, log::SetLoggerError> {
        let logger = Box::leak(Box::new(Logger { tz: Mutex::new(None) }));
        log::set_logger(logger)?;
        Ok(logger)
    }

    pub fn set_time_zone(&self, tz: TimeZone) {
        let mut logger_tz = self.tz.lock().unwrap();
        *logger_tz = Some(tz);
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        // We set the log level via log::set_max_level, so we don't need to
        // implement filtering here.
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        // `Zoned::now()` may read the system time zone, which logs. So the
        // time zone is only ever the one handed to us by `set_time_zone`.
        let ts = jiff::Timestamp::now();
        let tz = self.tz.lock().unwrap().clone();
        let formatted = match tz {
            Some(tz) => {
                strtime::format(DEFAULT_DATETIME_FORMAT, &ts.to_zoned(tz))
            }
            None => strtime::format(DEFAULT_DATETIME_FORMAT, ts),
        };
        let now = formatted.unwrap_or_else(|_| ts.to_string());
        match (record.file(), record.line()) {
            (Some(file), Some(line)) => {
                eprintln!(
                    "{}|{}|{}:{}: {}",
                    Theme::stderr().highlight(now),
                    record.level(),
                    relative(file),
                    line,
                    record.args()
                );
            }
            (Some(file), None) => {
                eprintln!(
                    "{}|{}|{}: {}",
                    Theme::stderr().highlight(now),
                    record.level(),
                    relative(file),
                    record.args()
                );
            }
            _ => {
                eprintln!(
                    "{}|{}: {}",
                    Theme::stderr().highlight(now),
                    record.level(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {
        // We use eprintln! which is flushed on every call.
    }
}

fn relative<'p>(path: &'p str) -> &'p str {
    let Some(cwd) = cwd() else { return path };
    let Ok(relative) = Path::new(path).strip_prefix(cwd) else { return path };
    let Some(relative) = relative.to_str() else { return path };
    relative
}

fn cwd() -> Option<&'static Path> {
    static CWD: LazyLock<Option<PathBuf>> =
        LazyLock::new(|| std::env::current_dir().ok());
    CWD.as_deref()
}
