//! Process-wide logging state
//!
//! Rendering state is never global here: every build call takes a `DeviceRef`.
//! What `Engine` owns is the installed logger and the severity threshold.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// `LogSeverity as u8`
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(LogSeverity::Trace as u8);

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Logging facade
///
/// # Example
///
/// ```no_run
/// use trigon_engine::trigon::Engine;
/// use trigon_engine::trigon::log::LogSeverity;
///
/// Engine::set_min_severity(LogSeverity::Info);
/// Engine::log(LogSeverity::Info, "trigon::demo", "Starting".to_string());
/// ```
pub struct Engine;

impl Engine {
    /// Route every subsequent entry to `logger`
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut slot) = self::logger().write() {
            *slot = Box::new(logger);
        }
    }

    /// Restore the console logger
    pub fn reset_logger() {
        Self::set_logger(DefaultLogger);
    }

    /// Drop every entry below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> LogSeverity {
        LogSeverity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Entry point of `engine_trace!` through `engine_warn!`
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Entry point of `engine_error!`; `file` and `line` name the call site
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if severity < Self::min_severity() {
            return;
        }
        if let Ok(sink) = logger().read() {
            sink.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
