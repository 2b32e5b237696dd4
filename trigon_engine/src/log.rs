//! Engine logging
//!
//! Entries flow from the `engine_*!` macros through `Engine::log` to a single
//! process-wide `Logger`. The default logger prints one colored line per entry;
//! replace it with `Engine::set_logger` to capture or redirect output.
//!
//! ERROR entries carry the file and line of the macro call site.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};

/// Sink for log entries
///
/// # Example
///
/// ```no_run
/// use trigon_engine::trigon::log::{Logger, LogEntry};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{} {}", entry.severity, entry.message);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "trigon::ShaderUnit"
    pub source: String,
    pub message: String,
    /// Call site file (ERROR entries only)
    pub file: Option<&'static str>,
    /// Call site line (ERROR entries only)
    pub line: Option<u32>,
}

impl LogEntry {
    /// `file:line` of the call site, if recorded
    pub fn location(&self) -> Option<String> {
        match (self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }
}

/// Severity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogSeverity {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogSeverity {
    /// Fixed-width upper-case label
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    /// Inverse of `severity as u8`; out-of-range values saturate to `Error`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogSeverity::Trace,
            1 => LogSeverity::Debug,
            2 => LogSeverity::Info,
            3 => LogSeverity::Warn,
            _ => LogSeverity::Error,
        }
    }

    fn colored_label(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().trim_end())
    }
}

/// Console logger
///
/// Line format: `[YYYY-MM-DD HH:MM:SS.mmm] [SEVERITY] [source] message (file:line)`.
/// WARN and ERROR lines go to stderr, the rest to stdout.
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry as one line
    pub fn format_entry(entry: &LogEntry) -> String {
        let local: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.severity.colored_label(),
            entry.source.bright_blue(),
            entry.message
        );
        if let Some(location) = entry.location() {
            line.push_str(&format!(" ({})", location));
        }
        line
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let line = Self::format_entry(entry);
        if entry.severity >= LogSeverity::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::trigon::Engine::log(
            $crate::trigon::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at TRACE
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

/// Log at DEBUG
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

/// Log at INFO
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

/// Log at WARN
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// Log at ERROR, recording the call site
///
/// ```ignore
/// engine_error!("trigon::ProgramLinker", "Program link failed: {}", log);
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::trigon::Engine::log_detailed(
            $crate::trigon::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log at ERROR and evaluate to `Error::BackendError` carrying the message
///
/// ```ignore
/// let err = engine_err!("trigon::opengl", "glCreateProgram failed: {}", reason);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::trigon::Error::BackendError(message)
    }};
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
