//! Engine facade tests
//!
//! The installed logger and the threshold are global, hence #[serial].

use crate::trigon::Engine;
use crate::trigon::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

/// Records "Severity: message @file:line" for the "trigon::test" source only
///
/// Resource tests log from other threads while these run.
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != "trigon::test" {
            return;
        }
        let location = entry.location().map(|at| format!(" @{}", at)).unwrap_or_default();
        self.entries.lock().unwrap()
            .push(format!("{:?}: {}{}", entry.severity, entry.message, location));
    }
}

fn teardown() {
    Engine::reset_logger();
    Engine::set_min_severity(LogSeverity::Trace);
}

#[test]
#[serial]
fn test_engine_custom_logger_receives_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "trigon::test", "hello".to_string());
    crate::engine_warn!("trigon::test", "value = {}", 3);

    let captured = entries.lock().unwrap().clone();
    assert_eq!(captured, vec!["Info: hello".to_string(), "Warn: value = 3".to_string()]);

    teardown();
}

#[test]
#[serial]
fn test_engine_min_severity_filters_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    crate::engine_debug!("trigon::test", "dropped");
    crate::engine_info!("trigon::test", "dropped too");
    crate::engine_warn!("trigon::test", "kept");

    assert_eq!(entries.lock().unwrap().len(), 1);

    teardown();
}

#[test]
#[serial]
fn test_engine_err_macro_logs_and_builds_backend_error() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let err = crate::engine_err!("trigon::test", "Failed to create {}", "buffer");
    assert_eq!(err, crate::trigon::Error::BackendError("Failed to create buffer".to_string()));

    let captured = entries.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].starts_with("Error: Failed to create buffer @"));

    teardown();
}
