//! Logging integration tests
//!
//! The logger is process-wide, so every test here runs under #[serial].

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use serial_test::serial;
use trigon_engine::trigon::Engine;
use trigon_engine::trigon::log::{LogEntry, LogSeverity, Logger};
use trigon_engine::trigon::render::{DeviceRef, MockGraphicsDevice, UsageHint};
use trigon_engine::trigon::resource::{GeometryBuffer, ShaderSource, ShaderUnit};
use trigon_engine::trigon::primitives::triangle_layout;

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

fn teardown() {
    Engine::reset_logger();
    Engine::set_min_severity(LogSeverity::Trace);
}

#[test]
#[serial]
fn compile_failure_is_logged_with_location() {
    let entries = install_capture();
    let device: DeviceRef = Rc::new(MockGraphicsDevice::new());

    let _ = ShaderUnit::compile(&device, ShaderSource::fragment("void main() {}"));

    let captured = entries.lock().unwrap().clone();
    let error = captured.iter()
        .find(|e| e.source == "trigon::ShaderUnit")
        .expect("compile failure was not logged");
    assert_eq!(error.severity, LogSeverity::Error);
    assert!(error.message.contains("fragment"));
    assert!(error.file.is_some());
    assert!(error.line.is_some());

    teardown();
}

#[test]
#[serial]
fn trailing_floats_are_warned_about() {
    let entries = install_capture();
    let device: DeviceRef = Rc::new(MockGraphicsDevice::new());

    let _geometry = GeometryBuffer::upload(&device, &[0.0; 4], UsageHint::Static, triangle_layout()).unwrap();

    let captured = entries.lock().unwrap().clone();
    assert!(captured.iter().any(|e| {
        e.source == "trigon::GeometryBuffer" && e.severity == LogSeverity::Warn
    }));

    teardown();
}

#[test]
#[serial]
fn min_severity_silences_debug_output() {
    let entries = install_capture();
    Engine::set_min_severity(LogSeverity::Warn);
    let device: DeviceRef = Rc::new(MockGraphicsDevice::new());

    let _geometry = GeometryBuffer::upload(&device, &[0.0; 9], UsageHint::Static, triangle_layout()).unwrap();

    assert!(entries.lock().unwrap().is_empty());

    teardown();
}
