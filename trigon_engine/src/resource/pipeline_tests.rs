//! Unit tests for pipeline.rs
//!
//! Builds pipelines against MockGraphicsDevice (no GPU required).

use std::rc::Rc;
use crate::error::Error;
use crate::graphics_device::{
    mock_graphics_device::INVALID_OPERATION, DeviceRef, GraphicsDevice as _, MockGraphicsDevice, PrimitiveTopology,
    ShaderStage, UsageHint,
};
use crate::primitives::{triangle_layout, TRIANGLE_2D, TRIANGLE_FRAGMENT_SHADER, TRIANGLE_VERTEX_SHADER};
use crate::resource::{PipelineBootstrap, PipelineDesc};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn create_mock_device() -> (Rc<MockGraphicsDevice>, DeviceRef) {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: DeviceRef = mock.clone();
    (mock, device)
}

fn triangle_desc<'a>(vertex_source: &'a str, fragment_source: &'a str) -> PipelineDesc<'a> {
    PipelineDesc {
        vertex_source,
        fragment_source,
        vertices: &TRIANGLE_2D,
        layout: triangle_layout(),
        usage: UsageHint::Static,
    }
}

// ============================================================================
// BUILD
// ============================================================================

#[test]
fn test_build_triangle_pipeline() {
    let (mock, device) = create_mock_device();

    let pipeline = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    ).unwrap();

    assert!(pipeline.program().is_valid());
    assert_eq!(pipeline.geometry().vertex_count(), 3);
    // Program + buffer + vertex array; both shader objects were released by the link
    assert_eq!(mock.live_objects(), 3);
    assert_eq!(mock.shader_count(), 0);
}

#[test]
fn test_build_step_order() {
    let (mock, device) = create_mock_device();

    let _pipeline = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    ).unwrap();

    let names = mock.call_names();
    let position = |name: &str| names.iter().position(|n| n == name).unwrap();
    let calls = mock.calls();
    assert!(calls[0].starts_with("create_shader(vertex)"));
    assert!(calls.iter().any(|c| c.starts_with("create_shader(fragment)")));
    assert!(position("create_program") < position("create_vertex_array"));
    assert!(position("link_program") < position("create_buffer"));
    assert_eq!(names.last().map(String::as_str), Some("poll_error"));
}

#[test]
fn test_build_fragment_error_aborts() {
    let (mock, device) = create_mock_device();
    let broken = "#version 330 core\nout vec4 FragColor;\nvoid main()\n{\n    FragColor = vec4(1.0, 0.5, 0.2, 1.0)\n}\n";

    let err = PipelineBootstrap::build(&device, triangle_desc(TRIANGLE_VERTEX_SHADER, broken)).unwrap_err();

    assert!(matches!(err, Error::CompilationError { stage: ShaderStage::Fragment, .. }));
    assert!(!mock.call_names().iter().any(|n| n == "create_program"));
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_build_vertex_error_stops_before_fragment() {
    let (mock, device) = create_mock_device();

    let err = PipelineBootstrap::build(&device, triangle_desc("void main() {}", TRIANGLE_FRAGMENT_SHADER)).unwrap_err();

    assert!(matches!(err, Error::CompilationError { stage: ShaderStage::Vertex, .. }));
    assert!(!mock.calls().iter().any(|c| c.starts_with("create_shader(fragment)")));
}

#[test]
fn test_build_link_error_releases_everything() {
    let (mock, device) = create_mock_device();
    mock.force_link_failure("error: link failed");

    let err = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    ).unwrap_err();

    assert_eq!(err, Error::LinkError { log: "error: link failed".to_string() });
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_build_upload_error_releases_program() {
    let (mock, device) = create_mock_device();
    // vertex shader, fragment shader, program, then the vertex array fails
    mock.fail_allocation_after(3);

    let err = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    ).unwrap_err();

    assert!(matches!(err, Error::BackendError(_)));
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_build_pending_driver_error_is_not_fatal() {
    let (mock, device) = create_mock_device();
    mock.raise_error(INVALID_OPERATION);

    let pipeline = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    );

    assert!(pipeline.is_ok());
    assert_eq!(mock.poll_error(), None);
}

// ============================================================================
// DRAW
// ============================================================================

#[test]
fn test_draw_order() {
    let (mock, device) = create_mock_device();
    let pipeline = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    ).unwrap();
    mock.clear_calls();

    pipeline.draw(PrimitiveTopology::TriangleList).unwrap();

    assert_eq!(mock.call_names(), vec!["use_program", "bind_vertex_array", "draw_arrays"]);
    assert_eq!(mock.draw_calls(), 1);
    assert_eq!(mock.poll_error(), None);
}

#[test]
fn test_drop_pipeline_releases_everything() {
    let (mock, device) = create_mock_device();
    let pipeline = PipelineBootstrap::build(
        &device,
        triangle_desc(TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER),
    ).unwrap();

    drop(pipeline);

    assert_eq!(mock.live_objects(), 0);
}
