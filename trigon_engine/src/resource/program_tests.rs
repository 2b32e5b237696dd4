//! Unit tests for program.rs
//!
//! Links compiled units against MockGraphicsDevice (no GPU required).

use std::rc::Rc;
use crate::error::Error;
use crate::graphics_device::{DeviceRef, GraphicsDevice as _, MockGraphicsDevice};
use crate::primitives::{TRIANGLE_FRAGMENT_SHADER, TRIANGLE_VERTEX_SHADER};
use crate::resource::{ProgramLinker, ShaderSource, ShaderUnit};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn create_mock_device() -> (Rc<MockGraphicsDevice>, DeviceRef) {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: DeviceRef = mock.clone();
    (mock, device)
}

fn compile_pair(device: &DeviceRef) -> Vec<ShaderUnit> {
    vec![
        ShaderUnit::compile(device, ShaderSource::vertex(TRIANGLE_VERTEX_SHADER)).unwrap(),
        ShaderUnit::compile(device, ShaderSource::fragment(TRIANGLE_FRAGMENT_SHADER)).unwrap(),
    ]
}

// ============================================================================
// LINK SUCCESS
// ============================================================================

#[test]
fn test_link_vertex_and_fragment() {
    let (mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);

    let program = ProgramLinker::link(&device, &mut stages).unwrap();

    assert!(program.is_valid());
    assert!(program.handle().is_some());
    assert_eq!(mock.program_count(), 1);
}

#[test]
fn test_link_releases_every_stage() {
    let (mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);
    let vs = stages[0].handle().unwrap().object();
    let fs = stages[1].handle().unwrap().object();
    mock.clear_calls();

    let program = ProgramLinker::link(&device, &mut stages).unwrap();
    let p = program.handle().unwrap().object();

    assert!(stages.iter().all(ShaderUnit::is_spent));
    assert_eq!(mock.shader_count(), 0);
    assert!(mock.attached_shaders(p).is_empty());
    assert_eq!(
        mock.calls(),
        vec![
            format!("create_program() -> {}", p.0),
            format!("attach_shader({}, {})", p.0, vs.0),
            format!("attach_shader({}, {})", p.0, fs.0),
            format!("link_program({})", p.0),
            format!("program_link_status({})", p.0),
            format!("detach_shader({}, {})", p.0, vs.0),
            format!("delete_shader({})", vs.0),
            format!("detach_shader({}, {})", p.0, fs.0),
            format!("delete_shader({})", fs.0),
        ]
    );
    assert_eq!(mock.poll_error(), None);
}

#[test]
fn test_bind_makes_program_current() {
    let (mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);
    let program = ProgramLinker::link(&device, &mut stages).unwrap();

    program.bind().unwrap();

    assert_eq!(mock.current_program(), program.handle().map(|h| h.object()));
}

// ============================================================================
// LINK FAILURE
// ============================================================================

#[test]
fn test_link_without_fragment_stage_fails_before_driver_calls() {
    let (mock, device) = create_mock_device();
    let mut stages = vec![
        ShaderUnit::compile(&device, ShaderSource::vertex(TRIANGLE_VERTEX_SHADER)).unwrap(),
    ];
    mock.clear_calls();

    let err = ProgramLinker::link(&device, &mut stages).unwrap_err();

    match err {
        Error::LinkError { log } => assert!(log.contains("fragment")),
        other => panic!("expected LinkError, got {:?}", other),
    }
    assert!(mock.calls().is_empty());
    assert!(!stages[0].is_spent());
}

#[test]
fn test_link_without_vertex_stage_fails() {
    let (_mock, device) = create_mock_device();
    let mut stages = vec![
        ShaderUnit::compile(&device, ShaderSource::fragment(TRIANGLE_FRAGMENT_SHADER)).unwrap(),
    ];

    let err = ProgramLinker::link(&device, &mut stages).unwrap_err();

    match err {
        Error::LinkError { log } => assert!(log.contains("vertex")),
        other => panic!("expected LinkError, got {:?}", other),
    }
}

#[test]
fn test_link_empty_set_fails() {
    let (_mock, device) = create_mock_device();
    let err = ProgramLinker::link(&device, &mut []).unwrap_err();
    assert!(matches!(err, Error::LinkError { .. }));
}

#[test]
fn test_driver_link_failure_keeps_units_and_deletes_program() {
    let (mock, device) = create_mock_device();
    mock.force_link_failure("error: vertex output `color' not consumed\n");
    let mut stages = compile_pair(&device);

    let err = ProgramLinker::link(&device, &mut stages).unwrap_err();

    assert_eq!(err, Error::LinkError { log: "error: vertex output `color' not consumed".to_string() });
    assert!(stages.iter().all(|unit| !unit.is_spent()));
    assert_eq!(mock.program_count(), 0);
    assert_eq!(mock.shader_count(), 2);
    assert_eq!(mock.poll_error(), None);

    // The caller still owns the units; dropping them frees everything
    drop(stages);
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn test_link_spent_unit_is_invalid_resource() {
    let (mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);
    stages[1].destroy();
    mock.clear_calls();

    let err = ProgramLinker::link(&device, &mut stages).unwrap_err();

    assert!(matches!(err, Error::InvalidResource(_)));
    assert!(mock.calls().is_empty());
}

#[test]
fn test_relinking_consumed_units_is_rejected() {
    let (_mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);
    let _program = ProgramLinker::link(&device, &mut stages).unwrap();

    let err = ProgramLinker::link(&device, &mut stages).unwrap_err();

    assert!(matches!(err, Error::InvalidResource(_)));
}

#[test]
fn test_program_allocation_failure() {
    let (mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);
    mock.fail_next_allocation();

    let err = ProgramLinker::link(&device, &mut stages).unwrap_err();

    assert!(matches!(err, Error::BackendError(_)));
    assert!(stages.iter().all(|unit| !unit.is_spent()));
}

// ============================================================================
// DESTRUCTION
// ============================================================================

#[test]
fn test_destroy_is_idempotent() {
    let (mock, device) = create_mock_device();
    let mut stages = compile_pair(&device);
    let mut program = ProgramLinker::link(&device, &mut stages).unwrap();

    program.destroy();
    program.destroy();

    assert!(!program.is_valid());
    assert!(program.handle().is_none());
    assert!(matches!(program.bind(), Err(Error::InvalidResource(_))));
    assert_eq!(mock.live_objects(), 0);
    assert_eq!(mock.poll_error(), None);
}

#[test]
fn test_drop_releases_program() {
    let (mock, device) = create_mock_device();
    {
        let mut stages = compile_pair(&device);
        let _program = ProgramLinker::link(&device, &mut stages).unwrap();
        assert_eq!(mock.program_count(), 1);
    }
    assert_eq!(mock.live_objects(), 0);
}
