//! Unit tests for primitives.rs

use glam::Vec3;
use super::*;
use crate::graphics_device::mock_graphics_device::check_glsl;

#[test]
fn test_triangle_layout_matches_triangle_data() {
    let layout = triangle_layout();
    assert_eq!(layout.components_per_vertex(), 3);
    assert_eq!(layout.attributes()[0].stride, 12);
    assert_eq!(TRIANGLE_2D.len() as u32 % layout.components_per_vertex(), 0);
}

#[test]
fn test_triangle_shaders_are_well_formed() {
    assert_eq!(check_glsl(TRIANGLE_VERTEX_SHADER), Ok(()));
    assert_eq!(check_glsl(TRIANGLE_FRAGMENT_SHADER), Ok(()));
}

#[test]
fn test_positions_to_vertices() {
    let positions = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.0, 0.5, 0.0),
    ];
    assert_eq!(positions_to_vertices(&positions), TRIANGLE_2D.to_vec());
    assert!(positions_to_vertices(&[]).is_empty());
}
