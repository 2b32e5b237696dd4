//! Built-in primitives and the shaders that draw them.
//!
//! Positions are in normalized device coordinates (-1.0..=1.0).

use glam::Vec3;

use crate::resource::{VertexAttribute, VertexAttributeLayout};

/// Single triangle centered on the origin, three `vec3` positions
pub const TRIANGLE_2D: [f32; 9] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.0,  0.5, 0.0,
];

/// Vertex stage passing `aPos` (location 0) through unchanged
pub const TRIANGLE_VERTEX_SHADER: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

/// Fragment stage writing a constant green
pub const TRIANGLE_FRAGMENT_SHADER: &str = "#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(0.5f, 1.0f, 0.2f, 1.0f);
}
";

/// One tightly packed `vec3` position at location 0
pub fn triangle_layout() -> VertexAttributeLayout {
    VertexAttributeLayout::single(VertexAttribute {
        location: 0,
        component_count: 3,
        stride: (3 * std::mem::size_of::<f32>()) as u32,
        offset: 0,
    })
}

/// Flatten positions into the float stream `GeometryBuffer::upload` expects
pub fn positions_to_vertices(positions: &[Vec3]) -> Vec<f32> {
    bytemuck::cast_slice::<Vec3, f32>(positions).to_vec()
}

#[cfg(test)]
#[path = "primitives_tests.rs"]
mod tests;
