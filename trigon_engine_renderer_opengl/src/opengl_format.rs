//! Engine enum to OpenGL constant conversions

use trigon_engine::trigon::render::{ClearFlags, PrimitiveTopology, ShaderStage, UsageHint};

/// Convert ShaderStage to a shader object type
pub(crate) fn shader_stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Convert UsageHint to a buffer usage
pub(crate) fn usage_to_gl(usage: UsageHint) -> u32 {
    match usage {
        UsageHint::Static => glow::STATIC_DRAW,
        UsageHint::Dynamic => glow::DYNAMIC_DRAW,
        UsageHint::Streaming => glow::STREAM_DRAW,
    }
}

/// Convert PrimitiveTopology to a draw mode
pub(crate) fn topology_to_gl(topology: PrimitiveTopology) -> u32 {
    match topology {
        PrimitiveTopology::TriangleList => glow::TRIANGLES,
        PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveTopology::LineList => glow::LINES,
        PrimitiveTopology::PointList => glow::POINTS,
    }
}

/// Convert ClearFlags to a clear mask
pub(crate) fn clear_flags_to_gl(flags: ClearFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= glow::STENCIL_BUFFER_BIT;
    }
    mask
}

/// Name of an error code returned by `glGetError`
pub(crate) fn error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

#[cfg(test)]
#[path = "opengl_format_tests.rs"]
mod tests;
