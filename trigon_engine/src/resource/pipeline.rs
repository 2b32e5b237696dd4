//! Pipeline bootstrap: shader sources and vertex data in, drawable pipeline out.

use crate::{engine_info, engine_warn};
use crate::error::Result;
use crate::graphics_device::{DeviceRef, PrimitiveTopology, UsageHint};
use crate::resource::geometry::{GeometryBuffer, VertexAttributeLayout};
use crate::resource::program::{LinkedProgram, ProgramLinker};
use crate::resource::shader::{ShaderSource, ShaderUnit};

// ============================================================================
// PIPELINE DESC
// ============================================================================

/// Everything needed to build a `Pipeline`
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    /// Vertex stage GLSL
    pub vertex_source: &'a str,
    /// Fragment stage GLSL
    pub fragment_source: &'a str,
    /// Flat vertex data
    pub vertices: &'a [f32],
    /// How `vertices` map to the vertex stage inputs
    pub layout: VertexAttributeLayout,
    /// Upload usage hint
    pub usage: UsageHint,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// A linked program and the geometry it draws
///
/// Per frame: bind the program, bind the geometry, submit the draw call.
/// `draw` does exactly that.
#[derive(Debug)]
pub struct Pipeline {
    program: LinkedProgram,
    geometry: GeometryBuffer,
}

impl Pipeline {
    pub fn program(&self) -> &LinkedProgram {
        &self.program
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    /// Bind program, bind geometry, draw every vertex
    pub fn draw(&self, topology: PrimitiveTopology) -> Result<()> {
        self.program.bind()?;
        self.geometry.draw(topology)
    }
}

/// Builds a `Pipeline` from sources and vertex data
pub struct PipelineBootstrap;

impl PipelineBootstrap {
    /// Compile, link and upload
    ///
    /// Order: vertex stage, fragment stage, link, geometry upload. The first
    /// failure aborts the build and is returned unchanged; everything created
    /// before it is released when the partial results drop.
    ///
    /// A driver error still pending after a successful build is logged as a
    /// warning and does not fail the build.
    ///
    /// # Arguments
    ///
    /// * `device` - Current rendering context
    /// * `desc` - Sources, vertex data, layout and usage hint
    pub fn build(device: &DeviceRef, desc: PipelineDesc<'_>) -> Result<Pipeline> {
        let vertex = ShaderUnit::compile(device, ShaderSource::vertex(desc.vertex_source))?;
        let fragment = ShaderUnit::compile(device, ShaderSource::fragment(desc.fragment_source))?;

        let mut stages = [vertex, fragment];
        let program = ProgramLinker::link(device, &mut stages)?;

        let geometry = GeometryBuffer::upload(device, desc.vertices, desc.usage, desc.layout)?;

        if let Some(code) = device.poll_error() {
            engine_warn!(
                "trigon::PipelineBootstrap",
                "Driver error 0x{:04X} pending after pipeline setup",
                code
            );
        }

        engine_info!(
            "trigon::PipelineBootstrap",
            "Pipeline ready ({} vertices)",
            geometry.vertex_count()
        );

        Ok(Pipeline { program, geometry })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
