//! GPU resource module
//!
//! Shader units, linked programs, geometry buffers and the pipeline bootstrap
//! composing them. Every resource keeps a `DeviceRef` and releases its driver
//! objects on drop.

pub mod shader;
pub mod program;
pub mod geometry;
pub mod pipeline;

pub use shader::{ShaderSource, ShaderUnit, CompiledShaderHandle};
pub use program::{ProgramLinker, LinkedProgram, LinkedProgramHandle};
pub use geometry::{
    GeometryBuffer, GeometryBufferHandle,
    VertexAttribute, VertexAttributeLayout,
};
pub use pipeline::{Pipeline, PipelineBootstrap, PipelineDesc};
