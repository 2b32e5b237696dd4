//! Compiled shader stages.
//!
//! A `ShaderUnit` owns exactly one driver shader object. It is a single-use
//! build artifact: once linked into a program the linker releases it and the
//! unit becomes spent.

use crate::engine_error;
use crate::error::{Error, Result};
use crate::graphics_device::{self, DeviceRef, ShaderObject, ShaderStage};

// ============================================================================
// SHADER SOURCE
// ============================================================================

/// Stage-tagged source text borrowed from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    /// GLSL source text
    pub text: &'a str,
    /// Pipeline stage the text is compiled for
    pub stage: ShaderStage,
}

impl<'a> ShaderSource<'a> {
    /// Vertex stage source
    pub fn vertex(text: &'a str) -> Self {
        Self { text, stage: ShaderStage::Vertex }
    }

    /// Fragment stage source
    pub fn fragment(text: &'a str) -> Self {
        Self { text, stage: ShaderStage::Fragment }
    }
}

/// Opaque handle of a compiled shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompiledShaderHandle(ShaderObject);

impl CompiledShaderHandle {
    /// Underlying driver object
    pub fn object(&self) -> ShaderObject {
        self.0
    }
}

// ============================================================================
// SHADER UNIT
// ============================================================================

/// One compiled shader stage
pub struct ShaderUnit {
    device: DeviceRef,
    stage: ShaderStage,
    /// `None` once destroyed or consumed by a successful link
    handle: Option<CompiledShaderHandle>,
}

impl ShaderUnit {
    /// Compile `source` on `device`
    ///
    /// The compile status is queried synchronously. On failure the driver
    /// diagnostic is truncated to `INFO_LOG_CAPACITY`, the driver object is
    /// deleted and the error is returned; nothing is retried.
    ///
    /// # Arguments
    ///
    /// * `device` - Current rendering context
    /// * `source` - Stage-tagged source text
    ///
    /// # Errors
    ///
    /// * `CompilationError` - Empty source, or the driver rejected the source
    /// * `BackendError` - The driver could not allocate a shader object
    pub fn compile(device: &DeviceRef, source: ShaderSource<'_>) -> Result<Self> {
        let stage = source.stage;

        if source.text.trim().is_empty() {
            engine_error!("trigon::ShaderUnit", "Empty {} shader source", stage);
            return Err(Error::CompilationError {
                stage,
                log: "empty shader source".to_string(),
            });
        }

        let shader = device.create_shader(stage)?;
        device.shader_source(shader, source.text);
        device.compile_shader(shader);

        if !device.shader_compile_status(shader) {
            let log = graphics_device::truncate_info_log(&device.shader_info_log(shader));
            device.delete_shader(shader);
            engine_error!("trigon::ShaderUnit", "{} shader compilation failed: {}", stage, log);
            return Err(Error::CompilationError { stage, log });
        }

        Ok(Self {
            device: device.clone(),
            stage,
            handle: Some(CompiledShaderHandle(shader)),
        })
    }

    /// Stage this unit was compiled for
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Compiled handle, `None` once the unit is spent
    pub fn handle(&self) -> Option<CompiledShaderHandle> {
        self.handle
    }

    /// Whether the unit was already linked or destroyed
    pub fn is_spent(&self) -> bool {
        self.handle.is_none()
    }

    /// Release the driver object (no-op if already released)
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.delete_shader(handle.0);
        }
    }

    /// Detach from `program` and release the driver object
    ///
    /// Called by the linker once the program no longer needs the stage.
    pub(crate) fn release_from(&mut self, program: graphics_device::ProgramObject) {
        if let Some(handle) = self.handle.take() {
            self.device.detach_shader(program, handle.0);
            self.device.delete_shader(handle.0);
        }
    }
}

impl Drop for ShaderUnit {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for ShaderUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderUnit")
            .field("stage", &self.stage)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
