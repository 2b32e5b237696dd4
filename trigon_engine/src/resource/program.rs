//! Linked shader programs.
//!
//! `ProgramLinker` turns a set of compiled `ShaderUnit`s into a
//! `LinkedProgram`. On success every unit is detached and released; on failure
//! the units stay with the caller and only the program object is discarded.

use crate::{engine_debug, engine_error};
use crate::error::{Error, Result};
use crate::graphics_device::{self, DeviceRef, ProgramObject, ShaderStage};
use crate::resource::shader::ShaderUnit;

// ============================================================================
// LINKED PROGRAM
// ============================================================================

/// Opaque handle of a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkedProgramHandle(ProgramObject);

impl LinkedProgramHandle {
    /// Underlying driver object
    pub fn object(&self) -> ProgramObject {
        self.0
    }
}

/// An executable program, bindable any number of times until destroyed
pub struct LinkedProgram {
    device: DeviceRef,
    handle: Option<LinkedProgramHandle>,
}

impl LinkedProgram {
    /// Program handle, `None` once destroyed
    pub fn handle(&self) -> Option<LinkedProgramHandle> {
        self.handle
    }

    /// Whether the driver still knows the program
    pub fn is_valid(&self) -> bool {
        match self.handle {
            Some(handle) => self.device.is_program(handle.0),
            None => false,
        }
    }

    /// Make this program the active pipeline
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the program was destroyed
    pub fn bind(&self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Err(Error::InvalidResource("program was destroyed".to_string()));
        };
        self.device.use_program(Some(handle.0));
        Ok(())
    }

    /// Release the program object (no-op if already released)
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.delete_program(handle.0);
        }
    }
}

impl Drop for LinkedProgram {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for LinkedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedProgram").field("handle", &self.handle).finish()
    }
}

// ============================================================================
// PROGRAM LINKER
// ============================================================================

/// Links compiled stages into a program
pub struct ProgramLinker;

impl ProgramLinker {
    /// Link `stages` into a new program
    ///
    /// The stage set must contain at least one vertex and one fragment unit;
    /// this is checked before any driver call.
    ///
    /// # Arguments
    ///
    /// * `device` - Current rendering context
    /// * `stages` - Compiled units; released on success, untouched on failure
    ///
    /// # Errors
    ///
    /// * `InvalidResource` - A unit is spent (already linked or destroyed)
    /// * `LinkError` - A required stage is missing, or the driver link failed
    /// * `BackendError` - The driver could not allocate a program object
    pub fn link(device: &DeviceRef, stages: &mut [ShaderUnit]) -> Result<LinkedProgram> {
        let mut shaders = Vec::with_capacity(stages.len());
        for unit in stages.iter() {
            match unit.handle() {
                Some(handle) => shaders.push(handle.object()),
                None => {
                    engine_error!("trigon::ProgramLinker", "Cannot link a spent {} shader unit", unit.stage());
                    return Err(Error::InvalidResource(format!(
                        "{} shader unit already linked or destroyed",
                        unit.stage()
                    )));
                }
            }
        }

        for required in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !stages.iter().any(|unit| unit.stage() == required) {
                let log = format!("no {} stage in the link set", required);
                engine_error!("trigon::ProgramLinker", "Program link failed: {}", log);
                return Err(Error::LinkError { log });
            }
        }

        let program = device.create_program()?;
        for shader in &shaders {
            device.attach_shader(program, *shader);
        }
        device.link_program(program);

        if !device.program_link_status(program) {
            let log = graphics_device::truncate_info_log(&device.program_info_log(program));
            for shader in &shaders {
                device.detach_shader(program, *shader);
            }
            device.delete_program(program);
            engine_error!("trigon::ProgramLinker", "Program link failed: {}", log);
            return Err(Error::LinkError { log });
        }

        for unit in stages.iter_mut() {
            unit.release_from(program);
        }

        engine_debug!("trigon::ProgramLinker", "Linked program {} from {} stages", program.0, shaders.len());

        Ok(LinkedProgram {
            device: device.clone(),
            handle: Some(LinkedProgramHandle(program)),
        })
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
