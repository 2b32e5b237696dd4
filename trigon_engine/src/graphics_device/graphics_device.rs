//! GraphicsDevice trait - the rendering-driver seam
//!
//! Every method maps onto exactly one driver call. The resource types in
//! `crate::resource` sequence these calls; backends (OpenGL, mock) only
//! translate them.

use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

use bitflags::bitflags;
use glam::Vec4;

use crate::error::Result;

// ============================================================================
// Object names
// ============================================================================

/// Driver name of a shader object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderObject(pub NonZeroU32);

/// Driver name of a program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramObject(pub NonZeroU32);

/// Driver name of a buffer object (raw data store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferObject(pub NonZeroU32);

/// Driver name of a vertex array object (attribute-layout container)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayObject(pub NonZeroU32);

// ============================================================================
// Common types
// ============================================================================

/// Driver-side cap on the diagnostic log carried by compile/link errors (bytes)
pub const INFO_LOG_CAPACITY: usize = 512;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Expected mutation frequency of an uploaded data store
///
/// A driver hint only: it never changes correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageHint {
    /// Written once, drawn many times
    #[default]
    Static,
    /// Rewritten repeatedly, drawn many times
    Dynamic,
    /// Written once, drawn a few times
    Streaming,
}

/// Primitive topology of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    /// Triangle list
    #[default]
    TriangleList,
    /// Triangle strip
    TriangleStrip,
    /// Line list
    LineList,
    /// Point list
    PointList,
}

bitflags! {
    /// Framebuffer planes cleared by `GraphicsDevice::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Rendering context configuration
///
/// Consumed by the context bootstrap; the defaults reproduce a 640x480
/// "Triangle" window on a 3.3 core profile context.
#[derive(Debug, Clone)]
pub struct Config {
    /// Window title
    pub title: String,
    /// Initial window width in pixels
    pub width: u32,
    /// Initial window height in pixels
    pub height: u32,
    /// Requested context version (major, minor)
    pub context_version: (u8, u8),
    /// Request a core profile context
    pub core_profile: bool,
    /// Request a debug context
    pub enable_validation: bool,
    /// Synchronize buffer swaps with the display refresh
    pub vsync: bool,
    /// Color used by the per-frame clear
    pub clear_color: Vec4,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Triangle".to_string(),
            width: 640,
            height: 480,
            context_version: (3, 3),
            core_profile: true,
            enable_validation: cfg!(debug_assertions),
            vsync: true,
            clear_color: Vec4::new(0.2, 0.3, 0.3, 1.0),
        }
    }
}

/// Clamp a driver diagnostic to `INFO_LOG_CAPACITY` bytes
///
/// Cuts on a UTF-8 boundary and strips the trailing whitespace drivers tend
/// to append.
pub fn truncate_info_log(log: &str) -> String {
    let mut end = log.len().min(INFO_LOG_CAPACITY);
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].trim_end().to_string()
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Shared, single-threaded reference to the current rendering context
///
/// `Rc` keeps every resource on the thread that owns the context.
pub type DeviceRef = Rc<dyn GraphicsDevice>;

/// Rendering-driver interface
///
/// All calls are synchronous and must run on the thread owning the current
/// context. Calls that act on the current binding (`array_buffer_data`,
/// `vertex_attrib_pointer_f32`, `enable_vertex_attrib_array`, `draw_arrays`)
/// depend on the binding state established by earlier calls.
pub trait GraphicsDevice {
    // ===== SHADERS =====

    /// Allocate a shader object for `stage`
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderObject>;

    /// Replace the source text of a shader object
    fn shader_source(&self, shader: ShaderObject, source: &str);

    /// Compile the current source of a shader object
    fn compile_shader(&self, shader: ShaderObject);

    /// Status of the last compilation
    fn shader_compile_status(&self, shader: ShaderObject) -> bool;

    /// Full diagnostic log of the last compilation
    fn shader_info_log(&self, shader: ShaderObject) -> String;

    /// Release a shader object
    fn delete_shader(&self, shader: ShaderObject);

    // ===== PROGRAMS =====

    /// Allocate a program object
    fn create_program(&self) -> Result<ProgramObject>;

    /// Attach a compiled shader to a program
    fn attach_shader(&self, program: ProgramObject, shader: ShaderObject);

    /// Detach a shader from a program
    fn detach_shader(&self, program: ProgramObject, shader: ShaderObject);

    /// Link the attached shaders
    fn link_program(&self, program: ProgramObject);

    /// Status of the last link
    fn program_link_status(&self, program: ProgramObject) -> bool;

    /// Full diagnostic log of the last link
    fn program_info_log(&self, program: ProgramObject) -> String;

    /// Release a program object
    fn delete_program(&self, program: ProgramObject);

    /// Whether `program` still names a program object
    fn is_program(&self, program: ProgramObject) -> bool;

    /// Make `program` the active pipeline (`None` unbinds)
    fn use_program(&self, program: Option<ProgramObject>);

    // ===== VERTEX ARRAYS =====

    /// Allocate a vertex array object
    fn create_vertex_array(&self) -> Result<VertexArrayObject>;

    /// Make a vertex array current (`None` unbinds)
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayObject>);

    /// Release a vertex array object
    fn delete_vertex_array(&self, vertex_array: VertexArrayObject);

    // ===== BUFFERS =====

    /// Allocate a buffer object
    fn create_buffer(&self) -> Result<BufferObject>;

    /// Bind a buffer to the array binding point (`None` unbinds)
    fn bind_array_buffer(&self, buffer: Option<BufferObject>);

    /// Copy `data` into the buffer bound to the array binding point
    fn array_buffer_data(&self, data: &[u8], usage: UsageHint);

    /// Release a buffer object
    fn delete_buffer(&self, buffer: BufferObject);

    // ===== VERTEX ATTRIBUTES =====

    /// Declare a float attribute sourced from the currently bound array buffer
    ///
    /// # Arguments
    ///
    /// * `location` - Shader input location
    /// * `component_count` - Floats per attribute (1..=4)
    /// * `stride` - Bytes between consecutive vertices
    /// * `offset` - Byte offset of the first component
    fn vertex_attrib_pointer_f32(&self, location: u32, component_count: i32, stride: i32, offset: i32);

    /// Enable an attribute location on the current vertex array
    fn enable_vertex_attrib_array(&self, location: u32);

    // ===== DRAWING =====

    /// Submit `count` vertices starting at `first`
    fn draw_arrays(&self, topology: PrimitiveTopology, first: i32, count: i32);

    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    /// Set the color used by `clear`
    fn clear_color(&self, color: Vec4);

    /// Clear the selected framebuffer planes
    fn clear(&self, flags: ClearFlags);

    /// Return and reset the oldest pending driver error, if any
    fn poll_error(&self) -> Option<u32>;
}

#[cfg(test)]
#[path = "graphics_device_tests.rs"]
mod tests;
