//! OpenGlGraphicsDevice - OpenGL implementation of the GraphicsDevice trait

use glow::HasContext;
use trigon_engine::trigon::Result;
use trigon_engine::trigon::render::{
    BufferObject, ClearFlags, GraphicsDevice, PrimitiveTopology, ProgramObject, ShaderObject,
    ShaderStage, UsageHint, VertexArrayObject,
};
use trigon_engine::glam::Vec4;
use trigon_engine::{engine_debug, engine_err};

use crate::opengl_format::{
    clear_flags_to_gl, error_name, shader_stage_to_gl, topology_to_gl, usage_to_gl,
};

/// OpenGL device
///
/// Wraps a loaded `glow::Context`. Every call is forwarded on the calling
/// thread, so the context must be current there for the lifetime of the
/// device and of every resource created through it.
pub struct OpenGlGraphicsDevice {
    gl: glow::Context,
}

impl OpenGlGraphicsDevice {
    /// Wrap a loaded context
    ///
    /// # Safety
    ///
    /// `gl` must have been loaded from the context current on this thread,
    /// and that context must stay current while the device is in use.
    pub unsafe fn new(gl: glow::Context) -> Self {
        let version = gl.version();
        engine_debug!(
            "trigon::opengl",
            "OpenGL {}.{} ({})",
            version.major, version.minor, version.vendor_info
        );

        #[cfg(feature = "opengl-debug")]
        let gl = Self::install_debug_output(gl);

        Self { gl }
    }

    #[cfg(feature = "opengl-debug")]
    unsafe fn install_debug_output(mut gl: glow::Context) -> glow::Context {
        use trigon_engine::{engine_error, engine_warn};

        if !gl.supports_debug() {
            engine_warn!("trigon::opengl", "KHR_debug unavailable, driver messages disabled");
            return gl;
        }
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|_source, _kind, id, severity, message| {
            match severity {
                glow::DEBUG_SEVERITY_HIGH => {
                    engine_error!("trigon::opengl", "[{}] {}", id, message)
                }
                glow::DEBUG_SEVERITY_MEDIUM | glow::DEBUG_SEVERITY_LOW => {
                    engine_warn!("trigon::opengl", "[{}] {}", id, message)
                }
                _ => trigon_engine::engine_trace!("trigon::opengl", "[{}] {}", id, message),
            }
        });
        gl
    }
}

impl GraphicsDevice for OpenGlGraphicsDevice {
    // ===== SHADERS =====

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderObject> {
        unsafe {
            self.gl.create_shader(shader_stage_to_gl(stage))
                .map(|shader| ShaderObject(shader.0))
                .map_err(|e| engine_err!("trigon::opengl", "glCreateShader({}) failed: {}", stage, e))
        }
    }

    fn shader_source(&self, shader: ShaderObject, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: ShaderObject) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader.0)) }
    }

    fn shader_compile_status(&self, shader: ShaderObject) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader.0)) }
    }

    fn shader_info_log(&self, shader: ShaderObject) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: ShaderObject) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    // ===== PROGRAMS =====

    fn create_program(&self) -> Result<ProgramObject> {
        unsafe {
            self.gl.create_program()
                .map(|program| ProgramObject(program.0))
                .map_err(|e| engine_err!("trigon::opengl", "glCreateProgram failed: {}", e))
        }
    }

    fn attach_shader(&self, program: ProgramObject, shader: ShaderObject) {
        unsafe {
            self.gl.attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn detach_shader(&self, program: ProgramObject, shader: ShaderObject) {
        unsafe {
            self.gl.detach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: ProgramObject) {
        unsafe { self.gl.link_program(glow::NativeProgram(program.0)) }
    }

    fn program_link_status(&self, program: ProgramObject) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program.0)) }
    }

    fn program_info_log(&self, program: ProgramObject) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn delete_program(&self, program: ProgramObject) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn is_program(&self, program: ProgramObject) -> bool {
        unsafe { self.gl.is_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<ProgramObject>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> Result<VertexArrayObject> {
        unsafe {
            self.gl.create_vertex_array()
                .map(|vao| VertexArrayObject(vao.0))
                .map_err(|e| engine_err!("trigon::opengl", "glGenVertexArrays failed: {}", e))
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayObject>) {
        unsafe { self.gl.bind_vertex_array(vertex_array.map(|v| glow::NativeVertexArray(v.0))) }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayObject) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0)) }
    }

    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<BufferObject> {
        unsafe {
            self.gl.create_buffer()
                .map(|buffer| BufferObject(buffer.0))
                .map_err(|e| engine_err!("trigon::opengl", "glGenBuffers failed: {}", e))
        }
    }

    fn bind_array_buffer(&self, buffer: Option<BufferObject>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer.map(|b| glow::NativeBuffer(b.0))) }
    }

    fn array_buffer_data(&self, data: &[u8], usage: UsageHint) {
        unsafe { self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, usage_to_gl(usage)) }
    }

    fn delete_buffer(&self, buffer: BufferObject) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    // ===== VERTEX ATTRIBUTES =====

    fn vertex_attrib_pointer_f32(&self, location: u32, component_count: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(location, component_count, glow::FLOAT, false, stride, offset)
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) }
    }

    // ===== DRAWING =====

    fn draw_arrays(&self, topology: PrimitiveTopology, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(topology_to_gl(topology), first, count) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, color: Vec4) {
        unsafe { self.gl.clear_color(color.x, color.y, color.z, color.w) }
    }

    fn clear(&self, flags: ClearFlags) {
        unsafe { self.gl.clear(clear_flags_to_gl(flags)) }
    }

    fn poll_error(&self) -> Option<u32> {
        let code = unsafe { self.gl.get_error() };
        if code == glow::NO_ERROR {
            return None;
        }
        engine_debug!("trigon::opengl", "glGetError: {} (0x{:04X})", error_name(code), code);
        Some(code)
    }
}
