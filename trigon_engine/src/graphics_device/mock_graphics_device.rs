//! Mock GraphicsDevice (no GPU or display required)
//!
//! Emulates the subset of driver behavior the resource types depend on:
//! object tables, current bindings, deferred error codes, a minimal GLSL
//! syntax check at compile time and stage checks at link time. Every call is
//! recorded so tests can assert on call ordering.

use std::cell::RefCell;
use std::num::NonZeroU32;

use glam::Vec4;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferObject, ClearFlags, GraphicsDevice, PrimitiveTopology, ProgramObject, ShaderObject,
    ShaderStage, UsageHint, VertexArrayObject,
};

/// GL_INVALID_VALUE
pub const INVALID_VALUE: u32 = 0x0501;
/// GL_INVALID_OPERATION
pub const INVALID_OPERATION: u32 = 0x0502;

// ============================================================================
// Mock objects
// ============================================================================

/// An attribute as recorded on a mock vertex array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockAttribute {
    /// Buffer bound to the array binding point when the attribute was declared
    pub buffer: BufferObject,
    pub component_count: i32,
    pub stride: i32,
    pub offset: i32,
    pub enabled: bool,
}

#[derive(Debug)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<ShaderObject>,
    linked: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct MockVertexArray {
    attributes: FxHashMap<u32, MockAttribute>,
}

#[derive(Debug, Default)]
struct MockBuffer {
    data: Vec<u8>,
    usage: Option<UsageHint>,
}

#[derive(Debug, Default)]
struct MockState {
    next_name: u32,
    shaders: FxHashMap<NonZeroU32, MockShader>,
    programs: FxHashMap<NonZeroU32, MockProgram>,
    vertex_arrays: FxHashMap<NonZeroU32, MockVertexArray>,
    buffers: FxHashMap<NonZeroU32, MockBuffer>,

    bound_vertex_array: Option<VertexArrayObject>,
    bound_array_buffer: Option<BufferObject>,
    current_program: Option<ProgramObject>,

    pending_error: Option<u32>,
    /// Successful allocations left before one fails
    fail_allocation_in: Option<u32>,
    forced_compile_failure: Option<String>,
    forced_link_failure: Option<String>,

    draw_calls: u32,
    calls: Vec<String>,
}

impl MockState {
    fn allocate(&mut self, what: &str) -> Result<NonZeroU32> {
        match self.fail_allocation_in {
            Some(0) => {
                self.fail_allocation_in = None;
                return Err(Error::BackendError(format!("Mock device refused to allocate {}", what)));
            }
            Some(n) => self.fail_allocation_in = Some(n - 1),
            None => {}
        }
        self.next_name += 1;
        NonZeroU32::new(self.next_name)
            .ok_or_else(|| Error::BackendError("Mock device ran out of names".to_string()))
    }

    /// Record an error; like the driver, only the first one is kept until polled
    fn raise(&mut self, code: u32) {
        if self.pending_error.is_none() {
            self.pending_error = Some(code);
        }
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// In-process stand-in for a rendering context
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    state: RefCell<MockState>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== FAULT INJECTION =====

    /// Make the next object allocation fail with `BackendError`
    pub fn fail_next_allocation(&self) {
        self.fail_allocation_after(0);
    }

    /// Let `successes` allocations through, then fail the next one
    pub fn fail_allocation_after(&self, successes: u32) {
        self.state.borrow_mut().fail_allocation_in = Some(successes);
    }

    /// Make every subsequent compilation fail with `log`
    pub fn force_compile_failure(&self, log: &str) {
        self.state.borrow_mut().forced_compile_failure = Some(log.to_string());
    }

    /// Make every subsequent link fail with `log`
    pub fn force_link_failure(&self, log: &str) {
        self.state.borrow_mut().forced_link_failure = Some(log.to_string());
    }

    /// Leave a pending driver error for the next `poll_error`
    pub fn raise_error(&self, code: u32) {
        self.state.borrow_mut().raise(code);
    }

    // ===== INSPECTION =====

    /// Every recorded call, with arguments
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Every recorded call, operation name only
    pub fn call_names(&self) -> Vec<String> {
        self.state.borrow().calls.iter()
            .map(|call| call.split('(').next().unwrap_or(call).to_string())
            .collect()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of objects of any kind still allocated
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.shaders.len() + state.programs.len() + state.vertex_arrays.len() + state.buffers.len()
    }

    pub fn shader_count(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn vertex_array_count(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn draw_calls(&self) -> u32 {
        self.state.borrow().draw_calls
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayObject> {
        self.state.borrow().bound_vertex_array
    }

    pub fn bound_array_buffer(&self) -> Option<BufferObject> {
        self.state.borrow().bound_array_buffer
    }

    pub fn current_program(&self) -> Option<ProgramObject> {
        self.state.borrow().current_program
    }

    /// Shaders currently attached to `program`
    pub fn attached_shaders(&self, program: ProgramObject) -> Vec<ShaderObject> {
        self.state.borrow().programs.get(&program.0)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    /// Contents of a buffer, if it exists
    pub fn buffer_data(&self, buffer: BufferObject) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer.0).map(|b| b.data.clone())
    }

    /// Usage hint of the last upload into a buffer
    pub fn buffer_usage(&self, buffer: BufferObject) -> Option<UsageHint> {
        self.state.borrow().buffers.get(&buffer.0).and_then(|b| b.usage)
    }

    /// Attributes recorded on a vertex array, sorted by location
    pub fn vertex_array_attributes(&self, vertex_array: VertexArrayObject) -> Vec<(u32, MockAttribute)> {
        let state = self.state.borrow();
        let mut attributes: Vec<(u32, MockAttribute)> = state.vertex_arrays.get(&vertex_array.0)
            .map(|vao| vao.attributes.iter().map(|(location, attr)| (*location, *attr)).collect())
            .unwrap_or_default();
        attributes.sort_by_key(|(location, _)| *location);
        attributes
    }

    /// Stage of a live shader object
    pub fn shader_stage(&self, shader: ShaderObject) -> Option<ShaderStage> {
        self.state.borrow().shaders.get(&shader.0).map(|s| s.stage)
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    // ===== SHADERS =====

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderObject> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate("shader")?;
        state.shaders.insert(name, MockShader {
            stage,
            source: String::new(),
            compiled: false,
            info_log: String::new(),
        });
        state.calls.push(format!("create_shader({}) -> {}", stage, name));
        Ok(ShaderObject(name))
    }

    fn shader_source(&self, shader: ShaderObject, source: &str) {
        self.record(format!("shader_source({})", shader.0));
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader.0) {
            Some(s) => s.source = source.to_string(),
            None => state.raise(INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: ShaderObject) {
        self.record(format!("compile_shader({})", shader.0));
        let mut state = self.state.borrow_mut();
        let forced = state.forced_compile_failure.clone();
        match state.shaders.get_mut(&shader.0) {
            Some(s) => match forced.map_or_else(|| check_glsl(&s.source), Err) {
                Ok(()) => {
                    s.compiled = true;
                    s.info_log.clear();
                }
                Err(log) => {
                    s.compiled = false;
                    s.info_log = log;
                }
            },
            None => state.raise(INVALID_VALUE),
        }
    }

    fn shader_compile_status(&self, shader: ShaderObject) -> bool {
        self.record(format!("shader_compile_status({})", shader.0));
        self.state.borrow().shaders.get(&shader.0).map(|s| s.compiled).unwrap_or(false)
    }

    fn shader_info_log(&self, shader: ShaderObject) -> String {
        self.record(format!("shader_info_log({})", shader.0));
        self.state.borrow().shaders.get(&shader.0).map(|s| s.info_log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderObject) {
        self.record(format!("delete_shader({})", shader.0));
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader.0).is_none() {
            state.raise(INVALID_VALUE);
        }
    }

    // ===== PROGRAMS =====

    fn create_program(&self) -> Result<ProgramObject> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate("program")?;
        state.programs.insert(name, MockProgram::default());
        state.calls.push(format!("create_program() -> {}", name));
        Ok(ProgramObject(name))
    }

    fn attach_shader(&self, program: ProgramObject, shader: ShaderObject) {
        self.record(format!("attach_shader({}, {})", program.0, shader.0));
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader.0) {
            state.raise(INVALID_VALUE);
            return;
        }
        match state.programs.get_mut(&program.0) {
            Some(p) if p.attached.contains(&shader) => state.raise(INVALID_OPERATION),
            Some(p) => p.attached.push(shader),
            None => state.raise(INVALID_VALUE),
        }
    }

    fn detach_shader(&self, program: ProgramObject, shader: ShaderObject) {
        self.record(format!("detach_shader({}, {})", program.0, shader.0));
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program.0) {
            Some(p) => match p.attached.iter().position(|s| *s == shader) {
                Some(index) => {
                    p.attached.remove(index);
                }
                None => state.raise(INVALID_OPERATION),
            },
            None => state.raise(INVALID_VALUE),
        }
    }

    fn link_program(&self, program: ProgramObject) {
        self.record(format!("link_program({})", program.0));
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program.0).map(|p| p.attached.clone()) else {
            state.raise(INVALID_VALUE);
            return;
        };

        let outcome = if let Some(log) = state.forced_link_failure.clone() {
            Err(log)
        } else if attached.is_empty() {
            Err("error: no shaders attached to the program".to_string())
        } else if attached.iter().any(|s| !state.shaders.get(&s.0).map(|s| s.compiled).unwrap_or(false)) {
            Err("error: linking with uncompiled/unspecialized shader".to_string())
        } else {
            Ok(())
        };

        if let Some(p) = state.programs.get_mut(&program.0) {
            match outcome {
                Ok(()) => {
                    p.linked = true;
                    p.info_log.clear();
                }
                Err(log) => {
                    p.linked = false;
                    p.info_log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: ProgramObject) -> bool {
        self.record(format!("program_link_status({})", program.0));
        self.state.borrow().programs.get(&program.0).map(|p| p.linked).unwrap_or(false)
    }

    fn program_info_log(&self, program: ProgramObject) -> String {
        self.record(format!("program_info_log({})", program.0));
        self.state.borrow().programs.get(&program.0).map(|p| p.info_log.clone()).unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramObject) {
        self.record(format!("delete_program({})", program.0));
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program.0).is_none() {
            state.raise(INVALID_VALUE);
        }
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn is_program(&self, program: ProgramObject) -> bool {
        self.record(format!("is_program({})", program.0));
        self.state.borrow().programs.contains_key(&program.0)
    }

    fn use_program(&self, program: Option<ProgramObject>) {
        self.record(format!("use_program({})", name_or_zero(program.map(|p| p.0))));
        let mut state = self.state.borrow_mut();
        match program {
            Some(p) if !state.programs.get(&p.0).map(|p| p.linked).unwrap_or(false) => {
                state.raise(INVALID_OPERATION)
            }
            _ => state.current_program = program,
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> Result<VertexArrayObject> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate("vertex array")?;
        state.vertex_arrays.insert(name, MockVertexArray::default());
        state.calls.push(format!("create_vertex_array() -> {}", name));
        Ok(VertexArrayObject(name))
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayObject>) {
        self.record(format!("bind_vertex_array({})", name_or_zero(vertex_array.map(|v| v.0))));
        let mut state = self.state.borrow_mut();
        match vertex_array {
            Some(v) if !state.vertex_arrays.contains_key(&v.0) => state.raise(INVALID_OPERATION),
            _ => state.bound_vertex_array = vertex_array,
        }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayObject) {
        self.record(format!("delete_vertex_array({})", vertex_array.0));
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array.0);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<BufferObject> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate("buffer")?;
        state.buffers.insert(name, MockBuffer::default());
        state.calls.push(format!("create_buffer() -> {}", name));
        Ok(BufferObject(name))
    }

    fn bind_array_buffer(&self, buffer: Option<BufferObject>) {
        self.record(format!("bind_array_buffer({})", name_or_zero(buffer.map(|b| b.0))));
        let mut state = self.state.borrow_mut();
        match buffer {
            Some(b) if !state.buffers.contains_key(&b.0) => state.raise(INVALID_VALUE),
            _ => state.bound_array_buffer = buffer,
        }
    }

    fn array_buffer_data(&self, data: &[u8], usage: UsageHint) {
        self.record(format!("array_buffer_data({} bytes, {:?})", data.len(), usage));
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.bound_array_buffer else {
            state.raise(INVALID_OPERATION);
            return;
        };
        if let Some(buffer) = state.buffers.get_mut(&bound.0) {
            buffer.data = data.to_vec();
            buffer.usage = Some(usage);
        }
    }

    fn delete_buffer(&self, buffer: BufferObject) {
        self.record(format!("delete_buffer({})", buffer.0));
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer.0);
        if state.bound_array_buffer == Some(buffer) {
            state.bound_array_buffer = None;
        }
    }

    // ===== VERTEX ATTRIBUTES =====

    fn vertex_attrib_pointer_f32(&self, location: u32, component_count: i32, stride: i32, offset: i32) {
        self.record(format!(
            "vertex_attrib_pointer_f32({}, {}, {}, {})",
            location, component_count, stride, offset
        ));
        let mut state = self.state.borrow_mut();
        if !(1..=4).contains(&component_count) || stride < 0 {
            state.raise(INVALID_VALUE);
            return;
        }
        let (Some(vao), Some(buffer)) = (state.bound_vertex_array, state.bound_array_buffer) else {
            state.raise(INVALID_OPERATION);
            return;
        };
        if let Some(vertex_array) = state.vertex_arrays.get_mut(&vao.0) {
            let enabled = vertex_array.attributes.get(&location).map(|a| a.enabled).unwrap_or(false);
            vertex_array.attributes.insert(location, MockAttribute {
                buffer,
                component_count,
                stride,
                offset,
                enabled,
            });
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(format!("enable_vertex_attrib_array({})", location));
        let mut state = self.state.borrow_mut();
        let Some(vao) = state.bound_vertex_array else {
            state.raise(INVALID_OPERATION);
            return;
        };
        let declared = state.vertex_arrays.get_mut(&vao.0)
            .and_then(|v| v.attributes.get_mut(&location))
            .map(|attr| attr.enabled = true)
            .is_some();
        if !declared {
            state.raise(INVALID_OPERATION);
        }
    }

    // ===== DRAWING =====

    fn draw_arrays(&self, topology: PrimitiveTopology, first: i32, count: i32) {
        self.record(format!("draw_arrays({:?}, {}, {})", topology, first, count));
        let mut state = self.state.borrow_mut();
        if first < 0 || count < 0 {
            state.raise(INVALID_VALUE);
            return;
        }
        if state.current_program.is_none() || state.bound_vertex_array.is_none() {
            state.raise(INVALID_OPERATION);
            return;
        }
        state.draw_calls += 1;
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(format!("viewport({}, {}, {}, {})", x, y, width, height));
        if width < 0 || height < 0 {
            self.state.borrow_mut().raise(INVALID_VALUE);
        }
    }

    fn clear_color(&self, color: Vec4) {
        self.record(format!("clear_color({}, {}, {}, {})", color.x, color.y, color.z, color.w));
    }

    fn clear(&self, flags: ClearFlags) {
        self.record(format!("clear({:?})", flags));
    }

    fn poll_error(&self) -> Option<u32> {
        self.record("poll_error()".to_string());
        self.state.borrow_mut().pending_error.take()
    }
}

fn name_or_zero(name: Option<NonZeroU32>) -> u32 {
    name.map(NonZeroU32::get).unwrap_or(0)
}

// ============================================================================
// Minimal GLSL syntax check
// ============================================================================

/// Reject the mistakes the resource tests care about
///
/// Catches a missing `#version` directive, a missing `main`, unbalanced braces
/// and statements not terminated by `;`. Diagnostics follow the
/// `0:line(column): error: ...` shape drivers commonly use.
pub(crate) fn check_glsl(source: &str) -> std::result::Result<(), String> {
    let first_line = source.lines().map(str::trim).find(|line| !line.is_empty());
    if !first_line.map(|line| line.starts_with("#version")).unwrap_or(false) {
        return Err("0:1(1): error: missing #version directive".to_string());
    }
    if !source.contains("main") {
        return Err("0:0(0): error: no function `main' defined".to_string());
    }

    let mut depth = 0i32;
    let mut pending = String::new();
    let mut last_line = 1;

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        last_line = line_number;
        let line = raw_line.find("//").map_or(raw_line, |cut| &raw_line[..cut]);
        if line.trim_start().starts_with('#') {
            continue;
        }
        for (column, ch) in line.chars().enumerate() {
            match ch {
                '{' => {
                    depth += 1;
                    pending.clear();
                }
                '}' => {
                    if !pending.trim().is_empty() {
                        return Err(format!(
                            "0:{}({}): error: syntax error, unexpected '}}', expecting ',' or ';'",
                            line_number, column + 1
                        ));
                    }
                    depth -= 1;
                    if depth < 0 {
                        return Err(format!(
                            "0:{}({}): error: syntax error, unexpected '}}'",
                            line_number, column + 1
                        ));
                    }
                }
                ';' => pending.clear(),
                other => pending.push(other),
            }
        }
        pending.push('\n');
    }

    if depth != 0 || !pending.trim().is_empty() {
        return Err(format!("0:{}(1): error: syntax error, unexpected end of file", last_line));
    }
    Ok(())
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
