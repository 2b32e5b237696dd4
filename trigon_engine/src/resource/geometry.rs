//! Resource-level geometry buffers.
//!
//! A `GeometryBuffer` pairs a raw data store (buffer object) with the
//! attribute-layout container (vertex array object) that describes it. Both
//! are created together, bound together and released together; neither is
//! ever exposed on its own.
//!
//! # Upload order
//!
//! ```text
//! create + bind vertex array
//! create + bind array buffer
//! copy vertices (usage hint)
//! for each attribute: declare pointer, enable
//! unbind array buffer
//! unbind vertex array
//! ```
//!
//! Each attribute captures the buffer bound when it is declared, which is why
//! the data store must be bound before the layout is recorded.

use crate::{engine_debug, engine_error, engine_warn};
use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferObject, DeviceRef, PrimitiveTopology, UsageHint, VertexArrayObject,
};

// ============================================================================
// VERTEX ATTRIBUTE LAYOUT
// ============================================================================

/// How one shader input is read from the vertex data
///
/// Strides and offsets are in bytes. The layout must match the shader's
/// declared inputs; a mismatch is not detected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,
    /// Floats per vertex for this attribute (1..=4)
    pub component_count: u32,
    /// Bytes between consecutive vertices
    pub stride: u32,
    /// Byte offset of the first component
    pub offset: u32,
}

/// Ordered list of attribute descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexAttributeLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexAttributeLayout {
    /// Empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout with a single attribute
    pub fn single(attribute: VertexAttribute) -> Self {
        Self { attributes: vec![attribute] }
    }

    /// Append an attribute (builder style)
    pub fn push(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Sum of the per-attribute component counts
    pub fn components_per_vertex(&self) -> u32 {
        self.attributes.iter().map(|a| a.component_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

// ============================================================================
// GEOMETRY BUFFER
// ============================================================================

/// Opaque pair of driver objects backing a `GeometryBuffer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryBufferHandle {
    data_store: BufferObject,
    layout: VertexArrayObject,
}

/// Uploaded vertex data plus its attribute layout
pub struct GeometryBuffer {
    device: DeviceRef,
    handle: Option<GeometryBufferHandle>,
    /// Whole vertices, already range-checked for `draw_arrays`
    draw_count: i32,
}

impl GeometryBuffer {
    /// Upload `vertices` and record `layout` against them
    ///
    /// An empty vertex slice is accepted and yields zero vertices.
    ///
    /// # Arguments
    ///
    /// * `device` - Current rendering context
    /// * `vertices` - Flat vertex data
    /// * `usage` - Expected mutation frequency
    /// * `layout` - How the floats map to shader inputs
    ///
    /// # Errors
    ///
    /// * `InvalidResource` - An attribute has a component count outside 1..=4,
    ///   a stride or offset beyond `i32::MAX`, or the data holds more vertices
    ///   than one draw call can submit
    /// * `BackendError` - The driver could not allocate an object
    pub fn upload(
        device: &DeviceRef,
        vertices: &[f32],
        usage: UsageHint,
        layout: VertexAttributeLayout,
    ) -> Result<Self> {
        let mut attributes = Vec::with_capacity(layout.attributes().len());
        for attribute in layout.attributes() {
            attributes.push(Self::driver_attribute(attribute)?);
        }

        let vertex_count = Self::count_vertices(vertices.len(), &layout);
        let draw_count = i32::try_from(vertex_count).map_err(|_| {
            engine_error!("trigon::GeometryBuffer", "{} vertices exceed the draw call range", vertex_count);
            Error::InvalidResource(format!("{} vertices exceed the draw call range", vertex_count))
        })?;

        let vao = device.create_vertex_array()?;
        device.bind_vertex_array(Some(vao));

        let vbo = match device.create_buffer() {
            Ok(vbo) => vbo,
            Err(err) => {
                device.bind_vertex_array(None);
                device.delete_vertex_array(vao);
                return Err(err);
            }
        };
        device.bind_array_buffer(Some(vbo));
        device.array_buffer_data(bytemuck::cast_slice(vertices), usage);

        for (location, component_count, stride, offset) in attributes {
            device.vertex_attrib_pointer_f32(location, component_count, stride, offset);
            device.enable_vertex_attrib_array(location);
        }

        device.bind_array_buffer(None);
        device.bind_vertex_array(None);

        engine_debug!(
            "trigon::GeometryBuffer",
            "Uploaded {} floats ({} vertices, {:?})",
            vertices.len(), vertex_count, usage
        );

        Ok(Self {
            device: device.clone(),
            handle: Some(GeometryBufferHandle { data_store: vbo, layout: vao }),
            draw_count,
        })
    }

    /// `(location, components, stride, offset)` in the driver's signed types
    ///
    /// Component counts outside 1..=4, and strides or offsets beyond `i32::MAX`,
    /// would leave the attribute unrecorded by the driver.
    fn driver_attribute(attribute: &VertexAttribute) -> Result<(u32, i32, i32, i32)> {
        let location = attribute.location;
        let reject = |detail: String| {
            engine_error!("trigon::GeometryBuffer", "Attribute at location {} {}", location, detail);
            Error::InvalidResource(format!("attribute at location {} {}", location, detail))
        };

        if !(1..=4).contains(&attribute.component_count) {
            return Err(reject(format!("has {} components (expected 1..=4)", attribute.component_count)));
        }
        let stride = i32::try_from(attribute.stride)
            .map_err(|_| reject(format!("has stride {} beyond i32::MAX", attribute.stride)))?;
        let offset = i32::try_from(attribute.offset)
            .map_err(|_| reject(format!("has offset {} beyond i32::MAX", attribute.offset)))?;

        Ok((location, attribute.component_count as i32, stride, offset))
    }

    fn count_vertices(float_count: usize, layout: &VertexAttributeLayout) -> usize {
        let components = layout.components_per_vertex() as usize;
        if components == 0 {
            return 0;
        }
        let remainder = float_count % components;
        if remainder != 0 {
            engine_warn!(
                "trigon::GeometryBuffer",
                "{} trailing floats do not form a whole vertex and are ignored",
                remainder
            );
        }
        float_count / components
    }

    /// Number of whole vertices in the data store
    pub fn vertex_count(&self) -> u32 {
        self.draw_count.unsigned_abs()
    }

    /// Object pair, `None` once destroyed
    pub fn handle(&self) -> Option<GeometryBufferHandle> {
        self.handle
    }

    /// Make the layout container current for drawing
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the buffer was destroyed
    pub fn bind(&self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Err(Error::InvalidResource("geometry buffer was destroyed".to_string()));
        };
        self.device.bind_vertex_array(Some(handle.layout));
        Ok(())
    }

    /// Submit every vertex with `topology`
    ///
    /// The caller binds the program first; this binds the layout container
    /// and issues the draw call.
    pub fn draw(&self, topology: PrimitiveTopology) -> Result<()> {
        self.bind()?;
        self.device.draw_arrays(topology, 0, self.draw_count);
        Ok(())
    }

    /// Release both driver objects (no-op if already released)
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.delete_buffer(handle.data_store);
            self.device.delete_vertex_array(handle.layout);
        }
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for GeometryBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("handle", &self.handle)
            .field("vertex_count", &self.draw_count)
            .finish()
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
