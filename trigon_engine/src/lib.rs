/*!
# Trigon Engine

GPU resource and shader-pipeline lifecycle management.

This crate turns shader source text and vertex data into a drawable pipeline
on an already-current rendering context, and releases every driver object it
creates. The context itself comes from a backend crate implementing
`GraphicsDevice` (OpenGL: `trigon_engine_renderer_opengl`).

## Architecture

- **GraphicsDevice**: Driver seam, one method per driver call
- **ShaderUnit**: One compiled shader stage
- **ProgramLinker**: Links stages into a `LinkedProgram`, releasing the stages
- **GeometryBuffer**: Vertex data plus its attribute layout
- **PipelineBootstrap**: Compile, link and upload in one call

All resources live on the thread owning the context (`DeviceRef` is an `Rc`).
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod primitives;

// Main trigon namespace module
pub mod trigon {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module with the driver seam and its mock
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Built-in primitives
    pub mod primitives {
        pub use crate::primitives::*;
    }
}

// Re-export math library at crate root
pub use glam;
