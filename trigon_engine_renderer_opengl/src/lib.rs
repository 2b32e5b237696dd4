/*!
# Trigon Engine - OpenGL Renderer Backend

OpenGL implementation of the Trigon `GraphicsDevice` seam, using the glow
bindings. The crate does not create contexts: the caller makes an OpenGL 3.3
core context current and hands over the loaded `glow::Context`.
*/

mod opengl;
mod opengl_format;

pub use opengl::OpenGlGraphicsDevice;

// Re-export the binding crate so callers load it with a matching version
pub use glow;
