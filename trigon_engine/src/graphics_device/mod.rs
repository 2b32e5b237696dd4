//! Graphics device module - driver seam and its in-process mock

// Module declarations
pub mod graphics_device;
pub mod mock_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Mock graphics device (no GPU or display required)
pub use mock_graphics_device::{MockGraphicsDevice, MockAttribute};
