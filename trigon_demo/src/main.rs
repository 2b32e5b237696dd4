//! Trigon demo - draws the default triangle in a 640x480 window
//!
//! Bootstraps an OpenGL 3.3 core context with winit + glutin, builds the
//! triangle pipeline once, then clears and draws it every frame. Escape
//! closes the window.

use std::num::NonZeroU32;
use std::process::ExitCode;
use std::rc::Rc;

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::GlWindow;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use trigon_engine::trigon::{Engine, Error, Result};
use trigon_engine::trigon::log::LogSeverity;
use trigon_engine::trigon::primitives::{
    triangle_layout, TRIANGLE_2D, TRIANGLE_FRAGMENT_SHADER, TRIANGLE_VERTEX_SHADER,
};
use trigon_engine::trigon::render::{ClearFlags, Config, DeviceRef, PrimitiveTopology, UsageHint};
use trigon_engine::trigon::resource::{Pipeline, PipelineBootstrap, PipelineDesc};
use trigon_engine::{engine_error, engine_info, engine_warn};
use trigon_engine_renderer_opengl::{glow, OpenGlGraphicsDevice};

// ============================================================================
// RENDER STATE
// ============================================================================

/// Everything alive while the window is open
///
/// Field order is drop order: GPU resources go before the context.
struct RenderState {
    pipeline: Pipeline,
    device: DeviceRef,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

impl RenderState {
    fn new(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let window = event_loop.create_window(window_attributes)
            .map_err(|e| init_error(format!("Window creation failed: {}", e)))?;
        let raw_window_handle = window.window_handle()
            .map(|handle| handle.as_raw())
            .map_err(|e| init_error(format!("Window handle unavailable: {}", e)))?;
        let raw_display_handle = event_loop.display_handle()
            .map(|handle| handle.as_raw())
            .map_err(|e| init_error(format!("Display handle unavailable: {}", e)))?;

        let gl_display = unsafe { Display::new(raw_display_handle, display_preference(raw_window_handle)) }
            .map_err(|e| init_error(format!("Display creation failed: {}", e)))?;

        let template = ConfigTemplateBuilder::new();
        #[cfg(target_os = "windows")]
        let template = template.compatible_with_native_window(raw_window_handle);
        let gl_config = unsafe { gl_display.find_configs(template.build()) }
            .map_err(|e| init_error(format!("No usable framebuffer config: {}", e)))?
            .reduce(|best, candidate| {
                if candidate.num_samples() > best.num_samples() { candidate } else { best }
            })
            .ok_or_else(|| init_error("No usable framebuffer config".to_string()))?;

        let (major, minor) = config.context_version;
        let profile = if config.core_profile { GlProfile::Core } else { GlProfile::Compatibility };
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(profile)
            .with_debug(config.enable_validation)
            .build(Some(raw_window_handle));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| init_error(format!("OpenGL {}.{} context creation failed: {}", major, minor, e)))?;

        let surface_attributes = window.build_surface_attributes(Default::default())
            .map_err(|e| init_error(format!("Surface attributes unavailable: {}", e)))?;
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| init_error(format!("Window surface creation failed: {}", e)))?;

        let gl_context = not_current.make_current(&gl_surface)
            .map_err(|e| init_error(format!("Making the context current failed: {}", e)))?;

        if config.vsync {
            if let Err(e) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN)) {
                engine_warn!("trigon::demo", "Vsync unavailable: {}", e);
            }
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol).cast())
        };
        let device: DeviceRef = Rc::new(unsafe { OpenGlGraphicsDevice::new(gl) });

        let size = window.inner_size();
        device.viewport(0, 0, size.width as i32, size.height as i32);
        device.clear_color(config.clear_color);

        let pipeline = PipelineBootstrap::build(&device, PipelineDesc {
            vertex_source: TRIANGLE_VERTEX_SHADER,
            fragment_source: TRIANGLE_FRAGMENT_SHADER,
            vertices: &TRIANGLE_2D,
            layout: triangle_layout(),
            usage: UsageHint::Static,
        })?;

        Ok(Self { pipeline, device, gl_surface, gl_context, window })
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.gl_surface.resize(&self.gl_context, width, height);
        }
        self.device.viewport(0, 0, size.width as i32, size.height as i32);
    }

    fn render(&self) -> Result<()> {
        self.device.clear(ClearFlags::COLOR);
        self.pipeline.draw(PrimitiveTopology::TriangleList)?;
        self.gl_surface.swap_buffers(&self.gl_context)
            .map_err(|e| Error::BackendError(format!("Buffer swap failed: {}", e)))
    }
}

#[cfg(target_os = "windows")]
fn display_preference(window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Wgl(Some(window))
}

#[cfg(target_os = "macos")]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

fn init_error(message: String) -> Error {
    engine_error!("trigon::demo", "{}", message);
    Error::InitializationFailed(message)
}

// ============================================================================
// APPLICATION
// ============================================================================

struct App {
    config: Config,
    state: Option<RenderState>,
    failure: Option<Error>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match RenderState::new(event_loop, &self.config) {
            Ok(state) => {
                engine_info!("trigon::demo", "Window ready ({}x{})", self.config.width, self.config.height);
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                engine_error!("trigon::demo", "Initialization failed: {}", err);
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_ref() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event: KeyEvent { logical_key: Key::Named(NamedKey::Escape), state: ElementState::Pressed, .. },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.resize(size);
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.render() {
                    engine_error!("trigon::demo", "Frame failed: {}", err);
                    self.failure = Some(err);
                    event_loop.exit();
                    return;
                }
                state.window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release GPU objects while the context is still current
        self.state = None;
    }
}

fn main() -> ExitCode {
    Engine::set_min_severity(if cfg!(debug_assertions) { LogSeverity::Debug } else { LogSeverity::Info });

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!("trigon::demo", "Event loop creation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut app = App { config: Config::default(), state: None, failure: None };
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!("trigon::demo", "Event loop failed: {}", e);
        return ExitCode::FAILURE;
    }

    match app.failure {
        Some(_) => ExitCode::FAILURE,
        None => ExitCode::SUCCESS,
    }
}
