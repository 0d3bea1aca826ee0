//! Native contexts backed by a glutin window.
use crate::config::BackendConfig;
use crate::backend::OpenGlRhi;
use crate::native::{NativeContext, ProcAddressLoader};
use glutin::{EventsLoop, GlContext, GlWindow, WindowBuilder};
use rhi::{Error, Result};
use std::os::raw::c_void;
use std::rc::Rc;

/// A glutin window and its OpenGL context.
pub struct GlutinContext {
    window: GlWindow,
}

impl GlutinContext {
    pub fn new(window: GlWindow) -> GlutinContext {
        GlutinContext { window }
    }

    pub fn window(&self) -> &GlWindow {
        &self.window
    }
}

impl ProcAddressLoader for GlutinContext {
    fn get_proc_address(&self, name: &str) -> *const c_void {
        self.window.get_proc_address(name) as *const c_void
    }
}

impl NativeContext for GlutinContext {
    fn is_initialized(&self) -> bool {
        true
    }

    fn make_current(&self) -> bool {
        match unsafe { self.window.make_current() } {
            Ok(()) => true,
            Err(e) => {
                error!("could not make the context current: {:?}", e);
                false
            }
        }
    }

    fn swap_buffers(&self) {
        if let Err(e) = self.window.swap_buffers() {
            error!("swap_buffers failed: {:?}", e);
        }
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let dpi = self.window.get_hidpi_factor();
        self.window
            .get_inner_size()
            .map(|size| {
                let size = size.to_physical(dpi);
                (size.width as u32, size.height as u32)
            })
            .unwrap_or((1, 1))
    }
}

/// Opens a window with a 4.6 core profile context and creates a backend rendering into it.
pub fn create_rhi_and_window(
    config: BackendConfig,
    events_loop: &EventsLoop,
    window_builder: WindowBuilder,
) -> Result<(OpenGlRhi, Rc<GlutinContext>)> {
    let context_builder = glutin::ContextBuilder::new()
        .with_gl_profile(glutin::GlProfile::Core)
        .with_gl_debug_flag(config.debug_output)
        .with_vsync(true)
        .with_srgb(true)
        .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (4, 6)));

    let window = GlWindow::new(window_builder, context_builder, events_loop).map_err(|e| {
        error!("unable to create window: {}", e);
        Error::NoContext
    })?;
    let context = Rc::new(GlutinContext::new(window));
    let rhi = OpenGlRhi::from_native_context(context.clone(), config)?;
    Ok((rhi, context))
}
