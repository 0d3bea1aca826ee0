//! Native context provider interfaces.
use std::fmt;
use std::os::raw::c_void;
use std::rc::Rc;

/// Resolves OpenGL entry points by name (`glBindTextureUnit`...).
pub trait ProcAddressLoader {
    fn get_proc_address(&self, name: &str) -> *const c_void;

    fn has_proc_address(&self, name: &str) -> bool {
        !self.get_proc_address(name).is_null()
    }
}

/// A platform OpenGL context.
///
/// The backend only needs to make it current, present and resolve entry points; window and
/// pixel format creation happen elsewhere.
pub trait NativeContext: ProcAddressLoader {
    fn is_initialized(&self) -> bool;

    /// Makes the context current on the calling thread. Returns false on failure.
    fn make_current(&self) -> bool;

    fn swap_buffers(&self);

    /// Size of the default framebuffer in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Space-separated WGL/GLX extension string, if the platform has one.
    fn platform_extensions(&self) -> String {
        String::new()
    }
}

impl<T: ProcAddressLoader + ?Sized> ProcAddressLoader for Rc<T> {
    fn get_proc_address(&self, name: &str) -> *const c_void {
        (**self).get_proc_address(name)
    }
}

impl<T: NativeContext + ?Sized> NativeContext for Rc<T> {
    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn make_current(&self) -> bool {
        (**self).make_current()
    }

    fn swap_buffers(&self) {
        (**self).swap_buffers()
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (**self).framebuffer_size()
    }

    fn platform_extensions(&self) -> String {
        (**self).platform_extensions()
    }
}

/// A context created and made current by the caller (`use_external_context`).
///
/// The backend never makes it current or presents through it.
pub struct ExternalContext {
    loader: Box<dyn Fn(&str) -> *const c_void>,
    size: (u32, u32),
}

impl ExternalContext {
    pub fn new<F>(loader: F, size: (u32, u32)) -> ExternalContext
    where
        F: Fn(&str) -> *const c_void + 'static,
    {
        ExternalContext {
            loader: Box::new(loader),
            size,
        }
    }

    pub fn resize(&mut self, size: (u32, u32)) {
        self.size = size;
    }
}

impl fmt::Debug for ExternalContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExternalContext")
            .field("size", &self.size)
            .finish()
    }
}

impl ProcAddressLoader for ExternalContext {
    fn get_proc_address(&self, name: &str) -> *const c_void {
        (self.loader)(name)
    }
}

impl NativeContext for ExternalContext {
    fn is_initialized(&self) -> bool {
        true
    }

    fn make_current(&self) -> bool {
        true
    }

    fn swap_buffers(&self) {}

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }
}
