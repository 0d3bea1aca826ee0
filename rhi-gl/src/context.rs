//! State shared by the backend and every object it creates.
use crate::api as gl;
use crate::api::types::*;
use crate::capabilities::Capabilities;
use crate::config::BackendConfig;
use crate::extensions::Extensions;
use crate::native::GlApi;
use crate::state::{Binding, Restore, StateCache};
use crate::strategy::Strategies;
use rhi::MakeId;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Largest compact ID handed out to pipeline states and vertex arrays.
pub const MAX_COMPACT_ID: u32 = 65535;

/// Kinds of objects that receive a compact recycled ID.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IdKind {
    GraphicsPipelineState,
    ComputePipelineState,
    VertexArray,
}

/// The binding context: entry points, detected features, chosen code paths and the state
/// cache. Resources hold an `Rc` to it so that they can delete their native objects when dropped.
pub struct GlContext {
    gl: Rc<dyn GlApi>,
    pub extensions: Extensions,
    pub capabilities: Capabilities,
    pub strategies: Strategies,
    pub config: BackendConfig,
    state: RefCell<StateCache>,
    graphics_pipeline_ids: RefCell<MakeId>,
    compute_pipeline_ids: RefCell<MakeId>,
    vertex_array_ids: RefCell<MakeId>,
}

impl GlContext {
    pub fn new(gl: Rc<dyn GlApi>, extensions: Extensions, config: BackendConfig) -> GlContext {
        let capabilities = Capabilities::populate(&*gl, &extensions);
        let strategies = Strategies::select(&extensions);
        debug!("code paths: {:?}", strategies);
        GlContext {
            gl,
            extensions,
            capabilities,
            strategies,
            config,
            state: RefCell::new(StateCache::new()),
            graphics_pipeline_ids: RefCell::new(MakeId::new(MAX_COMPACT_ID)),
            compute_pipeline_ids: RefCell::new(MakeId::new(MAX_COMPACT_ID)),
            vertex_array_ids: RefCell::new(MakeId::new(MAX_COMPACT_ID)),
        }
    }

    pub fn gl(&self) -> &dyn GlApi {
        &*self.gl
    }

    /// The state cache. Do not hold the borrow across anything that can drop a resource.
    pub fn state(&self) -> RefMut<StateCache> {
        self.state.borrow_mut()
    }

    pub fn restore_state(&self) -> bool {
        self.config.restore_state
    }

    /// Saves an untracked binding, restored when the guard is dropped if state restoration is
    /// enabled.
    pub fn save_binding(&self, binding: Binding) -> Restore {
        Restore::save(&*self.gl, binding, self.config.restore_state)
    }

    /// Runs `f` with `buffer` bound to `target`. The draw-indirect binding is tracked by the
    /// state cache, other targets are saved and restored around the call.
    pub fn with_bound_buffer<R>(
        &self,
        target: GLenum,
        buffer: GLuint,
        f: impl FnOnce(&dyn GlApi) -> R,
    ) -> R {
        let gl = self.gl();
        if target == gl::DRAW_INDIRECT_BUFFER {
            let previous = {
                let mut state = self.state();
                let previous = state.indirect_buffer();
                state.bind_indirect_buffer(gl, buffer);
                previous
            };
            let result = f(gl);
            if let (true, Some(previous)) = (self.restore_state(), previous) {
                self.state().bind_indirect_buffer(gl, previous);
            }
            result
        } else {
            let _restore = self.save_binding(Binding::Buffer(target));
            gl.bind_buffer(target, buffer);
            f(gl)
        }
    }

    /// Runs `f` with `texture` bound to `target` of the active unit.
    pub fn with_bound_texture<R>(
        &self,
        target: GLenum,
        texture: GLuint,
        f: impl FnOnce(&dyn GlApi) -> R,
    ) -> R {
        let gl = self.gl();
        let _restore = self.save_binding(Binding::Texture(target));
        gl.bind_texture(target, texture);
        f(gl)
    }

    fn ids(&self, kind: IdKind) -> &RefCell<MakeId> {
        match kind {
            IdKind::GraphicsPipelineState => &self.graphics_pipeline_ids,
            IdKind::ComputePipelineState => &self.compute_pipeline_ids,
            IdKind::VertexArray => &self.vertex_array_ids,
        }
    }

    pub fn create_id(&self, kind: IdKind) -> Option<u32> {
        let id = self.ids(kind).borrow_mut().create_id();
        if id.is_none() {
            warn!("out of {:?} IDs", kind);
        }
        id
    }

    pub fn destroy_id(&self, kind: IdKind, id: u32) {
        let freed = self.ids(kind).borrow_mut().destroy_id(id);
        debug_assert!(freed, "{:?} ID {} freed twice", kind, id);
    }

    pub fn is_id(&self, kind: IdKind, id: u32) -> bool {
        self.ids(kind).borrow().is_id(id)
    }
}

impl fmt::Debug for GlContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GlContext")
            .field("version", &self.capabilities.version)
            .field("strategies", &self.strategies)
            .field("config", &self.config)
            .finish()
    }
}
