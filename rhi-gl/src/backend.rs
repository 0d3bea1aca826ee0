//! The OpenGL backend instance.
//!
//! `OpenGlRhi` owns the native context, creates every object and carries the state that
//! commands are applied against: the current root signatures, pipeline states, vertex array and
//! render target. Command buffers reach it through `submit_command_buffer`, which replays them
//! with the dispatch table.
use crate::api as gl;
use crate::api::types::*;
use crate::config::BackendConfig;
use crate::context::GlContext;
use crate::debug;
use crate::dispatch;
use crate::extensions::Extensions;
use crate::native::{GlApi, NativeContext};
use crate::pipeline::{ComputePipelineState, GraphicsPipelineState, GraphicsPipelineStateDesc};
use crate::resource::{
    BufferManager, Framebuffer, FramebufferAttachment, GlResource, IndirectBuffer, QueryPool,
    RenderPass, SamplerState, SwapChain, Texture, TextureManager, VertexArray,
};
use crate::resource_group::ResourceGroup;
use crate::root_signature::RootSignature;
use crate::shader::{Shader, ShaderCompiler, ShaderLanguage};
use crate::state::{ScissorEntry, ViewportEntry};
use crate::strategy::{DsaMode, VertexArrayMode};
use rhi::command::{
    decode_draw_arguments, decode_draw_indexed_arguments, decode_draw_mesh_tasks_arguments,
};
use rhi::{
    Backend, ClearFlags, CommandBuffer, DrawArguments, DrawIndexedArguments,
    DrawMeshTasksArguments, Error, MapType, MappedSubresource, QueryControlFlags,
    QueryResultFlags, QueryType, Result, Rhi, RootSignatureDesc, SamplerStateDesc,
    ScissorRectangle, TextureFlags, TextureFormat, Viewport,
};
use smallvec::SmallVec;
use std::mem;
use std::rc::Rc;

/// The OpenGL backend. Command buffers recorded for it hold `GlResource`s.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OpenGl;

impl Backend for OpenGl {
    type Resource = GlResource;
}

/// What draws render into.
#[derive(Clone, Debug)]
pub enum RenderTarget {
    SwapChain(Rc<SwapChain>),
    Framebuffer(Rc<Framebuffer>),
}

impl RenderTarget {
    /// `None` if the resource cannot be rendered into.
    pub fn from_resource(resource: &GlResource) -> Option<RenderTarget> {
        match resource {
            GlResource::SwapChain(sc) => Some(RenderTarget::SwapChain(sc.clone())),
            GlResource::Framebuffer(fb) => Some(RenderTarget::Framebuffer(fb.clone())),
            _ => None,
        }
    }

    pub fn width_and_height(&self) -> (u32, u32) {
        match self {
            RenderTarget::SwapChain(sc) => sc.width_and_height(),
            RenderTarget::Framebuffer(fb) => fb.width_and_height(),
        }
    }

    pub fn render_pass(&self) -> &Rc<RenderPass> {
        match self {
            RenderTarget::SwapChain(sc) => sc.render_pass(),
            RenderTarget::Framebuffer(fb) => fb.render_pass(),
        }
    }

    /// Native framebuffer name, 0 for the default framebuffer.
    fn framebuffer_name(&self) -> GLuint {
        match self {
            RenderTarget::SwapChain(_) => 0,
            RenderTarget::Framebuffer(fb) => fb.name(),
        }
    }

    fn ptr_eq(&self, other: &RenderTarget) -> bool {
        match (self, other) {
            (RenderTarget::SwapChain(a), RenderTarget::SwapChain(b)) => Rc::ptr_eq(a, b),
            (RenderTarget::Framebuffer(a), RenderTarget::Framebuffer(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Rc<SwapChain>> for RenderTarget {
    fn from(sc: Rc<SwapChain>) -> RenderTarget {
        RenderTarget::SwapChain(sc)
    }
}

impl From<Rc<Framebuffer>> for RenderTarget {
    fn from(fb: Rc<Framebuffer>) -> RenderTarget {
        RenderTarget::Framebuffer(fb)
    }
}

fn same<T>(a: Option<&Rc<T>>, b: Option<&Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Regenerates the mip chains of color attachments that asked for it, after rendering into
/// them.
fn generate_attachment_mipmaps(framebuffer: &Framebuffer) {
    for attachment in framebuffer.color_attachments() {
        let texture = &attachment.texture;
        if texture.desc().flags.contains(TextureFlags::GENERATE_MIPMAPS)
            && texture.number_of_mipmaps() > 1
        {
            texture.generate_mipmaps();
        }
    }
}

//--------------------------------------------------------------------------------------------------

pub struct OpenGlRhi {
    ctx: Rc<GlContext>,
    native_context: Rc<dyn NativeContext>,
    shader_language: Option<ShaderLanguage>,
    graphics_root_signature: Option<Rc<RootSignature>>,
    graphics_pipeline_state: Option<Rc<GraphicsPipelineState>>,
    vertex_array: Option<Rc<VertexArray>>,
    render_target: Option<RenderTarget>,
    compute_root_signature: Option<Rc<RootSignature>>,
    compute_pipeline_state: Option<Rc<ComputePipelineState>>,
    between_begin_end_scene: bool,
}

impl OpenGlRhi {
    /// Creates a backend on top of `native_context`, issuing native calls through `gl`.
    ///
    /// Unless `config.use_external_context` is set, the context is made current first.
    pub fn new(
        native_context: Rc<dyn NativeContext>,
        gl: Rc<dyn GlApi>,
        config: BackendConfig,
    ) -> Result<OpenGlRhi> {
        if !config.use_external_context {
            if !native_context.is_initialized() {
                error!("the native context is not initialized");
                return Err(Error::NoContext);
            }
            if !native_context.make_current() {
                error!("could not make the native context current");
                return Err(Error::NoContext);
            }
        }

        info!(
            "OpenGL version {} (vendor: {}, renderer: {})",
            gl.get_string(gl::VERSION).unwrap_or_default(),
            gl.get_string(gl::VENDOR).unwrap_or_default(),
            gl.get_string(gl::RENDERER).unwrap_or_default()
        );

        let platform_extensions = native_context.platform_extensions();
        let extensions = Extensions::detect(&*gl, &*native_context, &platform_extensions);
        let ctx = Rc::new(GlContext::new(gl, extensions, config));

        if config.debug_output {
            if ctx.extensions.khr_debug() {
                debug::install(ctx.gl());
            } else {
                debug!("no GL_KHR_debug, native debug output stays off");
            }
        }

        let shader_language = ShaderLanguage::new(&ctx, None).ok();
        Ok(OpenGlRhi {
            ctx,
            native_context,
            shader_language,
            graphics_root_signature: None,
            graphics_pipeline_state: None,
            vertex_array: None,
            render_target: None,
            compute_root_signature: None,
            compute_pipeline_state: None,
            between_begin_end_scene: false,
        })
    }

    /// Loads the entry points through the context and creates a backend on top of it.
    pub fn from_native_context(
        native_context: Rc<dyn NativeContext>,
        config: BackendConfig,
    ) -> Result<OpenGlRhi> {
        // entry points can only be resolved with a current context
        if !config.use_external_context && !native_context.make_current() {
            error!("could not make the native context current");
            return Err(Error::NoContext);
        }
        let gl = gl::Gl::load_with(|symbol| native_context.get_proc_address(symbol));
        OpenGlRhi::new(native_context, Rc::new(gl), config)
    }

    pub fn context(&self) -> &Rc<GlContext> {
        &self.ctx
    }

    pub fn native_context(&self) -> &Rc<dyn NativeContext> {
        &self.native_context
    }

    pub fn extensions(&self) -> &Extensions {
        &self.ctx.extensions
    }

    pub fn capabilities(&self) -> &crate::capabilities::Capabilities {
        &self.ctx.capabilities
    }

    /// Installs the compiler used for bytecode shaders.
    pub fn set_shader_compiler(&mut self, compiler: Rc<dyn ShaderCompiler>) {
        self.shader_language = ShaderLanguage::new(&self.ctx, Some(compiler)).ok();
    }

    //----------------------------------------------------------------------------------------------
    // factories

    pub fn shader_language(&self) -> Result<&ShaderLanguage> {
        self.shader_language
            .as_ref()
            .ok_or_else(|| Error::unsupported("GL_ARB_shader_objects"))
    }

    pub fn create_render_pass(
        &self,
        color_attachment_formats: &[TextureFormat],
        depth_stencil_attachment_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> Result<Rc<RenderPass>> {
        RenderPass::new(
            &self.ctx,
            color_attachment_formats,
            depth_stencil_attachment_format,
            number_of_multisamples,
        )
        .map(Rc::new)
    }

    /// A swap chain presenting through the backend's native context.
    pub fn create_swap_chain(&self, render_pass: &Rc<RenderPass>) -> Result<Rc<SwapChain>> {
        if render_pass.number_of_color_attachments() != 1 {
            return Err(Error::InvalidDescription(
                "swap chains render into exactly one color attachment",
            ));
        }
        Ok(Rc::new(SwapChain::new(
            &self.ctx,
            render_pass.clone(),
            self.native_context.clone(),
        )))
    }

    pub fn create_framebuffer(
        &self,
        render_pass: &Rc<RenderPass>,
        color_attachments: &[FramebufferAttachment],
        depth_stencil_attachment: Option<&FramebufferAttachment>,
    ) -> Result<Rc<Framebuffer>> {
        Framebuffer::new(
            &self.ctx,
            render_pass,
            color_attachments,
            depth_stencil_attachment,
        )
        .map(Rc::new)
    }

    pub fn create_buffer_manager(&self) -> Result<BufferManager> {
        BufferManager::new(&self.ctx)
    }

    pub fn create_texture_manager(&self) -> TextureManager {
        TextureManager::new(&self.ctx)
    }

    pub fn create_root_signature(&self, desc: &RootSignatureDesc) -> Rc<RootSignature> {
        Rc::new(RootSignature::new(desc))
    }

    pub fn create_graphics_pipeline_state(
        &self,
        desc: GraphicsPipelineStateDesc,
    ) -> Result<Rc<GraphicsPipelineState>> {
        GraphicsPipelineState::new(&self.ctx, desc).map(Rc::new)
    }

    pub fn create_compute_pipeline_state(
        &self,
        root_signature: &Rc<RootSignature>,
        compute_shader: &Rc<Shader>,
    ) -> Result<Rc<ComputePipelineState>> {
        if !self.ctx.capabilities.compute_shader {
            error!("compute pipeline states need GL_ARB_compute_shader");
            return Err(Error::unsupported("GL_ARB_compute_shader"));
        }
        let flavor = self.shader_language()?.flavor();
        ComputePipelineState::new(&self.ctx, flavor, root_signature, compute_shader).map(Rc::new)
    }

    pub fn create_sampler_state(&self, desc: SamplerStateDesc) -> Rc<SamplerState> {
        Rc::new(SamplerState::new(&self.ctx, desc))
    }

    pub fn create_query_pool(
        &self,
        query_type: QueryType,
        number_of_queries: u32,
    ) -> Result<Rc<QueryPool>> {
        QueryPool::new(&self.ctx, query_type, number_of_queries).map(Rc::new)
    }

    //----------------------------------------------------------------------------------------------
    // current state

    pub fn graphics_root_signature(&self) -> Option<&Rc<RootSignature>> {
        self.graphics_root_signature.as_ref()
    }

    pub fn graphics_pipeline_state(&self) -> Option<&Rc<GraphicsPipelineState>> {
        self.graphics_pipeline_state.as_ref()
    }

    pub fn vertex_array(&self) -> Option<&Rc<VertexArray>> {
        self.vertex_array.as_ref()
    }

    pub fn render_target(&self) -> Option<&RenderTarget> {
        self.render_target.as_ref()
    }

    pub fn compute_root_signature(&self) -> Option<&Rc<RootSignature>> {
        self.compute_root_signature.as_ref()
    }

    pub fn compute_pipeline_state(&self) -> Option<&Rc<ComputePipelineState>> {
        self.compute_pipeline_state.as_ref()
    }

    //----------------------------------------------------------------------------------------------
    // graphics

    pub fn set_graphics_root_signature(&mut self, root_signature: Option<&Rc<RootSignature>>) {
        // the new reference is taken before the old one is released
        self.graphics_root_signature = root_signature.cloned();
    }

    /// Binds the program and applies the fixed-function state. Both go through the state cache,
    /// so setting the same pipeline state again issues no native call.
    pub fn set_graphics_pipeline_state(
        &mut self,
        pipeline_state: Option<&Rc<GraphicsPipelineState>>,
    ) {
        if let Some(pso) = pipeline_state {
            debug_assert!(
                self.graphics_root_signature
                    .as_ref()
                    .map_or(true, |rs| Rc::ptr_eq(rs, pso.root_signature())),
                "pipeline state created with another root signature than the current one"
            );
            pso.bind();
        }
        if !same(self.graphics_pipeline_state.as_ref(), pipeline_state) {
            self.graphics_pipeline_state = pipeline_state.cloned();
        }
    }

    pub fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Rc<ResourceGroup>>,
    ) {
        let root_signature = match &self.graphics_root_signature {
            Some(rs) => rs,
            None => {
                debug_assert!(false, "no graphics root signature set");
                return;
            }
        };
        bind_resource_group(&self.ctx, root_signature, root_parameter_index, resource_group);
    }

    /// Vertex array objects are always bound through the state cache: creating a vertex array
    /// on the bind path leaves it bound, so the current vertex array alone says nothing about
    /// the native binding.
    pub fn set_graphics_vertex_array(&mut self, vertex_array: Option<&Rc<VertexArray>>) {
        match self.ctx.strategies.vertex_array {
            VertexArrayMode::NoVao => {
                if same(self.vertex_array.as_ref(), vertex_array) {
                    return;
                }
                if let Some(previous) = &self.vertex_array {
                    previous.disable_attributes();
                }
                if let Some(va) = vertex_array {
                    va.enable_attributes();
                }
            }
            VertexArrayMode::Vao | VertexArrayMode::VaoDsa => {
                let name = vertex_array.map_or(0, |va| va.name());
                self.ctx.state().bind_vertex_array(self.ctx.gl(), name);
            }
        }
        self.vertex_array = vertex_array.cloned();
    }

    fn render_target_height(&self) -> u32 {
        self.render_target
            .as_ref()
            .map_or(1, |rt| rt.width_and_height().1)
    }

    /// Viewports have their origin in the upper left corner.
    pub fn set_graphics_viewports(&mut self, viewports: &[Viewport]) {
        debug_assert!(!viewports.is_empty(), "at least one viewport is required");
        debug_assert!(
            viewports.len() <= self.ctx.capabilities.maximum_number_of_viewports.max(1) as usize,
            "too many viewports"
        );
        let height = self.render_target_height();
        let entries: SmallVec<[ViewportEntry; 4]> = viewports
            .iter()
            .map(|vp| ViewportEntry::from_viewport(vp, height))
            .collect();
        let array = self.ctx.extensions.arb_viewport_array();
        self.ctx.state().set_viewports(self.ctx.gl(), &entries, array);
    }

    pub fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) {
        debug_assert!(
            !scissor_rectangles.is_empty(),
            "at least one scissor rectangle is required"
        );
        let height = self.render_target_height();
        let entries: SmallVec<[ScissorEntry; 4]> = scissor_rectangles
            .iter()
            .map(|r| ScissorEntry::from_rectangle(r, height))
            .collect();
        let array = self.ctx.extensions.arb_viewport_array();
        self.ctx.state().set_scissors(self.ctx.gl(), &entries, array);
    }

    /// Framebuffers are rendered with an upper left origin so that textures come out the same
    /// way up as on other backends; the default framebuffer keeps the native lower left origin.
    pub fn set_graphics_render_target(&mut self, render_target: Option<RenderTarget>) {
        let unchanged = match (&self.render_target, &render_target) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            // framebuffer creation on the bind path may have replaced the native binding
            if let Some(rt) = &self.render_target {
                self.ctx
                    .state()
                    .bind_draw_framebuffer(self.ctx.gl(), rt.framebuffer_name());
            }
            return;
        }

        if let Some(RenderTarget::Framebuffer(previous)) = &self.render_target {
            generate_attachment_mipmaps(previous);
        }

        let gl = self.ctx.gl();
        if let Some(rt) = &render_target {
            let origin = match rt {
                RenderTarget::SwapChain(_) => gl::LOWER_LEFT,
                RenderTarget::Framebuffer(_) => gl::UPPER_LEFT,
            };
            let mut state = self.ctx.state();
            state.bind_draw_framebuffer(gl, rt.framebuffer_name());
            if self.ctx.extensions.arb_clip_control() {
                state.set_clip_control_origin(gl, origin);
            }
        } else {
            self.ctx.state().bind_draw_framebuffer(gl, 0);
        }
        self.render_target = render_target;
    }

    /// Clears the current render target. Depth is cleared even when the current depth-stencil
    /// state disables depth writes.
    pub fn clear_graphics(&mut self, flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32) {
        debug_assert!((0.0..=1.0).contains(&z), "clear depth outside [0, 1]");
        let gl = self.ctx.gl();
        let mut mask: GLbitfield = 0;
        if flags.contains(ClearFlags::COLOR) {
            gl.clear_color(color[0], color[1], color[2], color[3]);
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            gl.clear_depth(f64::from(z));
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            gl.clear_stencil(stencil as GLint);
            mask |= gl::STENCIL_BUFFER_BIT;
        }
        if mask == 0 {
            return;
        }
        let enable_depth_writes =
            flags.contains(ClearFlags::DEPTH) && !self.ctx.state().depth_write_enabled();
        if enable_depth_writes {
            gl.depth_mask(gl::TRUE);
        }
        gl.clear(mask);
        if enable_depth_writes {
            gl.depth_mask(gl::FALSE);
        }
    }

    fn primitive_mode(&self) -> Option<GLenum> {
        let mode = self.graphics_pipeline_state.as_ref().map(|p| p.mode());
        debug_assert!(mode.is_some(), "draw without a graphics pipeline state");
        mode
    }

    fn index_type_and_size(&self) -> Option<(GLenum, u32)> {
        let format = self
            .vertex_array
            .as_ref()
            .and_then(|va| va.index_buffer())
            .map(|ib| ib.format());
        debug_assert!(format.is_some(), "indexed draw without an index buffer");
        format.map(|f| (crate::mapping::index_format_to_gl(f), f.bytes_per_element()))
    }

    /// Non-indexed draws reading `number_of_draws` argument structs from `indirect_buffer`.
    pub fn draw_graphics(
        &mut self,
        indirect_buffer: &IndirectBuffer,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        let mode = match self.primitive_mode() {
            Some(mode) => mode,
            None => return,
        };
        if number_of_draws == 0 {
            return;
        }
        let gl = self.ctx.gl();
        self.ctx
            .state()
            .bind_indirect_buffer(gl, indirect_buffer.raw().name());
        let stride = mem::size_of::<DrawArguments>();
        let offset = indirect_buffer_offset as usize;
        if number_of_draws == 1 {
            gl.draw_arrays_indirect(mode, offset);
        } else if self.ctx.extensions.arb_multi_draw_indirect() {
            gl.multi_draw_arrays_indirect(mode, offset, number_of_draws as GLsizei, stride as GLsizei);
        } else {
            for i in 0..number_of_draws as usize {
                gl.draw_arrays_indirect(mode, offset + i * stride);
            }
        }
    }

    /// Non-indexed draws with arguments read from `emulation_data`.
    ///
    /// The instanced entry points are only used when a draw has more than one instance or a
    /// start instance.
    pub fn draw_graphics_emulated(&mut self, emulation_data: &[u8], number_of_draws: u32) {
        let mode = match self.primitive_mode() {
            Some(mode) => mode,
            None => return,
        };
        let gl = self.ctx.gl();
        let ext = &self.ctx.extensions;
        for args in decode_draw_arguments(emulation_data).take(number_of_draws as usize) {
            let first = args.start_vertex_location as GLint;
            let count = args.vertex_count_per_instance as GLsizei;
            let instances = args.instance_count as GLsizei;
            if args.instance_count > 1
                || (args.start_instance_location > 0 && ext.arb_base_instance())
            {
                if args.start_instance_location > 0 {
                    gl.draw_arrays_instanced_base_instance(
                        mode,
                        first,
                        count,
                        instances,
                        args.start_instance_location,
                    );
                } else {
                    debug_assert!(ext.arb_draw_instanced(), "instanced draws are not supported");
                    gl.draw_arrays_instanced(mode, first, count, instances);
                }
            } else {
                debug_assert!(
                    args.start_instance_location == 0,
                    "start instance needs GL_ARB_base_instance"
                );
                gl.draw_arrays(mode, first, count);
            }
        }
    }

    pub fn draw_indexed_graphics(
        &mut self,
        indirect_buffer: &IndirectBuffer,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        let (mode, (index_type, _)) = match (self.primitive_mode(), self.index_type_and_size()) {
            (Some(mode), Some(index)) => (mode, index),
            _ => return,
        };
        if number_of_draws == 0 {
            return;
        }
        let gl = self.ctx.gl();
        self.ctx
            .state()
            .bind_indirect_buffer(gl, indirect_buffer.raw().name());
        let stride = mem::size_of::<DrawIndexedArguments>();
        let offset = indirect_buffer_offset as usize;
        if number_of_draws == 1 {
            gl.draw_elements_indirect(mode, index_type, offset);
        } else if self.ctx.extensions.arb_multi_draw_indirect() {
            gl.multi_draw_elements_indirect(
                mode,
                index_type,
                offset,
                number_of_draws as GLsizei,
                stride as GLsizei,
            );
        } else {
            for i in 0..number_of_draws as usize {
                gl.draw_elements_indirect(mode, index_type, offset + i * stride);
            }
        }
    }

    /// Indexed draws with arguments read from `emulation_data`. Index offsets are in bytes of
    /// the index buffer format.
    pub fn draw_indexed_graphics_emulated(&mut self, emulation_data: &[u8], number_of_draws: u32) {
        let (mode, (index_type, index_size)) =
            match (self.primitive_mode(), self.index_type_and_size()) {
                (Some(mode), Some(index)) => (mode, index),
                _ => return,
            };
        let gl = self.ctx.gl();
        let ext = &self.ctx.extensions;
        for args in decode_draw_indexed_arguments(emulation_data).take(number_of_draws as usize) {
            let count = args.index_count_per_instance as GLsizei;
            let offset = (args.start_index_location * index_size) as usize;
            let instances = args.instance_count as GLsizei;
            let base_vertex = args.base_vertex_location;
            if args.instance_count > 1
                || (args.start_instance_location > 0 && ext.arb_base_instance())
            {
                if args.start_instance_location > 0 {
                    gl.draw_elements_instanced_base_vertex_base_instance(
                        mode,
                        count,
                        index_type,
                        offset,
                        instances,
                        base_vertex,
                        args.start_instance_location,
                    );
                } else if base_vertex != 0 {
                    debug_assert!(
                        ext.arb_draw_elements_base_vertex(),
                        "base vertex needs GL_ARB_draw_elements_base_vertex"
                    );
                    gl.draw_elements_instanced_base_vertex(
                        mode,
                        count,
                        index_type,
                        offset,
                        instances,
                        base_vertex,
                    );
                } else {
                    gl.draw_elements_instanced(mode, count, index_type, offset, instances);
                }
            } else if base_vertex != 0 {
                debug_assert!(
                    ext.arb_draw_elements_base_vertex(),
                    "base vertex needs GL_ARB_draw_elements_base_vertex"
                );
                gl.draw_elements_base_vertex(mode, count, index_type, offset, base_vertex);
            } else {
                gl.draw_elements(mode, count, index_type, offset);
            }
        }
    }

    pub fn draw_mesh_tasks(
        &mut self,
        indirect_buffer: &IndirectBuffer,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        if !self.ctx.extensions.nv_mesh_shader() {
            debug_assert!(false, "mesh shaders are not supported");
            return;
        }
        if number_of_draws == 0 {
            return;
        }
        let gl = self.ctx.gl();
        self.ctx
            .state()
            .bind_indirect_buffer(gl, indirect_buffer.raw().name());
        let offset = indirect_buffer_offset as GLintptr;
        if number_of_draws == 1 {
            gl.draw_mesh_tasks_indirect_nv(offset);
        } else {
            gl.multi_draw_mesh_tasks_indirect_nv(
                offset,
                number_of_draws as GLsizei,
                mem::size_of::<DrawMeshTasksArguments>() as GLsizei,
            );
        }
    }

    pub fn draw_mesh_tasks_emulated(&mut self, emulation_data: &[u8], number_of_draws: u32) {
        if !self.ctx.extensions.nv_mesh_shader() {
            debug_assert!(false, "mesh shaders are not supported");
            return;
        }
        let gl = self.ctx.gl();
        for args in decode_draw_mesh_tasks_arguments(emulation_data).take(number_of_draws as usize)
        {
            gl.draw_mesh_tasks_nv(args.first_task, args.number_of_tasks);
        }
    }

    //----------------------------------------------------------------------------------------------
    // compute

    pub fn set_compute_root_signature(&mut self, root_signature: Option<&Rc<RootSignature>>) {
        self.compute_root_signature = root_signature.cloned();
    }

    pub fn set_compute_pipeline_state(
        &mut self,
        pipeline_state: Option<&Rc<ComputePipelineState>>,
    ) {
        if let Some(pso) = pipeline_state {
            debug_assert!(
                self.compute_root_signature
                    .as_ref()
                    .map_or(true, |rs| Rc::ptr_eq(rs, pso.root_signature())),
                "pipeline state created with another root signature than the current one"
            );
            pso.bind();
        }
        if !same(self.compute_pipeline_state.as_ref(), pipeline_state) {
            self.compute_pipeline_state = pipeline_state.cloned();
        }
    }

    pub fn set_compute_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Rc<ResourceGroup>>,
    ) {
        let root_signature = match &self.compute_root_signature {
            Some(rs) => rs,
            None => {
                debug_assert!(false, "no compute root signature set");
                return;
            }
        };
        bind_resource_group(&self.ctx, root_signature, root_parameter_index, resource_group);
    }

    pub fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) {
        if !self.ctx.capabilities.compute_shader {
            debug_assert!(false, "compute shaders are not supported");
            return;
        }
        self.ctx
            .gl()
            .dispatch_compute(group_count_x, group_count_y, group_count_z);
    }

    //----------------------------------------------------------------------------------------------
    // resources

    pub fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        texture: &Texture,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) {
        texture.set_minimum_maximum_mipmap_index(minimum_mipmap_index, maximum_mipmap_index);
    }

    /// Resolves a multisample framebuffer into a render target of the same size.
    pub fn resolve_multisample_framebuffer(
        &mut self,
        destination: &RenderTarget,
        source: &Framebuffer,
    ) {
        let (width, height) = source.width_and_height();
        let (w, h) = (width as GLint, height as GLint);
        let gl = self.ctx.gl();
        let destination_name = destination.framebuffer_name();
        if self.ctx.strategies.dsa == DsaMode::Arb {
            gl.blit_named_framebuffer(
                source.name(),
                destination_name,
                0,
                0,
                w,
                h,
                0,
                0,
                w,
                h,
                gl::COLOR_BUFFER_BIT,
                gl::NEAREST,
            );
            return;
        }
        let mut state = self.ctx.state();
        state.bind_read_framebuffer(gl, source.name());
        state.bind_draw_framebuffer(gl, destination_name);
        gl.blit_framebuffer(0, 0, w, h, 0, 0, w, h, gl::COLOR_BUFFER_BIT, gl::NEAREST);
        // back to the current render target
        let current = self
            .render_target
            .as_ref()
            .map_or(0, |rt| rt.framebuffer_name());
        state.bind_draw_framebuffer(gl, current);
    }

    /// Copies a whole texture (first mip level) or buffer into another one of the same kind.
    pub fn copy_resource(&mut self, destination: &GlResource, source: &GlResource) {
        match (destination, source) {
            (GlResource::Texture(dst), GlResource::Texture(src)) => {
                self.copy_texture(dst, src);
            }
            (dst, src) => match (dst.raw_buffer(), src.raw_buffer()) {
                (Some(dst), Some(src)) => {
                    let size = dst.size().min(src.size());
                    let gl = self.ctx.gl();
                    match self.ctx.strategies.dsa {
                        DsaMode::Arb => gl.copy_named_buffer_sub_data(
                            src.name(),
                            dst.name(),
                            0,
                            0,
                            size as GLsizeiptr,
                        ),
                        DsaMode::Ext => gl.named_copy_buffer_sub_data_ext(
                            src.name(),
                            dst.name(),
                            0,
                            0,
                            size as GLsizeiptr,
                        ),
                        DsaMode::Bind => {
                            let _read = self
                                .ctx
                                .save_binding(crate::state::Binding::Buffer(gl::COPY_READ_BUFFER));
                            let _write = self
                                .ctx
                                .save_binding(crate::state::Binding::Buffer(gl::COPY_WRITE_BUFFER));
                            gl.bind_buffer(gl::COPY_READ_BUFFER, src.name());
                            gl.bind_buffer(gl::COPY_WRITE_BUFFER, dst.name());
                            gl.copy_buffer_sub_data(
                                gl::COPY_READ_BUFFER,
                                gl::COPY_WRITE_BUFFER,
                                0,
                                0,
                                size as GLsizeiptr,
                            );
                        }
                    }
                }
                _ => {
                    error!(
                        "cannot copy {:?} into {:?}",
                        source.resource_type(),
                        destination.resource_type()
                    );
                    debug_assert!(false, "unsupported resource copy");
                }
            },
        }
    }

    fn copy_texture(&self, destination: &Texture, source: &Texture) {
        if !self.ctx.extensions.arb_copy_image() {
            error!("texture copies need GL_ARB_copy_image");
            return;
        }
        debug_assert_eq!(
            (source.width(), source.height()),
            (destination.width(), destination.height()),
            "texture copy between textures of different sizes"
        );
        let desc = source.desc();
        let depth = match desc.resource_type {
            rhi::ResourceType::Texture3D => desc.depth,
            rhi::ResourceType::TextureCube | rhi::ResourceType::TextureCubeArray => {
                6 * desc.number_of_slices
            }
            _ => desc.number_of_slices,
        };
        self.ctx.gl().copy_image_sub_data(
            source.name(),
            source.target(),
            0,
            0,
            0,
            0,
            destination.name(),
            destination.target(),
            0,
            0,
            0,
            0,
            source.width() as GLsizei,
            source.height() as GLsizei,
            depth.max(1) as GLsizei,
        );
    }

    pub fn generate_mipmaps(&mut self, texture: &Texture) {
        texture.generate_mipmaps();
    }

    //----------------------------------------------------------------------------------------------
    // queries

    /// Query results are replaced when a query is begun again, there is nothing to reset.
    pub fn reset_query_pool(
        &mut self,
        query_pool: &QueryPool,
        first_query_index: u32,
        number_of_queries: u32,
    ) {
        query_pool.reset(first_query_index, number_of_queries);
    }

    pub fn begin_query(
        &mut self,
        query_pool: &QueryPool,
        query_index: u32,
        flags: QueryControlFlags,
    ) {
        query_pool.begin_query(query_index, flags);
    }

    pub fn end_query(&mut self, query_pool: &QueryPool, query_index: u32) {
        query_pool.end_query(query_index);
    }

    pub fn write_timestamp_query(&mut self, query_pool: &QueryPool, query_index: u32) {
        query_pool.write_timestamp(query_index);
    }

    /// See `QueryPool::get_results`.
    pub fn get_query_pool_results(
        &self,
        query_pool: &QueryPool,
        data: &mut [u8],
        first_query_index: u32,
        number_of_queries: u32,
        stride: usize,
        flags: QueryResultFlags,
    ) -> bool {
        query_pool.get_results(data, first_query_index, number_of_queries, stride, flags)
    }

    //----------------------------------------------------------------------------------------------
    // debug

    pub fn set_debug_marker(&mut self, name: &str) {
        if self.ctx.extensions.khr_debug() {
            self.ctx.gl().debug_message_insert(
                gl::DEBUG_SOURCE_APPLICATION,
                gl::DEBUG_TYPE_MARKER,
                1,
                gl::DEBUG_SEVERITY_NOTIFICATION,
                name,
            );
        }
    }

    pub fn begin_debug_event(&mut self, name: &str) {
        if self.ctx.extensions.khr_debug() {
            self.ctx
                .gl()
                .push_debug_group(gl::DEBUG_SOURCE_APPLICATION, 1, name);
        }
    }

    pub fn end_debug_event(&mut self) {
        if self.ctx.extensions.khr_debug() {
            self.ctx.gl().pop_debug_group();
        }
    }

    //----------------------------------------------------------------------------------------------
    // resource access

    /// Maps a buffer. `subresource` must be 0.
    pub fn map(
        &self,
        resource: &GlResource,
        subresource: u32,
        map_type: MapType,
    ) -> Result<MappedSubresource> {
        debug_assert_eq!(subresource, 0, "buffers have a single subresource");
        if let Some(raw) = resource.raw_buffer() {
            return raw.map(map_type);
        }
        match resource {
            GlResource::Texture(_) => Err(Error::unsupported("texture mapping")),
            _ => Err(Error::InvalidDescription("resource cannot be mapped")),
        }
    }

    /// Returns false if the buffer contents were lost while mapped.
    pub fn unmap(&self, resource: &GlResource, subresource: u32) -> bool {
        debug_assert_eq!(subresource, 0, "buffers have a single subresource");
        match resource.raw_buffer() {
            Some(raw) => raw.unmap(),
            None => {
                debug_assert!(false, "resource cannot be mapped");
                false
            }
        }
    }
}

fn bind_resource_group(
    ctx: &GlContext,
    root_signature: &RootSignature,
    root_parameter_index: u32,
    resource_group: Option<&Rc<ResourceGroup>>,
) {
    let group = match resource_group {
        Some(group) => group,
        // nothing to unbind, the next group overwrites the bindings
        None => return,
    };
    debug_assert_eq!(
        group.root_parameter_index(),
        root_parameter_index,
        "resource group created for another root parameter"
    );
    match root_signature
        .desc()
        .parameters
        .get(root_parameter_index as usize)
    {
        Some(parameter) => group.bind(ctx, parameter.ranges()),
        None => debug_assert!(false, "root parameter index out of bounds"),
    }
}

impl Rhi<OpenGl> for OpenGlRhi {
    fn name(&self) -> &'static str {
        "OpenGL"
    }

    fn is_initialized(&self) -> bool {
        self.native_context.is_initialized()
    }

    /// With an external context the application may have changed native state since the last
    /// scene, so the state cache starts over.
    fn begin_scene(&mut self) -> bool {
        debug_assert!(
            !self.between_begin_end_scene,
            "begin_scene called twice without end_scene"
        );
        self.between_begin_end_scene = true;
        if self.ctx.config.use_external_context {
            self.ctx.state().invalidate();
        }
        true
    }

    fn end_scene(&mut self) {
        debug_assert!(
            self.between_begin_end_scene,
            "end_scene called without begin_scene"
        );
        self.between_begin_end_scene = false;
        self.set_graphics_render_target(None);
        self.set_graphics_vertex_array(None);
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer<OpenGl>) {
        dispatch::submit(command_buffer, self);
    }

    fn flush(&mut self) {
        self.ctx.gl().flush();
    }

    fn finish(&mut self) {
        self.ctx.gl().finish();
    }
}
