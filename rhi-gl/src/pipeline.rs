//! Pipeline states.
use crate::context::{GlContext, IdKind};
use crate::mapping::topology_to_gl;
use crate::resource::RenderPass;
use crate::root_signature::RootSignature;
use crate::shader::{GraphicsProgram, LinkedProgram, Shader, ShaderStage};
use crate::strategy::ProgramFlavor;
use crate::api::types::*;
use rhi::{
    BlendState, DepthStencilState, Error, PrimitiveTopology, RasterizerState, Result,
    VertexAttribute,
};
use std::fmt;
use std::rc::Rc;

/// Everything a graphics pipeline state is made of.
#[derive(Clone, Debug)]
pub struct GraphicsPipelineStateDesc {
    pub root_signature: Rc<RootSignature>,
    pub program: Rc<GraphicsProgram>,
    pub render_pass: Rc<RenderPass>,
    pub vertex_attributes: Vec<VertexAttribute>,
    pub primitive_topology: PrimitiveTopology,
    pub rasterizer_state: RasterizerState,
    pub depth_stencil_state: DepthStencilState,
    pub blend_state: BlendState,
}

impl GraphicsPipelineStateDesc {
    /// Description with default fixed-function state and a triangle list topology.
    pub fn new(
        root_signature: &Rc<RootSignature>,
        program: &Rc<GraphicsProgram>,
        render_pass: &Rc<RenderPass>,
        vertex_attributes: &[VertexAttribute],
    ) -> GraphicsPipelineStateDesc {
        GraphicsPipelineStateDesc {
            root_signature: root_signature.clone(),
            program: program.clone(),
            render_pass: render_pass.clone(),
            vertex_attributes: vertex_attributes.to_vec(),
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterizer_state: RasterizerState::default(),
            depth_stencil_state: DepthStencilState::default(),
            blend_state: BlendState::default(),
        }
    }
}

/// Immutable graphics state, bound with `set_graphics_pipeline_state`.
pub struct GraphicsPipelineState {
    ctx: Rc<GlContext>,
    id: u32,
    desc: GraphicsPipelineStateDesc,
    mode: GLenum,
    number_of_patch_vertices: Option<u32>,
}

impl GraphicsPipelineState {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        desc: GraphicsPipelineStateDesc,
    ) -> Result<GraphicsPipelineState> {
        let number_of_patch_vertices = desc.primitive_topology.patch_vertices();
        if let Some(n) = number_of_patch_vertices {
            if !ctx.extensions.arb_tessellation_shader() {
                error!("patch lists need GL_ARB_tessellation_shader");
                return Err(Error::unsupported("GL_ARB_tessellation_shader"));
            }
            let max = ctx.capabilities.maximum_number_of_patch_vertices;
            if n == 0 || n > max {
                error!(
                    "{} patch vertices requested, the context supports 1 to {}",
                    n, max
                );
                return Err(Error::InvalidDescription(
                    "number of patch vertices out of range",
                ));
            }
        }
        let id = ctx
            .create_id(IdKind::GraphicsPipelineState)
            .ok_or(Error::InvalidDescription("out of graphics pipeline state IDs"))?;
        Ok(GraphicsPipelineState {
            ctx: ctx.clone(),
            id,
            mode: topology_to_gl(desc.primitive_topology),
            number_of_patch_vertices,
            desc,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }

    pub fn root_signature(&self) -> &Rc<RootSignature> {
        &self.desc.root_signature
    }

    pub fn program(&self) -> &Rc<GraphicsProgram> {
        &self.desc.program
    }

    pub fn render_pass(&self) -> &Rc<RenderPass> {
        &self.desc.render_pass
    }

    pub fn vertex_attributes(&self) -> &[VertexAttribute] {
        &self.desc.vertex_attributes
    }

    pub fn primitive_topology(&self) -> PrimitiveTopology {
        self.desc.primitive_topology
    }

    /// Native primitive mode used for draws.
    pub fn mode(&self) -> GLenum {
        self.mode
    }

    pub fn number_of_patch_vertices(&self) -> Option<u32> {
        self.number_of_patch_vertices
    }

    /// Makes the program current and applies the fixed-function state, all through the cache.
    pub(crate) fn bind(&self) {
        let gl = self.ctx.gl();
        let mut state = self.ctx.state();
        self.desc.program.bind(&mut state);
        if let Some(n) = self.number_of_patch_vertices {
            state.set_patch_vertices(gl, n);
        }
        state.set_rasterizer_state(gl, &self.desc.rasterizer_state);
        state.set_depth_stencil_state(gl, &self.desc.depth_stencil_state);
        state.set_blend_state(gl, &self.desc.blend_state);
    }
}

impl Drop for GraphicsPipelineState {
    fn drop(&mut self) {
        self.ctx
            .destroy_id(IdKind::GraphicsPipelineState, self.id);
    }
}

impl fmt::Debug for GraphicsPipelineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GraphicsPipelineState")
            .field("id", &self.id)
            .field("program", &self.desc.program.name())
            .field("primitive_topology", &self.desc.primitive_topology)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------

/// A compute shader linked against a root signature.
pub struct ComputePipelineState {
    ctx: Rc<GlContext>,
    id: u32,
    root_signature: Rc<RootSignature>,
    program: LinkedProgram,
}

impl ComputePipelineState {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        flavor: ProgramFlavor,
        root_signature: &Rc<RootSignature>,
        compute_shader: &Rc<Shader>,
    ) -> Result<ComputePipelineState> {
        if compute_shader.stage() != ShaderStage::Compute {
            return Err(Error::InvalidDescription(
                "compute pipeline states need a compute shader",
            ));
        }
        let program = LinkedProgram::new(
            ctx,
            flavor,
            root_signature.desc(),
            &[],
            &[compute_shader],
        )?;
        let id = ctx
            .create_id(IdKind::ComputePipelineState)
            .ok_or(Error::InvalidDescription("out of compute pipeline state IDs"))?;
        Ok(ComputePipelineState {
            ctx: ctx.clone(),
            id,
            root_signature: root_signature.clone(),
            program,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn root_signature(&self) -> &Rc<RootSignature> {
        &self.root_signature
    }

    /// The native program, or program pipeline.
    pub fn program_name(&self) -> GLuint {
        self.program.name()
    }

    pub(crate) fn bind(&self) {
        self.program.bind(&mut self.ctx.state());
    }
}

impl Drop for ComputePipelineState {
    fn drop(&mut self) {
        self.ctx.destroy_id(IdKind::ComputePipelineState, self.id);
    }
}

impl fmt::Debug for ComputePipelineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ComputePipelineState")
            .field("id", &self.id)
            .field("program", &self.program)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;
    use crate::shader::{ShaderLanguage, ShaderSourceCode};
    use rhi::{RootSignatureDesc, TextureFormat};

    const SRC: &str = "#version 450\nvoid main() {}\n";

    struct Fixture {
        gl: Rc<RecordingGl>,
        ctx: Rc<GlContext>,
        lang: ShaderLanguage,
        root_signature: Rc<RootSignature>,
        render_pass: Rc<RenderPass>,
    }

    fn fixture() -> Fixture {
        let gl = Rc::new(RecordingGl::new());
        let ext = Extensions::detect(&*gl, &*gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, BackendConfig::default()));
        let lang = ShaderLanguage::new(&ctx, None).unwrap();
        let root_signature = Rc::new(RootSignature::new(&RootSignatureDesc::new(Vec::new())));
        let render_pass =
            Rc::new(RenderPass::new(&ctx, &[TextureFormat::R8G8B8A8], None, 1).unwrap());
        Fixture {
            gl,
            ctx,
            lang,
            root_signature,
            render_pass,
        }
    }

    fn program(f: &Fixture) -> Rc<GraphicsProgram> {
        let vs = f
            .lang
            .create_vertex_shader_from_source(&[], &ShaderSourceCode::new(SRC))
            .unwrap();
        f.lang
            .create_graphics_program(&f.root_signature, &[], Some(&vs), None, None, None, None)
            .unwrap()
    }

    #[test]
    fn ids_are_recycled() {
        let f = fixture();
        let program = program(&f);
        let desc = GraphicsPipelineStateDesc::new(&f.root_signature, &program, &f.render_pass, &[]);
        let a = GraphicsPipelineState::new(&f.ctx, desc.clone()).unwrap();
        let b = GraphicsPipelineState::new(&f.ctx, desc.clone()).unwrap();
        assert_eq!((a.id(), b.id()), (0, 1));
        assert_eq!(Rc::strong_count(&program), 4);
        drop(a);
        assert!(!f.ctx.is_id(IdKind::GraphicsPipelineState, 0));
        let c = GraphicsPipelineState::new(&f.ctx, desc).unwrap();
        assert_eq!(c.id(), 0);
        drop(b);
        drop(c);
        assert_eq!(Rc::strong_count(&program), 1);
    }

    #[test]
    fn patch_lists_are_validated() {
        let f = fixture();
        let program = program(&f);
        let mut desc =
            GraphicsPipelineStateDesc::new(&f.root_signature, &program, &f.render_pass, &[]);
        desc.primitive_topology = PrimitiveTopology::PatchList(0);
        assert!(GraphicsPipelineState::new(&f.ctx, desc.clone()).is_err());
        desc.primitive_topology = PrimitiveTopology::PatchList(33);
        assert!(GraphicsPipelineState::new(&f.ctx, desc.clone()).is_err());
        // failed creations hand out no ID
        desc.primitive_topology = PrimitiveTopology::PatchList(3);
        let pso = GraphicsPipelineState::new(&f.ctx, desc).unwrap();
        assert_eq!(pso.id(), 0);
        assert_eq!(pso.number_of_patch_vertices(), Some(3));
        assert_eq!(pso.mode(), crate::api::PATCHES);

        f.gl.clear_calls();
        pso.bind();
        pso.bind();
        assert_eq!(f.gl.count("PatchParameteri"), 1);
        assert_eq!(f.gl.count("BindProgramPipeline"), 1);
    }

    #[test]
    fn compute_pipeline_state() {
        let f = fixture();
        let cs = f
            .lang
            .create_compute_shader_from_source(&ShaderSourceCode::new(SRC))
            .unwrap();
        let pso =
            ComputePipelineState::new(&f.ctx, f.lang.flavor(), &f.root_signature, &cs).unwrap();
        assert_eq!(pso.id(), 0);
        assert!(f.gl.contains(&format!(
            "UseProgramStages({}, {}, {})",
            pso.program_name(),
            crate::api::COMPUTE_SHADER_BIT,
            cs.name()
        )));

        let vs = f
            .lang
            .create_vertex_shader_from_source(&[], &ShaderSourceCode::new(SRC))
            .unwrap();
        assert!(ComputePipelineState::new(&f.ctx, f.lang.flavor(), &f.root_signature, &vs).is_err());
        drop(pso);
        assert!(!f.ctx.is_id(IdKind::ComputePipelineState, 0));
    }
}
