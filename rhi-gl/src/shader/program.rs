//! Linked programs and uniforms.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::native::UniformValue;
use crate::shader::{
    bind_attribute_locations, compiler, GeometryShaderParameters, Shader, ShaderStage,
};
use crate::state::StateCache;
use crate::strategy::{ProgramFlavor, UniformMode};
use rhi::{DescriptorRangeType, Error, Result, RootSignatureDesc, VertexAttribute};
use std::fmt;
use std::rc::Rc;

/// Location of a uniform in one of the programs of a `GraphicsProgram`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct UniformHandle {
    program: GLuint,
    location: GLint,
}

impl UniformHandle {
    pub fn program(&self) -> GLuint {
        self.program
    }

    pub fn location(&self) -> GLint {
        self.location
    }
}

/// Writes a uniform of `program` with the uniform path of the context.
///
/// The bind path makes `program` current through the state cache, and puts the previous
/// program back afterwards if state restoration is enabled.
pub(crate) fn set_uniform(ctx: &GlContext, program: GLuint, location: GLint, value: UniformValue) {
    let gl = ctx.gl();
    match ctx.strategies.uniform {
        UniformMode::ProgramDsa => gl.program_uniform(program, location, value),
        UniformMode::ProgramExt => gl.program_uniform_ext(program, location, value),
        UniformMode::Bind => {
            let previous = {
                let mut state = ctx.state();
                let previous = if ctx.restore_state() {
                    Some(
                        state
                            .program()
                            .unwrap_or_else(|| gl.get_integer(gl::CURRENT_PROGRAM) as GLuint),
                    )
                } else {
                    None
                };
                state.use_program(gl, program);
                previous
            };
            gl.uniform(location, value);
            if let Some(previous) = previous {
                ctx.state().use_program(gl, previous);
            }
        }
    }
}

/// Configures the geometry stage of `program` before linking.
///
/// Needs `glProgramParameteriARB`; without it the primitive types must be declared with layout
/// qualifiers in the shader.
pub(crate) fn configure_geometry(
    ctx: &GlContext,
    program: GLuint,
    params: &GeometryShaderParameters,
) {
    if !ctx.extensions.arb_geometry_shader4() {
        debug!("no GL_ARB_geometry_shader4, geometry shader parameters come from the source");
        return;
    }
    let gl = ctx.gl();
    gl.program_parameter_i_arb(
        program,
        gl::GEOMETRY_INPUT_TYPE_ARB,
        params.input_primitive_topology.to_gl() as GLint,
    );
    gl.program_parameter_i_arb(
        program,
        gl::GEOMETRY_OUTPUT_TYPE_ARB,
        params.output_primitive_topology.to_gl() as GLint,
    );
    gl.program_parameter_i_arb(
        program,
        gl::GEOMETRY_VERTICES_OUT_ARB,
        params.number_of_output_vertices as GLint,
    );
}

/// Statically assigns binding points to the resources declared by a root signature.
///
/// Uniform blocks get one binding point each, numbered across the whole root signature in
/// declaration order; the numbering matches the one used by resource groups, so ranges not
/// visible to `stage` still consume their number. Texture and image uniforms are set to their
/// range's base register, which is the unit the resource group binds them to.
fn resolve_bindings(
    ctx: &GlContext,
    program: GLuint,
    desc: &RootSignatureDesc,
    stage: Option<ShaderStage>,
) {
    let gl = ctx.gl();
    let uniform_blocks = ctx.extensions.arb_uniform_buffer_object();
    let mut uniform_block_binding = 0;
    for (_, range) in desc.all_ranges() {
        let visible = stage.map_or(true, |s| s.is_visible(range.shader_visibility));
        let name = range.base_shader_register_name.as_str();
        match range.range_type {
            DescriptorRangeType::Ubv => {
                if visible && uniform_blocks {
                    let index = gl.get_uniform_block_index(program, name);
                    if index != gl::INVALID_INDEX {
                        gl.uniform_block_binding(program, index, uniform_block_binding);
                    }
                }
                uniform_block_binding += 1;
            }
            DescriptorRangeType::Srv | DescriptorRangeType::Uav => {
                if !visible || !range.resource_type.is_texture() {
                    continue;
                }
                let location = gl.get_uniform_location(program, name);
                if location != -1 {
                    set_uniform(
                        ctx,
                        program,
                        location,
                        UniformValue::Int(range.base_shader_register as GLint),
                    );
                }
            }
            DescriptorRangeType::Sampler => {}
        }
    }
}

//--------------------------------------------------------------------------------------------------

enum ProgramObject {
    Monolithic {
        program: GLuint,
    },
    Separate {
        pipeline: GLuint,
        /// Separable stage programs used by the pipeline.
        stages: Vec<Rc<Shader>>,
    },
}

/// A linked program, or a program pipeline combining separable programs.
pub(crate) struct LinkedProgram {
    ctx: Rc<GlContext>,
    object: ProgramObject,
}

impl LinkedProgram {
    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        flavor: ProgramFlavor,
        desc: &RootSignatureDesc,
        vertex_attributes: &[VertexAttribute],
        shaders: &[&Rc<Shader>],
    ) -> Result<LinkedProgram> {
        let object = match flavor {
            ProgramFlavor::Monolithic => Self::link(ctx, desc, vertex_attributes, shaders)?,
            ProgramFlavor::Separate => Self::combine(ctx, desc, shaders)?,
        };
        Ok(LinkedProgram {
            ctx: ctx.clone(),
            object,
        })
    }

    fn link(
        ctx: &GlContext,
        desc: &RootSignatureDesc,
        vertex_attributes: &[VertexAttribute],
        shaders: &[&Rc<Shader>],
    ) -> Result<ProgramObject> {
        let gl = ctx.gl();
        let program = gl.create_program();
        for shader in shaders {
            gl.attach_shader(program, shader.name());
        }
        if let Some(params) = shaders.iter().find_map(|s| s.geometry_parameters()) {
            configure_geometry(ctx, program, params);
        }
        bind_attribute_locations(gl, program, vertex_attributes);
        compiler::link_program(gl, program)?;
        for shader in shaders {
            gl.detach_shader(program, shader.name());
        }
        resolve_bindings(ctx, program, desc, None);
        Ok(ProgramObject::Monolithic { program })
    }

    fn combine(
        ctx: &GlContext,
        desc: &RootSignatureDesc,
        shaders: &[&Rc<Shader>],
    ) -> Result<ProgramObject> {
        let gl = ctx.gl();
        let pipeline = gl.gen_program_pipeline();
        for shader in shaders {
            gl.use_program_stages(pipeline, shader.stage().stage_bit(), shader.name());
            resolve_bindings(ctx, shader.name(), desc, Some(shader.stage()));
        }
        gl.validate_program_pipeline(pipeline);
        if gl.get_program_pipeline_iv(pipeline, gl::VALIDATE_STATUS) != gl::TRUE as GLint {
            let log = gl.get_program_pipeline_info_log(pipeline);
            error!("program pipeline validation failed: {}", log);
            gl.delete_program_pipeline(pipeline);
            return Err(Error::ProgramPipelineValidation(log));
        }
        Ok(ProgramObject::Separate {
            pipeline,
            stages: shaders.iter().map(|&s| s.clone()).collect(),
        })
    }

    pub(crate) fn flavor(&self) -> ProgramFlavor {
        match self.object {
            ProgramObject::Monolithic { .. } => ProgramFlavor::Monolithic,
            ProgramObject::Separate { .. } => ProgramFlavor::Separate,
        }
    }

    /// The program, or the program pipeline.
    pub(crate) fn name(&self) -> GLuint {
        match self.object {
            ProgramObject::Monolithic { program } => program,
            ProgramObject::Separate { pipeline, .. } => pipeline,
        }
    }

    /// Makes the program current through the state cache.
    pub(crate) fn bind(&self, state: &mut StateCache) {
        let gl = self.ctx.gl();
        match self.object {
            ProgramObject::Monolithic { program } => state.use_program(gl, program),
            ProgramObject::Separate { pipeline, .. } => state.bind_program_pipeline(gl, pipeline),
        }
    }

    pub(crate) fn uniform_handle(&self, name: &str) -> Option<UniformHandle> {
        let gl = self.ctx.gl();
        let lookup = |program: GLuint| {
            let location = gl.get_uniform_location(program, name);
            if location == -1 {
                None
            } else {
                Some(UniformHandle { program, location })
            }
        };
        match &self.object {
            ProgramObject::Monolithic { program } => lookup(*program),
            ProgramObject::Separate { stages, .. } => {
                stages.iter().find_map(|s| lookup(s.name()))
            }
        }
    }

    pub(crate) fn set_uniform(&self, handle: UniformHandle, value: UniformValue) {
        set_uniform(&self.ctx, handle.program, handle.location, value);
    }
}

impl Drop for LinkedProgram {
    fn drop(&mut self) {
        let gl = self.ctx.gl();
        match self.object {
            ProgramObject::Monolithic { program } => {
                self.ctx.state().forget_program(program);
                gl.delete_program(program);
            }
            ProgramObject::Separate { pipeline, .. } => {
                self.ctx.state().forget_program_pipeline(pipeline);
                gl.delete_program_pipeline(pipeline);
            }
        }
    }
}

impl fmt::Debug for LinkedProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LinkedProgram")
            .field("flavor", &self.flavor())
            .field("name", &self.name())
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------

/// Program used by graphics pipeline states.
#[derive(Debug)]
pub struct GraphicsProgram {
    program: LinkedProgram,
    mesh: bool,
}

impl GraphicsProgram {
    pub(crate) fn new(program: LinkedProgram, mesh: bool) -> GraphicsProgram {
        GraphicsProgram { program, mesh }
    }

    pub fn flavor(&self) -> ProgramFlavor {
        self.program.flavor()
    }

    /// The native program, or program pipeline.
    pub fn name(&self) -> GLuint {
        self.program.name()
    }

    /// Whether this program uses task and mesh shaders instead of vertex processing.
    pub fn is_mesh_program(&self) -> bool {
        self.mesh
    }

    pub(crate) fn bind(&self, state: &mut StateCache) {
        self.program.bind(state)
    }

    /// `None` if no stage declares an active uniform called `name`.
    pub fn get_uniform_handle(&self, name: &str) -> Option<UniformHandle> {
        self.program.uniform_handle(name)
    }

    pub fn set_uniform_1i(&self, handle: UniformHandle, value: i32) {
        self.program.set_uniform(handle, UniformValue::Int(value))
    }

    pub fn set_uniform_1f(&self, handle: UniformHandle, value: f32) {
        self.program.set_uniform(handle, UniformValue::Float(value))
    }

    pub fn set_uniform_2fv(&self, handle: UniformHandle, value: &[f32; 2]) {
        self.program.set_uniform(handle, UniformValue::Vec2(value))
    }

    pub fn set_uniform_3fv(&self, handle: UniformHandle, value: &[f32; 3]) {
        self.program.set_uniform(handle, UniformValue::Vec3(value))
    }

    pub fn set_uniform_4fv(&self, handle: UniformHandle, value: &[f32; 4]) {
        self.program.set_uniform(handle, UniformValue::Vec4(value))
    }

    pub fn set_uniform_matrix_3fv(&self, handle: UniformHandle, value: &[f32; 9]) {
        self.program.set_uniform(handle, UniformValue::Mat3(value))
    }

    pub fn set_uniform_matrix_4fv(&self, handle: UniformHandle, value: &[f32; 16]) {
        self.program.set_uniform(handle, UniformValue::Mat4(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;
    use crate::root_signature::RootSignature;
    use crate::shader::{
        GsInputPrimitiveTopology, GsOutputPrimitiveTopology, ShaderLanguage, ShaderSourceCode,
    };
    use rhi::{DescriptorRange, ResourceType, RootParameter, ShaderVisibility};

    const SRC: &str = "#version 410\nvoid main() {}\n";

    fn setup(gl: &Rc<RecordingGl>, restore_state: bool) -> (Rc<GlContext>, ShaderLanguage) {
        let ext = Extensions::detect(&**gl, &**gl, "");
        let config = BackendConfig {
            restore_state,
            ..BackendConfig::default()
        };
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, config));
        let lang = ShaderLanguage::new(&ctx, None).unwrap();
        (ctx, lang)
    }

    fn monolithic_gl() -> Rc<RecordingGl> {
        Rc::new(RecordingGl::legacy(
            3,
            3,
            &[
                "GL_ARB_shader_objects",
                "GL_ARB_vertex_shader",
                "GL_ARB_fragment_shader",
                "GL_ARB_uniform_buffer_object",
                "GL_ARB_geometry_shader4",
            ],
        ))
    }

    fn root_signature() -> RootSignature {
        RootSignature::new(&RootSignatureDesc::new(vec![
            RootParameter::descriptor_table(vec![
                DescriptorRange::new(
                    DescriptorRangeType::Ubv,
                    0,
                    "PassUniforms",
                    ResourceType::UniformBuffer,
                    ShaderVisibility::Vertex,
                ),
                DescriptorRange::new(
                    DescriptorRangeType::Srv,
                    3,
                    "AlbedoMap",
                    ResourceType::Texture2D,
                    ShaderVisibility::Fragment,
                ),
            ]),
            RootParameter::descriptor_table(vec![
                DescriptorRange::sampler(0, ShaderVisibility::Fragment),
                DescriptorRange::new(
                    DescriptorRangeType::Ubv,
                    1,
                    "MaterialUniforms",
                    ResourceType::UniformBuffer,
                    ShaderVisibility::Fragment,
                ),
            ]),
        ]))
    }

    #[test]
    fn monolithic_link_and_resolution() {
        let gl = monolithic_gl();
        let (_ctx, lang) = setup(&gl, false);
        let rs = root_signature();
        let attributes = [VertexAttribute::new(
            rhi::VertexAttributeFormat::Float2,
            "Position",
            0,
            0,
            8,
        )];
        let vs = lang
            .create_vertex_shader_from_source(&attributes, &ShaderSourceCode::new(SRC))
            .unwrap();
        let gs = lang
            .create_geometry_shader_from_source(
                &ShaderSourceCode::new(SRC),
                GeometryShaderParameters {
                    input_primitive_topology: GsInputPrimitiveTopology::Triangles,
                    output_primitive_topology: GsOutputPrimitiveTopology::TriangleStrip,
                    number_of_output_vertices: 3,
                },
            )
            .unwrap();
        let fs = lang
            .create_fragment_shader_from_source(&ShaderSourceCode::new(SRC))
            .unwrap();
        gl.clear_calls();

        let program = lang
            .create_graphics_program(
                &rs,
                &attributes,
                Some(&vs),
                None,
                None,
                Some(&gs),
                Some(&fs),
            )
            .unwrap();
        let p = program.name();
        assert_eq!(program.flavor(), ProgramFlavor::Monolithic);
        assert_eq!(gl.count("AttachShader"), 3);
        assert_eq!(gl.count("DetachShader"), 3);
        assert!(gl.contains(&format!(
            "ProgramParameteriARB({}, {}, {})",
            p,
            gl::GEOMETRY_VERTICES_OUT_ARB,
            3
        )));
        assert!(gl.contains(&format!("BindAttribLocation({}, 0, \"Position\")", p)));

        // uniform blocks are numbered across root parameters
        let calls = gl.calls();
        let block_bindings: Vec<&String> = calls
            .iter()
            .filter(|c| c.starts_with("UniformBlockBinding"))
            .collect();
        assert_eq!(block_bindings.len(), 2);
        assert!(block_bindings[0].ends_with(", 0)"));
        assert!(block_bindings[1].ends_with(", 1)"));

        // the texture uniform reads unit 3, written through the bound program
        let albedo = program.get_uniform_handle("AlbedoMap").unwrap();
        assert!(gl.contains(&format!("UseProgram({})", p)));
        assert!(gl.contains(&format!("Uniform1i({}, 3)", albedo.location())));
    }

    #[test]
    fn monolithic_link_failure_deletes_the_program() {
        let gl = monolithic_gl();
        let (_ctx, lang) = setup(&gl, false);
        let rs = root_signature();
        let vs = lang
            .create_vertex_shader_from_source(&[], &ShaderSourceCode::new(SRC))
            .unwrap();
        gl.set_fail_link(true);
        let err = lang
            .create_graphics_program(&rs, &[], Some(&vs), None, None, None, None)
            .unwrap_err();
        assert_eq!(err, Error::ProgramLink("0:1(1): error: link failed".to_string()));
        assert_eq!(gl.count("CreateProgram"), 1);
        assert_eq!(gl.count("DeleteProgram"), 1);
        assert_eq!(gl.count("UniformBlockBinding"), 0);
        // the shader is still usable
        assert_eq!(Rc::strong_count(&vs), 1);
    }

    #[test]
    fn separate_pipeline_resolves_per_stage() {
        let gl = Rc::new(RecordingGl::new());
        let (ctx, lang) = setup(&gl, false);
        let rs = root_signature();
        let vs = lang
            .create_vertex_shader_from_source(&[], &ShaderSourceCode::new(SRC))
            .unwrap();
        let fs = lang
            .create_fragment_shader_from_source(&ShaderSourceCode::new(SRC))
            .unwrap();
        gl.clear_calls();
        let program = lang
            .create_graphics_program(&rs, &[], Some(&vs), None, None, None, Some(&fs))
            .unwrap();
        assert_eq!(program.flavor(), ProgramFlavor::Separate);
        assert_eq!(Rc::strong_count(&vs), 2);

        let pipeline = program.name();
        assert!(gl.contains(&format!(
            "UseProgramStages({}, {}, {})",
            pipeline,
            gl::VERTEX_SHADER_BIT,
            vs.name()
        )));
        // the vertex stage only sees the pass block, binding point 0
        assert!(gl.contains(&format!(
            "GetUniformBlockIndex({}, \"PassUniforms\", 0)",
            vs.name()
        )));
        assert!(!gl.contains(&format!(
            "GetUniformLocation({}, \"AlbedoMap\", 0)",
            vs.name()
        )));
        // the fragment stage sees the material block, binding point 1, and the texture
        let calls = gl.calls();
        assert!(calls.iter().any(|c| c.starts_with(&format!(
            "UniformBlockBinding({}, ",
            fs.name()
        )) && c.ends_with(", 1)")));
        assert!(gl.contains(&format!(
            "GetUniformLocation({}, \"AlbedoMap\", 0)",
            fs.name()
        )));
        assert!(gl.contains(&format!("ProgramUniform1i({}, 0, 3)", fs.name())));
        // no program was made current
        assert_eq!(gl.count("UseProgram"), 0);
        assert!(gl.contains(&format!("ValidateProgramPipeline({})", pipeline)));

        program.bind(&mut ctx.state());
        program.bind(&mut ctx.state());
        assert_eq!(gl.count("BindProgramPipeline"), 1);

        drop(program);
        assert!(gl.contains(&format!("DeleteProgramPipelines({})", pipeline)));
        assert_eq!(Rc::strong_count(&vs), 1);
    }

    #[test]
    fn pipeline_validation_failure() {
        let gl = Rc::new(RecordingGl::new());
        let (_ctx, lang) = setup(&gl, false);
        let rs = root_signature();
        let vs = lang
            .create_vertex_shader_from_source(&[], &ShaderSourceCode::new(SRC))
            .unwrap();
        gl.set_fail_validate(true);
        let err = lang
            .create_graphics_program(&rs, &[], Some(&vs), None, None, None, None)
            .unwrap_err();
        assert!(match err {
            Error::ProgramPipelineValidation(_) => true,
            _ => false,
        });
        assert_eq!(gl.count("DeleteProgramPipelines"), 1);
        assert_eq!(Rc::strong_count(&vs), 1);
    }

    #[test]
    fn uniform_paths() {
        // program DSA: no program binding at all
        let gl = Rc::new(RecordingGl::new());
        let (ctx, _lang) = setup(&gl, false);
        gl.clear_calls();
        set_uniform(&ctx, 7, 2, UniformValue::Float(0.5));
        assert_eq!(gl.calls(), vec!["ProgramUniform1f(7, 2, 0.5)"]);

        // EXT DSA
        let gl = Rc::new(RecordingGl::legacy(
            3,
            3,
            &["GL_ARB_shader_objects", "GL_EXT_direct_state_access"],
        ));
        let (ctx, _lang) = setup(&gl, false);
        gl.clear_calls();
        set_uniform(&ctx, 7, 2, UniformValue::Int(4));
        assert_eq!(gl.calls(), vec!["ProgramUniform1iEXT(7, 2, 4)"]);

        // bind path with restoration: the previous program comes back
        let gl = monolithic_gl();
        let (ctx, _lang) = setup(&gl, true);
        ctx.state().use_program(ctx.gl(), 3);
        gl.clear_calls();
        set_uniform(&ctx, 7, 2, UniformValue::Int(4));
        assert_eq!(
            gl.calls(),
            vec!["UseProgram(7)", "Uniform1i(2, 4)", "UseProgram(3)"]
        );
        assert_eq!(ctx.state().program(), Some(3));

        // unknown current program: ask the context
        let gl = monolithic_gl();
        gl.set_integer(gl::CURRENT_PROGRAM, 9);
        let (ctx, _lang) = setup(&gl, true);
        gl.clear_calls();
        set_uniform(&ctx, 7, 2, UniformValue::Int(4));
        assert_eq!(gl.calls().last().map(String::as_str), Some("UseProgram(9)"));

        // bind path without restoration leaves the program current
        let gl = monolithic_gl();
        let (ctx, _lang) = setup(&gl, false);
        gl.clear_calls();
        set_uniform(&ctx, 7, 2, UniformValue::Int(4));
        assert_eq!(gl.calls(), vec!["UseProgram(7)", "Uniform1i(2, 4)"]);
        assert_eq!(ctx.state().program(), Some(7));
    }
}
