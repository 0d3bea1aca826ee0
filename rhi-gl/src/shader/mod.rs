//! Shaders and programs.
//!
//! Two flavors exist, chosen once per context (see `strategy::ProgramFlavor`):
//! * monolithic: each shader is a shader object, and a graphics program links them into one
//!   program;
//! * separate: each shader is linked on its own into a separable program, and a graphics program
//!   is a program pipeline that combines them.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::native::GlApi;
use crate::root_signature::RootSignature;
use crate::strategy::ProgramFlavor;
use rhi::{Error, ResourceType, Result, ShaderVisibility, VertexAttribute};
use std::fmt;
use std::rc::Rc;

mod compiler;
mod program;

pub use self::compiler::{ShaderBytecode, ShaderCompiler, ShaderSourceCode};
pub use self::program::{GraphicsProgram, UniformHandle};
pub(crate) use self::program::{configure_geometry, LinkedProgram};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Task,
    Mesh,
    Compute,
}

impl ShaderStage {
    pub fn to_gl(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::TessellationControl => gl::TESS_CONTROL_SHADER,
            ShaderStage::TessellationEvaluation => gl::TESS_EVALUATION_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Task => gl::TASK_SHADER_NV,
            ShaderStage::Mesh => gl::MESH_SHADER_NV,
            ShaderStage::Compute => gl::COMPUTE_SHADER,
        }
    }

    /// Bit passed to `glUseProgramStages`.
    pub fn stage_bit(self) -> GLbitfield {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER_BIT,
            ShaderStage::TessellationControl => gl::TESS_CONTROL_SHADER_BIT,
            ShaderStage::TessellationEvaluation => gl::TESS_EVALUATION_SHADER_BIT,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER_BIT,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER_BIT,
            ShaderStage::Task => gl::TASK_SHADER_BIT_NV,
            ShaderStage::Mesh => gl::MESH_SHADER_BIT_NV,
            ShaderStage::Compute => gl::COMPUTE_SHADER_BIT,
        }
    }

    pub fn resource_type(self) -> ResourceType {
        match self {
            ShaderStage::Vertex => ResourceType::VertexShader,
            ShaderStage::TessellationControl => ResourceType::TessellationControlShader,
            ShaderStage::TessellationEvaluation => ResourceType::TessellationEvaluationShader,
            ShaderStage::Geometry => ResourceType::GeometryShader,
            ShaderStage::Fragment => ResourceType::FragmentShader,
            ShaderStage::Task => ResourceType::TaskShader,
            ShaderStage::Mesh => ResourceType::MeshShader,
            ShaderStage::Compute => ResourceType::ComputeShader,
        }
    }

    /// Whether a descriptor range with this visibility is used by this stage.
    pub fn is_visible(self, visibility: ShaderVisibility) -> bool {
        match visibility {
            ShaderVisibility::All => true,
            ShaderVisibility::AllGraphics => self != ShaderStage::Compute,
            ShaderVisibility::Vertex => self == ShaderStage::Vertex,
            ShaderVisibility::TessellationControl => self == ShaderStage::TessellationControl,
            ShaderVisibility::TessellationEvaluation => {
                self == ShaderStage::TessellationEvaluation
            }
            ShaderVisibility::Geometry => self == ShaderStage::Geometry,
            ShaderVisibility::Fragment => self == ShaderStage::Fragment,
            ShaderVisibility::Task => self == ShaderStage::Task,
            ShaderVisibility::Mesh => self == ShaderStage::Mesh,
            ShaderVisibility::Compute => self == ShaderStage::Compute,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GsInputPrimitiveTopology {
    Points,
    Lines,
    LinesAdjacency,
    Triangles,
    TrianglesAdjacency,
}

impl GsInputPrimitiveTopology {
    pub fn to_gl(self) -> GLenum {
        match self {
            GsInputPrimitiveTopology::Points => gl::POINTS,
            GsInputPrimitiveTopology::Lines => gl::LINES,
            GsInputPrimitiveTopology::LinesAdjacency => gl::LINES_ADJACENCY,
            GsInputPrimitiveTopology::Triangles => gl::TRIANGLES,
            GsInputPrimitiveTopology::TrianglesAdjacency => gl::TRIANGLES_ADJACENCY,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GsOutputPrimitiveTopology {
    Points,
    LineStrip,
    TriangleStrip,
}

impl GsOutputPrimitiveTopology {
    pub fn to_gl(self) -> GLenum {
        match self {
            GsOutputPrimitiveTopology::Points => gl::POINTS,
            GsOutputPrimitiveTopology::LineStrip => gl::LINE_STRIP,
            GsOutputPrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
        }
    }
}

/// Primitive types and output size of a geometry shader, for contexts where they cannot be
/// declared in the shader source.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GeometryShaderParameters {
    pub input_primitive_topology: GsInputPrimitiveTopology,
    pub output_primitive_topology: GsOutputPrimitiveTopology,
    pub number_of_output_vertices: u32,
}

//--------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ShaderObject {
    /// Shader object, linked later into a monolithic program.
    Shader(GLuint),
    /// Separable program holding this stage only.
    Program(GLuint),
}

/// A compiled shader stage.
pub struct Shader {
    ctx: Rc<GlContext>,
    stage: ShaderStage,
    object: ShaderObject,
    geometry_parameters: Option<GeometryShaderParameters>,
}

impl Shader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn resource_type(&self) -> ResourceType {
        self.stage.resource_type()
    }

    /// The shader object, or the separable program.
    pub fn name(&self) -> GLuint {
        match self.object {
            ShaderObject::Shader(name) | ShaderObject::Program(name) => name,
        }
    }

    pub fn is_separable(&self) -> bool {
        match self.object {
            ShaderObject::Program(_) => true,
            ShaderObject::Shader(_) => false,
        }
    }

    pub fn geometry_parameters(&self) -> Option<&GeometryShaderParameters> {
        self.geometry_parameters.as_ref()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        let gl = self.ctx.gl();
        match self.object {
            ShaderObject::Shader(shader) => gl.delete_shader(shader),
            ShaderObject::Program(program) => {
                self.ctx.state().forget_program(program);
                gl.delete_program(program);
            }
        }
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Shader")
            .field("stage", &self.stage)
            .field("object", &self.object)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------

/// Creates shaders and programs for the flavor supported by the context.
#[derive(Clone)]
pub struct ShaderLanguage {
    ctx: Rc<GlContext>,
    flavor: ProgramFlavor,
    compiler: Option<Rc<dyn ShaderCompiler>>,
}

impl ShaderLanguage {
    pub const NAME: &'static str = "GLSL";

    pub(crate) fn new(
        ctx: &Rc<GlContext>,
        compiler: Option<Rc<dyn ShaderCompiler>>,
    ) -> Result<ShaderLanguage> {
        let flavor = match ctx.strategies.program {
            Some(flavor) => flavor,
            None => {
                error!("no GL_ARB_separate_shader_objects or GL_ARB_shader_objects: no shaders");
                return Err(Error::unsupported("GL_ARB_shader_objects"));
            }
        };
        Ok(ShaderLanguage {
            ctx: ctx.clone(),
            flavor,
            compiler,
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn flavor(&self) -> ProgramFlavor {
        self.flavor
    }

    /// Compiles GLSL to bytecode with the external compiler, if one was provided.
    pub fn compile_to_bytecode(
        &self,
        stage: ShaderStage,
        source: &ShaderSourceCode,
    ) -> Result<ShaderBytecode> {
        match &self.compiler {
            Some(compiler) => compiler.compile_to_bytecode(stage, source),
            None => Err(Error::unsupported("shader compiler")),
        }
    }

    //----------------------------------------------------------------------------------------------
    // shaders

    /// `vertex_attributes` are bound to locations `0..n` in the separate flavor; monolithic
    /// programs bind them at link time.
    pub fn create_vertex_shader_from_source(
        &self,
        vertex_attributes: &[VertexAttribute],
        source: &ShaderSourceCode,
    ) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::Vertex, source, vertex_attributes, None)
    }

    pub fn create_vertex_shader_from_bytecode(
        &self,
        vertex_attributes: &[VertexAttribute],
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::Vertex, bytecode, vertex_attributes, None)
    }

    pub fn create_tessellation_control_shader_from_source(
        &self,
        source: &ShaderSourceCode,
    ) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::TessellationControl, source, &[], None)
    }

    pub fn create_tessellation_control_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::TessellationControl, bytecode, &[], None)
    }

    pub fn create_tessellation_evaluation_shader_from_source(
        &self,
        source: &ShaderSourceCode,
    ) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::TessellationEvaluation, source, &[], None)
    }

    pub fn create_tessellation_evaluation_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::TessellationEvaluation, bytecode, &[], None)
    }

    pub fn create_geometry_shader_from_source(
        &self,
        source: &ShaderSourceCode,
        parameters: GeometryShaderParameters,
    ) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::Geometry, source, &[], Some(parameters))
    }

    pub fn create_geometry_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
        parameters: GeometryShaderParameters,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::Geometry, bytecode, &[], Some(parameters))
    }

    pub fn create_fragment_shader_from_source(
        &self,
        source: &ShaderSourceCode,
    ) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::Fragment, source, &[], None)
    }

    pub fn create_fragment_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::Fragment, bytecode, &[], None)
    }

    pub fn create_task_shader_from_source(&self, source: &ShaderSourceCode) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::Task, source, &[], None)
    }

    pub fn create_task_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::Task, bytecode, &[], None)
    }

    pub fn create_mesh_shader_from_source(&self, source: &ShaderSourceCode) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::Mesh, source, &[], None)
    }

    pub fn create_mesh_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::Mesh, bytecode, &[], None)
    }

    pub fn create_compute_shader_from_source(
        &self,
        source: &ShaderSourceCode,
    ) -> Result<Rc<Shader>> {
        self.from_source(ShaderStage::Compute, source, &[], None)
    }

    pub fn create_compute_shader_from_bytecode(
        &self,
        bytecode: &ShaderBytecode,
    ) -> Result<Rc<Shader>> {
        self.from_bytecode(ShaderStage::Compute, bytecode, &[], None)
    }

    //----------------------------------------------------------------------------------------------
    // programs

    /// Links a vertex processing program. Vertex attribute `i` is bound to location `i`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_graphics_program(
        &self,
        root_signature: &RootSignature,
        vertex_attributes: &[VertexAttribute],
        vertex: Option<&Rc<Shader>>,
        tessellation_control: Option<&Rc<Shader>>,
        tessellation_evaluation: Option<&Rc<Shader>>,
        geometry: Option<&Rc<Shader>>,
        fragment: Option<&Rc<Shader>>,
    ) -> Result<Rc<GraphicsProgram>> {
        let stages = [
            (ShaderStage::Vertex, vertex),
            (ShaderStage::TessellationControl, tessellation_control),
            (ShaderStage::TessellationEvaluation, tessellation_evaluation),
            (ShaderStage::Geometry, geometry),
            (ShaderStage::Fragment, fragment),
        ];
        let shaders = self.collect_stages(&stages)?;
        let program = LinkedProgram::new(
            &self.ctx,
            self.flavor,
            root_signature.desc(),
            vertex_attributes,
            &shaders,
        )?;
        Ok(Rc::new(GraphicsProgram::new(program, false)))
    }

    /// Links a mesh shading program (`GL_NV_mesh_shader`).
    pub fn create_mesh_program(
        &self,
        root_signature: &RootSignature,
        task: Option<&Rc<Shader>>,
        mesh: &Rc<Shader>,
        fragment: Option<&Rc<Shader>>,
    ) -> Result<Rc<GraphicsProgram>> {
        if !self.ctx.capabilities.mesh_shader {
            return Err(Error::unsupported("GL_NV_mesh_shader"));
        }
        let stages = [
            (ShaderStage::Task, task),
            (ShaderStage::Mesh, Some(mesh)),
            (ShaderStage::Fragment, fragment),
        ];
        let shaders = self.collect_stages(&stages)?;
        let program =
            LinkedProgram::new(&self.ctx, self.flavor, root_signature.desc(), &[], &shaders)?;
        Ok(Rc::new(GraphicsProgram::new(program, true)))
    }

    //----------------------------------------------------------------------------------------------

    fn collect_stages<'a>(
        &self,
        stages: &[(ShaderStage, Option<&'a Rc<Shader>>)],
    ) -> Result<Vec<&'a Rc<Shader>>> {
        let mut shaders = Vec::with_capacity(stages.len());
        for &(stage, shader) in stages {
            if let Some(shader) = shader {
                if shader.stage() != stage {
                    error!("{:?} shader given for the {:?} stage", shader.stage(), stage);
                    return Err(Error::InvalidDescription("shader stage mismatch"));
                }
                if shader.is_separable() != (self.flavor == ProgramFlavor::Separate) {
                    return Err(Error::InvalidDescription(
                        "shader was not created by this shader language",
                    ));
                }
                shaders.push(shader);
            }
        }
        if shaders.is_empty() {
            return Err(Error::InvalidDescription("program without shaders"));
        }
        Ok(shaders)
    }

    fn check_stage(&self, stage: ShaderStage) -> Result<()> {
        let caps = &self.ctx.capabilities;
        let (supported, feature) = match stage {
            ShaderStage::Vertex | ShaderStage::Fragment => (true, ""),
            ShaderStage::TessellationControl | ShaderStage::TessellationEvaluation => (
                self.ctx.extensions.arb_tessellation_shader(),
                "GL_ARB_tessellation_shader",
            ),
            ShaderStage::Geometry => (caps.geometry_shader, "GL_ARB_geometry_shader4"),
            ShaderStage::Task | ShaderStage::Mesh => (caps.mesh_shader, "GL_NV_mesh_shader"),
            ShaderStage::Compute => (caps.compute_shader, "GL_ARB_compute_shader"),
        };
        if supported {
            Ok(())
        } else {
            error!("{:?} shaders need {}", stage, feature);
            Err(Error::unsupported(feature))
        }
    }

    fn from_source(
        &self,
        stage: ShaderStage,
        source: &ShaderSourceCode,
        vertex_attributes: &[VertexAttribute],
        geometry_parameters: Option<GeometryShaderParameters>,
    ) -> Result<Rc<Shader>> {
        self.check_stage(stage)?;
        let shader = compiler::compile_glsl(self.ctx.gl(), stage, source)?;
        self.finish(stage, shader, vertex_attributes, geometry_parameters)
    }

    fn from_bytecode(
        &self,
        stage: ShaderStage,
        bytecode: &ShaderBytecode,
        vertex_attributes: &[VertexAttribute],
        geometry_parameters: Option<GeometryShaderParameters>,
    ) -> Result<Rc<Shader>> {
        self.check_stage(stage)?;
        if !self.ctx.capabilities.shader_bytecode {
            return Err(Error::unsupported("GL_ARB_gl_spirv"));
        }
        let compiler = match &self.compiler {
            Some(compiler) => compiler,
            None => return Err(Error::unsupported("shader compiler")),
        };
        let shader = compiler.load_bytecode(self.ctx.gl(), stage, bytecode)?;
        self.finish(stage, shader, vertex_attributes, geometry_parameters)
    }

    fn finish(
        &self,
        stage: ShaderStage,
        shader: GLuint,
        vertex_attributes: &[VertexAttribute],
        geometry_parameters: Option<GeometryShaderParameters>,
    ) -> Result<Rc<Shader>> {
        let object = match self.flavor {
            ProgramFlavor::Monolithic => ShaderObject::Shader(shader),
            ProgramFlavor::Separate => ShaderObject::Program(self.separable_program(
                shader,
                vertex_attributes,
                geometry_parameters.as_ref(),
            )?),
        };
        Ok(Rc::new(Shader {
            ctx: self.ctx.clone(),
            stage,
            object,
            geometry_parameters,
        }))
    }

    /// Links `shader` alone into a separable program. The shader object is deleted either way.
    fn separable_program(
        &self,
        shader: GLuint,
        vertex_attributes: &[VertexAttribute],
        geometry_parameters: Option<&GeometryShaderParameters>,
    ) -> Result<GLuint> {
        let gl = self.ctx.gl();
        let program = gl.create_program();
        gl.program_parameter_i(program, gl::PROGRAM_SEPARABLE, gl::TRUE as GLint);
        gl.attach_shader(program, shader);
        bind_attribute_locations(gl, program, vertex_attributes);
        if let Some(params) = geometry_parameters {
            configure_geometry(&self.ctx, program, params);
        }
        let linked = compiler::link_program(gl, program);
        if linked.is_ok() {
            gl.detach_shader(program, shader);
        }
        gl.delete_shader(shader);
        linked.map(|_| program)
    }
}

impl fmt::Debug for ShaderLanguage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ShaderLanguage")
            .field("flavor", &self.flavor)
            .field("compiler", &self.compiler)
            .finish()
    }
}

pub(crate) fn bind_attribute_locations(
    gl: &dyn GlApi,
    program: GLuint,
    vertex_attributes: &[VertexAttribute],
) {
    for (location, attribute) in vertex_attributes.iter().enumerate() {
        gl.bind_attrib_location(program, location as GLuint, &attribute.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;
    use rhi::{RootSignatureDesc, VertexAttributeFormat};

    fn language(gl: &Rc<RecordingGl>) -> ShaderLanguage {
        let ext = Extensions::detect(&**gl, &**gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, BackendConfig::default()));
        gl.clear_calls();
        ShaderLanguage::new(&ctx, None).unwrap()
    }

    const VS: &str = "#version 410\nvoid main() {}\n";

    #[test]
    fn separate_shaders_are_separable_programs() {
        let gl = Rc::new(RecordingGl::new());
        let lang = language(&gl);
        assert_eq!(lang.flavor(), ProgramFlavor::Separate);
        let attributes = [VertexAttribute::new(
            VertexAttributeFormat::Float3,
            "Position",
            0,
            0,
            12,
        )];
        let vs = lang
            .create_vertex_shader_from_source(&attributes, &ShaderSourceCode::new(VS))
            .unwrap();
        assert!(vs.is_separable());
        assert_eq!(vs.resource_type(), ResourceType::VertexShader);
        assert_eq!(
            gl.names(),
            vec![
                "CreateShader",
                "ShaderSource",
                "CompileShader",
                "CreateProgram",
                "ProgramParameteri",
                "AttachShader",
                "BindAttribLocation",
                "LinkProgram",
                "DetachShader",
                "DeleteShader",
            ]
        );
        assert!(gl.contains(&format!(
            "BindAttribLocation({}, 0, \"Position\")",
            vs.name()
        )));
        gl.clear_calls();
        drop(vs);
        assert_eq!(gl.names(), vec!["DeleteProgram"]);
    }

    #[test]
    fn monolithic_shaders_are_shader_objects() {
        let gl = Rc::new(RecordingGl::legacy(
            3,
            3,
            &["GL_ARB_shader_objects", "GL_ARB_vertex_shader", "GL_ARB_fragment_shader"],
        ));
        let lang = language(&gl);
        assert_eq!(lang.flavor(), ProgramFlavor::Monolithic);
        let fs = lang
            .create_fragment_shader_from_source(&ShaderSourceCode::new(VS))
            .unwrap();
        assert!(!fs.is_separable());
        assert_eq!(gl.names(), vec!["CreateShader", "ShaderSource", "CompileShader"]);
        drop(fs);
        assert_eq!(gl.count("DeleteShader"), 1);
    }

    #[test]
    fn link_failure_of_a_separable_program() {
        let gl = Rc::new(RecordingGl::new());
        let lang = language(&gl);
        gl.set_fail_link(true);
        let err = lang
            .create_fragment_shader_from_source(&ShaderSourceCode::new(VS))
            .unwrap_err();
        assert!(match err {
            Error::ProgramLink(_) => true,
            _ => false,
        });
        assert_eq!(gl.count("DeleteProgram"), 1);
        assert_eq!(gl.count("DeleteShader"), 1);
    }

    #[test]
    fn optional_stages_need_their_extension() {
        let gl = Rc::new(RecordingGl::new());
        gl.remove_extension("GL_NV_mesh_shader");
        let lang = language(&gl);
        assert_eq!(
            lang.create_mesh_shader_from_source(&ShaderSourceCode::new(VS))
                .unwrap_err(),
            Error::unsupported("GL_NV_mesh_shader")
        );
        assert_eq!(gl.count("CreateShader"), 0);
        // bytecode is switched off
        assert_eq!(
            lang.create_fragment_shader_from_bytecode(&ShaderBytecode(vec![0; 4]))
                .unwrap_err(),
            Error::unsupported("GL_ARB_gl_spirv")
        );
        assert!(lang
            .compile_to_bytecode(ShaderStage::Fragment, &ShaderSourceCode::new(VS))
            .is_err());
    }

    #[test]
    fn no_shader_support() {
        let gl = Rc::new(RecordingGl::legacy(2, 1, &[]));
        let ext = Extensions::detect(&*gl, &*gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, BackendConfig::default()));
        assert!(ShaderLanguage::new(&ctx, None).is_err());
    }

    #[test]
    fn programs_reject_mismatched_stages() {
        let gl = Rc::new(RecordingGl::new());
        let lang = language(&gl);
        let rs = RootSignature::new(&RootSignatureDesc::new(Vec::new()));
        let fs = lang
            .create_fragment_shader_from_source(&ShaderSourceCode::new(VS))
            .unwrap();
        assert!(lang
            .create_graphics_program(&rs, &[], Some(&fs), None, None, None, None)
            .is_err());
        assert!(lang
            .create_graphics_program(&rs, &[], None, None, None, None, None)
            .is_err());
    }

    #[test]
    fn visibility() {
        assert!(ShaderStage::Fragment.is_visible(ShaderVisibility::All));
        assert!(ShaderStage::Fragment.is_visible(ShaderVisibility::AllGraphics));
        assert!(!ShaderStage::Compute.is_visible(ShaderVisibility::AllGraphics));
        assert!(!ShaderStage::Vertex.is_visible(ShaderVisibility::Fragment));
        assert!(ShaderStage::Mesh.is_visible(ShaderVisibility::Mesh));
    }
}
