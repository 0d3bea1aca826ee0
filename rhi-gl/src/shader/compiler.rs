//! GLSL compilation and the external bytecode compiler seam.
use crate::api as gl;
use crate::api::types::*;
use crate::native::GlApi;
use crate::shader::ShaderStage;
use rhi::{Error, Result};
use std::borrow::Cow;
use std::fmt;

/// Opaque shader bytecode (SPIR-V for this backend).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShaderBytecode(pub Vec<u8>);

impl ShaderBytecode {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// GLSL source of one shader stage.
#[derive(Copy, Clone, Debug)]
pub struct ShaderSourceCode<'a> {
    pub source: &'a str,
    /// Inserted after the `#version` line, if any.
    pub preprocessor_definitions: Option<&'a str>,
}

impl<'a> ShaderSourceCode<'a> {
    pub fn new(source: &'a str) -> ShaderSourceCode<'a> {
        ShaderSourceCode {
            source,
            preprocessor_definitions: None,
        }
    }

    pub fn with_definitions(mut self, definitions: &'a str) -> ShaderSourceCode<'a> {
        self.preprocessor_definitions = Some(definitions);
        self
    }

    /// The text handed to `glShaderSource`.
    pub fn assemble(&self) -> Cow<'a, str> {
        let definitions = match self.preprocessor_definitions {
            Some(d) if !d.is_empty() => d,
            _ => return Cow::Borrowed(self.source),
        };
        // `#version` must stay the first directive
        let split = if self.source.trim_start().starts_with("#version") {
            self.source.find('\n').map(|i| i + 1).unwrap_or_else(|| self.source.len())
        } else {
            0
        };
        let (head, tail) = self.source.split_at(split);
        let mut out = String::with_capacity(self.source.len() + definitions.len() + 2);
        out.push_str(head);
        if !head.is_empty() && !head.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(definitions);
        if !definitions.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(tail);
        Cow::Owned(out)
    }
}

impl<'a> From<&'a str> for ShaderSourceCode<'a> {
    fn from(source: &'a str) -> ShaderSourceCode<'a> {
        ShaderSourceCode::new(source)
    }
}

/// Turns GLSL into bytecode and bytecode into native shader objects.
///
/// The backend ships without an implementation: bytecode support is off in this backend, and
/// compilers are provided by the application.
pub trait ShaderCompiler: fmt::Debug {
    fn compile_to_bytecode(
        &self,
        stage: ShaderStage,
        source: &ShaderSourceCode,
    ) -> Result<ShaderBytecode>;

    /// Creates a native shader object from bytecode.
    fn load_bytecode(
        &self,
        gl: &dyn GlApi,
        stage: ShaderStage,
        bytecode: &ShaderBytecode,
    ) -> Result<GLuint> {
        let shader = gl.create_shader(stage.to_gl());
        gl.shader_binary(shader, gl::SHADER_BINARY_FORMAT_SPIR_V, bytecode.bytes());
        gl.specialize_shader(shader, "main");
        check_compile_status(gl, shader, stage)
    }
}

/// Compiles GLSL into a new shader object.
pub(crate) fn compile_glsl(
    gl: &dyn GlApi,
    stage: ShaderStage,
    source: &ShaderSourceCode,
) -> Result<GLuint> {
    let shader = gl.create_shader(stage.to_gl());
    gl.shader_source(shader, &source.assemble());
    gl.compile_shader(shader);
    check_compile_status(gl, shader, stage)
}

fn check_compile_status(gl: &dyn GlApi, shader: GLuint, stage: ShaderStage) -> Result<GLuint> {
    if gl.get_shader_iv(shader, gl::COMPILE_STATUS) != gl::TRUE as GLint {
        let log = gl.get_shader_info_log(shader);
        error!("error compiling {:?} shader: {}", stage, log);
        gl.delete_shader(shader);
        return Err(Error::ShaderCompilation(log));
    }
    Ok(shader)
}

/// Links `program`; on failure the program is deleted.
pub(crate) fn link_program(gl: &dyn GlApi, program: GLuint) -> Result<()> {
    gl.link_program(program);
    if gl.get_program_iv(program, gl::LINK_STATUS) != gl::TRUE as GLint {
        let log = gl.get_program_info_log(program);
        error!("error linking program: {}", log);
        gl.delete_program(program);
        return Err(Error::ProgramLink(log));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RecordingGl;

    #[test]
    fn definitions_go_after_the_version() {
        let src =
            ShaderSourceCode::new("#version 450\nvoid main() {}\n").with_definitions("#define A 1");
        assert_eq!(src.assemble(), "#version 450\n#define A 1\nvoid main() {}\n");

        let src = ShaderSourceCode::new("void main() {}").with_definitions("#define A 1\n");
        assert_eq!(src.assemble(), "#define A 1\nvoid main() {}");

        let src = ShaderSourceCode::new("#version 330");
        assert_eq!(src.assemble(), "#version 330");
    }

    #[test]
    fn compile_failure_deletes_the_shader() {
        let gl = RecordingGl::new();
        gl.set_fail_compile(true);
        let source = ShaderSourceCode::new("void main() {}");
        let err = compile_glsl(&gl, ShaderStage::Fragment, &source).unwrap_err();
        match err {
            Error::ShaderCompilation(log) => assert!(log.contains("compile failed")),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(gl.count("CreateShader"), 1);
        assert_eq!(gl.count("DeleteShader"), 1);
    }

    #[derive(Debug)]
    struct PassThrough;

    impl ShaderCompiler for PassThrough {
        fn compile_to_bytecode(
            &self,
            _stage: ShaderStage,
            source: &ShaderSourceCode,
        ) -> Result<ShaderBytecode> {
            Ok(ShaderBytecode(source.source.as_bytes().to_vec()))
        }
    }

    #[test]
    fn default_bytecode_loader() {
        let gl = RecordingGl::new();
        let bytecode = PassThrough
            .compile_to_bytecode(ShaderStage::Vertex, &ShaderSourceCode::new("abcd"))
            .unwrap();
        let shader = PassThrough
            .load_bytecode(&gl, ShaderStage::Vertex, &bytecode)
            .unwrap();
        assert!(gl.contains(&format!(
            "ShaderBinary({}, {}, 4)",
            shader,
            gl::SHADER_BINARY_FORMAT_SPIR_V
        )));
        assert!(gl.contains(&format!("SpecializeShader({}, \"main\")", shader)));
    }
}
