//! Code path selection.
//!
//! Most objects can be created and updated in more than one way depending on the extensions of
//! the context. The choice is made once, when the backend is created, and objects store the tag
//! of the path they were created with.
use crate::extensions::Extensions;

/// How objects are manipulated without binding them.
///
/// ARB direct state access is preferred over the EXT version, which is preferred over binding.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DsaMode {
    /// `GL_ARB_direct_state_access` (`glNamedBufferData`, `glBindTextureUnit`...)
    Arb,
    /// `GL_EXT_direct_state_access` (`glNamedBufferDataEXT`, `glBindMultiTextureEXT`...)
    Ext,
    /// Bind to a target, operate, optionally restore the previous binding.
    Bind,
}

impl DsaMode {
    pub fn select(ext: &Extensions) -> DsaMode {
        if ext.arb_direct_state_access() {
            DsaMode::Arb
        } else if ext.ext_direct_state_access() {
            DsaMode::Ext
        } else {
            DsaMode::Bind
        }
    }

    pub fn is_dsa(self) -> bool {
        self != DsaMode::Bind
    }
}

/// How sampler states reach texture units.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SamplerMode {
    /// Native sampler objects, bound to units.
    Native,
    /// Sampler parameters written into each bound texture through DSA.
    Dsa,
    /// Sampler parameters written into each bound texture through the bound target.
    Bind,
}

impl SamplerMode {
    pub fn select(ext: &Extensions) -> SamplerMode {
        if ext.arb_sampler_objects() {
            SamplerMode::Native
        } else if ext.arb_direct_state_access() || ext.ext_direct_state_access() {
            SamplerMode::Dsa
        } else {
            SamplerMode::Bind
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ProgramFlavor {
    /// One linked program for all stages.
    Monolithic,
    /// One separable program per stage, combined in a program pipeline.
    Separate,
}

impl ProgramFlavor {
    /// `None` when the context supports neither flavor.
    pub fn select(ext: &Extensions) -> Option<ProgramFlavor> {
        if ext.arb_separate_shader_objects() {
            Some(ProgramFlavor::Separate)
        } else if ext.arb_shader_objects() {
            Some(ProgramFlavor::Monolithic)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VertexArrayMode {
    /// No vertex array objects: attributes are specified again before each draw.
    NoVao,
    /// Vertex array object set up through binding.
    Vao,
    /// Vertex array object set up with `GL_ARB_direct_state_access`.
    VaoDsa,
}

impl VertexArrayMode {
    pub fn select(ext: &Extensions) -> VertexArrayMode {
        if ext.arb_direct_state_access() {
            VertexArrayMode::VaoDsa
        } else if ext.arb_vertex_array_object() {
            VertexArrayMode::Vao
        } else {
            VertexArrayMode::NoVao
        }
    }
}

/// How uniform values are written into a program.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UniformMode {
    /// `glProgramUniform*`
    ProgramDsa,
    /// `glProgramUniform*EXT`
    ProgramExt,
    /// `glUseProgram` then `glUniform*`
    Bind,
}

impl UniformMode {
    pub fn select(ext: &Extensions) -> UniformMode {
        if ext.arb_separate_shader_objects() {
            UniformMode::ProgramDsa
        } else if ext.ext_direct_state_access() {
            UniformMode::ProgramExt
        } else {
            UniformMode::Bind
        }
    }
}

/// Every code path choice of a backend instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Strategies {
    pub dsa: DsaMode,
    pub sampler: SamplerMode,
    pub program: Option<ProgramFlavor>,
    pub vertex_array: VertexArrayMode,
    pub uniform: UniformMode,
}

impl Strategies {
    pub fn select(ext: &Extensions) -> Strategies {
        Strategies {
            dsa: DsaMode::select(ext),
            sampler: SamplerMode::select(ext),
            program: ProgramFlavor::select(ext),
            vertex_array: VertexArrayMode::select(ext),
            uniform: UniformMode::select(ext),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARB_DSA: &str = "GL_ARB_direct_state_access";
    const EXT_DSA: &str = "GL_EXT_direct_state_access";

    #[test]
    fn dsa_preference_order() {
        let cases = [
            (true, true, DsaMode::Arb),
            (true, false, DsaMode::Arb),
            (false, true, DsaMode::Ext),
            (false, false, DsaMode::Bind),
        ];
        for &(arb, ext, expected) in cases.iter() {
            let e = Extensions::none().with(ARB_DSA, arb).with(EXT_DSA, ext);
            assert_eq!(DsaMode::select(&e), expected, "arb={} ext={}", arb, ext);
        }
    }

    #[test]
    fn sampler_modes() {
        let native = Extensions::none()
            .with("GL_ARB_sampler_objects", true)
            .with(EXT_DSA, true);
        assert_eq!(SamplerMode::select(&native), SamplerMode::Native);
        let dsa = Extensions::none().with(EXT_DSA, true);
        assert_eq!(SamplerMode::select(&dsa), SamplerMode::Dsa);
        assert_eq!(SamplerMode::select(&Extensions::none()), SamplerMode::Bind);
    }

    #[test]
    fn program_flavors() {
        let both = Extensions::none()
            .with("GL_ARB_shader_objects", true)
            .with("GL_ARB_separate_shader_objects", true);
        assert_eq!(ProgramFlavor::select(&both), Some(ProgramFlavor::Separate));
        let mono = Extensions::none().with("GL_ARB_shader_objects", true);
        assert_eq!(ProgramFlavor::select(&mono), Some(ProgramFlavor::Monolithic));
        assert_eq!(ProgramFlavor::select(&Extensions::none()), None);
    }

    #[test]
    fn vertex_array_modes() {
        let vao = Extensions::none().with("GL_ARB_vertex_array_object", true);
        assert_eq!(VertexArrayMode::select(&vao), VertexArrayMode::Vao);
        let dsa = vao.clone().with(ARB_DSA, true);
        assert_eq!(VertexArrayMode::select(&dsa), VertexArrayMode::VaoDsa);
        assert_eq!(
            VertexArrayMode::select(&Extensions::none()),
            VertexArrayMode::NoVao
        );
    }

    #[test]
    fn uniform_modes() {
        let sso = Extensions::none().with("GL_ARB_separate_shader_objects", true);
        assert_eq!(UniformMode::select(&sso), UniformMode::ProgramDsa);
        let ext = Extensions::none().with(EXT_DSA, true);
        assert_eq!(UniformMode::select(&ext), UniformMode::ProgramExt);
        assert_eq!(UniformMode::select(&Extensions::none()), UniformMode::Bind);
    }

    #[test]
    fn modern_driver() {
        let s = Strategies::select(&Extensions::all());
        assert_eq!(s.dsa, DsaMode::Arb);
        assert_eq!(s.sampler, SamplerMode::Native);
        assert_eq!(s.program, Some(ProgramFlavor::Separate));
        assert_eq!(s.vertex_array, VertexArrayMode::VaoDsa);
        assert_eq!(s.uniform, UniformMode::ProgramDsa);
    }
}
