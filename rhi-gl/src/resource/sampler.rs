//! Sampler states.
//!
//! With `GL_ARB_sampler_objects` a sampler state is a native sampler bound to texture units.
//! Without it, the parameters are written into every texture the sampler is used with when a
//! resource group is bound.
use crate::api as gl;
use crate::api::types::*;
use crate::context::GlContext;
use crate::mapping::{address_mode_to_gl, comparison_func_to_gl, filter_to_gl};
use crate::native::GlApi;
use crate::strategy::{DsaMode, SamplerMode};
use rhi::SamplerStateDesc;
use std::fmt;
use std::rc::Rc;

pub struct SamplerState {
    ctx: Rc<GlContext>,
    desc: SamplerStateDesc,
    native: Option<GLuint>,
}

/// Sink for sampler parameters.
trait ParameterSink {
    fn int(&self, pname: GLenum, value: GLint);
    fn float(&self, pname: GLenum, value: GLfloat);
    fn floats(&self, pname: GLenum, values: &[f32]);
}

struct NativeSampler<'a> {
    gl: &'a dyn GlApi,
    sampler: GLuint,
}

impl<'a> ParameterSink for NativeSampler<'a> {
    fn int(&self, pname: GLenum, value: GLint) {
        self.gl.sampler_parameter_i(self.sampler, pname, value)
    }
    fn float(&self, pname: GLenum, value: GLfloat) {
        self.gl.sampler_parameter_f(self.sampler, pname, value)
    }
    fn floats(&self, pname: GLenum, values: &[f32]) {
        self.gl.sampler_parameter_fv(self.sampler, pname, values)
    }
}

struct TextureParameters<'a> {
    gl: &'a dyn GlApi,
    dsa: DsaMode,
    texture: GLuint,
    target: GLenum,
}

impl<'a> ParameterSink for TextureParameters<'a> {
    fn int(&self, pname: GLenum, value: GLint) {
        match self.dsa {
            DsaMode::Arb => self.gl.texture_parameter_i(self.texture, pname, value),
            DsaMode::Ext => self
                .gl
                .texture_parameter_i_ext(self.texture, self.target, pname, value),
            DsaMode::Bind => self.gl.tex_parameter_i(self.target, pname, value),
        }
    }
    fn float(&self, pname: GLenum, value: GLfloat) {
        match self.dsa {
            DsaMode::Arb => self.gl.texture_parameter_f(self.texture, pname, value),
            DsaMode::Ext => self
                .gl
                .texture_parameter_f_ext(self.texture, self.target, pname, value),
            DsaMode::Bind => self.gl.tex_parameter_f(self.target, pname, value),
        }
    }
    fn floats(&self, pname: GLenum, values: &[f32]) {
        match self.dsa {
            DsaMode::Arb => self.gl.texture_parameter_fv(self.texture, pname, values),
            DsaMode::Ext => self
                .gl
                .texture_parameter_fv_ext(self.texture, self.target, pname, values),
            DsaMode::Bind => self.gl.tex_parameter_fv(self.target, pname, values),
        }
    }
}

impl SamplerState {
    pub(crate) fn new(ctx: &Rc<GlContext>, desc: SamplerStateDesc) -> SamplerState {
        let native = if ctx.strategies.sampler == SamplerMode::Native {
            let gl = ctx.gl();
            let sampler = if ctx.strategies.dsa == DsaMode::Arb {
                gl.create_sampler()
            } else {
                gl.gen_sampler()
            };
            let sampler_state = SamplerState {
                ctx: ctx.clone(),
                desc,
                native: Some(sampler),
            };
            sampler_state.write(&NativeSampler { gl, sampler });
            return sampler_state;
        } else {
            None
        };
        SamplerState {
            ctx: ctx.clone(),
            desc,
            native,
        }
    }

    pub fn desc(&self) -> &SamplerStateDesc {
        &self.desc
    }

    /// The native sampler object, if sampler objects are used.
    pub fn native(&self) -> Option<GLuint> {
        self.native
    }

    fn write(&self, sink: &dyn ParameterSink) {
        let d = &self.desc;
        let ext = &self.ctx.extensions;
        let (min, mag) = filter_to_gl(d.filter, d.max_lod.into_inner() > 0.0);
        sink.int(gl::TEXTURE_MIN_FILTER, min as GLint);
        sink.int(gl::TEXTURE_MAG_FILTER, mag as GLint);
        sink.int(gl::TEXTURE_WRAP_S, address_mode_to_gl(d.address_u) as GLint);
        sink.int(gl::TEXTURE_WRAP_T, address_mode_to_gl(d.address_v) as GLint);
        sink.int(gl::TEXTURE_WRAP_R, address_mode_to_gl(d.address_w) as GLint);
        if self.native.is_some() || ext.ext_texture_lod_bias() {
            sink.float(gl::TEXTURE_LOD_BIAS, d.mip_lod_bias.into_inner());
        }
        if ext.ext_texture_filter_anisotropic() && d.filter.is_anisotropic() {
            let max = d
                .max_anisotropy
                .min(self.ctx.capabilities.maximum_anisotropy)
                .max(1);
            sink.float(gl::TEXTURE_MAX_ANISOTROPY_EXT, max as GLfloat);
        }
        if d.filter.is_comparison() {
            sink.int(gl::TEXTURE_COMPARE_MODE, gl::COMPARE_REF_TO_TEXTURE as GLint);
            sink.int(
                gl::TEXTURE_COMPARE_FUNC,
                comparison_func_to_gl(d.comparison_func) as GLint,
            );
        } else {
            sink.int(gl::TEXTURE_COMPARE_MODE, gl::NONE as GLint);
        }
        let border = [
            d.border_color[0].into_inner(),
            d.border_color[1].into_inner(),
            d.border_color[2].into_inner(),
            d.border_color[3].into_inner(),
        ];
        sink.floats(gl::TEXTURE_BORDER_COLOR, &border);
        sink.float(gl::TEXTURE_MIN_LOD, d.min_lod.into_inner());
        sink.float(gl::TEXTURE_MAX_LOD, d.max_lod.into_inner());
    }

    /// Binds the sampler to `unit`. Only meaningful with native sampler objects.
    pub(crate) fn bind_to_unit(&self, unit: u32) {
        if let Some(sampler) = self.native {
            self.ctx.gl().bind_sampler(unit, sampler);
        }
    }

    /// Writes the sampler parameters into a texture. On the bind path, the texture must be
    /// bound to `target` of the active unit.
    pub(crate) fn apply_to_texture(&self, dsa: DsaMode, texture: GLuint, target: GLenum) {
        self.write(&TextureParameters {
            gl: self.ctx.gl(),
            dsa,
            texture,
            target,
        });
    }
}

impl Drop for SamplerState {
    fn drop(&mut self) {
        if let Some(sampler) = self.native {
            self.ctx.gl().delete_sampler(sampler);
        }
    }
}

impl fmt::Debug for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SamplerState")
            .field("native", &self.native)
            .field("desc", &self.desc)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::extensions::Extensions;
    use crate::native::RecordingGl;
    use rhi::{FilterMode, TextureAddressMode};

    fn context(gl: &Rc<RecordingGl>) -> Rc<GlContext> {
        let ext = Extensions::detect(&**gl, &**gl, "");
        let ctx = Rc::new(GlContext::new(gl.clone(), ext, BackendConfig::default()));
        gl.clear_calls();
        ctx
    }

    #[test]
    fn native_sampler_objects() {
        let gl = Rc::new(RecordingGl::new());
        let ctx = context(&gl);
        let desc = SamplerStateDesc {
            filter: FilterMode::ComparisonMinMagMipLinear,
            address_u: TextureAddressMode::Wrap,
            ..SamplerStateDesc::default()
        };
        let s = SamplerState::new(&ctx, desc);
        let sampler = s.native().unwrap();
        assert!(gl.contains(&format!("CreateSamplers({})", sampler)));
        assert!(gl.contains(&format!(
            "SamplerParameteri({}, {}, {})",
            sampler,
            gl::TEXTURE_WRAP_S,
            gl::REPEAT
        )));
        assert!(gl.contains(&format!(
            "SamplerParameteri({}, {}, {})",
            sampler,
            gl::TEXTURE_COMPARE_MODE,
            gl::COMPARE_REF_TO_TEXTURE
        )));
        assert_eq!(gl.count("TextureParameteri"), 0);

        s.bind_to_unit(3);
        assert!(gl.contains(&format!("BindSampler(3, {})", sampler)));
        drop(s);
        assert!(gl.contains(&format!("DeleteSamplers({})", sampler)));
    }

    #[test]
    fn emulated_samplers_write_texture_parameters() {
        let gl = Rc::new(RecordingGl::legacy(
            2,
            1,
            &["GL_ARB_vertex_buffer_object", "GL_EXT_direct_state_access"],
        ));
        let ctx = context(&gl);
        let s = SamplerState::new(&ctx, SamplerStateDesc::default());
        assert!(s.native().is_none());
        assert!(gl.calls().is_empty());

        s.apply_to_texture(ctx.strategies.dsa, 9, gl::TEXTURE_2D);
        assert!(gl.contains(&format!(
            "TextureParameteriEXT(9, {}, {}, {})",
            gl::TEXTURE_2D,
            gl::TEXTURE_MIN_FILTER,
            gl::LINEAR_MIPMAP_LINEAR
        )));
        assert_eq!(gl.count("SamplerParameteri"), 0);
        // no lod bias without GL_EXT_texture_lod_bias
        assert!(!gl
            .calls()
            .iter()
            .any(|c| c.contains(&format!(", {}, ", gl::TEXTURE_LOD_BIAS))));
    }
}
