//! Extension detection.
//!
//! Every extension the backend can take advantage of has a flag here. Flags are detected once
//! per context: string membership first, then forced on for features that are core in a core
//! profile, then cleared again when one of the entry points the backend calls for the feature
//! cannot be resolved.
use crate::api as gl;
use crate::native::{GlApi, ProcAddressLoader};
use fxhash::FxHashSet;

macro_rules! extensions {
    (
        platform { $($pfield:ident => $pname:literal, [$($pentry:literal),*];)* }
        gl { $($field:ident => $name:literal, [$($entry:literal),*];)* }
    ) => {
        /// Names of the OpenGL extensions with a flag in `Extensions`.
        pub const KNOWN_EXTENSIONS: &[&str] = &[$($name),*];

        /// Names of the platform (WGL/GLX) extensions with a flag in `Extensions`.
        pub const KNOWN_PLATFORM_EXTENSIONS: &[&str] = &[$($pname),*];

        /// (extension, entry points the backend calls when the extension is used)
        const ENTRY_POINTS: &[(&str, &[&str])] = &[
            $(($pname, &[$($pentry),*]),)*
            $(($name, &[$($entry),*]),)*
        ];

        /// Extension flags of a context.
        #[derive(Clone, Debug, Default)]
        pub struct Extensions {
            core_profile: bool,
            names: FxHashSet<String>,
            $($pfield: bool,)*
            $($field: bool,)*
        }

        impl Extensions {
            $(
                #[inline]
                pub fn $pfield(&self) -> bool {
                    self.$pfield
                }
            )*
            $(
                #[inline]
                pub fn $field(&self) -> bool {
                    self.$field
                }
            )*

            /// Flag by extension name, `None` if the backend has no flag for it.
            pub fn flag(&self, name: &str) -> Option<bool> {
                match name {
                    $($pname => Some(self.$pfield),)*
                    $($name => Some(self.$field),)*
                    _ => None,
                }
            }

            fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
                match name {
                    $($pname => Some(&mut self.$pfield),)*
                    $($name => Some(&mut self.$field),)*
                    _ => None,
                }
            }

            /// Every flag that is set, by name.
            pub fn enabled(&self) -> Vec<&'static str> {
                let mut v = Vec::new();
                $(if self.$pfield { v.push($pname); })*
                $(if self.$field { v.push($name); })*
                v
            }
        }
    };
}

extensions! {
    platform {
        wgl_arb_framebuffer_srgb => "WGL_ARB_framebuffer_sRGB", [];
        wgl_ext_swap_control => "WGL_EXT_swap_control", ["wglSwapIntervalEXT"];
        wgl_ext_swap_control_tear => "WGL_EXT_swap_control_tear", [];
        glx_ext_swap_control => "GLX_EXT_swap_control", ["glXSwapIntervalEXT"];
    }
    gl {
        // EXT
        ext_texture_lod_bias => "GL_EXT_texture_lod_bias", [];
        ext_texture_filter_anisotropic => "GL_EXT_texture_filter_anisotropic", [];
        ext_texture_array => "GL_EXT_texture_array", [];
        ext_texture_3d => "GL_EXT_texture3D", ["glTexImage3D"];
        ext_direct_state_access => "GL_EXT_direct_state_access", [
            "glNamedBufferDataEXT", "glNamedBufferSubDataEXT", "glMapNamedBufferEXT",
            "glUnmapNamedBufferEXT", "glNamedCopyBufferSubDataEXT", "glTextureImage1DEXT",
            "glTextureImage2DEXT", "glTextureImage3DEXT", "glTextureParameteriEXT",
            "glTextureParameterfEXT", "glTextureParameterfvEXT", "glTextureBufferEXT",
            "glGenerateTextureMipmapEXT", "glBindMultiTextureEXT",
            "glNamedFramebufferTexture2DEXT", "glNamedFramebufferTextureLayerEXT",
            "glCheckNamedFramebufferStatusEXT", "glFramebufferDrawBuffersEXT",
            "glProgramUniform1iEXT", "glProgramUniform1fEXT", "glProgramUniform2fvEXT",
            "glProgramUniform3fvEXT", "glProgramUniform4fvEXT", "glProgramUniformMatrix3fvEXT",
            "glProgramUniformMatrix4fvEXT"
        ];
        // KHR
        khr_debug => "GL_KHR_debug", [
            "glDebugMessageCallback", "glDebugMessageControl", "glDebugMessageInsert",
            "glPushDebugGroup", "glPopDebugGroup"
        ];
        // NV
        nv_mesh_shader => "GL_NV_mesh_shader", [
            "glDrawMeshTasksNV", "glDrawMeshTasksIndirectNV", "glMultiDrawMeshTasksIndirectNV"
        ];
        // ARB
        arb_framebuffer_object => "GL_ARB_framebuffer_object", [
            "glGenFramebuffers", "glDeleteFramebuffers", "glBindFramebuffer",
            "glFramebufferTexture2D", "glFramebufferTextureLayer", "glCheckFramebufferStatus",
            "glBlitFramebuffer", "glGenerateMipmap"
        ];
        arb_multitexture => "GL_ARB_multitexture", ["glActiveTexture"];
        arb_texture_multisample => "GL_ARB_texture_multisample", ["glTexImage2DMultisample"];
        arb_vertex_buffer_object => "GL_ARB_vertex_buffer_object", [
            "glGenBuffers", "glDeleteBuffers", "glBindBuffer", "glBufferData", "glBufferSubData",
            "glMapBuffer", "glUnmapBuffer"
        ];
        arb_texture_compression => "GL_ARB_texture_compression", [];
        arb_draw_buffers => "GL_ARB_draw_buffers", ["glDrawBuffers"];
        arb_shader_objects => "GL_ARB_shader_objects", [
            "glCreateShader", "glDeleteShader", "glShaderSource", "glCompileShader",
            "glGetShaderiv", "glGetShaderInfoLog", "glCreateProgram", "glDeleteProgram",
            "glAttachShader", "glDetachShader", "glLinkProgram", "glGetProgramiv",
            "glGetProgramInfoLog", "glUseProgram", "glGetUniformLocation", "glUniform1i",
            "glUniform1f", "glUniform2fv", "glUniform3fv", "glUniform4fv", "glUniformMatrix3fv",
            "glUniformMatrix4fv"
        ];
        arb_vertex_shader => "GL_ARB_vertex_shader", [
            "glBindAttribLocation", "glVertexAttribPointer", "glEnableVertexAttribArray",
            "glDisableVertexAttribArray"
        ];
        arb_vertex_program => "GL_ARB_vertex_program", [];
        arb_fragment_shader => "GL_ARB_fragment_shader", [];
        arb_draw_instanced => "GL_ARB_draw_instanced", [
            "glDrawArraysInstanced", "glDrawElementsInstanced"
        ];
        arb_instanced_arrays => "GL_ARB_instanced_arrays", ["glVertexAttribDivisor"];
        arb_vertex_array_object => "GL_ARB_vertex_array_object", [
            "glGenVertexArrays", "glDeleteVertexArrays", "glBindVertexArray"
        ];
        arb_uniform_buffer_object => "GL_ARB_uniform_buffer_object", [
            "glGetUniformBlockIndex", "glUniformBlockBinding", "glBindBufferBase"
        ];
        arb_texture_buffer_object => "GL_ARB_texture_buffer_object", ["glTexBuffer"];
        arb_draw_indirect => "GL_ARB_draw_indirect", [
            "glDrawArraysIndirect", "glDrawElementsIndirect"
        ];
        arb_multi_draw_indirect => "GL_ARB_multi_draw_indirect", [
            "glMultiDrawArraysIndirect", "glMultiDrawElementsIndirect"
        ];
        arb_texture_cube_map => "GL_ARB_texture_cube_map", [];
        arb_texture_cube_map_array => "GL_ARB_texture_cube_map_array", [];
        arb_separate_shader_objects => "GL_ARB_separate_shader_objects", [
            "glProgramParameteri", "glGenProgramPipelines", "glDeleteProgramPipelines",
            "glBindProgramPipeline", "glUseProgramStages", "glValidateProgramPipeline",
            "glGetProgramPipelineiv", "glGetProgramPipelineInfoLog", "glProgramUniform1i",
            "glProgramUniform1f", "glProgramUniform2fv", "glProgramUniform3fv",
            "glProgramUniform4fv", "glProgramUniformMatrix3fv", "glProgramUniformMatrix4fv"
        ];
        arb_get_program_binary => "GL_ARB_get_program_binary", ["glProgramParameteri"];
        arb_draw_elements_base_vertex => "GL_ARB_draw_elements_base_vertex", [
            "glDrawElementsBaseVertex", "glDrawElementsInstancedBaseVertex"
        ];
        arb_debug_output => "GL_ARB_debug_output", [
            "glDebugMessageCallbackARB", "glDebugMessageControlARB", "glDebugMessageInsertARB"
        ];
        arb_direct_state_access => "GL_ARB_direct_state_access", [
            "glCreateBuffers", "glNamedBufferData", "glNamedBufferSubData", "glMapNamedBuffer",
            "glUnmapNamedBuffer", "glCopyNamedBufferSubData", "glCreateTextures",
            "glTextureStorage1D", "glTextureStorage2D", "glTextureStorage3D",
            "glTextureStorage2DMultisample", "glTextureSubImage1D", "glTextureSubImage2D",
            "glTextureSubImage3D", "glTextureParameteri", "glTextureParameterf",
            "glTextureParameterfv", "glTextureBuffer", "glGenerateTextureMipmap",
            "glBindTextureUnit", "glCreateFramebuffers", "glNamedFramebufferTexture",
            "glNamedFramebufferTextureLayer", "glNamedFramebufferDrawBuffers",
            "glCheckNamedFramebufferStatus", "glBlitNamedFramebuffer", "glCreateSamplers",
            "glCreateVertexArrays", "glEnableVertexArrayAttrib", "glVertexArrayAttribFormat",
            "glVertexArrayAttribIFormat", "glVertexArrayAttribBinding",
            "glVertexArrayVertexBuffer", "glVertexArrayBindingDivisor",
            "glVertexArrayElementBuffer"
        ];
        arb_texture_storage => "GL_ARB_texture_storage", [];
        arb_copy_image => "GL_ARB_copy_image", ["glCopyImageSubData"];
        arb_gl_spirv => "GL_ARB_gl_spirv", ["glSpecializeShader", "glShaderBinary"];
        arb_clip_control => "GL_ARB_clip_control", ["glClipControl"];
        arb_occlusion_query => "GL_ARB_occlusion_query", [
            "glGenQueries", "glDeleteQueries", "glBeginQuery", "glEndQuery", "glGetQueryObjectuiv"
        ];
        arb_pipeline_statistics_query => "GL_ARB_pipeline_statistics_query", [];
        arb_timer_query => "GL_ARB_timer_query", ["glQueryCounter", "glGetQueryObjectui64v"];
        arb_tessellation_shader => "GL_ARB_tessellation_shader", ["glPatchParameteri"];
        arb_geometry_shader4 => "GL_ARB_geometry_shader4", ["glProgramParameteriARB"];
        arb_compute_shader => "GL_ARB_compute_shader", ["glDispatchCompute"];
        arb_shader_storage_buffer_object => "GL_ARB_shader_storage_buffer_object", [];
        arb_shader_image_load_store => "GL_ARB_shader_image_load_store", ["glBindImageTexture"];
        arb_sampler_objects => "GL_ARB_sampler_objects", [
            "glGenSamplers", "glDeleteSamplers", "glBindSampler", "glSamplerParameteri",
            "glSamplerParameterf", "glSamplerParameterfv"
        ];
        arb_viewport_array => "GL_ARB_viewport_array", [
            "glViewportArrayv", "glScissorArrayv", "glDepthRangeArrayv"
        ];
        arb_base_instance => "GL_ARB_base_instance", [
            "glDrawArraysInstancedBaseInstance", "glDrawElementsInstancedBaseVertexBaseInstance"
        ];
        arb_vertex_attrib_binding => "GL_ARB_vertex_attrib_binding", [];
    }
}

/// Extensions that are part of every core profile context, whether the driver lists them or
/// not.
const CORE_PROFILE_EXTENSIONS: &[&str] = &[
    "GL_ARB_framebuffer_object",
    "GL_ARB_multitexture",
    "GL_ARB_texture_multisample",
    "GL_ARB_vertex_buffer_object",
    "GL_ARB_texture_compression",
    "GL_ARB_draw_buffers",
    "GL_ARB_shader_objects",
    "GL_ARB_vertex_shader",
    "GL_ARB_vertex_program",
    "GL_ARB_fragment_shader",
    "GL_ARB_draw_instanced",
    "GL_ARB_instanced_arrays",
    "GL_ARB_vertex_array_object",
    "GL_EXT_texture_array",
    "GL_EXT_texture3D",
    "GL_ARB_uniform_buffer_object",
];

/// Reads the extension names exposed by the current context.
fn context_extension_names(gl: &dyn GlApi, major_version: i32) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    if major_version >= 3 {
        let n = gl.get_integer(gl::NUM_EXTENSIONS).max(0) as u32;
        for i in 0..n {
            if let Some(name) = gl.get_string_i(gl::EXTENSIONS, i) {
                names.insert(name);
            }
        }
    } else if let Some(all) = gl.get_string(gl::EXTENSIONS) {
        names.extend(all.split_whitespace().map(|s| s.to_string()));
    }
    names
}

impl Extensions {
    /// No extension at all. Mostly useful to build flag sets by hand with `with`.
    pub fn none() -> Extensions {
        Extensions::default()
    }

    /// Detects the extensions of the current context.
    ///
    /// `platform_extensions` is the space-separated WGL/GLX extension string (may be empty).
    pub fn detect<L: ProcAddressLoader + ?Sized>(
        gl: &dyn GlApi,
        loader: &L,
        platform_extensions: &str,
    ) -> Extensions {
        let major_version = gl.get_integer(gl::MAJOR_VERSION);
        let minor_version = gl.get_integer(gl::MINOR_VERSION);
        // the profile mask only exists since 3.2
        let core_profile = (major_version, minor_version) >= (3, 2)
            && gl.get_integer(gl::CONTEXT_PROFILE_MASK) as u32 & gl::CONTEXT_CORE_PROFILE_BIT != 0;

        let mut names = context_extension_names(gl, major_version);
        names.extend(platform_extensions.split_whitespace().map(|s| s.to_string()));

        let mut ext = Extensions {
            core_profile,
            names,
            ..Extensions::default()
        };

        for &(name, _) in ENTRY_POINTS {
            let supported = ext.names.contains(name);
            if let Some(flag) = ext.flag_mut(name) {
                *flag = supported;
            }
        }

        if core_profile {
            for &name in CORE_PROFILE_EXTENSIONS {
                if let Some(flag) = ext.flag_mut(name) {
                    *flag = true;
                }
            }
        }

        // detected but unusable counts as not detected
        for &(name, entry_points) in ENTRY_POINTS {
            if ext.flag(name) != Some(true) {
                continue;
            }
            if let Some(missing) = entry_points
                .iter()
                .find(|&&entry| !loader.has_proc_address(entry))
            {
                warn!(
                    "{} is advertised but {} could not be resolved, disabling it",
                    name, missing
                );
                if let Some(flag) = ext.flag_mut(name) {
                    *flag = false;
                }
            }
        }

        // SPIR-V shader loading is not finished
        ext.arb_gl_spirv = false;

        debug!("core profile: {}", core_profile);
        debug!("detected extensions: {:?}", ext.enabled());
        ext
    }

    /// Sets the flag of a known extension, ignoring unknown names.
    pub fn with(mut self, name: &str, supported: bool) -> Extensions {
        if let Some(flag) = self.flag_mut(name) {
            *flag = supported;
            if supported {
                self.names.insert(name.to_string());
            } else {
                self.names.remove(name);
            }
        }
        self
    }

    /// Every known extension set, as on a recent desktop driver (SPIR-V stays off).
    pub fn all() -> Extensions {
        let mut ext = KNOWN_EXTENSIONS
            .iter()
            .fold(Extensions::none(), |ext, name| ext.with(name, true));
        ext.arb_gl_spirv = false;
        ext.core_profile = true;
        ext
    }

    pub fn is_core_profile(&self) -> bool {
        self.core_profile
    }

    /// Whether `name` was advertised by the context or the platform.
    ///
    /// This only checks the extension strings: a feature can be supported without its
    /// extension string in a core profile, use the typed accessors for that.
    pub fn is_supported(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RecordingGl;

    #[test]
    fn core_profile_forces_core_extensions() {
        let gl = RecordingGl::new();
        gl.set_extensions(&["GL_ARB_direct_state_access"]);
        let ext = Extensions::detect(&gl, &gl, "");
        assert!(ext.is_core_profile());
        assert!(ext.arb_vertex_array_object());
        assert!(ext.arb_uniform_buffer_object());
        assert!(ext.ext_texture_3d());
        assert!(ext.arb_direct_state_access());
        // string lookups stay string lookups
        assert!(!ext.is_supported("GL_ARB_vertex_array_object"));
        assert!(!ext.arb_sampler_objects());
    }

    #[test]
    fn legacy_context_uses_extension_string() {
        let gl = RecordingGl::legacy(2, 1, &["GL_ARB_vertex_buffer_object", "GL_ARB_multitexture"]);
        let ext = Extensions::detect(&gl, &gl, "WGL_EXT_swap_control");
        assert!(!ext.is_core_profile());
        assert!(ext.arb_vertex_buffer_object());
        assert!(ext.arb_multitexture());
        assert!(!ext.arb_vertex_array_object());
        assert!(ext.wgl_ext_swap_control());
        assert!(ext.is_supported("WGL_EXT_swap_control"));
    }

    #[test]
    fn missing_entry_point_disables_extension() {
        let gl = RecordingGl::new();
        gl.set_missing_entry_point("glBindTextureUnit");
        let ext = Extensions::detect(&gl, &gl, "");
        assert!(!ext.arb_direct_state_access());
        assert!(ext.ext_direct_state_access());
    }

    #[test]
    fn spirv_is_never_enabled() {
        let gl = RecordingGl::new();
        let ext = Extensions::detect(&gl, &gl, "");
        assert!(ext.is_supported("GL_ARB_gl_spirv"));
        assert!(!ext.arb_gl_spirv());
        assert!(!Extensions::all().arb_gl_spirv());
    }

    #[test]
    fn flags_by_name() {
        let ext = Extensions::none().with("GL_KHR_debug", true);
        assert_eq!(ext.flag("GL_KHR_debug"), Some(true));
        assert_eq!(ext.flag("GL_ARB_sampler_objects"), Some(false));
        assert_eq!(ext.flag("GL_FOO_bar"), None);
        assert_eq!(ext.enabled(), vec!["GL_KHR_debug"]);
    }
}
