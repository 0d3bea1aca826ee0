//! Native entry-point seam.
//!
//! Every OpenGL call made by the backend goes through `GlApi`. The generated `api::Gl` function
//! table implements it by forwarding to the driver; `RecordingGl` implements it without a
//! context by logging each call, which is what the test suite runs against.
//!
//! Entry points that only take scalar arguments are listed once in `simple_entry_points!` and
//! expanded into the trait declaration and both implementations. The others (out parameters,
//! slices, strings, pointers) are written out by hand.
use crate::api::types::*;
use std::os::raw::c_void;

/// Value passed to the `glUniform*` family.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue<'a> {
    Int(GLint),
    Float(GLfloat),
    Vec2(&'a [f32; 2]),
    Vec3(&'a [f32; 3]),
    Vec4(&'a [f32; 4]),
    Mat3(&'a [f32; 9]),
    Mat4(&'a [f32; 16]),
}

impl<'a> UniformValue<'a> {
    /// Suffix of the matching entry point (`1i` for `glUniform1i`...).
    pub fn suffix(&self) -> &'static str {
        match self {
            UniformValue::Int(_) => "1i",
            UniformValue::Float(_) => "1f",
            UniformValue::Vec2(_) => "2fv",
            UniformValue::Vec3(_) => "3fv",
            UniformValue::Vec4(_) => "4fv",
            UniformValue::Mat3(_) => "Matrix3fv",
            UniformValue::Mat4(_) => "Matrix4fv",
        }
    }
}

macro_rules! simple_entry_points {
    ($m:ident) => {
        $m! {
            // state
            fn enable(cap: GLenum) => Enable;
            fn disable(cap: GLenum) => Disable;
            fn enablei(target: GLenum, index: GLuint) => Enablei;
            fn disablei(target: GLenum, index: GLuint) => Disablei;
            fn flush() => Flush;
            fn finish() => Finish;

            // buffers
            fn bind_buffer(target: GLenum, buffer: GLuint) => BindBuffer;
            fn bind_buffer_base(target: GLenum, index: GLuint, buffer: GLuint) => BindBufferBase;
            fn copy_buffer_sub_data(read_target: GLenum, write_target: GLenum, read_offset: GLintptr, write_offset: GLintptr, size: GLsizeiptr) => CopyBufferSubData;
            fn copy_named_buffer_sub_data(read_buffer: GLuint, write_buffer: GLuint, read_offset: GLintptr, write_offset: GLintptr, size: GLsizeiptr) => CopyNamedBufferSubData;
            fn named_copy_buffer_sub_data_ext(read_buffer: GLuint, write_buffer: GLuint, read_offset: GLintptr, write_offset: GLintptr, size: GLsizeiptr) => NamedCopyBufferSubDataEXT;

            // textures
            fn active_texture(texture: GLenum) => ActiveTexture;
            fn bind_texture(target: GLenum, texture: GLuint) => BindTexture;
            fn bind_texture_unit(unit: GLuint, texture: GLuint) => BindTextureUnit;
            fn bind_multi_texture_ext(texunit: GLenum, target: GLenum, texture: GLuint) => BindMultiTextureEXT;
            fn texture_storage_1d(texture: GLuint, levels: GLsizei, internalformat: GLenum, width: GLsizei) => TextureStorage1D;
            fn texture_storage_2d(texture: GLuint, levels: GLsizei, internalformat: GLenum, width: GLsizei, height: GLsizei) => TextureStorage2D;
            fn texture_storage_3d(texture: GLuint, levels: GLsizei, internalformat: GLenum, width: GLsizei, height: GLsizei, depth: GLsizei) => TextureStorage3D;
            fn texture_storage_2d_multisample(texture: GLuint, samples: GLsizei, internalformat: GLenum, width: GLsizei, height: GLsizei, fixedsamplelocations: GLboolean) => TextureStorage2DMultisample;
            fn tex_image_2d_multisample(target: GLenum, samples: GLsizei, internalformat: GLenum, width: GLsizei, height: GLsizei, fixedsamplelocations: GLboolean) => TexImage2DMultisample;
            fn tex_buffer(target: GLenum, internalformat: GLenum, buffer: GLuint) => TexBuffer;
            fn texture_buffer(texture: GLuint, internalformat: GLenum, buffer: GLuint) => TextureBuffer;
            fn texture_buffer_ext(texture: GLuint, target: GLenum, internalformat: GLenum, buffer: GLuint) => TextureBufferEXT;
            fn tex_parameter_i(target: GLenum, pname: GLenum, param: GLint) => TexParameteri;
            fn texture_parameter_i(texture: GLuint, pname: GLenum, param: GLint) => TextureParameteri;
            fn texture_parameter_i_ext(texture: GLuint, target: GLenum, pname: GLenum, param: GLint) => TextureParameteriEXT;
            fn tex_parameter_f(target: GLenum, pname: GLenum, param: GLfloat) => TexParameterf;
            fn texture_parameter_f(texture: GLuint, pname: GLenum, param: GLfloat) => TextureParameterf;
            fn texture_parameter_f_ext(texture: GLuint, target: GLenum, pname: GLenum, param: GLfloat) => TextureParameterfEXT;
            fn generate_mipmap(target: GLenum) => GenerateMipmap;
            fn generate_texture_mipmap(texture: GLuint) => GenerateTextureMipmap;
            fn generate_texture_mipmap_ext(texture: GLuint, target: GLenum) => GenerateTextureMipmapEXT;
            fn bind_image_texture(unit: GLuint, texture: GLuint, level: GLint, layered: GLboolean, layer: GLint, access: GLenum, format: GLenum) => BindImageTexture;
            fn copy_image_sub_data(src_name: GLuint, src_target: GLenum, src_level: GLint, src_x: GLint, src_y: GLint, src_z: GLint, dst_name: GLuint, dst_target: GLenum, dst_level: GLint, dst_x: GLint, dst_y: GLint, dst_z: GLint, src_width: GLsizei, src_height: GLsizei, src_depth: GLsizei) => CopyImageSubData;

            // samplers
            fn bind_sampler(unit: GLuint, sampler: GLuint) => BindSampler;
            fn sampler_parameter_i(sampler: GLuint, pname: GLenum, param: GLint) => SamplerParameteri;
            fn sampler_parameter_f(sampler: GLuint, pname: GLenum, param: GLfloat) => SamplerParameterf;

            // framebuffers
            fn bind_framebuffer(target: GLenum, framebuffer: GLuint) => BindFramebuffer;
            fn framebuffer_texture_2d(target: GLenum, attachment: GLenum, textarget: GLenum, texture: GLuint, level: GLint) => FramebufferTexture2D;
            fn framebuffer_texture_layer(target: GLenum, attachment: GLenum, texture: GLuint, level: GLint, layer: GLint) => FramebufferTextureLayer;
            fn named_framebuffer_texture(framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint) => NamedFramebufferTexture;
            fn named_framebuffer_texture_layer(framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint, layer: GLint) => NamedFramebufferTextureLayer;
            fn named_framebuffer_texture_2d_ext(framebuffer: GLuint, attachment: GLenum, textarget: GLenum, texture: GLuint, level: GLint) => NamedFramebufferTexture2DEXT;
            fn named_framebuffer_texture_layer_ext(framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint, layer: GLint) => NamedFramebufferTextureLayerEXT;
            fn blit_framebuffer(src_x0: GLint, src_y0: GLint, src_x1: GLint, src_y1: GLint, dst_x0: GLint, dst_y0: GLint, dst_x1: GLint, dst_y1: GLint, mask: GLbitfield, filter: GLenum) => BlitFramebuffer;
            fn blit_named_framebuffer(read_framebuffer: GLuint, draw_framebuffer: GLuint, src_x0: GLint, src_y0: GLint, src_x1: GLint, src_y1: GLint, dst_x0: GLint, dst_y0: GLint, dst_x1: GLint, dst_y1: GLint, mask: GLbitfield, filter: GLenum) => BlitNamedFramebuffer;

            // shaders and programs
            fn compile_shader(shader: GLuint) => CompileShader;
            fn delete_shader(shader: GLuint) => DeleteShader;
            fn attach_shader(program: GLuint, shader: GLuint) => AttachShader;
            fn detach_shader(program: GLuint, shader: GLuint) => DetachShader;
            fn link_program(program: GLuint) => LinkProgram;
            fn delete_program(program: GLuint) => DeleteProgram;
            fn use_program(program: GLuint) => UseProgram;
            fn program_parameter_i(program: GLuint, pname: GLenum, value: GLint) => ProgramParameteri;
            fn program_parameter_i_arb(program: GLuint, pname: GLenum, value: GLint) => ProgramParameteriARB;
            fn uniform_block_binding(program: GLuint, uniform_block_index: GLuint, uniform_block_binding: GLuint) => UniformBlockBinding;
            fn bind_program_pipeline(pipeline: GLuint) => BindProgramPipeline;
            fn use_program_stages(pipeline: GLuint, stages: GLbitfield, program: GLuint) => UseProgramStages;
            fn validate_program_pipeline(pipeline: GLuint) => ValidateProgramPipeline;

            // vertex input
            fn bind_vertex_array(array: GLuint) => BindVertexArray;
            fn enable_vertex_attrib_array(index: GLuint) => EnableVertexAttribArray;
            fn disable_vertex_attrib_array(index: GLuint) => DisableVertexAttribArray;
            fn vertex_attrib_divisor(index: GLuint, divisor: GLuint) => VertexAttribDivisor;
            fn enable_vertex_array_attrib(vaobj: GLuint, index: GLuint) => EnableVertexArrayAttrib;
            fn vertex_array_attrib_format(vaobj: GLuint, attribindex: GLuint, size: GLint, type_: GLenum, normalized: GLboolean, relativeoffset: GLuint) => VertexArrayAttribFormat;
            fn vertex_array_attrib_i_format(vaobj: GLuint, attribindex: GLuint, size: GLint, type_: GLenum, relativeoffset: GLuint) => VertexArrayAttribIFormat;
            fn vertex_array_attrib_binding(vaobj: GLuint, attribindex: GLuint, bindingindex: GLuint) => VertexArrayAttribBinding;
            fn vertex_array_vertex_buffer(vaobj: GLuint, bindingindex: GLuint, buffer: GLuint, offset: GLintptr, stride: GLsizei) => VertexArrayVertexBuffer;
            fn vertex_array_binding_divisor(vaobj: GLuint, bindingindex: GLuint, divisor: GLuint) => VertexArrayBindingDivisor;
            fn vertex_array_element_buffer(vaobj: GLuint, buffer: GLuint) => VertexArrayElementBuffer;

            // draw and dispatch
            fn draw_arrays(mode: GLenum, first: GLint, count: GLsizei) => DrawArrays;
            fn draw_arrays_instanced(mode: GLenum, first: GLint, count: GLsizei, instancecount: GLsizei) => DrawArraysInstanced;
            fn draw_arrays_instanced_base_instance(mode: GLenum, first: GLint, count: GLsizei, instancecount: GLsizei, baseinstance: GLuint) => DrawArraysInstancedBaseInstance;
            fn draw_mesh_tasks_nv(first: GLuint, count: GLuint) => DrawMeshTasksNV;
            fn draw_mesh_tasks_indirect_nv(indirect: GLintptr) => DrawMeshTasksIndirectNV;
            fn multi_draw_mesh_tasks_indirect_nv(indirect: GLintptr, drawcount: GLsizei, stride: GLsizei) => MultiDrawMeshTasksIndirectNV;
            fn dispatch_compute(num_groups_x: GLuint, num_groups_y: GLuint, num_groups_z: GLuint) => DispatchCompute;
            fn patch_parameter_i(pname: GLenum, value: GLint) => PatchParameteri;

            // fixed function
            fn viewport(x: GLint, y: GLint, width: GLsizei, height: GLsizei) => Viewport;
            fn depth_range(near: GLdouble, far: GLdouble) => DepthRange;
            fn scissor(x: GLint, y: GLint, width: GLsizei, height: GLsizei) => Scissor;
            fn clip_control(origin: GLenum, depth: GLenum) => ClipControl;
            fn polygon_mode(face: GLenum, mode: GLenum) => PolygonMode;
            fn cull_face(mode: GLenum) => CullFace;
            fn front_face(mode: GLenum) => FrontFace;
            fn polygon_offset(factor: GLfloat, units: GLfloat) => PolygonOffset;
            fn depth_func(func: GLenum) => DepthFunc;
            fn depth_mask(flag: GLboolean) => DepthMask;
            fn stencil_func(func: GLenum, reference: GLint, mask: GLuint) => StencilFunc;
            fn stencil_mask(mask: GLuint) => StencilMask;
            fn blend_func_separate(src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) => BlendFuncSeparate;
            fn blend_func_separatei(buf: GLuint, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) => BlendFuncSeparatei;
            fn blend_equation_separate(mode_rgb: GLenum, mode_alpha: GLenum) => BlendEquationSeparate;
            fn blend_equation_separatei(buf: GLuint, mode_rgb: GLenum, mode_alpha: GLenum) => BlendEquationSeparatei;
            fn color_mask(red: GLboolean, green: GLboolean, blue: GLboolean, alpha: GLboolean) => ColorMask;
            fn color_maski(index: GLuint, red: GLboolean, green: GLboolean, blue: GLboolean, alpha: GLboolean) => ColorMaski;
            fn clear_color(red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat) => ClearColor;
            fn clear_depth(depth: GLdouble) => ClearDepth;
            fn clear_stencil(s: GLint) => ClearStencil;
            fn clear(mask: GLbitfield) => Clear;

            // debug
            fn pop_debug_group() => PopDebugGroup;
        }
    };
}

macro_rules! declare_entry_points {
    ($(fn $method:ident($($arg:ident: $ty:ty),*) => $gl:ident;)*) => {
        $(fn $method(&self, $($arg: $ty),*);)*
    };
}

// after the macros: the implementations expand them
mod context;
mod loaded;
mod recording;

pub use self::context::{ExternalContext, NativeContext, ProcAddressLoader};
pub use self::recording::RecordingGl;

/// OpenGL entry points used by the backend.
///
/// Method names are the snake_case form of the native name without the `gl` prefix. Object
/// creation functions return a single name instead of filling an array.
pub trait GlApi {
    simple_entry_points!(declare_entry_points);

    // context queries
    fn get_integer(&self, pname: GLenum) -> GLint;
    fn get_string(&self, name: GLenum) -> Option<String>;
    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String>;
    fn get_error(&self) -> GLenum;

    // buffers
    fn gen_buffer(&self) -> GLuint;
    fn create_buffer(&self) -> GLuint;
    fn delete_buffer(&self, buffer: GLuint);
    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    fn named_buffer_data(&self, buffer: GLuint, size: usize, data: Option<&[u8]>, usage: GLenum);
    fn named_buffer_data_ext(&self, buffer: GLuint, size: usize, data: Option<&[u8]>, usage: GLenum);
    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]);
    fn named_buffer_sub_data(&self, buffer: GLuint, offset: usize, data: &[u8]);
    fn named_buffer_sub_data_ext(&self, buffer: GLuint, offset: usize, data: &[u8]);
    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void;
    fn map_named_buffer(&self, buffer: GLuint, access: GLenum) -> *mut c_void;
    fn map_named_buffer_ext(&self, buffer: GLuint, access: GLenum) -> *mut c_void;
    fn unmap_buffer(&self, target: GLenum) -> bool;
    fn unmap_named_buffer(&self, buffer: GLuint) -> bool;
    fn unmap_named_buffer_ext(&self, buffer: GLuint) -> bool;

    // textures
    fn gen_texture(&self) -> GLuint;
    fn create_texture(&self, target: GLenum) -> GLuint;
    fn delete_texture(&self, texture: GLuint);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_1d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_3d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>);
    #[allow(clippy::too_many_arguments)]
    fn texture_image_1d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>);
    #[allow(clippy::too_many_arguments)]
    fn texture_image_2d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>);
    #[allow(clippy::too_many_arguments)]
    fn texture_image_3d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>);
    /// Uploads a whole mip level (offsets are zero).
    #[allow(clippy::too_many_arguments)]
    fn texture_sub_image_1d(&self, texture: GLuint, level: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: &[u8]);
    #[allow(clippy::too_many_arguments)]
    fn texture_sub_image_2d(&self, texture: GLuint, level: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: &[u8]);
    #[allow(clippy::too_many_arguments)]
    fn texture_sub_image_3d(&self, texture: GLuint, level: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: &[u8]);
    fn tex_parameter_fv(&self, target: GLenum, pname: GLenum, params: &[f32]);
    fn texture_parameter_fv(&self, texture: GLuint, pname: GLenum, params: &[f32]);
    fn texture_parameter_fv_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, params: &[f32]);

    // samplers
    fn gen_sampler(&self) -> GLuint;
    fn create_sampler(&self) -> GLuint;
    fn delete_sampler(&self, sampler: GLuint);
    fn sampler_parameter_fv(&self, sampler: GLuint, pname: GLenum, params: &[f32]);

    // framebuffers
    fn gen_framebuffer(&self) -> GLuint;
    fn create_framebuffer(&self) -> GLuint;
    fn delete_framebuffer(&self, framebuffer: GLuint);
    fn check_framebuffer_status(&self, target: GLenum) -> GLenum;
    fn check_named_framebuffer_status(&self, framebuffer: GLuint, target: GLenum) -> GLenum;
    fn check_named_framebuffer_status_ext(&self, framebuffer: GLuint, target: GLenum) -> GLenum;
    fn draw_buffers(&self, bufs: &[GLenum]);
    fn named_framebuffer_draw_buffers(&self, framebuffer: GLuint, bufs: &[GLenum]);
    fn framebuffer_draw_buffers_ext(&self, framebuffer: GLuint, bufs: &[GLenum]);

    // shaders and programs
    fn create_shader(&self, type_: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn shader_binary(&self, shader: GLuint, binary_format: GLenum, binary: &[u8]);
    fn specialize_shader(&self, shader: GLuint, entry_point: &str);
    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint;
    fn get_shader_info_log(&self, shader: GLuint) -> String;
    fn create_program(&self) -> GLuint;
    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint;
    fn get_program_info_log(&self, program: GLuint) -> String;
    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &str);
    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint;
    fn get_uniform_block_index(&self, program: GLuint, name: &str) -> GLuint;
    fn uniform(&self, location: GLint, value: UniformValue);
    fn program_uniform(&self, program: GLuint, location: GLint, value: UniformValue);
    fn program_uniform_ext(&self, program: GLuint, location: GLint, value: UniformValue);
    fn gen_program_pipeline(&self) -> GLuint;
    fn delete_program_pipeline(&self, pipeline: GLuint);
    fn get_program_pipeline_iv(&self, pipeline: GLuint, pname: GLenum) -> GLint;
    fn get_program_pipeline_info_log(&self, pipeline: GLuint) -> String;

    // vertex input
    fn gen_vertex_array(&self) -> GLuint;
    fn create_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, array: GLuint);
    fn vertex_attrib_pointer(&self, index: GLuint, size: GLint, type_: GLenum, normalized: bool, stride: GLsizei, offset: usize);
    fn vertex_attrib_i_pointer(&self, index: GLuint, size: GLint, type_: GLenum, stride: GLsizei, offset: usize);

    // draws with a byte offset into the bound element or indirect buffer
    fn draw_elements(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize);
    fn draw_elements_instanced(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei);
    fn draw_elements_base_vertex(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, basevertex: GLint);
    #[allow(clippy::too_many_arguments)]
    fn draw_elements_instanced_base_vertex(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei, basevertex: GLint);
    #[allow(clippy::too_many_arguments)]
    fn draw_elements_instanced_base_vertex_base_instance(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei, basevertex: GLint, baseinstance: GLuint);
    fn draw_arrays_indirect(&self, mode: GLenum, offset: usize);
    fn draw_elements_indirect(&self, mode: GLenum, type_: GLenum, offset: usize);
    fn multi_draw_arrays_indirect(&self, mode: GLenum, offset: usize, drawcount: GLsizei, stride: GLsizei);
    fn multi_draw_elements_indirect(&self, mode: GLenum, type_: GLenum, offset: usize, drawcount: GLsizei, stride: GLsizei);

    // viewport arrays
    fn viewport_array_v(&self, first: GLuint, v: &[f32]);
    fn depth_range_array_v(&self, first: GLuint, v: &[f64]);
    fn scissor_array_v(&self, first: GLuint, v: &[i32]);

    // queries
    fn gen_query(&self) -> GLuint;
    fn delete_query(&self, id: GLuint);
    fn begin_query(&self, target: GLenum, id: GLuint);
    fn end_query(&self, target: GLenum);
    fn query_counter(&self, id: GLuint, target: GLenum);
    fn get_query_object_u32(&self, id: GLuint, pname: GLenum) -> GLuint;
    fn get_query_object_u64(&self, id: GLuint, pname: GLenum) -> GLuint64;

    // debug output
    fn debug_message_callback(&self, callback: GLDEBUGPROC, user_param: *const c_void);
    fn debug_message_control(&self, source: GLenum, type_: GLenum, severity: GLenum, enabled: bool);
    fn debug_message_insert(&self, source: GLenum, type_: GLenum, id: GLuint, severity: GLenum, message: &str);
    fn push_debug_group(&self, source: GLenum, id: GLuint, message: &str);
}
