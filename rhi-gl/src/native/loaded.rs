//! `GlApi` on top of the generated function table.
use super::{GlApi, UniformValue};
use crate::api as gl;
use crate::api::types::*;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::ptr;

macro_rules! forward_entry_points {
    ($(fn $method:ident($($arg:ident: $ty:ty),*) => $gl:ident;)*) => {
        $(
            fn $method(&self, $($arg: $ty),*) {
                unsafe { self.$gl($($arg),*) }
            }
        )*
    };
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
    data.map_or(ptr::null(), |d| d.as_ptr() as *const c_void)
}

fn c_string(s: &str) -> CString {
    CString::new(s).unwrap_or_default()
}

unsafe fn gl_string(s: *const GLubyte) -> Option<String> {
    if s.is_null() {
        None
    } else {
        Some(
            CStr::from_ptr(s as *const c_char)
                .to_string_lossy()
                .into_owned(),
        )
    }
}

fn info_log(len: GLint, fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    let mut buf: Vec<u8> = vec![0; len.max(1) as usize];
    let mut written = 0;
    fill(buf.len() as GLsizei, &mut written, buf.as_mut_ptr() as *mut GLchar);
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

impl GlApi for gl::Gl {
    simple_entry_points!(forward_entry_points);

    fn get_integer(&self, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { self.GetIntegerv(pname, &mut v) };
        v
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        unsafe { gl_string(self.GetString(name)) }
    }

    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String> {
        unsafe { gl_string(self.GetStringi(name, index)) }
    }

    fn get_error(&self) -> GLenum {
        unsafe { self.GetError() }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_buffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenBuffers(1, &mut obj) };
        obj
    }

    fn create_buffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.CreateBuffers(1, &mut obj) };
        obj
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { self.DeleteBuffers(1, &buffer) }
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        unsafe { self.BufferData(target, size as GLsizeiptr, data_ptr(data), usage) }
    }

    fn named_buffer_data(&self, buffer: GLuint, size: usize, data: Option<&[u8]>, usage: GLenum) {
        unsafe { self.NamedBufferData(buffer, size as GLsizeiptr, data_ptr(data), usage) }
    }

    fn named_buffer_data_ext(&self, buffer: GLuint, size: usize, data: Option<&[u8]>, usage: GLenum) {
        unsafe { self.NamedBufferDataEXT(buffer, size as GLsizeiptr, data_ptr(data), usage) }
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        unsafe {
            self.BufferSubData(
                target,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn named_buffer_sub_data(&self, buffer: GLuint, offset: usize, data: &[u8]) {
        unsafe {
            self.NamedBufferSubData(
                buffer,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn named_buffer_sub_data_ext(&self, buffer: GLuint, offset: usize, data: &[u8]) {
        unsafe {
            self.NamedBufferSubDataEXT(
                buffer,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void {
        unsafe { self.MapBuffer(target, access) }
    }

    fn map_named_buffer(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        unsafe { self.MapNamedBuffer(buffer, access) }
    }

    fn map_named_buffer_ext(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        unsafe { self.MapNamedBufferEXT(buffer, access) }
    }

    fn unmap_buffer(&self, target: GLenum) -> bool {
        unsafe { self.UnmapBuffer(target) == gl::TRUE }
    }

    fn unmap_named_buffer(&self, buffer: GLuint) -> bool {
        unsafe { self.UnmapNamedBuffer(buffer) == gl::TRUE }
    }

    fn unmap_named_buffer_ext(&self, buffer: GLuint) -> bool {
        unsafe { self.UnmapNamedBufferEXT(buffer) == gl::TRUE }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_texture(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenTextures(1, &mut obj) };
        obj
    }

    fn create_texture(&self, target: GLenum) -> GLuint {
        let mut obj = 0;
        unsafe { self.CreateTextures(target, 1, &mut obj) };
        obj
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { self.DeleteTextures(1, &texture) }
    }

    fn tex_image_1d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        unsafe { self.TexImage1D(target, level, internalformat, width, 0, format, type_, data_ptr(data)) }
    }

    fn tex_image_2d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        unsafe {
            self.TexImage2D(target, level, internalformat, width, height, 0, format, type_, data_ptr(data))
        }
    }

    fn tex_image_3d(&self, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        unsafe {
            self.TexImage3D(target, level, internalformat, width, height, depth, 0, format, type_, data_ptr(data))
        }
    }

    fn texture_image_1d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        unsafe {
            self.TextureImage1DEXT(texture, target, level, internalformat, width, 0, format, type_, data_ptr(data))
        }
    }

    fn texture_image_2d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        unsafe {
            self.TextureImage2DEXT(texture, target, level, internalformat, width, height, 0, format, type_, data_ptr(data))
        }
    }

    fn texture_image_3d_ext(&self, texture: GLuint, target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: Option<&[u8]>) {
        unsafe {
            self.TextureImage3DEXT(texture, target, level, internalformat, width, height, depth, 0, format, type_, data_ptr(data))
        }
    }

    fn texture_sub_image_1d(&self, texture: GLuint, level: GLint, width: GLsizei, format: GLenum, type_: GLenum, data: &[u8]) {
        unsafe {
            self.TextureSubImage1D(texture, level, 0, width, format, type_, data.as_ptr() as *const c_void)
        }
    }

    fn texture_sub_image_2d(&self, texture: GLuint, level: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, data: &[u8]) {
        unsafe {
            self.TextureSubImage2D(texture, level, 0, 0, width, height, format, type_, data.as_ptr() as *const c_void)
        }
    }

    fn texture_sub_image_3d(&self, texture: GLuint, level: GLint, width: GLsizei, height: GLsizei, depth: GLsizei, format: GLenum, type_: GLenum, data: &[u8]) {
        unsafe {
            self.TextureSubImage3D(texture, level, 0, 0, 0, width, height, depth, format, type_, data.as_ptr() as *const c_void)
        }
    }

    fn tex_parameter_fv(&self, target: GLenum, pname: GLenum, params: &[f32]) {
        unsafe { self.TexParameterfv(target, pname, params.as_ptr()) }
    }

    fn texture_parameter_fv(&self, texture: GLuint, pname: GLenum, params: &[f32]) {
        unsafe { self.TextureParameterfv(texture, pname, params.as_ptr()) }
    }

    fn texture_parameter_fv_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, params: &[f32]) {
        unsafe { self.TextureParameterfvEXT(texture, target, pname, params.as_ptr()) }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_sampler(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenSamplers(1, &mut obj) };
        obj
    }

    fn create_sampler(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.CreateSamplers(1, &mut obj) };
        obj
    }

    fn delete_sampler(&self, sampler: GLuint) {
        unsafe { self.DeleteSamplers(1, &sampler) }
    }

    fn sampler_parameter_fv(&self, sampler: GLuint, pname: GLenum, params: &[f32]) {
        unsafe { self.SamplerParameterfv(sampler, pname, params.as_ptr()) }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_framebuffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenFramebuffers(1, &mut obj) };
        obj
    }

    fn create_framebuffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.CreateFramebuffers(1, &mut obj) };
        obj
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        unsafe { self.DeleteFramebuffers(1, &framebuffer) }
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        unsafe { self.CheckFramebufferStatus(target) }
    }

    fn check_named_framebuffer_status(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        unsafe { self.CheckNamedFramebufferStatus(framebuffer, target) }
    }

    fn check_named_framebuffer_status_ext(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        unsafe { self.CheckNamedFramebufferStatusEXT(framebuffer, target) }
    }

    fn draw_buffers(&self, bufs: &[GLenum]) {
        unsafe { self.DrawBuffers(bufs.len() as GLsizei, bufs.as_ptr()) }
    }

    fn named_framebuffer_draw_buffers(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        unsafe { self.NamedFramebufferDrawBuffers(framebuffer, bufs.len() as GLsizei, bufs.as_ptr()) }
    }

    fn framebuffer_draw_buffers_ext(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        unsafe { self.FramebufferDrawBuffersEXT(framebuffer, bufs.len() as GLsizei, bufs.as_ptr()) }
    }

    //----------------------------------------------------------------------------------------------
    fn create_shader(&self, type_: GLenum) -> GLuint {
        unsafe { self.CreateShader(type_) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let sources = [source.as_ptr() as *const GLchar];
        let lengths = [source.len() as GLint];
        unsafe { self.ShaderSource(shader, 1, sources.as_ptr(), lengths.as_ptr()) }
    }

    fn shader_binary(&self, shader: GLuint, binary_format: GLenum, binary: &[u8]) {
        unsafe {
            self.ShaderBinary(
                1,
                &shader,
                binary_format,
                binary.as_ptr() as *const c_void,
                binary.len() as GLsizei,
            )
        }
    }

    fn specialize_shader(&self, shader: GLuint, entry_point: &str) {
        let entry_point = c_string(entry_point);
        unsafe { self.SpecializeShader(shader, entry_point.as_ptr(), 0, ptr::null(), ptr::null()) }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { self.GetShaderiv(shader, pname, &mut v) };
        v
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let len = self.get_shader_iv(shader, gl::INFO_LOG_LENGTH);
        info_log(len, |size, written, buf| unsafe {
            self.GetShaderInfoLog(shader, size, written, buf)
        })
    }

    fn create_program(&self) -> GLuint {
        unsafe { self.CreateProgram() }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { self.GetProgramiv(program, pname, &mut v) };
        v
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let len = self.get_program_iv(program, gl::INFO_LOG_LENGTH);
        info_log(len, |size, written, buf| unsafe {
            self.GetProgramInfoLog(program, size, written, buf)
        })
    }

    fn bind_attrib_location(&self, program: GLuint, index: GLuint, name: &str) {
        let name = c_string(name);
        unsafe { self.BindAttribLocation(program, index, name.as_ptr()) }
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        let name = c_string(name);
        unsafe { self.GetUniformLocation(program, name.as_ptr()) }
    }

    fn get_uniform_block_index(&self, program: GLuint, name: &str) -> GLuint {
        let name = c_string(name);
        unsafe { self.GetUniformBlockIndex(program, name.as_ptr()) }
    }

    fn uniform(&self, location: GLint, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Int(v) => self.Uniform1i(location, v),
                UniformValue::Float(v) => self.Uniform1f(location, v),
                UniformValue::Vec2(v) => self.Uniform2fv(location, 1, v.as_ptr()),
                UniformValue::Vec3(v) => self.Uniform3fv(location, 1, v.as_ptr()),
                UniformValue::Vec4(v) => self.Uniform4fv(location, 1, v.as_ptr()),
                UniformValue::Mat3(v) => self.UniformMatrix3fv(location, 1, gl::FALSE, v.as_ptr()),
                UniformValue::Mat4(v) => self.UniformMatrix4fv(location, 1, gl::FALSE, v.as_ptr()),
            }
        }
    }

    fn program_uniform(&self, program: GLuint, location: GLint, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Int(v) => self.ProgramUniform1i(program, location, v),
                UniformValue::Float(v) => self.ProgramUniform1f(program, location, v),
                UniformValue::Vec2(v) => self.ProgramUniform2fv(program, location, 1, v.as_ptr()),
                UniformValue::Vec3(v) => self.ProgramUniform3fv(program, location, 1, v.as_ptr()),
                UniformValue::Vec4(v) => self.ProgramUniform4fv(program, location, 1, v.as_ptr()),
                UniformValue::Mat3(v) => {
                    self.ProgramUniformMatrix3fv(program, location, 1, gl::FALSE, v.as_ptr())
                }
                UniformValue::Mat4(v) => {
                    self.ProgramUniformMatrix4fv(program, location, 1, gl::FALSE, v.as_ptr())
                }
            }
        }
    }

    fn program_uniform_ext(&self, program: GLuint, location: GLint, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Int(v) => self.ProgramUniform1iEXT(program, location, v),
                UniformValue::Float(v) => self.ProgramUniform1fEXT(program, location, v),
                UniformValue::Vec2(v) => self.ProgramUniform2fvEXT(program, location, 1, v.as_ptr()),
                UniformValue::Vec3(v) => self.ProgramUniform3fvEXT(program, location, 1, v.as_ptr()),
                UniformValue::Vec4(v) => self.ProgramUniform4fvEXT(program, location, 1, v.as_ptr()),
                UniformValue::Mat3(v) => {
                    self.ProgramUniformMatrix3fvEXT(program, location, 1, gl::FALSE, v.as_ptr())
                }
                UniformValue::Mat4(v) => {
                    self.ProgramUniformMatrix4fvEXT(program, location, 1, gl::FALSE, v.as_ptr())
                }
            }
        }
    }

    fn gen_program_pipeline(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenProgramPipelines(1, &mut obj) };
        obj
    }

    fn delete_program_pipeline(&self, pipeline: GLuint) {
        unsafe { self.DeleteProgramPipelines(1, &pipeline) }
    }

    fn get_program_pipeline_iv(&self, pipeline: GLuint, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { self.GetProgramPipelineiv(pipeline, pname, &mut v) };
        v
    }

    fn get_program_pipeline_info_log(&self, pipeline: GLuint) -> String {
        let len = self.get_program_pipeline_iv(pipeline, gl::INFO_LOG_LENGTH);
        info_log(len, |size, written, buf| unsafe {
            self.GetProgramPipelineInfoLog(pipeline, size, written, buf)
        })
    }

    //----------------------------------------------------------------------------------------------
    fn gen_vertex_array(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenVertexArrays(1, &mut obj) };
        obj
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.CreateVertexArrays(1, &mut obj) };
        obj
    }

    fn delete_vertex_array(&self, array: GLuint) {
        unsafe { self.DeleteVertexArrays(1, &array) }
    }

    fn vertex_attrib_pointer(&self, index: GLuint, size: GLint, type_: GLenum, normalized: bool, stride: GLsizei, offset: usize) {
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        unsafe { self.VertexAttribPointer(index, size, type_, normalized, stride, offset as *const c_void) }
    }

    fn vertex_attrib_i_pointer(&self, index: GLuint, size: GLint, type_: GLenum, stride: GLsizei, offset: usize) {
        unsafe { self.VertexAttribIPointer(index, size, type_, stride, offset as *const c_void) }
    }

    //----------------------------------------------------------------------------------------------
    fn draw_elements(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize) {
        unsafe { self.DrawElements(mode, count, type_, offset as *const c_void) }
    }

    fn draw_elements_instanced(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei) {
        unsafe { self.DrawElementsInstanced(mode, count, type_, offset as *const c_void, instancecount) }
    }

    fn draw_elements_base_vertex(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, basevertex: GLint) {
        unsafe { self.DrawElementsBaseVertex(mode, count, type_, offset as *const c_void, basevertex) }
    }

    fn draw_elements_instanced_base_vertex(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei, basevertex: GLint) {
        unsafe {
            self.DrawElementsInstancedBaseVertex(mode, count, type_, offset as *const c_void, instancecount, basevertex)
        }
    }

    fn draw_elements_instanced_base_vertex_base_instance(&self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize, instancecount: GLsizei, basevertex: GLint, baseinstance: GLuint) {
        unsafe {
            self.DrawElementsInstancedBaseVertexBaseInstance(
                mode,
                count,
                type_,
                offset as *const c_void,
                instancecount,
                basevertex,
                baseinstance,
            )
        }
    }

    fn draw_arrays_indirect(&self, mode: GLenum, offset: usize) {
        unsafe { self.DrawArraysIndirect(mode, offset as *const c_void) }
    }

    fn draw_elements_indirect(&self, mode: GLenum, type_: GLenum, offset: usize) {
        unsafe { self.DrawElementsIndirect(mode, type_, offset as *const c_void) }
    }

    fn multi_draw_arrays_indirect(&self, mode: GLenum, offset: usize, drawcount: GLsizei, stride: GLsizei) {
        unsafe { self.MultiDrawArraysIndirect(mode, offset as *const c_void, drawcount, stride) }
    }

    fn multi_draw_elements_indirect(&self, mode: GLenum, type_: GLenum, offset: usize, drawcount: GLsizei, stride: GLsizei) {
        unsafe { self.MultiDrawElementsIndirect(mode, type_, offset as *const c_void, drawcount, stride) }
    }

    //----------------------------------------------------------------------------------------------
    fn viewport_array_v(&self, first: GLuint, v: &[f32]) {
        unsafe { self.ViewportArrayv(first, (v.len() / 4) as GLsizei, v.as_ptr()) }
    }

    fn depth_range_array_v(&self, first: GLuint, v: &[f64]) {
        unsafe { self.DepthRangeArrayv(first, (v.len() / 2) as GLsizei, v.as_ptr()) }
    }

    fn scissor_array_v(&self, first: GLuint, v: &[i32]) {
        unsafe { self.ScissorArrayv(first, (v.len() / 4) as GLsizei, v.as_ptr()) }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_query(&self) -> GLuint {
        let mut obj = 0;
        unsafe { self.GenQueries(1, &mut obj) };
        obj
    }

    fn delete_query(&self, id: GLuint) {
        unsafe { self.DeleteQueries(1, &id) }
    }

    fn begin_query(&self, target: GLenum, id: GLuint) {
        unsafe { self.BeginQuery(target, id) }
    }

    fn end_query(&self, target: GLenum) {
        unsafe { self.EndQuery(target) }
    }

    fn query_counter(&self, id: GLuint, target: GLenum) {
        unsafe { self.QueryCounter(id, target) }
    }

    fn get_query_object_u32(&self, id: GLuint, pname: GLenum) -> GLuint {
        let mut v = 0;
        unsafe { self.GetQueryObjectuiv(id, pname, &mut v) };
        v
    }

    fn get_query_object_u64(&self, id: GLuint, pname: GLenum) -> GLuint64 {
        let mut v = 0;
        unsafe { self.GetQueryObjectui64v(id, pname, &mut v) };
        v
    }

    //----------------------------------------------------------------------------------------------
    fn debug_message_callback(&self, callback: GLDEBUGPROC, user_param: *const c_void) {
        unsafe { self.DebugMessageCallback(callback, user_param) }
    }

    fn debug_message_control(&self, source: GLenum, type_: GLenum, severity: GLenum, enabled: bool) {
        let enabled = if enabled { gl::TRUE } else { gl::FALSE };
        unsafe { self.DebugMessageControl(source, type_, severity, 0, ptr::null(), enabled) }
    }

    fn debug_message_insert(&self, source: GLenum, type_: GLenum, id: GLuint, severity: GLenum, message: &str) {
        unsafe {
            self.DebugMessageInsert(
                source,
                type_,
                id,
                severity,
                message.len() as GLsizei,
                message.as_ptr() as *const GLchar,
            )
        }
    }

    fn push_debug_group(&self, source: GLenum, id: GLuint, message: &str) {
        unsafe {
            self.PushDebugGroup(
                source,
                id,
                message.len() as GLsizei,
                message.as_ptr() as *const GLchar,
            )
        }
    }
}
